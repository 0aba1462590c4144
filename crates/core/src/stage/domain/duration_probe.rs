use std::path::Path;

/// Discovers the playback duration of a media file.
///
/// Returns `None` when no usable duration can be found; callers degrade to
/// an unscaled progress indicator rather than failing.
pub trait DurationProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Option<f64>;
}
