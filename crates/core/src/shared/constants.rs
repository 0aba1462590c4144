/// Marker accepted in place of a path for stdin input or stdout output.
pub const STREAM_MARKER: &str = "-";

/// File name pattern handed to the frame extractor. Numbering starts at 1.
pub const FRAME_PATTERN: &str = "%06d.png";
pub const FRAME_EXTENSION: &str = "png";
pub const FRAME_START_NUMBER: u32 = 1;

/// Suffix appended to the input file stem for a named working area.
pub const NAMED_AREA_SUFFIX: &str = "_frames";
/// Named working area used when the input comes from a pipe.
pub const DEFAULT_NAMED_AREA: &str = "frames";

pub const SCRATCH_PREFIX: &str = "subscan-";

pub const EXEC_PLACEHOLDER: &str = "{}";
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_SAMPLE_RATE: &str = "1";

/// Nominal scale (seconds) for the activity bar when duration is unknown.
pub const NOMINAL_PROGRESS_SECONDS: f64 = 600.0;
pub const PROGRESS_BAR_WIDTH: usize = 24;

pub const FFMPEG_BINARY: &str = "ffmpeg";
pub const FFPROBE_BINARY: &str = "ffprobe";
pub const TESSERACT_BINARY: &str = "tesseract";
