/// Keys carrying the elapsed output time, in microseconds. The media engine
/// reports `out_time_ms` in microseconds as well, despite its name.
const ELAPSED_KEYS: &[&str] = &["out_time_us", "out_time_ms"];

/// Splits a `key=value` progress line.
pub fn parse_record(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.trim().split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Elapsed output time in microseconds, if this line reports one.
///
/// Placeholder values such as `N/A` and the negative values emitted before
/// the first frame are ignored.
pub fn elapsed_micros(line: &str) -> Option<u64> {
    let (key, value) = parse_record(line)?;
    if !ELAPSED_KEYS.contains(&key) {
        return None;
    }
    let micros: i64 = value.parse().ok()?;
    u64::try_from(micros).ok()
}
