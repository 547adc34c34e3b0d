/// Parse a single timecode token into a count of seconds.
///
/// Accepts `S`, `M:S` and `H:M:S`, with `.` accepted as an alias for `:`
/// (so `1.30` is one minute thirty). Each part is an integer; signs are
/// allowed here and dealt with when the range is clamped. Returns `None`
/// for any other shape.
pub fn parse_timecode(token: &str) -> Option<i64> {
    let normalized = token.trim().replace('.', ":");

    let mut parts = Vec::with_capacity(3);
    for part in normalized.split(':') {
        parts.push(part.trim().parse::<i64>().ok()?);
    }

    match parts.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] => hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(*seconds),
        _ => None,
    }
}

/// Render seconds as `HH:MM:SS` for ffmpeg arguments and log lines
pub fn format_timecode(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
