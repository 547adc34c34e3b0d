use unicode_normalization::UnicodeNormalization;

/// Returned when nothing usable is left of a name
pub const UNKNOWN_NAME: &str = "Unknown";

const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Map an arbitrary display string onto something usable as a single path
/// component. Never fails and never returns an empty string.
pub fn sanitize_name(name: &str) -> String {
    let folded: String = name
        .nfkc()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .filter(|c| is_printable(*c))
        .collect();

    // Dropping characters can leave combining marks next to a new base
    let recomposed: String = folded.nfkc().collect();
    let cleaned = recomposed
        .trim_end_matches(&['.', ' '][..])
        .trim_start_matches(' ');

    if cleaned.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Strip a parenthesised suffix from a column header before sanitizing it,
/// so `Intro (mm:ss)` becomes `Intro`.
pub fn sanitize_label(header: &str) -> String {
    let head = header.split('(').next().unwrap_or_default();
    sanitize_name(head.trim())
}

/// Printable in the sense of "safe to show": the ASCII space is the only
/// separator allowed; controls, format characters, surrogates and private
/// use code points are not.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c as u32,
        0x00AD
            | 0x0600..=0x0605
            | 0x061C
            | 0x06DD
            | 0x070F
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xE000..=0xF8FF
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0xF0000..=0x10FFFF
    )
}
