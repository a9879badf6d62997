//! Text Metrics
//!
//! Character counting used for the derived per-line and per-second fields.
//! Formatting tags (`<i>`, `{\an8}`) never count as visible characters.

/// Removes `<...>` and `{...}` formatting tags.
pub fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut closing: Option<char> = None;

    for c in text.chars() {
        match (closing, c) {
            (None, '<') => closing = Some('>'),
            (None, '{') => closing = Some('}'),
            (None, _) => result.push(c),
            (Some(end), _) if c == end => closing = None,
            (Some(_), _) => {}
        }
    }

    result
}

/// Visible character count of every line; empty text has no lines.
pub fn characters_per_line(text: &str) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    strip_tags(text)
        .split('\n')
        .map(|line| line.trim_end_matches('\r').chars().count())
        .collect()
}

/// Characters that count towards reading speed. Line breaks are not counted.
pub fn text_length_for_timing(text: &str) -> usize {
    characters_per_line(text).iter().sum()
}

/// Reading speed in characters per second; zero for empty text or a
/// non-positive duration.
pub fn characters_per_second(text: &str, msecs: i64) -> f64 {
    if msecs <= 0 {
        return 0.0;
    }
    let length = text_length_for_timing(text);
    if length == 0 {
        return 0.0;
    }
    (length as f64 * 1000.0) / msecs as f64
}

/// Per-line counts in their display form, one count per line (`"12\n8"`).
pub fn format_counts(counts: &[usize]) -> String {
    counts
        .iter()
        .map(|count| count.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
