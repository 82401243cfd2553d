/// Formats a byte count as mebibytes with two decimals.
///
/// # Example
///
/// ```
/// use tgdl::core::utils::format_megabytes;
///
/// assert_eq!(format_megabytes(52_428_800), "50.00");
/// assert_eq!(format_megabytes(1_572_864), "1.50");
/// ```
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Truncates a string to at most `max_chars` characters, appending an ellipsis
/// when something was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
