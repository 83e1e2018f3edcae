//! Field name canonicalization.

/// Canonicalizes a column or field name for comparison.
///
/// - Lowercases the whole string
/// - Treats `_`, `-` and `.` as word separators
/// - Drops anything that is not an ASCII letter, digit or whitespace
/// - Collapses whitespace runs and trims
///
/// Never fails: arbitrary uploaded headers normalize to some (possibly empty)
/// string, and normalizing twice changes nothing.
pub fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|ch| if matches!(ch, '_' | '-' | '.') { ' ' } else { ch })
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize_name`] for an optional name; `None` normalizes to `""`.
pub fn normalize_optional(raw: Option<&str>) -> String {
    raw.map(normalize_name).unwrap_or_default()
}
