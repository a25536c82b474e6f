/// Strips a single leading `[` and a single trailing `]` from a T-SQL
/// identifier or literal. Each bracket is removed independently, matching
/// how bracket quoting is written in practice.
pub fn unquote(source: &str) -> &str {
    let source = source.strip_prefix('[').unwrap_or(source);
    source.strip_suffix(']').unwrap_or(source)
}

/// Ordinal case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
