//! Count formatting for log and report lines.

/// Suffix for nouns that pluralize with a plain "s" ("3 redirect{s}").
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format a count with its noun: "1 redirect", "3 redirects", "2 entries".
///
/// Nouns ending in a consonant plus "y" take "ies"; everything else gets a
/// plain "s".
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        return format!("1 {noun}");
    }
    match noun.strip_suffix('y') {
        Some(stem) if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) => {
            format!("{count} {stem}ies")
        }
        _ => format!("{count} {noun}s"),
    }
}
