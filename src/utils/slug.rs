//! Slugification for folder names, proposed registry ids, and fuzzy-match keys.

use deunicode::deunicode;

/// Slugify a string: transliterate to ASCII, lowercase, collapse every run of
/// non-alphanumeric characters into a single hyphen, trim hyphens at the ends.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode(input).to_lowercase();
    let mut out = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hero Image"), "hero-image");
    }

    #[test]
    fn test_collapses_runs() {
        assert_eq!(slugify("photo -- final (v2)"), "photo-final-v2");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(slugify("--hero--"), "hero");
    }

    #[test]
    fn test_unicode_transliteration() {
        assert_eq!(slugify("Café Olé"), "cafe-ole");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
