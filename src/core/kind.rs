//! Content type definitions.
//!
//! Content lives under `{content}/{type}/{folder}/{locale}.yml`. The type
//! determines the canonical URL template and a couple of locale quirks
//! (landings treat `_common.yml` as the primary document).

use super::UrlPath;

/// Category of a content folder, determines the canonical URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Plain marketing pages, served at `/{slug}`
    Pages,
    /// Career programs, served locale-prefixed at `/{locale}/career-programs/{slug}`
    Programs,
    /// Physical locations, served at `/locations/{slug}`
    Locations,
    /// Campaign landing pages, served at `/landing/{slug}`
    Landings,
}

impl ContentType {
    /// All content types, in scan order.
    pub const ALL: [Self; 4] = [Self::Pages, Self::Programs, Self::Locations, Self::Landings];

    /// Directory name under the content root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Programs => "programs",
            Self::Locations => "locations",
            Self::Landings => "landings",
        }
    }

    /// Display name for this content type.
    pub fn name(self) -> &'static str {
        self.dir_name()
    }

    /// Detect content type from a directory name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "pages" => Some(Self::Pages),
            "programs" => Some(Self::Programs),
            "locations" => Some(Self::Locations),
            "landings" => Some(Self::Landings),
            _ => None,
        }
    }

    /// Whether canonical URLs for this type carry a locale prefix.
    #[inline]
    pub fn is_locale_prefixed(self) -> bool {
        matches!(self, Self::Programs)
    }

    /// Whether `_common.yml` takes priority over locale files for this type.
    ///
    /// Landings are mostly shared content with optional locale overrides, so
    /// the shared file wins.
    #[inline]
    pub fn prefers_common(self) -> bool {
        matches!(self, Self::Landings)
    }

    /// Canonical URL for a slug. `locale` is only used by locale-prefixed
    /// types and ignored otherwise.
    pub fn canonical_url(self, slug: &str, locale: &str) -> UrlPath {
        match self {
            Self::Pages => UrlPath::from_route(&format!("/{}", slug)),
            Self::Programs => {
                UrlPath::from_route(&format!("/{}/career-programs/{}", locale, slug))
            }
            Self::Locations => UrlPath::from_route(&format!("/locations/{}", slug)),
            Self::Landings => UrlPath::from_route(&format!("/landing/{}", slug)),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dir_name() {
        assert_eq!(ContentType::from_dir_name("pages"), Some(ContentType::Pages));
        assert_eq!(
            ContentType::from_dir_name("landings"),
            Some(ContentType::Landings)
        );
        assert_eq!(ContentType::from_dir_name("blog"), None);
    }

    #[test]
    fn test_canonical_url_templates() {
        assert_eq!(
            ContentType::Pages.canonical_url("about", "en").as_str(),
            "/about"
        );
        assert_eq!(
            ContentType::Programs
                .canonical_url("python-bootcamp", "en")
                .as_str(),
            "/en/career-programs/python-bootcamp"
        );
        assert_eq!(
            ContentType::Locations.canonical_url("madrid", "es").as_str(),
            "/locations/madrid"
        );
        assert_eq!(
            ContentType::Landings.canonical_url("promo", "en").as_str(),
            "/landing/promo"
        );
    }

    #[test]
    fn test_locale_prefixed() {
        assert!(ContentType::Programs.is_locale_prefixed());
        assert!(!ContentType::Pages.is_locale_prefixed());
        assert!(!ContentType::Landings.is_locale_prefixed());
    }
}
