//! A single indexed content entry.

use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::ContentMeta;
use crate::core::{ContentType, UrlPath};

/// One content folder, resolved to its slug, locale files and metadata.
#[derive(Debug, Clone)]
pub struct ContentEntry {
    /// Which content type directory this entry came from.
    pub content_type: ContentType,
    /// Canonical identifier (declared `slug:` or the folder name).
    pub slug: String,
    /// Folder name on disk.
    pub dir_name: String,
    /// Absolute folder path.
    pub dir: PathBuf,
    /// Locale files inside the folder (`en.yml`, `es.yml`, `_common.yml`...).
    pub files: Vec<PathBuf>,
    /// Locales this entry provides content for.
    pub locales: Vec<String>,
    /// Display title from the primary document.
    pub title: Option<String>,
    /// Metadata from the primary document.
    pub meta: ContentMeta,
}

impl ContentEntry {
    /// Canonical URL for the entry in `locale`.
    ///
    /// Only locale-prefixed types embed the locale; for the others the
    /// argument is ignored.
    pub fn canonical_url(&self, locale: &str) -> UrlPath {
        self.content_type.canonical_url(&self.slug, locale)
    }

    /// Every canonical URL of the entry, one per locale for locale-prefixed
    /// types, exactly one otherwise.
    pub fn canonical_urls(&self, config: &SiteConfig) -> Vec<UrlPath> {
        if self.content_type.is_locale_prefixed() {
            self.locales_or_default(config)
                .iter()
                .map(|locale| self.canonical_url(locale))
                .collect()
        } else {
            vec![self.canonical_url(&config.routes.default_locale)]
        }
    }

    /// Locales of this entry, falling back to the configured set when the
    /// folder declares none.
    pub fn locales_or_default<'a>(&'a self, config: &'a SiteConfig) -> &'a [String] {
        if self.locales.is_empty() {
            &config.routes.locales
        } else {
            &self.locales
        }
    }

    /// Resolve the content file to read for `locale`.
    ///
    /// Landing pages keep shared copy in `_common.yml` and prefer it; every
    /// other type prefers the exact locale file. `en` is the last resort for
    /// both.
    pub fn file_content(&self, locale: &str) -> Option<&Path> {
        let candidates: [&str; 3] = if self.content_type.prefers_common() {
            ["_common", locale, "en"]
        } else {
            [locale, "_common", "en"]
        };

        candidates
            .iter()
            .find_map(|stem| self.file_with_stem(stem))
    }

    /// The file that declared this entry's identity (`en.yml`, then
    /// `_common.yml`, then the first file). Used for error provenance.
    pub fn primary_file(&self) -> Option<&Path> {
        self.file_with_stem("en")
            .or_else(|| self.file_with_stem("_common"))
            .or_else(|| self.files.first().map(PathBuf::as_path))
    }

    /// Find the locale file with the given stem, if present.
    pub fn file_with_stem(&self, stem: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|f| f.file_stem().is_some_and(|s| s == stem))
            .map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn entry(content_type: ContentType, stems: &[&str]) -> ContentEntry {
        ContentEntry {
            content_type,
            slug: "python-bootcamp".to_string(),
            dir_name: "python-bootcamp".to_string(),
            dir: PathBuf::from("/site/marketing-content/programs/python-bootcamp"),
            files: stems
                .iter()
                .map(|s| {
                    PathBuf::from(format!(
                        "/site/marketing-content/programs/python-bootcamp/{s}.yml"
                    ))
                })
                .collect(),
            locales: stems
                .iter()
                .filter(|s| **s != "_common")
                .map(|s| s.to_string())
                .collect(),
            title: None,
            meta: ContentMeta::default(),
        }
    }

    #[test]
    fn test_file_content_prefers_locale() {
        let e = entry(ContentType::Programs, &["en", "es", "_common"]);
        let file = e.file_content("es").unwrap();
        assert!(file.ends_with("es.yml"));
    }

    #[test]
    fn test_file_content_falls_back_to_common_then_en() {
        let e = entry(ContentType::Programs, &["en", "_common"]);
        let file = e.file_content("es").unwrap();
        assert!(file.ends_with("_common.yml"));

        let e = entry(ContentType::Programs, &["en"]);
        let file = e.file_content("es").unwrap();
        assert!(file.ends_with("en.yml"));
    }

    #[test]
    fn test_landings_prefer_common() {
        let e = entry(ContentType::Landings, &["en", "_common"]);
        let file = e.file_content("en").unwrap();
        assert!(file.ends_with("_common.yml"));
    }

    #[test]
    fn test_canonical_urls_per_locale() {
        let config = test_parse_config("");
        let e = entry(ContentType::Programs, &["en", "es"]);
        let urls = e.canonical_urls(&config);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].as_str(), "/en/career-programs/python-bootcamp");
        assert_eq!(urls[1].as_str(), "/es/career-programs/python-bootcamp");
    }

    #[test]
    fn test_canonical_urls_single_for_unprefixed() {
        let config = test_parse_config("");
        let e = entry(ContentType::Locations, &["en", "es"]);
        let urls = e.canonical_urls(&config);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].as_str(), "/locations/python-bootcamp");
    }

    #[test]
    fn test_locales_fall_back_to_config() {
        let config = test_parse_config("");
        let e = entry(ContentType::Programs, &[]);
        assert_eq!(e.locales_or_default(&config), &["en", "es"]);
    }
}
