//! Filesystem scan producing content entries.
//!
//! The content tree is shallow and strictly shaped:
//! `{content.dir}/{type}/{folder}/{locale}.yml`. Anything that does not fit
//! the shape is skipped, not an error, so that stray editor files or new
//! experimental folders never break validation.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;

use crate::config::SiteConfig;
use crate::content::{self, ContentDoc};
use crate::core::ContentType;
use crate::debug;
use crate::index::ContentEntry;

/// Scan the whole content tree. Types are scanned in parallel; the result is
/// deterministically ordered by type and slug.
pub fn scan_entries(config: &SiteConfig) -> Result<Vec<Arc<ContentEntry>>> {
    let mut entries: Vec<Arc<ContentEntry>> = ContentType::ALL
        .par_iter()
        .map(|content_type| scan_type(config, *content_type))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    entries.sort_by(|a, b| {
        (a.content_type as usize, &a.slug).cmp(&(b.content_type as usize, &b.slug))
    });
    Ok(entries)
}

/// Scan one content type directory. A missing directory yields no entries.
fn scan_type(config: &SiteConfig, content_type: ContentType) -> Result<Vec<Arc<ContentEntry>>> {
    let dir = config.content_dir().join(content_type.dir_name());
    if !dir.is_dir() {
        debug!("scan"; "no {} directory at {}", content_type.name(), dir.display());
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for dir_entry in std::fs::read_dir(&dir)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if dir_name.starts_with('.') || dir_name.starts_with('_') {
            continue;
        }

        if let Some(entry) = scan_folder(content_type, &path, dir_name)? {
            entries.push(Arc::new(entry));
        }
    }
    Ok(entries)
}

/// Build one entry from a content folder. Folders without any YAML file are
/// skipped.
fn scan_folder(
    content_type: ContentType,
    dir: &Path,
    dir_name: &str,
) -> Result<Option<ContentEntry>> {
    let mut files = Vec::new();
    for file in std::fs::read_dir(dir)? {
        let path = file?.path();
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if path.is_file() && is_yaml {
            files.push(path);
        }
    }
    if files.is_empty() {
        debug!("scan"; "skipping {} (no content files)", dir.display());
        return Ok(None);
    }
    files.sort();

    let locales = detect_locales(content_type, &files);
    let doc = primary_doc(&files);

    let slug = doc
        .as_ref()
        .and_then(|d| d.slug.clone())
        .unwrap_or_else(|| dir_name.to_string());
    let (title, meta) = match doc {
        Some(d) => (d.title, d.meta),
        None => (None, Default::default()),
    };

    Ok(Some(ContentEntry {
        content_type,
        slug,
        dir_name: dir_name.to_string(),
        dir: dir.to_path_buf(),
        files,
        locales,
        title,
        meta,
    }))
}

/// Locales covered by a folder's files. `_common` is shared copy, never a
/// locale. For most types only two-letter stems count; landing pages are
/// free-form and any named variant is treated as a locale.
fn detect_locales(content_type: ContentType, files: &[std::path::PathBuf]) -> Vec<String> {
    let mut locales: Vec<String> = files
        .iter()
        .filter_map(|f| f.file_stem().and_then(|s| s.to_str()))
        .filter(|stem| *stem != "_common")
        .filter(|stem| {
            content_type.prefers_common()
                || (stem.len() == 2 && stem.chars().all(|c| c.is_ascii_lowercase()))
        })
        .map(str::to_string)
        .collect();
    locales.sort();
    locales.dedup();
    locales
}

/// The document that carries the folder's identity: `en.yml` when present,
/// then `_common.yml`, then whatever file sorts first.
fn primary_doc(files: &[std::path::PathBuf]) -> Option<ContentDoc> {
    let by_stem = |stem: &str| {
        files
            .iter()
            .find(|f| f.file_stem().is_some_and(|s| s == stem))
    };

    by_stem("en")
        .or_else(|| by_stem("_common"))
        .or_else(|| files.first())
        .and_then(|path| content::try_load_doc(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn config_at(root: &Path) -> SiteConfig {
        let mut config = crate::config::test_parse_config("");
        config.root = root.to_path_buf();
        config
    }

    #[test]
    fn test_scan_basic_tree() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("marketing-content");
        write_file(
            &content.join("programs/python-bootcamp"),
            "en.yml",
            "slug: python-bootcamp\ntitle: Python Bootcamp",
        );
        write_file(
            &content.join("programs/python-bootcamp"),
            "es.yml",
            "title: Bootcamp de Python",
        );
        write_file(&content.join("pages/about"), "en.yml", "title: About");

        let entries = scan_entries(&config_at(tmp.path())).unwrap();
        assert_eq!(entries.len(), 2);

        // Deterministic order: pages before programs.
        assert_eq!(entries[0].content_type, ContentType::Pages);
        assert_eq!(entries[0].slug, "about");
        assert_eq!(entries[1].slug, "python-bootcamp");
        assert_eq!(entries[1].locales, vec!["en", "es"]);
    }

    #[test]
    fn test_slug_falls_back_to_folder_name() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("marketing-content");
        write_file(&content.join("pages/contact-us"), "en.yml", "title: Contact");

        let entries = scan_entries(&config_at(tmp.path())).unwrap();
        assert_eq!(entries[0].slug, "contact-us");
    }

    #[test]
    fn test_common_is_not_a_locale() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("marketing-content");
        let dir = content.join("locations/madrid");
        write_file(&dir, "_common.yml", "slug: madrid");
        write_file(&dir, "en.yml", "title: Madrid");

        let entries = scan_entries(&config_at(tmp.path())).unwrap();
        assert_eq!(entries[0].locales, vec!["en"]);
    }

    #[test]
    fn test_malformed_file_does_not_abort_scan() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("marketing-content");
        write_file(&content.join("pages/broken"), "en.yml", ": [ not yaml {{");
        write_file(&content.join("pages/fine"), "en.yml", "title: Fine");

        let entries = scan_entries(&config_at(tmp.path())).unwrap();
        assert_eq!(entries.len(), 2);
        // The broken folder still indexes under its folder name.
        assert_eq!(entries[0].slug, "broken");
        assert!(entries[0].title.is_none());
    }

    #[test]
    fn test_empty_and_hidden_folders_skipped() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("marketing-content");
        fs::create_dir_all(content.join("pages/empty")).unwrap();
        write_file(&content.join("pages/.drafts"), "en.yml", "title: Draft");

        let entries = scan_entries(&config_at(tmp.path())).unwrap();
        assert!(entries.is_empty());
    }
}
