//! Commit a scan report: register new images, re-point updated ones and
//! rewrite content references.
//!
//! Reference rewriting is a structural YAML edit (parse, replace matching
//! string values, serialize), never a textual find-and-replace, so an old
//! path appearing as a substring of another value is left alone.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde_yaml::Value;

use crate::config::SiteConfig;
use crate::log;
use crate::registry::refs::scan_image_refs;
use crate::registry::{ImageRegistry, ScanReport};
use crate::utils::relativize;

/// What an apply run changed.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// Newly registered image count.
    pub added: usize,
    /// Entries re-pointed at a new physical file.
    pub updated: usize,
    /// Content files whose references were rewritten.
    pub touched_files: Vec<PathBuf>,
}

/// Apply a scan report to the registry and the content tree.
pub fn apply_scan(config: &SiteConfig, report: &ScanReport) -> Result<ApplyOutcome> {
    let registry_path = config.registry_path();
    let mut registry = ImageRegistry::load(&registry_path)?;
    let mut outcome = ApplyOutcome::default();

    for new in &report.new_images {
        registry.insert_new(&new.proposed_id, &new.src);
        outcome.added += 1;
    }
    for updated in &report.updated_images {
        registry.set_src(&updated.id, &updated.new_src);
        outcome.updated += 1;
    }

    outcome.touched_files = rewrite_references(config, report)?;

    if outcome.added > 0 || outcome.updated > 0 {
        registry.save(&registry_path)?;
        log!("images"; "registry saved ({} entries)", registry.len());
    }
    Ok(outcome)
}

/// Rewrite every content reference to an updated image's old path.
///
/// Content may write asset paths with or without the leading slash; both
/// forms are recognized and the original style is preserved.
fn rewrite_references(config: &SiteConfig, report: &ScanReport) -> Result<Vec<PathBuf>> {
    if report.updated_images.is_empty() {
        return Ok(Vec::new());
    }

    let mut replacements: FxHashMap<String, String> = FxHashMap::default();
    for updated in &report.updated_images {
        replacements.insert(updated.old_src.clone(), updated.new_src.clone());
        replacements.insert(
            updated.old_src.trim_start_matches('/').to_string(),
            updated.new_src.trim_start_matches('/').to_string(),
        );
    }

    let mut files: Vec<PathBuf> = scan_image_refs(config)?
        .into_iter()
        .filter(|r| replacements.contains_key(&r.src))
        .map(|r| r.file)
        .collect();
    files.sort();
    files.dedup();

    let mut touched = Vec::new();
    for file in files {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let mut value: Value = serde_yaml::from_str(&content)?;
        if replace_in_value(&mut value, &replacements) {
            let rewritten = serde_yaml::to_string(&value)?;
            std::fs::write(&file, rewritten)
                .with_context(|| format!("failed to write {}", file.display()))?;
            touched.push(relativize(&file, &config.root));
        }
    }
    Ok(touched)
}

/// Replace string values that exactly equal a replaced path. Returns whether
/// anything changed.
fn replace_in_value(value: &mut Value, replacements: &FxHashMap<String, String>) -> bool {
    match value {
        Value::String(s) => match replacements.get(s.as_str()) {
            Some(replacement) => {
                *s = replacement.clone();
                true
            }
            None => false,
        },
        Value::Sequence(items) => {
            let mut changed = false;
            for item in items {
                changed |= replace_in_value(item, replacements);
            }
            changed
        }
        Value::Mapping(map) => {
            let mut changed = false;
            for (_, item) in map.iter_mut() {
                changed |= replace_in_value(item, replacements);
            }
            changed
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::scan_images;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_at(root: &Path) -> SiteConfig {
        let mut config = crate::config::test_parse_config("");
        config.root = root.to_path_buf();
        config
    }

    #[test]
    fn test_apply_registers_new_and_rewrites_updated() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("attached_assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("photo_1700000050000.webp"), b"img").unwrap();
        fs::write(assets.join("brand-new.png"), b"img").unwrap();

        let content_dir = tmp.path().join("marketing-content");
        fs::create_dir_all(&content_dir).unwrap();
        fs::write(
            content_dir.join("image-registry.json"),
            r#"{"photo": {"src": "/attached_assets/photo_1700000000000.png", "alt": "A photo"}}"#,
        )
        .unwrap();

        let page = content_dir.join("pages/home");
        fs::create_dir_all(&page).unwrap();
        fs::write(
            page.join("en.yml"),
            "hero:\n  image: /attached_assets/photo_1700000000000.png\n",
        )
        .unwrap();

        let config = config_at(tmp.path());
        let registry = ImageRegistry::load(&config.registry_path()).unwrap();
        let report = scan_images(&config, &registry).unwrap();
        assert_eq!(report.updated_images.len(), 1);
        assert_eq!(report.new_images.len(), 1);

        let outcome = apply_scan(&config, &report).unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.touched_files.len(), 1);

        // Registry re-pointed and extended.
        let registry = ImageRegistry::load(&config.registry_path()).unwrap();
        assert_eq!(
            registry.entry("photo").unwrap().src,
            "/attached_assets/photo_1700000050000.webp"
        );
        let new_entry = registry.entry("brand-new").unwrap();
        assert!(new_entry.alt.starts_with("TODO"));

        // Content reference rewritten structurally.
        let rewritten = fs::read_to_string(page.join("en.yml")).unwrap();
        assert!(rewritten.contains("/attached_assets/photo_1700000050000.webp"));
        assert!(!rewritten.contains("photo_1700000000000"));
    }

    #[test]
    fn test_substring_values_left_alone() {
        let mut replacements = FxHashMap::default();
        replacements.insert(
            "/attached_assets/a.png".to_string(),
            "/attached_assets/b.webp".to_string(),
        );

        let mut value: Value = serde_yaml::from_str(
            "exact: /attached_assets/a.png\nprose: see /attached_assets/a.png for details",
        )
        .unwrap();
        assert!(replace_in_value(&mut value, &replacements));

        assert_eq!(value["exact"], Value::String("/attached_assets/b.webp".into()));
        // The path inside a longer sentence is not an exact match.
        assert_eq!(
            value["prose"],
            Value::String("see /attached_assets/a.png for details".into())
        );
    }
}
