//! Image registry bookkeeping.
//!
//! Three sources of truth drift apart over time: the declared registry JSON,
//! the physical assets directory, and the image paths referenced from YAML
//! content. [`scan`] reconciles them into a report; [`apply`] commits the
//! proposed changes.

mod apply;
mod refs;
mod scan;

pub use apply::{ApplyOutcome, apply_scan};
pub use refs::{ImageRef, scan_image_refs};
pub(crate) use refs::assets_prefix;
pub use scan::{ScanReport, asset_base, scan_images};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared metadata for one registered image.
///
/// Unknown fields are preserved through load/save cycles; the registry is
/// hand-maintained and must survive round trips untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_point: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub usage_count: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// The declared image registry: an ordered `id -> entry` JSON document.
///
/// Entry order follows the file (`serde_json` with `preserve_order`), so a
/// save after an edit produces a minimal diff.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    entries: serde_json::Map<String, Value>,
}

impl ImageRegistry {
    /// Load the registry file. A missing file is an empty registry, not an
    /// error - fresh checkouts have no registry yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("malformed image registry {}", path.display()))?;
        Ok(Self { entries })
    }

    /// Write the registry back, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// `(id, src)` pairs for every entry that declares a string `src`.
    pub fn srcs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(id, value)| {
            value
                .get("src")
                .and_then(Value::as_str)
                .map(|src| (id.as_str(), src))
        })
    }

    /// Typed view of one entry.
    pub fn entry(&self, id: &str) -> Option<ImageEntry> {
        self.entries
            .get(id)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Register a new image with placeholder alt text. Ids are unique;
    /// collisions get a numeric suffix instead of clobbering.
    pub fn insert_new(&mut self, id: &str, src: &str) {
        let id = self.free_id(id);
        let entry = ImageEntry {
            src: src.to_string(),
            alt: format!("TODO: describe {id}"),
            focal_point: None,
            tags: Vec::new(),
            usage_count: 0,
            extra: serde_json::Map::new(),
        };
        self.entries.insert(id, serde_json::json!(entry));
    }

    /// Point an existing entry at a new physical file.
    pub fn set_src(&mut self, id: &str, src: &str) {
        if let Some(Value::Object(entry)) = self.entries.get_mut(id) {
            entry.insert("src".to_string(), Value::String(src.to_string()));
        }
    }

    fn free_id(&self, wanted: &str) -> String {
        if !self.contains_id(wanted) {
            return wanted.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{wanted}-{n}");
            if !self.contains_id(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Web path of a physical asset file, e.g. `/attached_assets/hero_123.png`.
pub(crate) fn asset_web_path(assets_dir_name: &str, relative: &Path) -> String {
    let rel = relative.to_string_lossy().replace('\\', "/");
    format!("/{assets_dir_name}/{rel}")
}

/// Filesystem location of a referenced asset path (`/attached_assets/...`).
pub(crate) fn asset_fs_path(root: &Path, referenced: &str) -> PathBuf {
    root.join(referenced.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_empty() {
        let registry = ImageRegistry::load(Path::new("/nonexistent/registry.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order_and_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("image-registry.json");
        std::fs::write(
            &path,
            r#"{
  "zulu": {"src": "/attached_assets/zulu.png", "alt": "Z", "custom_field": 7},
  "alpha": {"src": "/attached_assets/alpha.png", "alt": "A"}
}"#,
        )
        .unwrap();

        let registry = ImageRegistry::load(&path).unwrap();
        registry.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        // zulu still serializes before alpha, custom_field survives.
        assert!(raw.find("zulu").unwrap() < raw.find("alpha").unwrap());
        assert!(raw.contains("custom_field"));
    }

    #[test]
    fn test_insert_new_and_collision_suffix() {
        let mut registry = ImageRegistry::default();
        registry.insert_new("hero", "/attached_assets/hero_1.png");
        registry.insert_new("hero", "/attached_assets/hero_2.png");

        assert!(registry.contains_id("hero"));
        assert!(registry.contains_id("hero-2"));
        assert_eq!(
            registry.entry("hero").unwrap().alt,
            "TODO: describe hero"
        );
    }

    #[test]
    fn test_set_src() {
        let mut registry = ImageRegistry::default();
        registry.insert_new("hero", "/attached_assets/hero_1.png");
        registry.set_src("hero", "/attached_assets/hero_2.webp");
        assert_eq!(
            registry.entry("hero").unwrap().src,
            "/attached_assets/hero_2.webp"
        );
    }
}
