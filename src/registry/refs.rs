//! Image references inside YAML content.
//!
//! Walks every content file and collects string values that look like asset
//! paths, remembering the field path (`sections[2].cards[0].src`) so a
//! broken reference can be located and fixed in the editor.

use std::path::PathBuf;

use anyhow::Result;
use jwalk::WalkDir;
use serde_yaml::Value;

use crate::config::SiteConfig;
use crate::debug;

/// One asset path found in a content file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Content file containing the reference.
    pub file: PathBuf,
    /// Dot/bracket path of the field within the document.
    pub field_path: String,
    /// The referenced asset path as written.
    pub src: String,
}

/// Collect every asset reference in the content tree.
///
/// Unparseable files are skipped entirely; the reference scan is best-effort
/// and must never fail a run on its own.
pub fn scan_image_refs(config: &SiteConfig) -> Result<Vec<ImageRef>> {
    let content_dir = config.content_dir();
    if !content_dir.is_dir() {
        return Ok(Vec::new());
    }
    let prefix = assets_prefix(config);

    let mut refs = Vec::new();
    let mut files: Vec<PathBuf> = WalkDir::new(&content_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext == "yml" || ext == "yaml")
        })
        .collect();
    files.sort();

    for file in files {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let value: Value = match serde_yaml::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!("images"; "skipping {}: {}", file.display(), e);
                continue;
            }
        };
        walk_value(&value, &prefix, "", &mut |field_path, src| {
            refs.push(ImageRef {
                file: file.clone(),
                field_path: field_path.to_string(),
                src: src.to_string(),
            });
        });
    }
    Ok(refs)
}

/// The prefix that marks a string as an asset path, with and without a
/// leading slash (`/attached_assets/` or `attached_assets/`).
pub(crate) fn assets_prefix(config: &SiteConfig) -> String {
    config
        .content
        .assets
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attached_assets".to_string())
}

fn is_asset_path(value: &str, prefix: &str) -> bool {
    value.starts_with(&format!("/{prefix}/")) || value.starts_with(&format!("{prefix}/"))
}

/// Depth-first walk over a YAML value, calling `found` for every asset path.
fn walk_value(value: &Value, prefix: &str, path: &str, found: &mut impl FnMut(&str, &str)) {
    match value {
        Value::String(s) => {
            if is_asset_path(s, prefix) {
                found(path, s);
            }
        }
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_value(item, prefix, &format!("{path}[{i}]"), found);
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map {
                let key = match key {
                    Value::String(k) => k.clone(),
                    other => serde_yaml::to_string(other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                };
                let child = if path.is_empty() {
                    key
                } else {
                    format!("{path}.{key}")
                };
                walk_value(item, prefix, &child, found);
            }
        }
        _ => {}
    }
}
