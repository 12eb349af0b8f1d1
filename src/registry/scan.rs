//! Registry reconciliation scan.
//!
//! Compares the declared registry against the physical assets directory and
//! every YAML image reference, producing a drift report. Nothing is mutated;
//! [`super::apply_scan`] commits the proposals.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use jwalk::WalkDir;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::registry::refs::{assets_prefix, scan_image_refs};
use crate::registry::{ImageRegistry, asset_fs_path, asset_web_path};
use crate::utils::{relativize, slugify};

/// Unix-epoch-millis suffix convention: `hero_1700000000000.png`.
static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_-]?([0-9]{13,})$").expect("valid regex"));

const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "webp", "gif", "svg", "avif", "ico"];

/// A physical file with no registry counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct NewImage {
    /// Suggested registry id, derived from the filename.
    pub proposed_id: String,
    /// Web path of the physical file.
    pub src: String,
}

/// A physical file recognized as a re-encoded version of a registered image
/// (same base name, later timestamp, different extension).
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedImage {
    pub id: String,
    pub old_src: String,
    pub new_src: String,
}

/// A YAML reference pointing at a file that does not exist.
#[derive(Debug, Clone, Serialize)]
pub struct BrokenRef {
    pub file: PathBuf,
    pub field_path: String,
    pub src: String,
}

/// Outcome of one reconciliation scan.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub new_images: Vec<NewImage>,
    pub updated_images: Vec<UpdatedImage>,
    pub broken_refs: Vec<BrokenRef>,
}

impl ScanReport {
    /// Broken references are the only build-breaking class; new and updated
    /// images are advisory.
    pub fn has_errors(&self) -> bool {
        !self.broken_refs.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.new_images.is_empty()
            && self.updated_images.is_empty()
            && self.broken_refs.is_empty()
    }
}

/// Slug base of an asset filename with the timestamp suffix stripped, plus
/// the embedded timestamp when one exists.
///
/// `Hero_Image_1700000000000` reduces to (`hero-image`, `1700000000000`).
pub fn asset_base(stem: &str) -> (String, Option<u64>) {
    match TIMESTAMP_RE.captures(stem) {
        Some(caps) => {
            let timestamp = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let stripped = TIMESTAMP_RE.replace(stem, "");
            (slugify(&stripped), timestamp)
        }
        None => (slugify(stem), None),
    }
}

/// Reconcile the registry against disk and content references.
pub fn scan_images(config: &SiteConfig, registry: &ImageRegistry) -> Result<ScanReport> {
    let mut report = ScanReport::default();

    let physical = walk_assets(config);
    let registered_srcs: rustc_hash::FxHashSet<&str> =
        registry.srcs().map(|(_, src)| src).collect();
    let base_index = build_base_index(registry);

    for asset in &physical {
        if registered_srcs.contains(asset.web_path.as_str()) {
            continue;
        }

        let (base, timestamp) = asset_base(&asset.stem);
        match base_index.get(base.as_str()).copied().flatten() {
            Some((id, registered_src)) if is_updated(asset, timestamp, registered_src) => {
                report.updated_images.push(UpdatedImage {
                    id: id.to_string(),
                    old_src: registered_src.to_string(),
                    new_src: asset.web_path.clone(),
                });
            }
            _ => {
                let proposed_id = if base.is_empty() {
                    slugify(&asset.stem)
                } else {
                    base
                };
                report.new_images.push(NewImage {
                    proposed_id,
                    src: asset.web_path.clone(),
                });
            }
        }
    }

    for image_ref in scan_image_refs(config)? {
        if !asset_fs_path(&config.root, &image_ref.src).is_file() {
            report.broken_refs.push(BrokenRef {
                file: relativize(&image_ref.file, &config.root),
                field_path: image_ref.field_path,
                src: image_ref.src,
            });
        }
    }

    Ok(report)
}

struct PhysicalAsset {
    web_path: String,
    stem: String,
    extension: String,
}

/// Recursively collect image files under the assets directory.
fn walk_assets(config: &SiteConfig) -> Vec<PhysicalAsset> {
    let assets_dir = config.assets_dir();
    if !assets_dir.is_dir() {
        return Vec::new();
    }
    let prefix = assets_prefix(config);

    let mut assets: Vec<PhysicalAsset> = WalkDir::new(&assets_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(|path| {
            let extension = path.extension()?.to_str()?.to_ascii_lowercase();
            if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                return None;
            }
            let stem = path.file_stem()?.to_str()?.to_string();
            let relative = path.strip_prefix(&assets_dir).ok()?;
            Some(PhysicalAsset {
                web_path: asset_web_path(&prefix, relative),
                stem,
                extension,
            })
        })
        .collect();
    assets.sort_by(|a, b| a.web_path.cmp(&b.web_path));
    assets
}

/// Base -> registered entry, with ambiguous bases mapped to `None` so they
/// are excluded from fuzzy matching.
fn build_base_index(registry: &ImageRegistry) -> FxHashMap<String, Option<(&str, &str)>> {
    let mut index: FxHashMap<String, Option<(&str, &str)>> = FxHashMap::default();
    for (id, src) in registry.srcs() {
        let stem = std::path::Path::new(src)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(src);
        let (base, _) = asset_base(stem);
        index
            .entry(base)
            .and_modify(|slot| *slot = None)
            .or_insert(Some((id, src)));
    }
    index
}

/// A physical file counts as a newer version of a registered image only when
/// the extension changed and its timestamp is not older.
fn is_updated(asset: &PhysicalAsset, timestamp: Option<u64>, registered_src: &str) -> bool {
    let registered = std::path::Path::new(registered_src);
    let registered_ext = registered
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if registered_ext == asset.extension {
        return false;
    }

    let registered_stem = registered
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let (_, registered_ts) = asset_base(registered_stem);
    timestamp.unwrap_or(0) >= registered_ts.unwrap_or(0)
}
