//! Content index: scans the content tree once and answers lookups from an
//! immutable snapshot.
//!
//! The snapshot lives behind an `ArcSwap`, so the request loop can keep
//! resolving against a consistent view while `refresh()` swaps in a new scan.

mod entry;
mod scan;

pub use entry::ContentEntry;
pub use scan::scan_entries;

use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;

use crate::config::SiteConfig;
use crate::core::ContentType;
use crate::log;

/// One immutable view of the content tree.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    /// All entries, ordered by type then slug.
    pub entries: Vec<Arc<ContentEntry>>,
    /// Slug lookup. Slugs are only unique per type, so this maps to a list.
    by_slug: FxHashMap<String, Vec<Arc<ContentEntry>>>,
    /// Canonical-URL lookup.
    by_path: FxHashMap<String, Arc<ContentEntry>>,
}

impl IndexSnapshot {
    fn build(config: &SiteConfig, entries: Vec<Arc<ContentEntry>>) -> Self {
        let mut by_slug: FxHashMap<String, Vec<Arc<ContentEntry>>> = FxHashMap::default();
        let mut by_path: FxHashMap<String, Arc<ContentEntry>> = FxHashMap::default();

        for entry in &entries {
            by_slug
                .entry(entry.slug.clone())
                .or_default()
                .push(Arc::clone(entry));
            for url in entry.canonical_urls(config) {
                by_path
                    .entry(url.as_str().to_string())
                    .or_insert_with(|| Arc::clone(entry));
            }
        }

        Self {
            entries,
            by_slug,
            by_path,
        }
    }
}

/// The content index service. Cheap to share (`Arc<ContentIndex>`); all reads
/// go through the current snapshot.
pub struct ContentIndex {
    snapshot: ArcSwap<IndexSnapshot>,
}

impl ContentIndex {
    /// Scan the content tree and build the initial snapshot.
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let entries = scan_entries(config)?;
        log!("scan"; "indexed {}", crate::utils::plural_count(entries.len(), "content entry"));
        Ok(Self {
            snapshot: ArcSwap::from_pointee(IndexSnapshot::build(config, entries)),
        })
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot.load_full()
    }

    /// Re-scan the content tree and atomically replace the snapshot.
    /// Lookups issued concurrently keep seeing the old view until the swap.
    pub fn refresh(&self, config: &SiteConfig) -> Result<()> {
        let entries = scan_entries(config)?;
        log!("scan"; "re-indexed {}", crate::utils::plural_count(entries.len(), "content entry"));
        self.snapshot
            .store(Arc::new(IndexSnapshot::build(config, entries)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshot().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().entries.is_empty()
    }

    /// All entries with the given slug, optionally narrowed to one type.
    /// Slugs are unique per type only; a program and a landing may share one.
    pub fn find_by_slug(
        &self,
        slug: &str,
        content_type: Option<ContentType>,
    ) -> Vec<Arc<ContentEntry>> {
        let mut entries = self
            .snapshot()
            .by_slug
            .get(slug)
            .cloned()
            .unwrap_or_default();
        if let Some(content_type) = content_type {
            entries.retain(|e| e.content_type == content_type);
        }
        entries
    }

    /// Read the content file backing `slug` for `locale`, honoring the
    /// per-type preference order (`_common` first for landings).
    pub fn file_content(
        &self,
        slug: &str,
        locale: &str,
        content_type: Option<ContentType>,
    ) -> Option<String> {
        let entries = self.find_by_slug(slug, content_type);
        let file = entries.first().and_then(|e| e.file_content(locale))?;
        std::fs::read_to_string(file).ok()
    }

    /// Entry whose canonical URL is exactly `path` (already normalized).
    pub fn find_by_path(&self, path: &str) -> Option<Arc<ContentEntry>> {
        self.snapshot().by_path.get(path).cloned()
    }

    /// All entries of one content type.
    pub fn find_by_type(&self, content_type: ContentType) -> Vec<Arc<ContentEntry>> {
        self.snapshot()
            .entries
            .iter()
            .filter(|e| e.content_type == content_type)
            .cloned()
            .collect()
    }
}
