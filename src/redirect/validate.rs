//! Content validation: redirect misconfiguration and meta-field checks.
//!
//! Every check runs to completion before the result is judged, so one run
//! reports the complete error set instead of stopping at the first problem.

use std::collections::BTreeMap;

use anyhow::Result;
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::SiteConfig;
use crate::content::CHANGE_FREQUENCIES;
use crate::core::UrlPath;
use crate::debug;
use crate::index::{ContentEntry, ContentIndex};
use crate::redirect::{RedirectMap, RedirectRule, RedirectTarget};
use crate::utils::relativize;

/// Validation outcome, grouped by category for reporting.
///
/// Errors are build-breaking; warnings are advisory and never fail a run.
#[derive(Debug, Default)]
pub struct ValidationReport {
    errors: BTreeMap<String, Vec<String>>,
    warnings: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    pub fn error(&mut self, category: &str, message: impl Into<String>) {
        self.errors
            .entry(category.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn warn(&mut self, category: &str, message: impl Into<String>) {
        self.warnings
            .entry(category.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn warnings(&self) -> &BTreeMap<String, Vec<String>> {
        &self.warnings
    }
}

/// Validate all content entries and build the redirect map.
///
/// The returned map only contains redirects that passed the per-declaration
/// checks; callers must still refuse to persist it when the report carries
/// errors.
pub fn validate_content(
    config: &SiteConfig,
    index: &ContentIndex,
) -> Result<(RedirectMap, ValidationReport)> {
    let mut report = ValidationReport::default();
    let mut map = RedirectMap::default();
    let snapshot = index.snapshot();

    if config.validate.redirects {
        let valid_urls = collect_valid_urls(config, &snapshot.entries);
        for entry in &snapshot.entries {
            collect_redirects(config, entry, &valid_urls, &mut map, &mut report);
        }
        detect_loops(&map, &config.routes.default_locale, &mut report);
    }

    if config.validate.meta {
        let schema_keys = load_schema_keys(config, &mut report);
        // Meta checks are independent per entry; run them in parallel and
        // merge into one report.
        let shared = RwLock::new(report);
        snapshot.entries.par_iter().for_each(|entry| {
            validate_meta(config, entry, schema_keys.as_deref(), &mut shared.write());
        });
        report = shared.into_inner();
    }

    Ok((map, report))
}

/// Canonical URLs of all entries plus the configured static routes. Redirect
/// sources must never shadow any of these.
fn collect_valid_urls(config: &SiteConfig, entries: &[std::sync::Arc<ContentEntry>]) -> FxHashSet<UrlPath> {
    let mut urls = FxHashSet::default();
    for route in &config.routes.static_routes {
        urls.insert(UrlPath::from_route(route));
    }
    for entry in entries {
        for url in entry.canonical_urls(config) {
            urls.insert(url);
        }
    }
    urls
}

/// Check and register the redirects declared by one entry.
fn collect_redirects(
    config: &SiteConfig,
    entry: &ContentEntry,
    valid_urls: &FxHashSet<UrlPath>,
    map: &mut RedirectMap,
    report: &mut ValidationReport,
) {
    if entry.meta.redirects.is_empty() {
        return;
    }

    let provenance = entry_provenance(config, entry);
    let canonical_urls = entry.canonical_urls(config);
    let target = redirect_target(config, entry);

    for decl in &entry.meta.redirects {
        let from = UrlPath::from_route(decl.from());

        if canonical_urls.contains(&from) {
            report.error(
                "self-redirect",
                format!("{from} redirects to itself (declared in {provenance})"),
            );
            continue;
        }

        if let Some(first) = map.source_of(&from) {
            report.error(
                "conflict",
                format!(
                    "{from} is claimed by both {} and {provenance}; keeping the first",
                    relativize(first, &config.root).display()
                ),
            );
            continue;
        }

        if valid_urls.contains(&from) {
            report.error(
                "collision",
                format!("{from} would shadow a real content URL (declared in {provenance})"),
            );
            continue;
        }

        map.insert(
            from,
            RedirectRule {
                target: target.clone(),
                status: decl.status(),
                source: entry.primary_file().unwrap_or(&entry.dir).to_path_buf(),
            },
        );
    }
}

/// Target for all of one entry's redirects: a locale map for locale-prefixed
/// types, a single path otherwise.
fn redirect_target(config: &SiteConfig, entry: &ContentEntry) -> RedirectTarget {
    if entry.content_type.is_locale_prefixed() {
        let by_locale: BTreeMap<String, UrlPath> = entry
            .locales_or_default(config)
            .iter()
            .map(|locale| (locale.clone(), entry.canonical_url(locale)))
            .collect();
        RedirectTarget::ByLocale(by_locale)
    } else {
        RedirectTarget::Single(entry.canonical_url(&config.routes.default_locale))
    }
}

/// Walk every redirect chain looking for cycles. Each cycle is reported once
/// no matter how many of its members the outer loop starts from.
fn detect_loops(map: &RedirectMap, default_locale: &str, report: &mut ValidationReport) {
    let mut in_reported_cycle: FxHashSet<UrlPath> = FxHashSet::default();

    for (start, _) in map.iter() {
        if in_reported_cycle.contains(start) {
            continue;
        }

        let mut chain = vec![start.clone()];
        let mut visited: FxHashSet<UrlPath> = FxHashSet::default();
        visited.insert(start.clone());

        let mut current = start.clone();
        while let Some(rule) = map.get(current.as_str()) {
            let Some(next) = rule.target.resolve(default_locale) else {
                break;
            };
            if visited.contains(next) {
                let pos = chain.iter().position(|p| p == next).unwrap_or(0);
                let cycle = &chain[pos..];
                if !cycle.iter().any(|p| in_reported_cycle.contains(p)) {
                    let rendered: Vec<&str> = cycle.iter().map(UrlPath::as_str).collect();
                    report.error(
                        "loop",
                        format!("redirect loop: {} -> {}", rendered.join(" -> "), next),
                    );
                }
                in_reported_cycle.extend(cycle.iter().cloned());
                break;
            }
            visited.insert(next.clone());
            chain.push(next.clone());
            current = next.clone();
        }
    }
}

/// Meta-field checks: priority range, change_frequency vocabulary, schema
/// references, and advisory SEO completeness.
fn validate_meta(
    config: &SiteConfig,
    entry: &ContentEntry,
    schema_keys: Option<&[String]>,
    report: &mut ValidationReport,
) {
    let provenance = entry_provenance(config, entry);

    if let Some(priority) = entry.meta.priority {
        if !(0.0..=1.0).contains(&priority) {
            report.error(
                "meta",
                format!("{provenance}: priority {priority} is outside [0, 1]"),
            );
        }
    }

    if let Some(freq) = &entry.meta.change_frequency {
        if !CHANGE_FREQUENCIES.contains(&freq.as_str()) {
            report.error(
                "meta",
                format!(
                    "{provenance}: change_frequency `{freq}` is not one of {}",
                    CHANGE_FREQUENCIES.join(", ")
                ),
            );
        }
    }

    if let (Some(schema), Some(keys)) = (&entry.meta.schema, schema_keys) {
        let declared = schema
            .include
            .iter()
            .chain(schema.overrides.keys());
        for key in declared {
            if !keys.contains(key) {
                report.error(
                    "schema",
                    format!(
                        "{provenance}: unknown schema-org key `{key}` (valid keys: {})",
                        keys.join(", ")
                    ),
                );
            }
        }
    }

    if config.validate.seo_warnings {
        if entry.meta.page_title.is_none() {
            report.warn("seo", format!("{provenance}: missing meta.page_title"));
        }
        if entry.meta.description.is_none() {
            report.warn("seo", format!("{provenance}: missing meta.description"));
        }
    }
}

/// Valid keys of the schema-org registry. A missing registry file downgrades
/// schema checks to a warning instead of failing every entry that uses them.
fn load_schema_keys(config: &SiteConfig, report: &mut ValidationReport) -> Option<Vec<String>> {
    let path = config.schema_registry_path();
    if !path.is_file() {
        report.warn(
            "schema",
            format!(
                "schema-org registry not found at {}; skipping schema checks",
                relativize(&path, &config.root).display()
            ),
        );
        return None;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            report.error("schema", format!("failed to read schema-org registry: {e}"));
            return None;
        }
    };
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&content) {
        Ok(registry) => {
            debug!("validate"; "loaded {} schema-org keys", registry.len());
            Some(registry.keys().cloned().collect())
        }
        Err(e) => {
            report.error("schema", format!("malformed schema-org registry: {e}"));
            None
        }
    }
}

fn entry_provenance(config: &SiteConfig, entry: &ContentEntry) -> String {
    let path = entry.primary_file().unwrap_or(&entry.dir);
    relativize(path, &config.root).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
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

    fn run(root: &Path) -> (RedirectMap, ValidationReport) {
        let config = config_at(root);
        let index = ContentIndex::new(&config).unwrap();
        validate_content(&config, &index).unwrap()
    }

    #[test]
    fn test_end_to_end_program_redirect() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/programs/python-bootcamp"),
            "en.yml",
            "slug: python-bootcamp\nmeta:\n  redirects:\n    - /old-python-course",
        );

        let (map, report) = run(tmp.path());
        assert!(!report.has_errors());
        let rule = map.get("/old-python-course").unwrap();
        assert_eq!(rule.status, 301);
        assert_eq!(
            rule.target.resolve("en").unwrap().as_str(),
            "/en/career-programs/python-bootcamp"
        );
    }

    #[test]
    fn test_self_redirect_reported_once_and_not_registered() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/about-us"),
            "en.yml",
            "slug: about-us\nmeta:\n  redirects:\n    - /about-us",
        );

        let (map, report) = run(tmp.path());
        assert_eq!(report.error_count(), 1);
        assert!(report.errors().contains_key("self-redirect"));
        assert!(map.get("/about-us").is_none());
    }

    #[test]
    fn test_conflict_keeps_first_registration() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/alpha"),
            "en.yml",
            "slug: alpha\nmeta:\n  redirects:\n    - /legacy",
        );
        write_file(
            &tmp.path().join("marketing-content/pages/beta"),
            "en.yml",
            "slug: beta\nmeta:\n  redirects:\n    - /legacy",
        );

        let (map, report) = run(tmp.path());
        let conflicts = &report.errors()["conflict"];
        assert_eq!(conflicts.len(), 1);
        // Both declaring files are named in the message.
        assert!(conflicts[0].contains("pages/alpha/en.yml"));
        assert!(conflicts[0].contains("pages/beta/en.yml"));
        // First registration (alpha, scanned first) survives.
        assert_eq!(
            map.get("/legacy").unwrap().target.resolve("en").unwrap().as_str(),
            "/alpha"
        );
    }

    #[test]
    fn test_collision_with_content_url() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/pricing"),
            "en.yml",
            "slug: pricing",
        );
        write_file(
            &tmp.path().join("marketing-content/pages/other"),
            "en.yml",
            "slug: other\nmeta:\n  redirects:\n    - /pricing",
        );

        let (map, report) = run(tmp.path());
        assert!(report.errors().contains_key("collision"));
        assert!(map.get("/pricing").is_none());
    }

    #[test]
    fn test_collision_with_static_route() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/other"),
            "en.yml",
            "slug: other\nmeta:\n  redirects:\n    - /contact",
        );

        let (_, report) = run(tmp.path());
        assert!(report.errors().contains_key("collision"));
    }

    fn rule_to(target: &str) -> RedirectRule {
        RedirectRule {
            target: RedirectTarget::Single(UrlPath::from_route(target)),
            status: 301,
            source: std::path::PathBuf::new(),
        }
    }

    #[test]
    fn test_three_node_loop_reported_once() {
        let mut map = RedirectMap::default();
        map.insert(UrlPath::from_route("/a"), rule_to("/b"));
        map.insert(UrlPath::from_route("/b"), rule_to("/c"));
        map.insert(UrlPath::from_route("/c"), rule_to("/a"));

        let mut report = ValidationReport::default();
        detect_loops(&map, "en", &mut report);

        let loops = &report.errors()["loop"];
        assert_eq!(loops.len(), 1);
        assert!(loops[0].contains("/a"));
        assert!(loops[0].contains("/b"));
        assert!(loops[0].contains("/c"));
    }

    #[test]
    fn test_chain_without_loop_is_clean() {
        let mut map = RedirectMap::default();
        map.insert(UrlPath::from_route("/a"), rule_to("/b"));
        map.insert(UrlPath::from_route("/b"), rule_to("/final"));

        let mut report = ValidationReport::default();
        detect_loops(&map, "en", &mut report);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_meta_field_errors() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/bad"),
            "en.yml",
            "slug: bad\nmeta:\n  priority: 1.5\n  change_frequency: sometimes",
        );

        let (_, report) = run(tmp.path());
        let meta = &report.errors()["meta"];
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_schema_keys_checked_against_registry() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content"),
            "schema-org.json",
            r#"{"organization": {}, "course": {}}"#,
        );
        write_file(
            &tmp.path().join("marketing-content/pages/x"),
            "en.yml",
            "slug: x\nmeta:\n  schema:\n    include: [organization, nonexistent]",
        );

        let (_, report) = run(tmp.path());
        let schema = &report.errors()["schema"];
        assert_eq!(schema.len(), 1);
        assert!(schema[0].contains("nonexistent"));
        assert!(schema[0].contains("organization, course"));
    }

    #[test]
    fn test_missing_schema_registry_downgrades_to_warning() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/x"),
            "en.yml",
            "slug: x\nmeta:\n  schema:\n    include: [whatever]",
        );

        let (_, report) = run(tmp.path());
        assert!(!report.errors().contains_key("schema"));
        assert!(report.warnings().contains_key("schema"));
    }

    #[test]
    fn test_seo_warnings_are_not_errors() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("marketing-content/pages/bare"),
            "en.yml",
            "slug: bare",
        );

        let (_, report) = run(tmp.path());
        assert!(!report.has_errors());
        assert_eq!(report.warnings()["seo"].len(), 2);
    }
}
