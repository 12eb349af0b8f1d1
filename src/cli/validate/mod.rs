//! Content validation command.

mod report;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::index::ContentIndex;
use crate::log;
use crate::redirect::validate_content;
use crate::utils::{plural_count, plural_s};

/// Validate all content and persist the redirect artifact on success.
///
/// Exit contract: errors fail the run (exit 1 through main) and nothing is
/// persisted; warnings alone pass. `warn_only` reports everything but never
/// fails or writes.
pub fn validate_site(config: &SiteConfig, index: &ContentIndex, warn_only: bool) -> Result<()> {
    if index.is_empty() {
        log!("validate"; "no content entries found");
        return Ok(());
    }
    log!("validate"; "validating {}", plural_count(index.len(), "content entry"));

    let (map, result) = validate_content(config, index)?;
    report::print_report(&result);

    if result.has_errors() {
        if warn_only {
            log!("validate"; "{} (ignored: --warn-only)", plural_count(result.error_count(), "error"));
            return Ok(());
        }
        anyhow::bail!(
            "validation failed: {} error{}, {} warning{}",
            result.error_count(),
            plural_s(result.error_count()),
            result.warning_count(),
            plural_s(result.warning_count())
        );
    }

    if warn_only {
        return Ok(());
    }

    // A broken redirect set must never reach the served artifact; this write
    // only happens on a clean run.
    let artifact = config.redirects_artifact();
    map.save(&artifact)?;
    log!(
        "validate";
        "wrote {} ({})",
        crate::utils::relativize(&artifact, &config.root).display(),
        plural_count(map.len(), "redirect")
    );
    Ok(())
}
