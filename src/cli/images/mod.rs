//! Image registry commands.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::SiteConfig;
use crate::log;
use crate::registry::{ImageRegistry, ScanReport, apply_scan, scan_images};
use crate::utils::plural_s;

/// `images scan`: report drift without touching anything.
///
/// Exit contract: broken references fail the run; unregistered and updated
/// images are advisory.
pub fn run_scan(config: &SiteConfig, json: bool) -> Result<()> {
    let report = scan(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_errors() {
        anyhow::bail!(
            "{} broken image reference{}",
            report.broken_refs.len(),
            plural_s(report.broken_refs.len())
        );
    }
    Ok(())
}

/// `images apply`: commit the scan proposals.
pub fn run_apply(config: &SiteConfig) -> Result<()> {
    let report = scan(config)?;
    if report.new_images.is_empty() && report.updated_images.is_empty() {
        log!("images"; "nothing to apply");
        return Ok(());
    }

    let outcome = apply_scan(config, &report)?;
    log!(
        "images";
        "registered {} new, re-pointed {} updated",
        outcome.added,
        outcome.updated
    );
    for file in &outcome.touched_files {
        log!("images"; "rewrote {}", file.display());
    }

    // Broken references are not fixable by apply; still fail so CI notices.
    if report.has_errors() {
        print_broken(&report);
        anyhow::bail!(
            "{} broken image reference{}",
            report.broken_refs.len(),
            plural_s(report.broken_refs.len())
        );
    }
    Ok(())
}

fn scan(config: &SiteConfig) -> Result<ScanReport> {
    let registry = ImageRegistry::load(&config.registry_path())?;
    log!("images"; "scanning against {} registered images", registry.len());
    scan_images(config, &registry)
}

fn print_report(report: &ScanReport) {
    if report.is_clean() {
        println!("{}", "registry in sync".green());
        return;
    }

    print_broken(report);

    if !report.updated_images.is_empty() {
        eprintln!();
        eprintln!(
            "{} {}",
            "updated images".yellow().bold(),
            format!("({})", report.updated_images.len()).dimmed()
        );
        for updated in &report.updated_images {
            eprintln!(
                "{} {} {} {} {}",
                "→".yellow(),
                updated.id.cyan(),
                updated.old_src.dimmed(),
                "⇒".dimmed(),
                updated.new_src
            );
        }
    }

    if !report.new_images.is_empty() {
        eprintln!();
        eprintln!(
            "{} {}",
            "unregistered images".green().bold(),
            format!("({})", report.new_images.len()).dimmed()
        );
        for new in &report.new_images {
            eprintln!("{} {} {}", "→".green(), new.src, format!("(id: {})", new.proposed_id).dimmed());
        }
    }

    if !report.updated_images.is_empty() || !report.new_images.is_empty() {
        eprintln!();
        eprintln!("{}", "run `curo images apply` to commit these changes".dimmed());
    }
}

fn print_broken(report: &ScanReport) {
    if report.broken_refs.is_empty() {
        return;
    }
    eprintln!();
    eprintln!(
        "{} {}",
        "broken references".red().bold(),
        format!(
            "({} error{})",
            report.broken_refs.len(),
            plural_s(report.broken_refs.len())
        )
        .dimmed()
    );
    for broken in &report.broken_refs {
        eprintln!(
            "{}{}{}",
            "[".dimmed(),
            broken.file.display().cyan(),
            "]".dimmed()
        );
        eprintln!("{} {} {}", "→".red(), broken.src, broken.field_path.dimmed());
    }
}
