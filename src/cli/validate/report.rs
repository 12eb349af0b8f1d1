//! Validation report formatting.

use std::collections::BTreeMap;

use owo_colors::OwoColorize;

use crate::redirect::ValidationReport;
use crate::utils::plural_s;

/// Print the full report to stderr: error sections first, then warnings,
/// then a one-line summary on stdout.
pub fn print_report(report: &ValidationReport) {
    print_sections(report.errors(), true);
    print_sections(report.warnings(), false);
    print_summary(report);
}

fn print_sections(sections: &BTreeMap<String, Vec<String>>, is_error: bool) {
    for (category, messages) in sections {
        eprintln!();
        let header = if is_error {
            category.red().bold().to_string()
        } else {
            category.yellow().bold().to_string()
        };
        eprintln!(
            "{} {}",
            header,
            format!(
                "({} {}{})",
                messages.len(),
                if is_error { "error" } else { "warning" },
                plural_s(messages.len())
            )
            .dimmed()
        );
        for message in messages {
            let arrow = if is_error {
                "→".red().to_string()
            } else {
                "→".yellow().to_string()
            };
            eprintln!("{arrow} {message}");
        }
    }
}

fn print_summary(report: &ValidationReport) {
    let errors = report.error_count();
    let warnings = report.warning_count();

    if errors == 0 && warnings == 0 {
        println!("{}", "all checks passed".green());
    } else if errors == 0 {
        println!(
            "{} {}",
            "passed".green(),
            format!("({warnings} warning{})", plural_s(warnings)).dimmed()
        );
    } else {
        println!(
            "{} {}",
            "failed".red().bold(),
            format!(
                "({errors} error{}, {warnings} warning{})",
                plural_s(errors),
                plural_s(warnings)
            )
            .dimmed()
        );
    }
}
