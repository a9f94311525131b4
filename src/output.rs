//! Colored console output for the socket mesh configurator.
//!
//! Human-facing summaries only; step-level detail goes through `tracing`.
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow skips and warnings, red failures, dimmed secondary text.

use crate::chains::ChainSlug;
use crate::ledger::DeploymentMode;
use crate::orchestrator::OrchestratorConfig;
use crate::report::{RunReport, StepStatus};
use alloy_primitives::Address;
use colored::Colorize;
use std::path::Path;
use url::Url;

// ── Helpers ────────────────────────────────────────────────────────

/// RPC endpoint as safe to print: scheme and host only, since paths and
/// query strings of hosted endpoints often carry API keys.
pub fn redact_url(url: &Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{}", url.scheme(), host),
        None => url.scheme().to_string(),
    }
}

/// One-word status label.
pub fn status_label(status: &StepStatus) -> &'static str {
    match status {
        StepStatus::Applied { .. } => "OK",
        StepStatus::Skipped { .. } => "SKIP",
        StepStatus::Failed { transient: true, .. } => "RETRY",
        StepStatus::Failed { .. } => "FAIL",
    }
}

/// `applied / skipped / failed` summary line (uncolored).
pub fn summary_line(report: &RunReport) -> String {
    format!(
        "{} applied, {} skipped, {} failed",
        report.applied(),
        report.skipped(),
        report.failed()
    )
}

// ── Banner & Identity ──────────────────────────────────────────────

/// Print the startup banner.
pub fn print_banner(mode: DeploymentMode, ledger: &Path) {
    println!();
    println!("{}", "=== Socket Mesh Configurator ===".blue().bold());
    println!("  Mode:         {}", mode.to_string().cyan());
    println!("  Ledger:       {}", ledger.display().to_string().dimmed());
}

/// Print the operator address. The key itself is never printed.
pub fn print_operator(address: &Address) {
    println!("  Operator:     {}", format!("{address}").cyan());
}

/// Print the run configuration block.
pub fn print_config(config: &OrchestratorConfig) {
    println!();
    println!("{}", "Run configuration:".blue().bold());
    println!(
        "  {} {}",
        "Capacitor type:   ".dimmed(),
        config.capacitor.capacitor_type.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Max packet length:".dimmed(),
        config.capacitor.max_packet_length.to_string().cyan()
    );
    println!(
        "  {} {}",
        "Attesters:        ".dimmed(),
        config.attesters.len().to_string().cyan()
    );
    println!(
        "  {} {}",
        "Parameters:       ".dimmed(),
        if config.skip_parameters {
            "skipped".yellow()
        } else {
            "enabled".green()
        }
    );
    println!(
        "  {} {}",
        "Remote links:     ".dimmed(),
        if config.skip_remote_links {
            "skipped".yellow()
        } else {
            "enabled".green()
        }
    );
    println!(
        "  {} {}",
        "Chain concurrency:".dimmed(),
        config.chain_concurrency.to_string().cyan()
    );
}

// ── Connections ────────────────────────────────────────────────────

/// Print that a chain's RPC endpoint was configured.
pub fn print_chain_connected(chain: ChainSlug, name: &str, url: &Url) {
    println!(
        "  {} {} ({}) via {}",
        "OK".green().bold(),
        name.cyan(),
        chain.to_string().dimmed(),
        redact_url(url).dimmed()
    );
}

/// Print that a chain has no usable RPC endpoint and will be reported as a chain error.
pub fn print_chain_unavailable(chain: ChainSlug, reason: &str) {
    println!(
        "  {} chain {}: {}",
        "WARNING:".yellow().bold(),
        chain.to_string().cyan(),
        reason.yellow()
    );
}

// ── Report ─────────────────────────────────────────────────────────

/// Print the final run report: counts, then every failure with its context.
pub fn print_report(report: &RunReport) {
    println!();
    println!("{}", "Run report:".blue().bold());
    println!(
        "  {} applied, {} skipped, {} failed",
        report.applied().to_string().green(),
        report.skipped().to_string().yellow(),
        if report.failed() == 0 {
            report.failed().to_string().normal()
        } else {
            report.failed().to_string().red()
        },
    );

    for outcome in report.failures() {
        let StepStatus::Failed { error, .. } = &outcome.status else {
            continue;
        };
        let label = status_label(&outcome.status);
        println!(
            "  {} {} -> {} {}: {}",
            if label == "RETRY" { label.yellow().bold() } else { label.red().bold() },
            outcome.chain.to_string().cyan(),
            outcome.sibling.to_string().cyan(),
            outcome.step,
            error.dimmed(),
        );
    }

    for (chain, reason) in &report.chain_errors {
        println!(
            "  {} chain {} not configured: {}",
            "FAIL".red().bold(),
            chain.to_string().cyan(),
            reason.dimmed()
        );
    }

    println!();
    if report.is_clean() {
        println!("{}", "Mesh configuration converged.".green().bold());
    } else {
        println!(
            "{}",
            "Mesh configuration incomplete; re-run to retry the failed steps.".yellow().bold()
        );
    }
}

// ── Tests ───────────────────────────────────────────────────────────
