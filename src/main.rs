// src/main.rs
// =============================================================================
// Entry point of the ghrecon CLI.
//
// What happens here:
// 1. Parse command-line arguments and set up logging
// 2. Wire Ctrl-C to the run's cancellation token
// 3. Run discovery + scanning with the built-in hooks
// 4. Print findings and failures
// 5. Exit with 0 = nothing found, 1 = secrets found, 2 = error
// =============================================================================

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::warn;

use cli::Cli;
use ghrecon::hooks::{Finding, Inventory, RepositoryTotals, SecretScanner};
use ghrecon::{cancellation, full_recon, GitCloner, GithubClient, Hook, Hooks, ReconReport};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let url = cli.organization_url()?;
    let config = cli.config();

    let (cancel_handle, cancel) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling run");
            cancel_handle.cancel();
        }
    });

    let scanner = Arc::new(SecretScanner::new());
    let inventory = Arc::new(Inventory::new(cli.list_files));
    let hooks = Hooks::new(vec![
        Arc::clone(&inventory) as Arc<dyn Hook>,
        Arc::clone(&scanner) as Arc<dyn Hook>,
    ]);

    println!("🔍 Scanning organization: {}", url);

    let client = GithubClient::new(&config)?;
    let report = full_recon(
        &client,
        Arc::new(GitCloner::new()),
        &url,
        hooks,
        &config,
        cancel,
    )
    .await?;

    let findings = scanner.findings();
    if cli.json {
        print_json(&report, &findings, &inventory.totals())?;
    } else {
        print_table(&report, &findings);
    }

    if findings.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn print_json(
    report: &ReconReport,
    findings: &[Finding],
    totals: &std::collections::BTreeMap<String, RepositoryTotals>,
) -> Result<()> {
    let failures: Vec<serde_json::Value> = report
        .pipeline
        .failed
        .iter()
        .map(|f| {
            serde_json::json!({
                "repository": f.repository.full_name,
                "stage": f.stage.name(),
                "error": f.error.to_string(),
            })
        })
        .chain(report.discovery_failures.iter().map(|f| {
            serde_json::json!({
                "subject": f.subject,
                "stage": "discovery",
                "error": f.error.to_string(),
            })
        }))
        .collect();

    let output = serde_json::json!({
        "organization": report.organization.login,
        "members": report.member_count,
        "repositories": totals,
        "findings": findings,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_table(report: &ReconReport, findings: &[Finding]) {
    println!();
    println!("{:<40} {:<30} {:<22} {:>6}", "REPOSITORY", "FILE", "RULE", "LINE");
    println!("{}", "=".repeat(101));

    for finding in findings {
        let filename = if finding.filename.is_empty() {
            "<unnamed>"
        } else {
            finding.filename.as_str()
        };
        println!(
            "{:<40} {:<30} {:<22} {:>6}",
            truncate(&finding.repository, 40),
            truncate(filename, 30),
            finding.rule,
            finding.line
        );
    }

    if !report.is_complete() {
        println!();
        println!("⚠️  Failures:");
        for failure in &report.discovery_failures {
            println!("   {} (discovery): {}", failure.subject, failure.error);
        }
        for failure in &report.pipeline.failed {
            println!(
                "   {} ({}): {}",
                failure.repository.full_name, failure.stage, failure.error
            );
        }
    }

    println!();
    println!("📊 Summary for {}:", report.organization.login);
    println!("   👥 Members: {}", report.member_count);
    println!("   📦 Repositories scanned: {}", report.pipeline.scanned.len());
    println!("   📄 Files scanned: {}", report.pipeline.files());
    println!("   ❌ Failed: {}", report.pipeline.failed.len());
    println!("   🔑 Findings: {}", findings.len());
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}
