use nu_ansi_term::Color::{Blue, Cyan, Green, Red, Yellow};
use pgext_operations::{
    reload::reload_repositories, sync::sync_repositories, PgextContext, RepoOutcome, Result,
    SyncOptions, SyncReport,
};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::{error, info};

use crate::utils::{print_json, Colored, Icons};

fn outcome_cell(outcome: &RepoOutcome) -> String {
    match outcome {
        RepoOutcome::Synced { .. } => Colored(Green, outcome.label()).to_string(),
        RepoOutcome::NotModified | RepoOutcome::Unchanged => {
            Colored(Cyan, outcome.label()).to_string()
        }
        RepoOutcome::Failed { .. } => Colored(Red, outcome.label()).to_string(),
    }
}

fn display_report(title: &str, report: &SyncReport, json: bool) -> Result<()> {
    if json {
        print_json(report)?;
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Repository", "Status", "Rows", "Packages", "Bytes"]);
    for repo in &report.repositories {
        let (raw, packages, bytes) = match repo.outcome {
            RepoOutcome::Synced {
                raw,
                packages,
                bytes,
            } => (raw.to_string(), packages.to_string(), bytes.to_string()),
            _ => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        builder.push_record([
            Colored(Blue, &repo.name).to_string(),
            outcome_cell(&repo.outcome),
            raw,
            packages,
            bytes,
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();
    info!("\n{table}");

    for failed in report.failed() {
        if let RepoOutcome::Failed { error } = &failed.outcome {
            error!("{} {}: {}", Icons::ARROW, failed.name, error);
        }
    }

    info!(
        "{} synced, {} skipped, {} failed",
        Colored(Green, report.synced()),
        Colored(Cyan, report.skipped()),
        Colored(Yellow, report.failed().count())
    );
    Ok(())
}

pub async fn sync(
    ctx: &PgextContext,
    force: bool,
    repositories: Vec<String>,
    json: bool,
) -> Result<()> {
    let options = SyncOptions {
        force,
        repositories,
    };
    let report = sync_repositories(ctx, &options).await?;
    display_report("Repository Sync", &report, json)
}

pub fn reload(ctx: &PgextContext, repositories: &[String], json: bool) -> Result<()> {
    let report = reload_repositories(ctx, repositories)?;
    display_report("Repository Reload", &report, json)
}
