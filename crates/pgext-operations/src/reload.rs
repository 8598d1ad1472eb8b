//! Re-parsing of stored repository payloads without network access.

use pgext_config::repository::Repository;
use pgext_core::{
    normalize::{normalize_content, RepoContext},
    PackageRecord,
};
use pgext_db::{
    models::{NewPackageRow, RepoData},
    repository::{replace_parsed, RepoDataRepository},
    DbError,
};
use pgext_registry::{parse_payload, MetadataContent};
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::{
    error::Result,
    sync::select_repositories,
    types::{RepoOutcome, RepoReport, SyncReport},
    PgextContext,
};

struct Parsed {
    content: MetadataContent,
    packages: Vec<NewPackageRow>,
    bytes: usize,
}

fn parse_stored(repo: &Repository, stored: Option<&RepoData>) -> std::result::Result<Parsed, String> {
    let data = stored
        .and_then(|row| row.data.as_deref())
        .ok_or_else(|| "no stored payload, run sync first".to_string())?;
    let content = parse_payload(repo.kind, data).map_err(|err| err.to_string())?;
    let ctx = RepoContext::from_repository(repo);
    let packages = normalize_content(&ctx, &content)
        .iter()
        .map(PackageRecord::to_row)
        .collect();
    Ok(Parsed {
        content,
        packages,
        bytes: data.len(),
    })
}

/// Rebuilds the `apt`/`yum`/`package` rows of the selected repositories from
/// their stored payloads.
///
/// Payloads are parsed in parallel; a repository whose payload is missing or
/// unparseable keeps its previous rows and is reported as failed.
pub fn reload_repositories(ctx: &PgextContext, names: &[String]) -> Result<SyncReport> {
    let repositories = select_repositories(ctx, names)?;
    let mut db = ctx.open_db()?;
    let stored = RepoDataRepository::list_all(db.conn()).map_err(DbError::from)?;
    debug!(
        configured = repositories.len(),
        stored = stored.len(),
        "reloading repositories"
    );

    let parsed: Vec<(Repository, std::result::Result<Parsed, String>)> = repositories
        .into_par_iter()
        .map(|repo| {
            let row = stored.iter().find(|row| row.id == repo.name);
            let result = parse_stored(&repo, row);
            (repo, result)
        })
        .collect();

    let mut report = SyncReport::default();
    for (repo, result) in parsed {
        let outcome = match result.and_then(|parsed| {
            replace_parsed(db.conn(), &repo.name, &parsed.content, &parsed.packages)
                .map_err(|err| err.to_string())?;
            Ok(parsed)
        }) {
            Ok(parsed) => {
                info!(
                    "[{}] reloaded {} rows, {} packages",
                    repo.name,
                    parsed.content.len(),
                    parsed.packages.len()
                );
                RepoOutcome::Synced {
                    raw: parsed.content.len(),
                    packages: parsed.packages.len(),
                    bytes: parsed.bytes,
                }
            }
            Err(error) => {
                error!("[{}] reload failed: {error}", repo.name);
                RepoOutcome::Failed { error }
            }
        };
        report.repositories.push(RepoReport {
            name: repo.name,
            outcome,
        });
    }

    Ok(report)
}
