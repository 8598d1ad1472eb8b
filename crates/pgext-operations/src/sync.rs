//! Repository sync orchestration.
//!
//! Each repository runs as its own blocking task on a pool bounded by the
//! configured worker count. Downloading, verifying and parsing happen in
//! parallel; every write goes through one [`StoreWriter`] so the store never
//! sees two writers at once.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use pgext_config::repository::Repository;
use pgext_core::{normalize::normalize_content, normalize::RepoContext, PackageRecord};
use pgext_db::{
    models::{NewPackageRow, NewRepoData},
    repository::{persist_repository, RepoDataRepository},
    DbConnection, DbError,
};
use pgext_dl::{Transport, Validators};
use pgext_registry::{fetch_metadata, FetchOptions, FetchOutcome, MetadataContent};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::{
    error::{OperationError, Result},
    types::{RepoOutcome, RepoReport, SyncOptions, SyncReport},
    PgextContext,
};

/// Picks the repositories a run covers, in configuration order.
pub(crate) fn select_repositories(
    ctx: &PgextContext,
    names: &[String],
) -> Result<Vec<Repository>> {
    if names.is_empty() {
        return Ok(ctx.config().enabled_repositories().cloned().collect());
    }
    names
        .iter()
        .map(|name| {
            ctx.config()
                .get_repository(name)
                .cloned()
                .ok_or_else(|| OperationError::UnknownRepository(name.clone()))
        })
        .collect()
}

/// The single store connection shared by the sync workers.
///
/// Workers hold the lock only to read stored validators and to persist a
/// finished payload.
#[derive(Clone)]
pub struct StoreWriter {
    conn: Arc<Mutex<DbConnection>>,
}

impl StoreWriter {
    pub fn new(db: DbConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(db)),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, DbConnection>> {
        self.conn
            .lock()
            .map_err(|_| OperationError::Worker("store writer lock poisoned".to_string()))
    }

    /// Validators recorded by the last successful sync of `repo`.
    pub fn validators(&self, repo: &str) -> Result<Option<Validators>> {
        let mut db = self.conn()?;
        let stored = RepoDataRepository::find(db.conn(), repo).map_err(DbError::from)?;
        Ok(stored.map(|row| {
            Validators {
                etag: row.etag,
                last_modified: row.last_modified,
                size: row.size,
            }
        }))
    }

    pub fn persist(
        &self,
        record: &NewRepoData<'_>,
        content: &MetadataContent,
        packages: &[NewPackageRow],
    ) -> Result<()> {
        let mut db = self.conn()?;
        persist_repository(db.conn(), record, content, packages)?;
        Ok(())
    }
}

/// Fetches, normalises and stores one repository.
///
/// Nothing is written unless the whole payload was downloaded, verified and
/// parsed.
pub fn sync_repository(
    transport: &dyn Transport,
    repo: &Repository,
    writer: &StoreWriter,
    options: &FetchOptions,
) -> Result<RepoOutcome> {
    let stored = writer.validators(&repo.name)?;

    let payload = match fetch_metadata(transport, repo, stored.as_ref(), options)? {
        FetchOutcome::NotModified => return Ok(RepoOutcome::NotModified),
        FetchOutcome::Unchanged => return Ok(RepoOutcome::Unchanged),
        FetchOutcome::Fetched(payload) => payload,
    };

    let ctx = RepoContext::from_repository(repo);
    let packages: Vec<NewPackageRow> = normalize_content(&ctx, &payload.content)
        .iter()
        .map(PackageRecord::to_row)
        .collect();

    let record = NewRepoData {
        id: &repo.name,
        kind: repo.kind.as_str(),
        etag: payload.validators.etag.as_deref(),
        size: payload.validators.size,
        last_modified: payload.validators.last_modified.as_deref(),
        data: Some(&payload.data),
        updated_at: Utc::now().to_rfc3339(),
    };
    writer.persist(&record, &payload.content, &packages)?;

    Ok(RepoOutcome::Synced {
        raw: payload.content.len(),
        packages: packages.len(),
        bytes: payload.data.len(),
    })
}

fn log_outcome(name: &str, outcome: &RepoOutcome) {
    match outcome {
        RepoOutcome::Synced {
            raw,
            packages,
            bytes,
        } => {
            info!("[{name}] synced {raw} rows, {packages} packages ({bytes} bytes)");
        }
        RepoOutcome::NotModified | RepoOutcome::Unchanged => {
            info!("[{name}] {}, skipped", outcome.label());
        }
        RepoOutcome::Failed { error } => error!("[{name}] sync failed: {error}"),
    }
}

/// Syncs the selected repositories on a pool of `workers` tasks.
///
/// A failing repository is reported in the returned [`SyncReport`] and never
/// stops its siblings. Errors are only returned for problems that prevent
/// the run from starting, such as an unknown repository name or an
/// unopenable store.
pub async fn sync_repositories(ctx: &PgextContext, options: &SyncOptions) -> Result<SyncReport> {
    let repositories = select_repositories(ctx, &options.repositories)?;
    let writer = StoreWriter::new(ctx.open_db()?);

    let workers = ctx.config().workers();
    debug!(
        count = repositories.len(),
        workers = workers,
        force = options.force,
        "syncing repositories"
    );

    let fetch_options = Arc::new(FetchOptions {
        metadata_timeout: ctx.config().metadata_timeout(),
        payload_timeout: ctx.config().payload_timeout(),
        force: options.force,
    });
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut handles = Vec::with_capacity(repositories.len());

    for repo in repositories {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| OperationError::Worker(err.to_string()))?;
        let transport = ctx.transport();
        let fetch_options = fetch_options.clone();
        let writer = writer.clone();
        let name = repo.name.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let outcome =
                match sync_repository(transport.as_ref(), &repo, &writer, &fetch_options) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        RepoOutcome::Failed {
                            error: err.to_string(),
                        }
                    }
                };
            log_outcome(&repo.name, &outcome);
            drop(permit);
            outcome
        });
        handles.push((name, handle));
    }

    let mut report = SyncReport::default();
    for (name, handle) in handles {
        let outcome = handle.await.unwrap_or_else(|err| {
            error!("[{name}] worker aborted: {err}");
            RepoOutcome::Failed {
                error: format!("worker aborted: {err}"),
            }
        });
        report.repositories.push(RepoReport { name, outcome });
    }

    info!(
        "sync finished: {} synced, {} skipped, {} failed",
        report.synced(),
        report.skipped(),
        report.failed().count()
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{fmt::Write, path::Path};

    use pgext_config::{config::Config, repository::RepositoryKind};
    use pgext_db::repository::{AptRepository, PackageRepository, YumRepository};
    use pgext_dl::test_utils::MockTransport;
    use pgext_utils::hash::sha256_hex;

    use super::*;

    pub const PACKAGES: &str = "\
Package: postgresql-17-pgvector
Version: 0.8.0-1.pgdg24.04+1
Architecture: amd64
Filename: pool/main/p/pgvector/postgresql-17-pgvector_0.8.0-1_amd64.deb
Size: 1024

Package: postgresql-16-pgvector
Version: 0.8.0-1.pgdg24.04+1
Architecture: amd64
Filename: pool/main/p/pgvector/postgresql-16-pgvector_0.8.0-1_amd64.deb
Size: 1000
";

    pub fn deb_url(host: &str) -> String {
        format!("https://{host}/apt/dists/noble-pgdg/main/binary-amd64/Packages")
    }

    pub fn test_context(
        dir: &Path,
        repositories: Vec<Repository>,
        transport: Arc<MockTransport>,
    ) -> PgextContext {
        context_with_workers(dir, repositories, transport, 2)
    }

    fn context_with_workers(
        dir: &Path,
        repositories: Vec<Repository>,
        transport: Arc<MockTransport>,
        workers: usize,
    ) -> PgextContext {
        let mut config = Config::default_config();
        config.data_path = Some(dir.display().to_string());
        config.workers = Some(workers);
        config.repositories = repositories;
        config.resolve().unwrap();
        PgextContext::with_transport(config, transport)
    }

    fn deb_repo(name: &str, host: &str) -> Repository {
        Repository::new(name, deb_url(host), RepositoryKind::Deb)
    }

    fn stored_rows(ctx: &PgextContext) -> Vec<(String, String, Option<i32>, String)> {
        let mut db = ctx.open_db().unwrap();
        PackageRepository::list_all(db.conn())
            .unwrap()
            .into_iter()
            .map(|r| (r.repo, r.name, r.pg, r.version))
            .collect()
    }

    #[tokio::test]
    async fn test_second_sync_downloads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default());
        transport.serve(&deb_url("a.test"), PACKAGES.as_bytes(), "\"a1\"");
        transport.serve(&deb_url("b.test"), PACKAGES.as_bytes(), "\"b1\"");
        let ctx = test_context(
            dir.path(),
            vec![deb_repo("u24.amd.pgdg", "a.test"), deb_repo("u24.amd.pigsty", "b.test")],
            transport.clone(),
        );

        let first = sync_repositories(&ctx, &SyncOptions::default()).await.unwrap();
        assert_eq!(first.synced(), 2);
        assert_eq!(transport.fetch_count(), 2);
        let before = stored_rows(&ctx);
        assert_eq!(before.len(), 4);

        let second = sync_repositories(&ctx, &SyncOptions::default()).await.unwrap();
        assert_eq!(transport.fetch_count(), 2);
        assert_eq!(second.skipped(), 2);
        assert_eq!(second.outcome("u24.amd.pgdg"), Some(&RepoOutcome::NotModified));
        assert_eq!(stored_rows(&ctx), before);
    }

    #[tokio::test]
    async fn test_force_sync_downloads_again() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default());
        transport.serve(&deb_url("a.test"), PACKAGES.as_bytes(), "\"a1\"");
        let ctx = test_context(
            dir.path(),
            vec![deb_repo("u24.amd.pgdg", "a.test")],
            transport.clone(),
        );

        sync_repositories(&ctx, &SyncOptions::default()).await.unwrap();
        let forced = SyncOptions {
            force: true,
            ..Default::default()
        };
        let report = sync_repositories(&ctx, &forced).await.unwrap();

        assert_eq!(transport.fetch_count(), 2);
        assert!(matches!(
            report.outcome("u24.amd.pgdg"),
            Some(RepoOutcome::Synced { packages: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_checksum_mismatch_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default());
        let repomd_url = "https://c.test/yum/el9.x86_64/repodata/repomd.xml";
        let primary = b"SQLite format 3\0 tampered payload".to_vec();
        let declared = sha256_hex(b"the payload that was published");
        let repomd = format!(
            r#"<repomd xmlns="http://linux.duke.edu/metadata/repo">
  <data type="primary_db">
    <open-checksum type="sha256">{declared}</open-checksum>
    <location href="repodata/primary.sqlite"/>
  </data>
</repomd>"#
        );
        transport.serve(repomd_url, repomd.as_bytes(), "\"r1\"");
        transport.serve(
            "https://c.test/yum/el9.x86_64/repodata/primary.sqlite",
            &primary,
            "\"p1\"",
        );
        let ctx = test_context(
            dir.path(),
            vec![Repository::new("el9.amd.pigsty", repomd_url, RepositoryKind::Rpm)],
            transport,
        );

        let report = sync_repositories(&ctx, &SyncOptions::default()).await.unwrap();
        let outcome = report.outcome("el9.amd.pigsty").unwrap();
        let RepoOutcome::Failed { error } = outcome else {
            panic!("expected a failure, got {outcome:?}");
        };
        assert!(error.contains("Checksum mismatch"), "{error}");

        let mut db = ctx.open_db().unwrap();
        assert_eq!(YumRepository::count(db.conn(), "el9.amd.pigsty").unwrap(), 0);
        assert!(RepoDataRepository::find(db.conn(), "el9.amd.pigsty")
            .unwrap()
            .is_none());
        assert!(stored_rows(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_repository_does_not_affect_others() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default());
        transport.serve(&deb_url("a.test"), PACKAGES.as_bytes(), "\"a1\"");
        transport.serve(&deb_url("b.test"), PACKAGES.as_bytes(), "\"b1\"");
        let ctx = test_context(
            dir.path(),
            vec![
                deb_repo("u24.amd.pgdg", "a.test"),
                deb_repo("u22.amd.pgdg", "unreachable.test"),
                deb_repo("u24.amd.pigsty", "b.test"),
            ],
            transport,
        );

        let report = sync_repositories(&ctx, &SyncOptions::default()).await.unwrap();

        assert_eq!(report.repositories.len(), 3);
        assert!(report.outcome("u22.amd.pgdg").unwrap().is_failed());
        assert_eq!(report.synced(), 2);
        let repos: Vec<String> = stored_rows(&ctx).into_iter().map(|r| r.0).collect();
        assert_eq!(repos.iter().filter(|r| *r == "u24.amd.pgdg").count(), 2);
        assert_eq!(repos.iter().filter(|r| *r == "u24.amd.pigsty").count(), 2);
        assert!(!repos.iter().any(|r| r == "u22.amd.pgdg"));
    }

    #[tokio::test]
    async fn test_unknown_repository_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path(), vec![], Arc::new(MockTransport::default()));
        let options = SyncOptions {
            repositories: vec!["u24.amd.nowhere".to_string()],
            ..Default::default()
        };

        let err = sync_repositories(&ctx, &options).await.unwrap_err();
        assert!(matches!(err, OperationError::UnknownRepository(_)));
    }

    #[test]
    fn test_sync_repository_normalises_records() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::default();
        transport.serve(&deb_url("a.test"), PACKAGES.as_bytes(), "\"a1\"");
        let repo = deb_repo("u24.amd.pgdg", "a.test");
        let writer = StoreWriter::new(DbConnection::open(dir.path().join("pgext.db")).unwrap());

        let outcome =
            sync_repository(&transport, &repo, &writer, &FetchOptions::default()).unwrap();
        assert!(matches!(outcome, RepoOutcome::Synced { raw: 2, packages: 2, .. }));

        let mut db = writer.conn().unwrap();
        let rows = PackageRepository::list_by_repo(db.conn(), "u24.amd.pgdg").unwrap();
        assert_eq!(rows[0].pg, Some(17));
        assert_eq!(rows[0].arch, "x86_64");
        assert_eq!(rows[0].origin, "PGDG");
        assert_eq!(
            rows[0].url.as_deref(),
            Some("https://a.test/apt/pool/main/p/pgvector/postgresql-17-pgvector_0.8.0-1_amd64.deb")
        );
        let stored = RepoDataRepository::find(db.conn(), "u24.amd.pgdg")
            .unwrap()
            .unwrap();
        assert_eq!(stored.etag.as_deref(), Some("\"a1\""));
        assert_eq!(stored.size, Some(PACKAGES.len() as i64));
    }

    fn large_packages_index(count: usize) -> String {
        let mut index = String::new();
        for i in 0..count {
            let pg = 13 + i % 5;
            writeln!(
                index,
                "Package: postgresql-{pg}-ext{i}\n\
                 Version: 1.{i}.0-1.pgdg24.04+1\n\
                 Architecture: amd64\n\
                 Filename: pool/main/e/ext{i}/postgresql-{pg}-ext{i}_1.{i}.0-1_amd64.deb\n\
                 Size: {size}\n",
                size = 1000 + i
            )
            .unwrap();
        }
        index
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_parallel_workers_share_one_writer() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default());
        let index = large_packages_index(10_000);
        let repositories: Vec<Repository> = (0..8)
            .map(|n| {
                let host = format!("mirror{n}.test");
                transport.serve(&deb_url(&host), index.as_bytes(), &format!("\"m{n}\""));
                deb_repo(&format!("u24.amd.mirror{n}"), &host)
            })
            .collect();
        let ctx = context_with_workers(dir.path(), repositories, transport.clone(), 8);

        let report = sync_repositories(&ctx, &SyncOptions::default()).await.unwrap();

        let failed: Vec<_> = report.failed().collect();
        assert!(failed.is_empty(), "{failed:?}");
        assert_eq!(report.synced(), 8);
        assert_eq!(transport.fetch_count(), 8);

        let mut db = ctx.open_db().unwrap();
        for n in 0..8 {
            let repo = format!("u24.amd.mirror{n}");
            assert_eq!(AptRepository::count(db.conn(), &repo).unwrap(), 10_000);
            assert_eq!(PackageRepository::count(db.conn(), &repo).unwrap(), 10_000);
        }
    }
}
