use pgext_core::{AvailabilityMatrix, CellStatus, Platform};
use serde::Serialize;

// ---- Sync ----

/// Options for a sync run.
#[derive(Clone, Debug, Default)]
pub struct SyncOptions {
    /// Ignore stored validators and download every repository.
    pub force: bool,
    /// Restrict the run to these repositories. Empty means all enabled ones.
    pub repositories: Vec<String>,
}

/// What happened to one repository during a sync or reload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepoOutcome {
    /// Metadata was downloaded (or re-parsed) and stored.
    Synced {
        /// Raw `apt`/`yum` rows.
        raw: usize,
        /// Normalised package records.
        packages: usize,
        /// Size of the stored payload.
        bytes: usize,
    },
    /// The server answered 304 Not Modified.
    NotModified,
    /// Remote size and ETag equal the stored ones.
    Unchanged,
    Failed { error: String },
}

impl RepoOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RepoOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RepoOutcome::NotModified | RepoOutcome::Unchanged)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepoOutcome::Synced { .. } => "synced",
            RepoOutcome::NotModified => "not modified",
            RepoOutcome::Unchanged => "unchanged",
            RepoOutcome::Failed { .. } => "failed",
        }
    }
}

/// Outcome of one repository, in configuration order.
#[derive(Clone, Debug, Serialize)]
pub struct RepoReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: RepoOutcome,
}

/// Report returned after a sync or reload completes.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SyncReport {
    pub repositories: Vec<RepoReport>,
}

impl SyncReport {
    pub fn synced(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| matches!(r.outcome, RepoOutcome::Synced { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| r.outcome.is_skipped())
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &RepoReport> {
        self.repositories.iter().filter(|r| r.outcome.is_failed())
    }

    pub fn outcome(&self, name: &str) -> Option<&RepoOutcome> {
        self.repositories
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }
}

// ---- Matrix ----

/// Matrix of one package group together with the extensions it covers.
#[derive(Clone, Debug, Serialize)]
pub struct GroupMatrix {
    /// Leading extension of the group.
    pub extension: String,
    pub siblings: Vec<String>,
    pub matrix: AvailabilityMatrix,
}

// ---- Gaps ----

/// A package group that is not plainly available on a platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GapEntry {
    pub pkg: String,
    pub extension: String,
    /// `(pg, status)` of every non-available cell on the platform.
    pub cells: Vec<(u16, CellStatus)>,
}

/// Gap entries of one platform.
#[derive(Clone, Debug, Serialize)]
pub struct PlatformGaps {
    pub platform: Platform,
    pub entries: Vec<GapEntry>,
}

// ---- Export ----

/// Report returned after an export completes.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: usize,
    pub failed: Vec<FailedExport>,
}

/// An extension whose document could not be written.
#[derive(Debug)]
pub struct FailedExport {
    pub extension: String,
    pub error: String,
}
