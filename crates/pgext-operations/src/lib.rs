//! Business logic of the pgext tooling.
//!
//! Every operation takes a [`PgextContext`] built once per run. The
//! long-running one is [`sync::sync_repositories`], which fans repositories
//! out over a bounded worker pool and reports one [`RepoOutcome`] per
//! repository instead of failing fast.

pub mod context;
pub mod error;
pub mod types;

pub mod export;
pub mod gaps;
pub mod matrix;
pub mod reload;
pub mod sync;

pub use context::PgextContext;
pub use error::{OperationError, Result};
pub use types::*;
