pub mod arch;
pub mod catalog;
pub mod error;
pub mod extension;
pub mod matrix;
pub mod normalize;
pub mod package;
pub mod version;

#[cfg(test)]
mod test_utils;

pub use arch::{normalize_arch, Arch, Origin, Platform};
pub use error::{CoreError, Result};
pub use extension::Extension;
pub use matrix::{build_matrix, AvailabilityMatrix, CellStatus, Grid, MatrixCell, MatrixInput};
pub use package::PackageRecord;
pub use version::extract_semantic_version;
