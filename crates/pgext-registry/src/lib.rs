//! Repository metadata handling for the pgext catalog.
//!
//! This crate turns remote repository metadata into typed package rows:
//! - **deb**: Debian-control `Packages` indexes ([`deb`])
//! - **rpm**: `repomd.xml` indexes ([`repomd`]) pointing at compressed
//!   SQLite primary databases ([`rpm`], [`compression`])
//!
//! [`fetch_metadata`] drives the conditional download of one repository over
//! a [`pgext_dl::Transport`], and [`parse_payload`] re-parses stored bytes.

pub mod compression;
pub mod deb;
pub mod error;
pub mod metadata;
pub mod repomd;
pub mod rpm;

pub use deb::{parse_packages, DebPackage};
pub use error::{ErrorContext, RegistryError, Result};
pub use metadata::{
    fetch_metadata, parse_payload, FetchOptions, FetchOutcome, MetadataContent, RepoPayload,
};
pub use rpm::{read_primary_db, RpmPackage};
