//! Canonical architecture, origin and platform vocabulary.

use std::fmt;

use pgext_config::repository::RepositoryKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }

    /// Short alias used in repository names.
    pub fn alias(&self) -> &'static str {
        match self {
            Arch::X86_64 => "amd",
            Arch::Aarch64 => "arm",
        }
    }

    fn lookup(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "x86_64" | "amd64" | "x86" | "amd" => Some(Arch::X86_64),
            "aarch64" | "arm64" | "arm" | "armv8" => Some(Arch::Aarch64),
            _ => None,
        }
    }
}

/// Maps an architecture spelling onto [`Arch`]. Unknown spellings fall back
/// to `x86_64` with a warning.
pub fn normalize_arch(raw: &str) -> Arch {
    Arch::lookup(raw).unwrap_or_else(|| {
        warn!("Unknown architecture '{}', defaulting to x86_64", raw.trim());
        Arch::X86_64
    })
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Arch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Arch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize_arch(&raw))
    }
}

/// Upstream repository family a package comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Pigsty,
    Pgdg,
    Contrib,
    Other,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Pigsty => "PIGSTY",
            Origin::Pgdg => "PGDG",
            Origin::Contrib => "CONTRIB",
            Origin::Other => "OTHER",
        }
    }

    /// Precedence when several repositories provide the same cell.
    pub fn rank(&self) -> u8 {
        match self {
            Origin::Pigsty => 3,
            Origin::Pgdg => 2,
            Origin::Contrib => 1,
            Origin::Other => 0,
        }
    }

    /// Derives the origin from the third segment of a repository name,
    /// e.g. `pgdg16`, `pgnf`, `pigsty`.
    pub fn from_repo_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.starts_with("pigsty") {
            Origin::Pigsty
        } else if tag.starts_with("pgdg") || tag.starts_with("pgnf") {
            Origin::Pgdg
        } else if tag.starts_with("contrib") {
            Origin::Contrib
        } else {
            Origin::Other
        }
    }
}

impl From<&str> for Origin {
    fn from(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "PIGSTY" => Origin::Pigsty,
            "PGDG" => Origin::Pgdg,
            "CONTRIB" => Origin::Contrib,
            _ => Origin::Other,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Origin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Origin::from(raw.as_str()))
    }
}

/// An (OS code, architecture) pair such as `el9.aarch64`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Platform {
    pub os: String,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: Arch) -> Self {
        Self {
            os: os.into(),
            arch,
        }
    }

    /// Package format of the OS code: `el*` ships RPMs, `d*` and `u*`
    /// (Debian, Ubuntu) ship debs.
    pub fn package_kind(&self) -> Option<RepositoryKind> {
        match self.os.as_bytes().first() {
            Some(b'e') if self.os.starts_with("el") => Some(RepositoryKind::Rpm),
            Some(b'd' | b'u') => Some(RepositoryKind::Deb),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::capture_logs;

    #[test]
    fn test_normalize_arch() {
        for raw in ["x86_64", "amd64", "x86", "amd", " AMD64 ", "X86_64"] {
            assert_eq!(normalize_arch(raw), Arch::X86_64, "{raw}");
        }
        for raw in ["aarch64", "arm64", "arm", "armv8", "ARM64\n"] {
            assert_eq!(normalize_arch(raw), Arch::Aarch64, "{raw}");
        }
    }

    #[test]
    fn test_normalize_unknown_defaults_to_x86_64() {
        let (arch, logs) = capture_logs(|| normalize_arch(" riscv64 "));
        assert_eq!(arch, Arch::X86_64);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(
            logs.contains("Unknown architecture 'riscv64', defaulting to x86_64"),
            "{logs}"
        );
        assert_eq!(logs.lines().count(), 1);

        let (arch, logs) = capture_logs(|| normalize_arch("noarch"));
        assert_eq!(arch, Arch::X86_64);
        assert!(logs.contains("'noarch'"), "{logs}");

        let (_, logs) = capture_logs(|| normalize_arch("arm64"));
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_platform_package_kind() {
        let kind = |os: &str| Platform::new(os, Arch::X86_64).package_kind();
        assert_eq!(kind("el8"), Some(RepositoryKind::Rpm));
        assert_eq!(kind("el9"), Some(RepositoryKind::Rpm));
        assert_eq!(kind("d12"), Some(RepositoryKind::Deb));
        assert_eq!(kind("u24"), Some(RepositoryKind::Deb));
        assert_eq!(kind("fc40"), None);
        assert_eq!(kind("e1"), None);
    }

    #[test]
    fn test_origin_from_repo_tag() {
        assert_eq!(Origin::from_repo_tag("pigsty"), Origin::Pigsty);
        assert_eq!(Origin::from_repo_tag("pgdg16"), Origin::Pgdg);
        assert_eq!(Origin::from_repo_tag("pgnf13"), Origin::Pgdg);
        assert_eq!(Origin::from_repo_tag("contrib"), Origin::Contrib);
        assert_eq!(Origin::from_repo_tag("citus"), Origin::Other);
    }

    #[test]
    fn test_origin_rank_order() {
        assert!(Origin::Pigsty.rank() > Origin::Pgdg.rank());
        assert!(Origin::Pgdg.rank() > Origin::Contrib.rank());
        assert!(Origin::Contrib.rank() > Origin::Other.rank());
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::new("u24", Arch::Aarch64).to_string(), "u24.aarch64");
    }
}
