use std::{error::Error, fmt, io, path::PathBuf};

/// Failure to expand a configured path.
#[derive(Debug)]
pub enum PathError {
    Empty,
    CurrentDir(io::Error),
    /// `$VAR` or `${VAR}` referenced a variable that is not set.
    MissingEnvVar { var: String, input: String },
    UnclosedVariable { input: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Path is empty"),
            Self::CurrentDir(err) => write!(f, "Cannot resolve relative path: {err}"),
            Self::MissingEnvVar { var, input } => {
                write!(f, "Environment variable `{var}` not set in `{input}`")
            }
            Self::UnclosedVariable { input } => {
                write!(f, "Unclosed `${{` in `{input}`")
            }
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            _ => None,
        }
    }
}

/// The filesystem call a [`FileSystemError::Io`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsAction {
    CreateDir,
    Write,
}

impl fmt::Display for FsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateDir => "create directory",
            Self::Write => "write",
        })
    }
}

#[derive(Debug)]
pub enum FileSystemError {
    Io {
        action: FsAction,
        path: PathBuf,
        source: io::Error,
    },
    NotADirectory(PathBuf),
}

impl FileSystemError {
    pub fn io(action: FsAction, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                action,
                path,
                source,
            } => write!(f, "Failed to {action} `{}`: {source}", path.display()),
            Self::NotADirectory(path) => write!(f, "`{}` is not a directory", path.display()),
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotADirectory(_) => None,
        }
    }
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;
pub type PathResult<T> = std::result::Result<T, PathError>;
