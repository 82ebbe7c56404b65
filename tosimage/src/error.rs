//! Error types for trusted OS image framing

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TosImageError>;

#[derive(Debug, Error)]
pub enum TosImageError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("can not read input file {}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can not write output file {}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("header prefix is {prefix_len} bytes, only {max} are reserved")]
    HeaderOverflow { prefix_len: usize, max: usize },

    #[error("payload is {size} bytes, size field holds at most {max}")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("can not set permissions on {}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl TosImageError {
    pub fn input(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::InputNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::InputUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn output(path: &Path, source: io::Error) -> Self {
        Self::OutputUnwritable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Process exit code reported for this error.
    ///
    /// `2` is left to clap for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound { .. } | Self::InputUnreadable { .. } => 3,
            Self::OutputUnwritable { .. } => 4,
            Self::HeaderOverflow { .. }
            | Self::PayloadTooLarge { .. }
            | Self::InvalidHeader(_) => 5,
            Self::Permissions { .. } => 6,
        }
    }
}
