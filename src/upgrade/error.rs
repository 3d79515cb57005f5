use std::io;
use std::process::ExitStatus;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of the upgrade pipeline, one variant per step.
#[derive(Debug, Error)]
pub enum UpgradeError {
    /// The request could not be completed or its body could not be read.
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {url} returned {status}")]
    HttpStatus { url: String, status: u16 },

    /// The tag listing was not a list of `{"name": ...}` records.
    #[error("failed to decode tag listing from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no valid version tag found among {inspected} tags")]
    NoValidVersion { inspected: usize },

    #[error("failed to create temp file for installer script")]
    TempFile(#[source] io::Error),

    #[error("failed to write installer script")]
    Write(#[source] io::Error),

    #[error("failed to rewind installer script")]
    Seek(#[source] io::Error),

    #[error("failed to make installer script executable")]
    Permission(#[source] io::Error),

    #[error("failed to launch `{command}`")]
    SubprocessLaunch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}")]
    SubprocessExit { command: String, status: ExitStatus },
}

impl UpgradeError {
    pub fn network(url: &str, source: impl Into<BoxError>) -> Self {
        Self::Network {
            url: url.to_string(),
            source: source.into(),
        }
    }

    /// True for the variants caused by either HTTP call.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }

    pub fn is_subprocess(&self) -> bool {
        matches!(
            self,
            Self::SubprocessLaunch { .. } | Self::SubprocessExit { .. }
        )
    }
}
