//! Error taxonomy for the publishing pipeline.
//!
//! Reject-class errors (bad config, unreachable generator, nothing to
//! commit, host-side validation) are user-correctable and surface as a
//! [`PublishOutcome::Rejected`](crate::publish::PublishOutcome) with a
//! reason string. Everything else is fatal for the run and propagates with
//! its cause chain intact.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// A required configuration field is absent or still carries a placeholder.
#[derive(Debug, Error)]
#[error("configuration field '{field}' is missing or a placeholder")]
pub struct ConfigError {
    pub field: &'static str,
}

/// Failures talking to the content generator API.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generator response: {0}")]
    Malformed(String),
}

/// Failures from the git subprocess layer.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to launch git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {action} exited with {status}: {stderr}")]
    Command {
        action: &'static str,
        status: ExitStatus,
        stderr: String,
    },
}

/// Failures talking to the code-hosting API.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("pull request creation failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The host rejected the request as invalid (duplicate branch, no
    /// diff, ...). Carries the provider message verbatim.
    #[error("{message}")]
    Validation { message: String },

    #[error("host returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed host response: {0}")]
    Malformed(String),
}

/// Failures producing a structured post out of the generator output.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The raw response contained no non-blank lines.
    #[error("generator response contained no usable lines")]
    EmptyGeneration,

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Top-level pipeline error.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("configuration invalid: {0}")]
    Configuration(#[from] ConfigError),

    #[error("content generator unreachable")]
    Connectivity,

    #[error("clone failed after {attempts} attempts")]
    CloneExhausted {
        attempts: u32,
        #[source]
        source: GitError,
    },

    #[error("posts directory missing after clone: {}", .0.display())]
    Layout(PathBuf),

    #[error("post generation failed: {0}")]
    Generation(#[from] ComposeError),

    #[error("no changes detected")]
    NoChanges,

    #[error("pull request rejected: {0}")]
    RemoteValidation(String),

    #[error("git operation failed: {0}")]
    Git(#[from] GitError),

    #[error("code host request failed: {0}")]
    Host(HostError),

    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("publish run cancelled")]
    Cancelled,
}

impl PublishError {
    /// The reason string for reject-class errors; `None` for fatal ones.
    pub fn rejection_reason(&self) -> Option<String> {
        match self {
            PublishError::Configuration(_) => Some("bad config".to_string()),
            PublishError::Connectivity => Some("generator unreachable".to_string()),
            PublishError::NoChanges => Some("no changes detected".to_string()),
            PublishError::RemoteValidation(message) => Some(message.clone()),
            _ => None,
        }
    }
}

impl From<HostError> for PublishError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Validation { message } => PublishError::RemoteValidation(message),
            other => PublishError::Host(other),
        }
    }
}
