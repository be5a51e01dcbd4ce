//! Seams between the pipeline and its external collaborators.
//!
//! This module defines the traits the publishing pipeline talks through
//! (content generator, git plumbing, code host, retry backoff) together
//! with the plain data types that cross those seams. All traits are
//! annotated for `mockall` so integration tests can substitute
//! deterministic mocks; the mocks are exported under the default
//! `test-export-mocks` feature.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;

use crate::error::{GeneratorError, GitError, HostError};

/// A generated article: first line of the model output becomes the title,
/// the rest the markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    pub title: String,
    pub content: String,
}

impl GeneratedPost {
    /// Filename the post is written under, derived from the literal title.
    /// Collisions with existing files are not rechecked.
    pub fn filename(&self) -> String {
        format!("{}.md", self.title)
    }
}

/// Clone/push credentials, constructed once per run and dropped after the
/// final authenticated git operation.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// `http.extraHeader` value injecting the bearer token into git's
    /// HTTPS transport.
    pub fn http_extra_header(&self) -> String {
        format!("http.extraHeader=Authorization: Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token stays out of logs.
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Commit author identity: display name is a crate constant, email comes
/// from configuration.
#[derive(Debug, Clone, Copy)]
pub struct CommitIdentity<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Request payload for opening a pull request.
#[derive(Debug, Clone, Copy)]
pub struct NewPullRequest<'a> {
    pub title: &'a str,
    pub head_branch: &'a str,
    pub base_branch: &'a str,
}

/// The created pull request as reported back by the host.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub number: u64,
    pub url: String,
}

/// Externally settable cancellation signal, consulted at every pipeline
/// step boundary and around the clone backoff suspension.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Language-model text generation capability.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Send a prompt and return the raw generated text.
    async fn send_request(&self, prompt: &str) -> Result<String, GeneratorError>;

    /// Lightweight round-trip probe; `true` when the generator answers.
    async fn probe_connectivity(&self) -> bool;
}

/// Git plumbing the pipeline drives: clone, branch, stage, status, commit,
/// push. Implemented by the subprocess adapter and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Clone `remote_url` into `target`, authenticating with `credentials`.
    async fn clone_repo(
        &self,
        remote_url: &str,
        target: &Path,
        credentials: &Credentials,
    ) -> Result<(), GitError>;

    /// Create and check out a new branch in the working copy.
    async fn create_branch(&self, workdir: &Path, name: &str) -> Result<(), GitError>;

    /// Stage exactly the given pathspec.
    async fn stage(&self, workdir: &Path, pathspec: &Path) -> Result<(), GitError>;

    /// `true` when the working tree reports pending changes.
    async fn has_pending_changes(&self, workdir: &Path) -> Result<bool, GitError>;

    /// Commit staged changes with the given author identity.
    async fn commit<'a>(
        &self,
        workdir: &Path,
        identity: CommitIdentity<'a>,
        message: &str,
    ) -> Result<(), GitError>;

    /// Push a branch to the `origin` remote.
    async fn push(
        &self,
        workdir: &Path,
        branch: &str,
        credentials: &Credentials,
    ) -> Result<(), GitError>;
}

/// Code-hosting API surface the pipeline needs: pull request creation.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Open a pull request and return its canonical URL.
    async fn open_pull_request<'a>(
        &self,
        req: NewPullRequest<'a>,
    ) -> Result<PullRequest, HostError>;
}

/// Injected backoff suspension so retry timing is testable with a mock.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
