//! Repository synchronisation: clean workspace, clone with bounded retry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::contract::{CancelFlag, Credentials, GitClient, Sleeper};
use crate::error::PublishError;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BACKOFF_SECS: u64 = 5;

/// Clone retry schedule: fixed backoff, no jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
        }
    }
}

/// Ephemeral working directory holding the cloned content repository.
///
/// Owned exclusively by one pipeline run. Reset destroys any prior state;
/// nothing cleans the directory up after the run finishes.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the directory if present, then recreate it empty.
    pub fn reset(&self) -> std::io::Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
            debug!(path = %self.root.display(), "Removed stale workspace");
        }
        std::fs::create_dir_all(&self.root)?;
        debug!(path = %self.root.display(), "Created empty workspace");
        Ok(())
    }
}

/// [`Sleeper`] backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Reset the workspace and clone `remote_url` into it, retrying up to
/// `policy.max_attempts` times with a fixed backoff between attempts.
///
/// Exhausting the retries fails with
/// [`PublishError::CloneExhausted`] wrapping the last underlying cause;
/// every failed attempt is logged with its attempt number and full error.
pub async fn clone_with_retry<G, S>(
    git: &G,
    sleeper: &S,
    policy: &RetryPolicy,
    remote_url: &str,
    workspace: &Workspace,
    credentials: &Credentials,
    cancel: &CancelFlag,
) -> Result<(), PublishError>
where
    G: GitClient + ?Sized,
    S: Sleeper + ?Sized,
{
    workspace.reset()?;

    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(PublishError::Cancelled);
        }
        match git
            .clone_repo(remote_url, workspace.root(), credentials)
            .await
        {
            Ok(()) => {
                info!(
                    attempt,
                    remote_url,
                    path = %workspace.root().display(),
                    "Cloned content repository"
                );
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                error!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    remote_url,
                    "Clone attempt failed, backing off"
                );
                sleeper.sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(source) => {
                error!(
                    attempt,
                    max_attempts = attempts,
                    error = %source,
                    remote_url,
                    "Clone attempts exhausted"
                );
                return Err(PublishError::CloneExhausted { attempts, source });
            }
        }
    }
}
