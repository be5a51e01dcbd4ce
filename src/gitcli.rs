//! Git plumbing via the `git` binary.
//!
//! Every operation spawns `git` with `tokio::process` and captures its
//! output; non-zero exits surface as [`GitError::Command`] with the
//! subcommand name, exit status and stderr. Authentication for clone and
//! push is injected per invocation through an `http.extraHeader`
//! configuration carrying the bearer token.

use std::ffi::OsString;
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::contract::{CommitIdentity, Credentials, GitClient};
use crate::error::GitError;

/// [`GitClient`] implementation backed by the system `git` binary.
pub struct CliGit;

async fn run_git(
    action: &'static str,
    workdir: Option<&Path>,
    args: Vec<OsString>,
) -> Result<String, GitError> {
    let mut cmd = Command::new("git");
    if let Some(dir) = workdir {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args);

    let output = cmd.output().await.map_err(GitError::Spawn)?;
    if !output.status.success() {
        return Err(GitError::Command {
            action,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    debug!(action, "git subcommand succeeded");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl GitClient for CliGit {
    async fn clone_repo(
        &self,
        remote_url: &str,
        target: &Path,
        credentials: &Credentials,
    ) -> Result<(), GitError> {
        run_git(
            "clone",
            None,
            vec![
                "-c".into(),
                credentials.http_extra_header().into(),
                "clone".into(),
                remote_url.into(),
                target.as_os_str().to_os_string(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn create_branch(&self, workdir: &Path, name: &str) -> Result<(), GitError> {
        run_git(
            "checkout",
            Some(workdir),
            vec!["checkout".into(), "-b".into(), name.into()],
        )
        .await
        .map(|_| ())
    }

    async fn stage(&self, workdir: &Path, pathspec: &Path) -> Result<(), GitError> {
        run_git(
            "add",
            Some(workdir),
            vec!["add".into(), pathspec.as_os_str().to_os_string()],
        )
        .await
        .map(|_| ())
    }

    async fn has_pending_changes(&self, workdir: &Path) -> Result<bool, GitError> {
        let stdout = run_git(
            "status",
            Some(workdir),
            vec!["status".into(), "--porcelain".into()],
        )
        .await?;
        Ok(!stdout.trim().is_empty())
    }

    async fn commit<'a>(
        &self,
        workdir: &Path,
        identity: CommitIdentity<'a>,
        message: &str,
    ) -> Result<(), GitError> {
        run_git(
            "commit",
            Some(workdir),
            vec![
                "-c".into(),
                format!("user.name={}", identity.name).into(),
                "-c".into(),
                format!("user.email={}", identity.email).into(),
                "commit".into(),
                "-m".into(),
                message.into(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn push(
        &self,
        workdir: &Path,
        branch: &str,
        credentials: &Credentials,
    ) -> Result<(), GitError> {
        run_git(
            "push",
            Some(workdir),
            vec![
                "-c".into(),
                credentials.http_extra_header().into(),
                "push".into(),
                "origin".into(),
                branch.into(),
            ],
        )
        .await
        .map(|_| ())
    }
}
