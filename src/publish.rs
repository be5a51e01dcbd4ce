//! End-to-end publishing pipeline: validate, clone, compose, write,
//! branch, commit, push, open a pull request.
//!
//! One logical flow per invocation, strictly sequential. Reject-class
//! failures (bad config, unreachable generator, nothing to commit,
//! host-side validation) end the run with [`PublishOutcome::Rejected`];
//! everything else propagates as [`PublishError`] with no rollback of
//! already-created local branches or commits — the workspace is ephemeral
//! and never reused.

use std::path::Path;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::checkout::{clone_with_retry, Workspace};
use crate::compose;
use crate::config::AppConfig;
use crate::contract::{
    CancelFlag, CodeHost, CommitIdentity, ContentGenerator, Credentials, GitClient,
    NewPullRequest, Sleeper,
};
use crate::error::PublishError;
use crate::naming;

/// Fixed author display name for generated commits.
pub const COMMIT_AUTHOR_NAME: &str = "blog-pilot";
/// Fixed message for generated commits.
pub const COMMIT_MESSAGE: &str = "Add generated blog post";
/// Integration branch pull requests target.
pub const BASE_BRANCH: &str = "main";

/// Terminal outcome of one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The pull request was opened; carries its canonical URL.
    PullRequestOpened { url: String },
    /// The run ended early on a user-correctable condition.
    Rejected { reason: String },
}

/// Run the full pipeline against the given collaborators.
///
/// Reject-class errors are folded into `Ok(Rejected { .. })`; fatal
/// errors come back as `Err` with their cause chain intact.
pub async fn publish<G, R, H, S>(
    config: &AppConfig,
    generator: &G,
    git: &R,
    host: &H,
    sleeper: &S,
    cancel: &CancelFlag,
) -> Result<PublishOutcome, PublishError>
where
    G: ContentGenerator + ?Sized,
    R: GitClient + ?Sized,
    H: CodeHost + ?Sized,
    S: Sleeper + ?Sized,
{
    match run_pipeline(config, generator, git, host, sleeper, cancel).await {
        Ok(url) => Ok(PublishOutcome::PullRequestOpened { url }),
        Err(e) => match e.rejection_reason() {
            Some(reason) => {
                warn!(reason = %reason, "Publish run rejected");
                Ok(PublishOutcome::Rejected { reason })
            }
            None => Err(e),
        },
    }
}

async fn run_pipeline<G, R, H, S>(
    config: &AppConfig,
    generator: &G,
    git: &R,
    host: &H,
    sleeper: &S,
    cancel: &CancelFlag,
) -> Result<String, PublishError>
where
    G: ContentGenerator + ?Sized,
    R: GitClient + ?Sized,
    H: CodeHost + ?Sized,
    S: Sleeper + ?Sized,
{
    info!("[PUBLISH] Validating configuration");
    config.validate()?;

    if !generator.probe_connectivity().await {
        error!("[PUBLISH] Content generator did not answer the connectivity probe");
        return Err(PublishError::Connectivity);
    }
    info!("[PUBLISH] Generator connectivity verified");
    ensure_active(cancel)?;

    let credentials = Credentials::new(
        &config.repository.account_user,
        &config.repository.token,
    );
    let workspace = Workspace::new(config.workspace_dir.join(naming::to_kebab_case(&format!(
        "{} {}",
        config.repository.owner, config.repository.name
    ))));
    clone_with_retry(
        git,
        sleeper,
        &config.retry,
        &config.remote_url(),
        &workspace,
        &credentials,
        cancel,
    )
    .await?;
    ensure_active(cancel)?;

    let posts_dir = workspace.root().join(&config.repository.posts_subdir);
    if !posts_dir.is_dir() {
        error!(path = %posts_dir.display(), "[PUBLISH] Posts directory missing after clone");
        return Err(PublishError::Layout(posts_dir));
    }
    let existing_titles = list_markdown_posts(&posts_dir)?;
    info!(count = existing_titles.len(), "[PUBLISH] Enumerated existing posts");
    ensure_active(cancel)?;

    let post = compose::compose(generator, &existing_titles).await?;

    let relative_path = config.repository.posts_subdir.join(post.filename());
    let post_path = workspace.root().join(&relative_path);
    std::fs::write(&post_path, &post.content)?;
    info!(path = %post_path.display(), "[PUBLISH] Wrote generated post");
    ensure_active(cancel)?;

    let branch = naming::branch_name(Utc::now());
    git.create_branch(workspace.root(), &branch).await?;
    info!(branch = %branch, "[PUBLISH] Created publish branch");

    git.stage(workspace.root(), &relative_path).await?;
    if !git.has_pending_changes(workspace.root()).await? {
        warn!("[PUBLISH] Working tree reports no pending changes");
        return Err(PublishError::NoChanges);
    }
    git.commit(
        workspace.root(),
        CommitIdentity {
            name: COMMIT_AUTHOR_NAME,
            email: &config.repository.account_email,
        },
        COMMIT_MESSAGE,
    )
    .await?;
    info!(branch = %branch, "[PUBLISH] Committed generated post");
    ensure_active(cancel)?;

    git.push(workspace.root(), &branch, &credentials).await?;
    info!(branch = %branch, "[PUBLISH] Pushed publish branch");
    // Last authenticated git operation: the credentials' scope ends here.
    drop(credentials);

    let pr = host
        .open_pull_request(NewPullRequest {
            title: &post.title,
            head_branch: &branch,
            base_branch: BASE_BRANCH,
        })
        .await?;
    info!(url = %pr.url, number = pr.number, "[PUBLISH] Pull request opened");
    Ok(pr.url)
}

fn ensure_active(cancel: &CancelFlag) -> Result<(), PublishError> {
    if cancel.is_cancelled() {
        warn!("[PUBLISH] Cancellation observed, aborting run");
        return Err(PublishError::Cancelled);
    }
    Ok(())
}

/// Titles (filenames without extension) of all markdown files under
/// `dir`, recursively, in directory listing order.
pub fn list_markdown_posts(dir: &Path) -> std::io::Result<Vec<String>> {
    fn visit_dir(dir: &Path, titles: &mut Vec<String>) -> std::io::Result<()> {
        for entry_res in std::fs::read_dir(dir)? {
            let entry = entry_res?;
            let path = entry.path();
            if path.is_dir() {
                visit_dir(&path, titles)?;
            } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    titles.push(stem.to_string());
                }
            }
        }
        Ok(())
    }

    let mut titles = Vec::new();
    visit_dir(dir, &mut titles)?;
    Ok(titles)
}
