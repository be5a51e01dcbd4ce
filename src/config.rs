//! Validated application settings, immutable for the lifetime of one run.

use std::path::PathBuf;

use tracing::info;

use crate::checkout::RetryPolicy;
use crate::error::ConfigError;
use crate::generator::GeneratorSettings;

/// Content repository coordinates and account identity.
#[derive(Clone)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
    /// Bearer token for clone, push and the pull-request API.
    pub token: String,
    /// Account login used on the authenticated remote URL.
    pub account_user: String,
    /// Commit author email; the author display name is a crate constant.
    pub account_email: String,
    /// Subdirectory of the repository holding the markdown posts.
    pub posts_subdir: PathBuf,
}

impl std::fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("account_user", &self.account_user)
            .field("account_email", &self.account_email)
            .field("posts_subdir", &self.posts_subdir)
            .finish()
    }
}

/// Full settings object handed to the pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub repository: RepositoryConfig,
    pub generator: GeneratorSettings,
    /// Parent directory for per-run workspaces.
    pub workspace_dir: PathBuf,
    pub retry: RetryPolicy,
}

fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty()
        || v.eq_ignore_ascii_case("changeme")
        || v.eq_ignore_ascii_case("placeholder")
        || (v.starts_with('<') && v.ends_with('>'))
}

impl AppConfig {
    /// Placeholder/non-empty precondition checks, run once at pipeline
    /// entry before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, &str); 8] = [
            ("repository.owner", &self.repository.owner),
            ("repository.name", &self.repository.name),
            ("repository.token", &self.repository.token),
            ("repository.account_user", &self.repository.account_user),
            ("repository.account_email", &self.repository.account_email),
            ("generator.base_url", &self.generator.base_url),
            ("generator.api_key", &self.generator.api_key),
            ("generator.model", &self.generator.model),
        ];
        for (field, value) in checks {
            if is_placeholder(value) {
                return Err(ConfigError { field });
            }
        }
        if self.repository.posts_subdir.as_os_str().is_empty() {
            return Err(ConfigError {
                field: "repository.posts_subdir",
            });
        }
        Ok(())
    }

    /// HTTPS remote of the content repository, carrying the account login.
    /// The token itself travels in a header, not in the URL.
    pub fn remote_url(&self) -> String {
        format!(
            "https://{}@github.com/{}/{}.git",
            self.repository.account_user, self.repository.owner, self.repository.name
        )
    }

    pub fn trace_loaded(&self) {
        info!(
            owner = %self.repository.owner,
            repo = %self.repository.name,
            posts_subdir = %self.repository.posts_subdir.display(),
            workspace_dir = %self.workspace_dir.display(),
            model = %self.generator.model,
            max_attempts = self.retry.max_attempts,
            "Loaded AppConfig"
        );
    }
}
