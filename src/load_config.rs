//! Static YAML config merged with environment-provided secrets.
//!
//! The YAML file carries no credentials; the repository token and the
//! generator API key come from `BLOG_REPO_TOKEN` and `GENERATOR_API_KEY`
//! (a `.env` file is honoured via dotenvy in `main`). Placeholder
//! detection is not done here — the pipeline validates the merged config
//! once at entry.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info};

use crate::checkout::RetryPolicy;
use crate::config::{AppConfig, RepositoryConfig};
use crate::generator::GeneratorSettings;

pub const REPO_TOKEN_ENV: &str = "BLOG_REPO_TOKEN";
pub const GENERATOR_KEY_ENV: &str = "GENERATOR_API_KEY";

#[derive(Deserialize)]
struct StaticConfig {
    repository: RepositorySection,
    generator: GeneratorSection,
    #[serde(default)]
    workspace_dir: Option<PathBuf>,
    #[serde(default)]
    retry: Option<RetrySection>,
}

#[derive(Deserialize)]
struct RepositorySection {
    owner: String,
    name: String,
    account_user: String,
    account_email: String,
    posts_subdir: PathBuf,
}

#[derive(Deserialize)]
struct GeneratorSection {
    base_url: String,
    model: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
struct RetrySection {
    max_attempts: u32,
    backoff_secs: u64,
}

/// Load the static YAML file and inject required env-var secrets,
/// returning a fully merged [`AppConfig`] or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read config file {:?}", path_ref))?;

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let token = std::env::var(REPO_TOKEN_ENV)
        .with_context(|| format!("{REPO_TOKEN_ENV} environment variable not set"))?;
    let api_key = std::env::var(GENERATOR_KEY_ENV)
        .with_context(|| format!("{GENERATOR_KEY_ENV} environment variable not set"))?;

    let mut generator = GeneratorSettings::new(
        static_conf.generator.base_url,
        api_key,
        static_conf.generator.model,
    );
    if let Some(secs) = static_conf.generator.timeout_secs {
        generator = generator.with_timeout(Duration::from_secs(secs));
    }

    let retry = match static_conf.retry {
        Some(section) => RetryPolicy {
            max_attempts: section.max_attempts,
            backoff: Duration::from_secs(section.backoff_secs),
        },
        None => RetryPolicy::default(),
    };

    let workspace_dir = static_conf
        .workspace_dir
        .unwrap_or_else(|| std::env::temp_dir().join("blog-pilot"));

    let config = AppConfig {
        repository: RepositoryConfig {
            owner: static_conf.repository.owner,
            name: static_conf.repository.name,
            token,
            account_user: static_conf.repository.account_user,
            account_email: static_conf.repository.account_email,
            posts_subdir: static_conf.repository.posts_subdir,
        },
        generator,
        workspace_dir,
        retry,
    };

    info!(
        owner = %config.repository.owner,
        repo = %config.repository.name,
        workspace_dir = %config.workspace_dir.display(),
        "Config loaded and merged successfully"
    );

    Ok(config)
}
