use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

/// Creates a structurally valid config file for the CLI to read.
fn create_config() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"repository:\n  owner: acme\n  name: blog\n  account_user: acme-bot\n  account_email: bot@acme.dev\n  posts_subdir: posts\ngenerator:\n  base_url: \"https://generator.invalid/v1\"\n  model: test-model\n",
    )
    .expect("Writing temp config failed");
    config
}

/// Placeholder secrets must reject the run before any network or
/// filesystem activity, so this test is hermetic.
#[test]
fn publish_cli_rejects_placeholder_credentials() {
    let config = create_config();

    let mut cmd = Command::cargo_bin("blog-pilot").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .env("BLOG_REPO_TOKEN", "<your-token>")
        .env("GENERATOR_API_KEY", "changeme");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("bad config"));
}

#[test]
fn publish_cli_fails_on_missing_config_file() {
    let mut cmd = Command::cargo_bin("blog-pilot").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg("does-not-exist.yaml")
        .env("BLOG_REPO_TOKEN", "ghp_sometoken")
        .env("GENERATOR_API_KEY", "sk-somekey");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config file"));
}
