use std::path::{Path, PathBuf};

use tempfile::tempdir;

use blog_pilot::checkout::RetryPolicy;
use blog_pilot::config::{AppConfig, RepositoryConfig};
use blog_pilot::contract::{
    CancelFlag, MockCodeHost, MockContentGenerator, MockGitClient, MockSleeper, PullRequest,
};
use blog_pilot::error::{GitError, HostError, PublishError};
use blog_pilot::generator::GeneratorSettings;
use blog_pilot::publish::{list_markdown_posts, publish, PublishOutcome, BASE_BRANCH};

fn test_config(workspace_dir: &Path) -> AppConfig {
    AppConfig {
        repository: RepositoryConfig {
            owner: "acme".into(),
            name: "blog".into(),
            token: "ghp_testtoken".into(),
            account_user: "acme-bot".into(),
            account_email: "bot@acme.dev".into(),
            posts_subdir: "posts".into(),
        },
        generator: GeneratorSettings::new("https://generator.test/v1", "sk-test", "test-model"),
        workspace_dir: workspace_dir.to_path_buf(),
        retry: RetryPolicy::default(),
    }
}

/// Workspace path the pipeline derives for the test repository.
fn expected_workspace(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join("acme-blog")
}

fn online_generator(response: &str) -> MockContentGenerator {
    let response = response.to_string();
    let mut generator = MockContentGenerator::new();
    generator.expect_probe_connectivity().return_once(|| true);
    generator
        .expect_send_request()
        .return_once(move |_| Ok(response));
    generator
}

/// Git mock whose clone materialises a posts directory with the given
/// existing files.
fn cloning_git(posts: &'static [&'static str]) -> MockGitClient {
    let mut git = MockGitClient::new();
    git.expect_clone_repo().returning(move |_, target, _| {
        let posts_dir = target.join("posts");
        std::fs::create_dir_all(&posts_dir).unwrap();
        for name in posts {
            std::fs::write(posts_dir.join(name), "existing body").unwrap();
        }
        Ok(())
    });
    git
}

#[tokio::test]
async fn happy_path_writes_post_and_opens_pull_request() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    let workspace = expected_workspace(temp.path());

    let generator = online_generator("New Post\n\nBody text.");

    let mut git = cloning_git(&["Post A.md", "Post B.md"]);
    git.expect_create_branch()
        .withf(|_, name| {
            name.starts_with("blog-post-") && name.len() == "blog-post-".len() + 14
        })
        .return_once(|_, _| Ok(()));
    git.expect_stage()
        .withf(|_, pathspec| pathspec == Path::new("posts/New Post.md"))
        .return_once(|_, _| Ok(()));
    git.expect_has_pending_changes().return_once(|_| Ok(true));
    git.expect_commit()
        .withf(|_, identity, message| {
            identity.email == "bot@acme.dev" && message == "Add generated blog post"
        })
        .return_once(|_, _, _| Ok(()));
    git.expect_push()
        .withf(|_, branch, _| branch.starts_with("blog-post-"))
        .return_once(|_, _, _| Ok(()));

    let mut host = MockCodeHost::new();
    host.expect_open_pull_request()
        .withf(|req| {
            req.title == "New Post"
                && req.base_branch == BASE_BRANCH
                && req.head_branch.starts_with("blog-post-")
        })
        .return_once(|_| {
            Ok(PullRequest {
                number: 7,
                url: "https://github.com/acme/blog/pull/7".into(),
            })
        });

    let outcome = publish(
        &config,
        &generator,
        &git,
        &host,
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect("publish should succeed");

    assert_eq!(
        outcome,
        PublishOutcome::PullRequestOpened {
            url: "https://github.com/acme/blog/pull/7".into()
        }
    );

    let written = workspace.join("posts").join("New Post.md");
    assert_eq!(std::fs::read_to_string(written).unwrap(), "Body text.");
}

#[tokio::test]
async fn clean_working_tree_rejects_without_push_or_pull_request() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());

    let generator = online_generator("Post A\n\nexisting body");

    let mut git = cloning_git(&["Post A.md"]);
    git.expect_create_branch().return_once(|_, _| Ok(()));
    git.expect_stage().return_once(|_, _| Ok(()));
    git.expect_has_pending_changes().return_once(|_| Ok(false));
    git.expect_commit().never();
    git.expect_push().never();

    let mut host = MockCodeHost::new();
    host.expect_open_pull_request().never();

    let outcome = publish(
        &config,
        &generator,
        &git,
        &host,
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect("no-op run is a rejection, not a failure");

    assert_eq!(
        outcome,
        PublishOutcome::Rejected {
            reason: "no changes detected".into()
        }
    );
}

#[tokio::test]
async fn unreachable_generator_rejects_before_any_filesystem_mutation() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());

    let mut generator = MockContentGenerator::new();
    generator.expect_probe_connectivity().return_once(|| false);
    generator.expect_send_request().never();

    let mut git = MockGitClient::new();
    git.expect_clone_repo().never();

    let outcome = publish(
        &config,
        &generator,
        &git,
        &MockCodeHost::new(),
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect("unreachable generator is a rejection");

    assert_eq!(
        outcome,
        PublishOutcome::Rejected {
            reason: "generator unreachable".into()
        }
    );
    assert!(
        !expected_workspace(temp.path()).exists(),
        "no workspace may be created before the probe passes"
    );
}

#[tokio::test]
async fn placeholder_token_rejects_before_probe() {
    let temp = tempdir().unwrap();
    let mut config = test_config(temp.path());
    config.repository.token = "<your-token>".into();

    let mut generator = MockContentGenerator::new();
    generator.expect_probe_connectivity().never();

    let outcome = publish(
        &config,
        &generator,
        &MockGitClient::new(),
        &MockCodeHost::new(),
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect("bad config is a rejection");

    assert_eq!(
        outcome,
        PublishOutcome::Rejected {
            reason: "bad config".into()
        }
    );
}

#[tokio::test]
async fn host_validation_error_rejects_with_provider_message() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());

    let generator = online_generator("New Post\n\nBody text.");

    let mut git = cloning_git(&["Post A.md"]);
    git.expect_create_branch().return_once(|_, _| Ok(()));
    git.expect_stage().return_once(|_, _| Ok(()));
    git.expect_has_pending_changes().return_once(|_| Ok(true));
    git.expect_commit().return_once(|_, _, _| Ok(()));
    git.expect_push().return_once(|_, _, _| Ok(()));

    let mut host = MockCodeHost::new();
    host.expect_open_pull_request().return_once(|_| {
        Err(HostError::Validation {
            message: "Validation Failed: A pull request already exists".into(),
        })
    });

    let outcome = publish(
        &config,
        &generator,
        &git,
        &host,
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect("host validation is a rejection");

    assert_eq!(
        outcome,
        PublishOutcome::Rejected {
            reason: "Validation Failed: A pull request already exists".into()
        }
    );
}

#[tokio::test]
async fn host_transport_error_is_fatal() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());

    let generator = online_generator("New Post\n\nBody text.");

    let mut git = cloning_git(&[]);
    git.expect_create_branch().return_once(|_, _| Ok(()));
    git.expect_stage().return_once(|_, _| Ok(()));
    git.expect_has_pending_changes().return_once(|_| Ok(true));
    git.expect_commit().return_once(|_, _, _| Ok(()));
    git.expect_push().return_once(|_, _, _| Ok(()));

    let mut host = MockCodeHost::new();
    host.expect_open_pull_request().return_once(|_| {
        Err(HostError::Status {
            status: 500,
            body: "server error".into(),
        })
    });

    let err = publish(
        &config,
        &generator,
        &git,
        &host,
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect_err("host transport failure must propagate");

    assert!(matches!(err, PublishError::Host(HostError::Status { status: 500, .. })));
}

#[tokio::test]
async fn missing_posts_directory_is_fatal_layout_error() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());

    let generator = online_generator("unused");

    // Clone succeeds but materialises no posts subdirectory.
    let mut git = MockGitClient::new();
    git.expect_clone_repo().returning(|_, target, _| {
        std::fs::create_dir_all(target.join("other")).unwrap();
        Ok(())
    });

    let err = publish(
        &config,
        &generator,
        &git,
        &MockCodeHost::new(),
        &MockSleeper::new(),
        &CancelFlag::new(),
    )
    .await
    .expect_err("missing posts directory must be fatal");

    assert!(matches!(err, PublishError::Layout(_)));
}

#[tokio::test]
async fn clone_failure_surfaces_as_clone_exhausted() {
    let temp = tempdir().unwrap();
    let mut config = test_config(temp.path());
    config.retry = RetryPolicy {
        max_attempts: 2,
        backoff: std::time::Duration::from_secs(5),
    };

    let generator = online_generator("unused");

    let mut git = MockGitClient::new();
    git.expect_clone_repo()
        .times(2)
        .returning(|_, _, _| {
            Err(GitError::Spawn(std::io::Error::new(
                std::io::ErrorKind::Other,
                "network down",
            )))
        });

    let mut sleeper = MockSleeper::new();
    sleeper.expect_sleep().times(1).returning(|_| ());

    let err = publish(
        &config,
        &generator,
        &git,
        &MockCodeHost::new(),
        &sleeper,
        &CancelFlag::new(),
    )
    .await
    .expect_err("exhausted clone must be fatal");

    assert!(matches!(err, PublishError::CloneExhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn cancelled_flag_aborts_the_run() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());

    let mut generator = MockContentGenerator::new();
    generator.expect_probe_connectivity().return_once(|| true);
    generator.expect_send_request().never();

    let mut git = MockGitClient::new();
    git.expect_clone_repo().never();

    let cancel = CancelFlag::new();
    cancel.cancel();

    let err = publish(
        &config,
        &generator,
        &git,
        &MockCodeHost::new(),
        &MockSleeper::new(),
        &cancel,
    )
    .await
    .expect_err("cancellation must propagate");

    assert!(matches!(err, PublishError::Cancelled));
}

#[tokio::test]
async fn list_markdown_posts_recurses_and_strips_extension() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("Post A.md"), "a").unwrap();
    std::fs::create_dir_all(temp.path().join("2024")).unwrap();
    std::fs::write(temp.path().join("2024").join("Post B.md"), "b").unwrap();
    std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

    let mut titles = list_markdown_posts(temp.path()).unwrap();
    titles.sort();
    assert_eq!(titles, vec!["Post A".to_string(), "Post B".to_string()]);
}
