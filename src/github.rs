//! GitHub pull-request API client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::contract::{CodeHost, NewPullRequest, PullRequest};
use crate::error::HostError;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const CLIENT_USER_AGENT: &str = "blog-pilot";

/// [`CodeHost`] implementation for the GitHub REST API, authenticated with
/// the repository owner's token.
pub struct GitHubClient {
    api_base: String,
    owner: String,
    repo: String,
    token: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Point the client at a different API base (test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Serialize)]
struct CreatePullRequestBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Extract the provider's human-readable message from a validation error
/// payload; falls back to the raw body when it is not the expected JSON.
pub fn validation_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            let detail = parsed
                .errors
                .iter()
                .find_map(|e| e.message.as_deref());
            match (parsed.message, detail) {
                (Some(message), Some(detail)) => format!("{message}: {detail}"),
                (Some(message), None) => message,
                (None, Some(detail)) => detail.to_string(),
                (None, None) => body.to_string(),
            }
        }
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn open_pull_request<'a>(
        &self,
        req: NewPullRequest<'a>,
    ) -> Result<PullRequest, HostError> {
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        );
        let body = CreatePullRequestBody {
            title: req.title,
            head: req.head_branch,
            base: req.base_branch,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            return Err(HostError::Validation {
                message: validation_message(&body),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            return Err(HostError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: PullRequestResponse = response
            .json()
            .await
            .map_err(|e| HostError::Malformed(e.to_string()))?;
        info!(
            number = created.number,
            url = %created.html_url,
            head = req.head_branch,
            "Pull request created"
        );
        Ok(PullRequest {
            number: created.number,
            url: created.html_url,
        })
    }
}
