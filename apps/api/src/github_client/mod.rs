/// GitHub client — loads a user's public repositories for the résumé's project list.
///
/// Only the unauthenticated public REST endpoint is used. A token, when
/// configured, raises the rate limit and nothing else.
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::GithubProject;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// How many of the most recently updated repositories an import brings in.
pub const IMPORT_LIMIT: usize = 5;
const USER_AGENT: &str = concat!("resume-api/", env!("CARGO_PKG_VERSION"));

// GitHub logins: alphanumerics and single inner hyphens, at most 39 chars.
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9]|-[A-Za-z0-9]){0,38}$").expect("valid username regex")
});

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    #[error("invalid GitHub username: {0}")]
    InvalidUsername(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: String,
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
}

impl From<RepoPayload> for GithubProject {
    fn from(repo: RepoPayload) -> Self {
        GithubProject {
            id: None,
            name: repo.name,
            description: repo.description.unwrap_or_default().trim().to_string(),
            url: repo.html_url,
            stars: Some(repo.stargazers_count),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn repos_url(&self, username: &str) -> String {
        format!(
            "{}/users/{username}/repos?sort=updated&per_page={IMPORT_LIMIT}",
            self.base_url
        )
    }

    /// The user's most recently updated public repositories, newest first.
    pub async fn fetch_recent_repos(
        &self,
        username: &str,
    ) -> Result<Vec<GithubProject>, GitHubError> {
        let username = username.trim().trim_start_matches('@');
        if !is_valid_username(username) {
            return Err(GitHubError::InvalidUsername(username.to_string()));
        }

        let mut request = self
            .client
            .get(self.repos_url(username))
            .header("accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::UserNotFound(username.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GitHub API returned {status} for {username}");
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let repos: Vec<RepoPayload> = response.json().await?;
        debug!("GitHub returned {} repositories for {username}", repos.len());
        Ok(select_recent(repos))
    }
}

fn select_recent(repos: Vec<RepoPayload>) -> Vec<GithubProject> {
    repos
        .into_iter()
        .take(IMPORT_LIMIT)
        .map(GithubProject::from)
        .collect()
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> RepoPayload {
        RepoPayload {
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/octo/{name}"),
            stargazers_count: 1,
        }
    }

    #[test]
    fn test_payload_maps_to_project() {
        let payload: RepoPayload = serde_json::from_str(
            r#"{"name":"kv","description":" Tiny store ","html_url":"https://github.com/octo/kv","stargazers_count":12,"fork":false}"#,
        )
        .unwrap();
        let project = GithubProject::from(payload);
        assert_eq!(project.name, "kv");
        assert_eq!(project.description, "Tiny store");
        assert_eq!(project.url, "https://github.com/octo/kv");
        assert_eq!(project.stars, Some(12));
        assert!(project.id.is_none());
    }

    #[test]
    fn test_null_description_becomes_empty() {
        let payload: RepoPayload = serde_json::from_str(
            r#"{"name":"x","description":null,"html_url":"u"}"#,
        )
        .unwrap();
        assert_eq!(GithubProject::from(payload).description, "");
    }

    #[test]
    fn test_select_recent_caps_at_limit() {
        let repos = ["a", "b", "c", "d", "e", "f"].into_iter().map(repo).collect();
        let names: Vec<_> = select_recent(repos).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("octocat"));
        assert!(is_valid_username("a-b-c"));
        assert!(!is_valid_username("-leading"));
        assert!(!is_valid_username("double--hyphen"));
        assert!(!is_valid_username("has/slash"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn test_repos_url_trims_trailing_slash() {
        let client = GitHubClient::new("http://localhost:9000/", None);
        assert_eq!(
            client.repos_url("octo"),
            "http://localhost:9000/users/octo/repos?sort=updated&per_page=5"
        );
    }

    #[tokio::test]
    async fn test_invalid_username_short_circuits() {
        let client = GitHubClient::new(DEFAULT_API_URL, None);
        let err = client.fetch_recent_repos("bad name").await.unwrap_err();
        assert!(matches!(err, GitHubError::InvalidUsername(_)));
    }
}
