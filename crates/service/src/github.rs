//! Outbound lookup of a user's public repositories on GitHub.

use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::ServiceError;

const USER_AGENT: &str = "connector-api";
const REPOS_PER_PAGE: &str = "2";
const REPOS_SORT: &str = "created:asc";

#[derive(Clone, Debug)]
pub struct GithubConfig {
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
    client_id: String,
    client_secret: String,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, ServiceError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ServiceError::Upstream(format!("invalid GitHub API url: {e}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            client_id: config.client_id,
            client_secret: config.client_secret,
        })
    }

    fn repos_url(&self, username: &str) -> Result<Url, ServiceError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::Upstream("GitHub API url cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        Ok(url)
    }

    /// Relays GitHub's JSON unchanged. Any non-200 answer is reported as a
    /// missing GitHub profile.
    pub async fn repos(&self, username: &str) -> Result<serde_json::Value, ServiceError> {
        let url = self.repos_url(username)?;
        debug!(%url, "fetching GitHub repos");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("per_page", REPOS_PER_PAGE),
                ("sort", REPOS_SORT),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, username, "GitHub request failed");
                ServiceError::Upstream(e.to_string())
            })?;

        if response.status() != StatusCode::OK {
            debug!(status = %response.status(), username, "GitHub lookup missed");
            return Err(ServiceError::not_found("No Github profile found"));
        }

        response.json().await.map_err(|e| {
            error!(error = %e, username, "GitHub returned an unreadable body");
            ServiceError::Upstream(e.to_string())
        })
    }
}
