use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::model::{Comment, Post, PostId, User, UserId};

pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one remote lookup.
///
/// `Skipped` is the contract for a missing identifier: no request was made.
/// `Failed` has already been logged by the client.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Fetch<T> {
    Ready(T),
    Skipped,
    Failed(FetchError),
}

impl<T> Fetch<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::Skipped | Fetch::Failed(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Fetch::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Fetch::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    base_url: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("api client user agent required");
        }

        let base = if config.base_url.trim().is_empty() {
            DEFAULT_API_BASE
        } else {
            config.base_url.trim()
        };
        let parsed = Url::parse(base).with_context(|| format!("parse api base url {base:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("api base url must be http or https, got {}", parsed.scheme());
        }

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .build()
                .context("build api HTTP client")?,
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_all_users(&self) -> Fetch<Vec<User>> {
        self.lookup("users", Some("/users".to_string()))
    }

    pub fn fetch_user_posts(&self, user_id: Option<UserId>) -> Fetch<Vec<Post>> {
        self.lookup("user posts", user_id.map(|id| format!("/users/{id}/posts")))
    }

    pub fn fetch_user(&self, user_id: Option<UserId>) -> Fetch<User> {
        self.lookup("user", user_id.map(|id| format!("/users/{id}")))
    }

    pub fn fetch_post_comments(&self, post_id: Option<PostId>) -> Fetch<Vec<Comment>> {
        self.lookup("post comments", post_id.map(|id| format!("/posts/{id}/comments")))
    }

    fn lookup<T: DeserializeOwned>(&self, what: &'static str, path: Option<String>) -> Fetch<T> {
        let Some(path) = path else {
            debug!(lookup = what, "no identifier given, skipping request");
            return Fetch::Skipped;
        };
        match self.get_json(&path) {
            Ok(value) => Fetch::Ready(value),
            Err(err) => {
                warn!(lookup = what, error = %err, "remote lookup failed");
                Fetch::Failed(err)
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| FetchError::Transport {
                url: url.clone(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|err| FetchError::Transport {
            url: url.clone(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            url,
            message: err.to_string(),
        })
    }
}
