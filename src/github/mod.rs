pub mod actions;
pub mod notifications;
pub mod resolver;

use crate::config::{Config, RunOptions};
use crate::data::Thread;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Shared HTTP client for all API requests to enable connection pooling
pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(5)
        .build()
        .expect("Failed to create HTTP client")
});

/// Live GitHub API client; the pipeline talks to it through the
/// [`crate::pipeline::Source`] seam so tests can substitute scripted pages.
#[derive(Clone)]
pub struct GitHubClient {
    pub config: Arc<Config>,
    pub opts: RunOptions,
}

impl GitHubClient {
    pub fn new(config: Arc<Config>, opts: RunOptions) -> Self {
        Self { config, opts }
    }
}

impl crate::pipeline::Source for GitHubClient {
    async fn fetch_page(&self, page: u32, per_page: u8) -> Result<Vec<Thread>> {
        notifications::fetch_page(
            &self.config,
            page,
            per_page,
            self.opts.participating,
            self.opts.include_read,
        )
        .await
    }

    async fn resolve(&self, thread: &Thread) -> Result<resolver::Resolution> {
        resolver::resolve(&self.config, thread, self.opts.debug).await
    }
}

/// Attach the standard GitHub request headers.
pub(crate) fn with_headers(req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
    req.header("Authorization", format!("Bearer {}", token))
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "pigeonhole")
        .header("X-GitHub-Api-Version", "2022-11-28")
}

/// Turn a non-success response into a fatal error, naming the rate-limit
/// reset when the primary limit is exhausted.
pub(crate) fn check_status(response: &reqwest::Response, what: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    if status.as_u16() == 403 || status.as_u16() == 429 {
        if let Some(wait) = rate_limit_reset(response) {
            anyhow::bail!(
                "GitHub API rate limited while fetching {} (resets in {}s)",
                what,
                wait.as_secs()
            );
        }
    }

    anyhow::bail!("GitHub API error for {}: {}", what, status)
}

fn rate_limit_reset(response: &reqwest::Response) -> Option<Duration> {
    let remaining = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    if remaining != Some(0) {
        return None;
    }

    let reset_epoch = response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    let Some(reset_epoch) = reset_epoch else {
        return Some(Duration::from_secs(60));
    };

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()?
        .as_secs();

    let wait = reset_epoch.saturating_sub(now);
    Some(Duration::from_secs(wait.clamp(10, 10 * 60)))
}

/// Post a raw GraphQL query and return the parsed body, failing on
/// transport errors, non-success statuses, or a non-empty errors array.
pub(crate) async fn graphql(
    token: &str,
    query: &str,
    variables: serde_json::Value,
) -> Result<serde_json::Value> {
    let response = with_headers(
        HTTP_CLIENT.post(format!("{}/graphql", GITHUB_API_URL)),
        token,
    )
    .json(&serde_json::json!({"query": query, "variables": variables}))
    .send()
    .await
    .context("GraphQL request failed")?;

    check_status(&response, "graphql")?;

    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse GraphQL response")?;

    if body
        .get("errors")
        .and_then(|e| e.as_array())
        .is_some_and(|errors| !errors.is_empty())
    {
        anyhow::bail!("GraphQL returned errors: {}", body["errors"]);
    }

    Ok(body)
}
