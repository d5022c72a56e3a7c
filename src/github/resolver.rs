//! The resource resolver: computes a human-readable display identifier for
//! each notification subject via per-type lookups and string transforms.

use super::{check_status, graphql, with_headers, HTTP_CLIENT};
use crate::config::Config;
use crate::data::{SubjectType, Thread};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Length of the abbreviated commit hash.
pub const SHORT_SHA_LEN: usize = 7;

/// Outcome of resolving one notification.
///
/// `Skip` is a valid terminal state meaning "exclude this row"; it is not
/// an error and the pipeline drops the thread silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        display: String,
        number: Option<u64>,
        prerelease: bool,
    },
    Skip,
}

impl Resolution {
    fn number(n: u64) -> Self {
        Resolution::Resolved {
            display: format!("#{}", n),
            number: Some(n),
            prerelease: false,
        }
    }
}

/// Resolve a thread's display identifier.
///
/// Release and Discussion lookups tolerate failure by skipping the row,
/// unless `debug` is set, in which case a lookup failure is fatal so
/// resolver bugs are not silently hidden.
pub async fn resolve(config: &Config, thread: &Thread, debug: bool) -> Result<Resolution> {
    match thread.subject.kind {
        SubjectType::Commit => Ok(match thread.subject.url.as_deref().and_then(short_sha) {
            Some(sha) => Resolution::Resolved {
                display: sha,
                number: None,
                prerelease: false,
            },
            None => Resolution::Skip,
        }),
        SubjectType::Release => resolve_release(config, thread, debug).await,
        SubjectType::Discussion => resolve_discussion(config, thread, debug).await,
        _ => Ok(
            match thread.subject.url.as_deref().and_then(trailing_number) {
                Some(n) => Resolution::number(n),
                None => Resolution::Skip,
            },
        ),
    }
}

/// Abbreviated hash from the trailing path segment of a commit subject URL.
pub fn short_sha(subject_url: &str) -> Option<String> {
    let segment = subject_url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.chars().take(SHORT_SHA_LEN).collect())
}

/// Numeric trailing path segment of a subject URL (issues, PRs, and the
/// fallback for unknown types).
pub fn trailing_number(subject_url: &str) -> Option<u64> {
    subject_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

/// Search query for locating a discussion's number. Discussions have no
/// direct ID lookup, so the search is scoped by title, the notification's
/// update month, and the repository.
pub fn discussion_search_query(
    title: &str,
    updated_at: Option<DateTime<Utc>>,
    repo_full_name: &str,
) -> String {
    match updated_at {
        Some(t) => format!(
            "\"{}\" in:title updated:>={} repo:{}",
            title,
            t.format("%Y-%m"),
            repo_full_name
        ),
        None => format!("\"{}\" in:title repo:{}", title, repo_full_name),
    }
}

async fn resolve_release(config: &Config, thread: &Thread, debug: bool) -> Result<Resolution> {
    let Some(url) = &thread.subject.url else {
        return Ok(Resolution::Skip);
    };
    release_resolution(fetch_release(config, url).await, &thread.id, debug)
}

/// Fold a release lookup outcome into a resolution.
///
/// Releases are frequently deleted after their notification is created, so
/// a failed lookup skips the row rather than failing the run; debug mode
/// turns the failure fatal instead.
pub fn release_resolution(
    lookup: Result<(String, bool)>,
    thread_id: &str,
    debug: bool,
) -> Result<Resolution> {
    match lookup {
        Ok((tag, prerelease)) => Ok(Resolution::Resolved {
            display: tag,
            number: None,
            prerelease,
        }),
        Err(e) if debug => {
            Err(e).with_context(|| format!("Failed to resolve release for thread {}", thread_id))
        }
        Err(e) => {
            tracing::debug!("skipping release thread {}: {}", thread_id, e);
            Ok(Resolution::Skip)
        }
    }
}

async fn fetch_release(config: &Config, url: &str) -> Result<(String, bool)> {
    let response = with_headers(HTTP_CLIENT.get(url), &config.token)
        .send()
        .await
        .context("Release lookup failed")?;

    check_status(&response, "release")?;

    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse release response")?;

    let tag = body["tag_name"]
        .as_str()
        .context("Release response has no tag_name")?
        .to_string();
    let prerelease = body["prerelease"].as_bool().unwrap_or(false);
    Ok((tag, prerelease))
}

async fn resolve_discussion(config: &Config, thread: &Thread, debug: bool) -> Result<Resolution> {
    let query = discussion_search_query(
        &thread.subject.title,
        thread.updated_at,
        &thread.repository.full_name,
    );

    discussion_resolution(search_discussion(config, &query).await, &thread.id, debug)
}

/// Fold a discussion search outcome into a resolution, with the same
/// skip-unless-debug treatment as releases.
pub fn discussion_resolution(
    lookup: Result<Option<u64>>,
    thread_id: &str,
    debug: bool,
) -> Result<Resolution> {
    match lookup {
        Ok(Some(n)) => Ok(Resolution::number(n)),
        // No match is a skip, not an error: the coarse time filter can miss.
        Ok(None) => Ok(Resolution::Skip),
        Err(e) if debug => {
            Err(e).with_context(|| format!("Failed to resolve discussion for thread {}", thread_id))
        }
        Err(e) => {
            tracing::debug!("skipping discussion thread {}: {}", thread_id, e);
            Ok(Resolution::Skip)
        }
    }
}

async fn search_discussion(config: &Config, query: &str) -> Result<Option<u64>> {
    let gql = r#"
      query($q: String!) {
        search(query: $q, type: DISCUSSION, first: 1) {
          nodes {
            ... on Discussion {
              number
            }
          }
        }
      }
    "#;

    let body = graphql(&config.token, gql, serde_json::json!({ "q": query })).await?;

    Ok(body["data"]["search"]["nodes"]
        .as_array()
        .and_then(|nodes| nodes.first())
        .and_then(|node| node["number"].as_u64()))
}
