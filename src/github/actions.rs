//! The action dispatcher: user-triggered side effects against the API.
//!
//! Bulk mark-read/mark-done is fire-and-forget: calls are spawned in
//! batches of [`BATCH_SIZE`] with [`BATCH_DELAY`] pacing between batches to
//! stay under the secondary rate limit. Individual failures in a batch are
//! logged at debug level and never surfaced; re-marking a thread is
//! idempotent on the server, so the next pass heals any drop.

use super::{check_status, graphql, with_headers, GITHUB_API_URL, HTTP_CLIENT};
use crate::config::Config;
use crate::data::Row;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Maximum number of simultaneous in-flight thread calls.
pub const BATCH_SIZE: usize = 30;

/// Pacing delay between batches.
pub const BATCH_DELAY: Duration = Duration::from_millis(300);

/// Current subscription state of a subscribable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Subscribed,
    Unsubscribed,
    Ignored,
}

impl SubscriptionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Subscribed => "SUBSCRIBED",
            Self::Unsubscribed => "UNSUBSCRIBED",
            Self::Ignored => "IGNORED",
        }
    }
}

/// Thread ids of the unread rows in a selection. Read rows never produce
/// an API call for mark-read or mark-done.
pub fn unread_ids(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter(|r| r.unread)
        .map(|r| r.thread_id.clone())
        .collect()
}

/// Number of batches a bulk dispatch over `n` threads issues.
pub fn batch_count(n: usize) -> usize {
    n.div_ceil(BATCH_SIZE)
}

/// Mark every notification read up to a cutoff timestamp.
///
/// Callers must refuse this when any exclude/include pattern or live query
/// is active, since it would silently affect hidden rows.
pub async fn mark_all_read(config: &Config, cutoff: DateTime<Utc>) -> Result<()> {
    let response = with_headers(
        HTTP_CLIENT.put(format!("{}/notifications", GITHUB_API_URL)),
        &config.token,
    )
    .json(&serde_json::json!({ "last_read_at": cutoff.to_rfc3339(), "read": true }))
    .send()
    .await
    .context("Failed to mark all notifications read")?;

    check_status(&response, "mark all read")
}

/// Mark the unread rows in a selection as read.
pub async fn mark_read(config: &Config, rows: &[Row]) -> Result<()> {
    dispatch_threads(config, rows, false).await
}

/// Remove the unread rows in a selection from the inbox entirely.
pub async fn mark_done(config: &Config, rows: &[Row]) -> Result<()> {
    dispatch_threads(config, rows, true).await
}

async fn dispatch_threads(config: &Config, rows: &[Row], done: bool) -> Result<()> {
    let config = config.clone();
    dispatch_batched(unread_ids(rows), move |id| {
        let config = config.clone();
        async move { thread_call(&config, &id, done).await }
    })
    .await
}

/// Issue one call per thread id.
///
/// A single id is awaited so its failure surfaces; larger selections fan
/// out fire-and-forget in chunks of [`BATCH_SIZE`], with [`BATCH_DELAY`]
/// pacing between chunks (not after the last one).
pub async fn dispatch_batched<F, Fut>(ids: Vec<String>, call: F) -> Result<()>
where
    F: Fn(String) -> Fut,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    match ids.as_slice() {
        [] => Ok(()),
        // A single row gets one awaited call; its failure is real feedback.
        [id] => call(id.clone()).await,
        _ => {
            for (i, chunk) in ids.chunks(BATCH_SIZE).enumerate() {
                if i > 0 {
                    tokio::time::sleep(BATCH_DELAY).await;
                }
                for id in chunk {
                    let fut = call(id.clone());
                    let id = id.clone();
                    tokio::spawn(async move {
                        if let Err(e) = fut.await {
                            tracing::debug!("bulk dispatch for thread {} failed: {}", id, e);
                        }
                    });
                }
            }
            Ok(())
        }
    }
}

async fn thread_call(config: &Config, thread_id: &str, done: bool) -> Result<()> {
    let url = format!("{}/notifications/threads/{}", GITHUB_API_URL, thread_id);
    let request = if done {
        HTTP_CLIENT.delete(&url)
    } else {
        HTTP_CLIENT.patch(&url)
    };

    let response = with_headers(request, &config.token)
        .send()
        .await
        .with_context(|| format!("Thread call for {} failed", thread_id))?;

    check_status(&response, "thread")
}

/// Comments endpoint for a row, refusing subject types that cannot take
/// comments before any API call is made.
pub fn comment_target(row: &Row) -> Result<String> {
    if !row.subject_type.supports_comments() {
        anyhow::bail!(
            "Cannot comment on a {} notification",
            row.subject_type.label()
        );
    }
    let number = row
        .number
        .context("Notification has no resolvable issue number")?;
    Ok(format!(
        "{}/repos/{}/issues/{}/comments",
        GITHUB_API_URL, row.repo_full_name, number
    ))
}

/// Post a comment on the issue or pull request behind a row.
pub async fn comment(config: &Config, row: &Row, body: &str) -> Result<()> {
    let url = comment_target(row)?;
    let response = with_headers(HTTP_CLIENT.post(&url), &config.token)
        .json(&serde_json::json!({ "body": body }))
        .send()
        .await
        .context("Failed to post comment")?;

    check_status(&response, "comment")
}

/// Flip the subscription state of an arbitrary GitHub URL.
///
/// IGNORED counts as unsubscribed for toggling; an unknown or custom state
/// is a hard error rather than something to silently resolve.
pub async fn toggle_subscription(config: &Config, url: &str) -> Result<SubscriptionState> {
    let query = r#"
      query($url: URI!) {
        resource(url: $url) {
          ... on Subscribable {
            id
            viewerCanSubscribe
            viewerSubscription
          }
        }
      }
    "#;

    let body = graphql(&config.token, query, serde_json::json!({ "url": url })).await?;
    let resource = &body["data"]["resource"];

    if resource.is_null() {
        anyhow::bail!("Not a subscribable GitHub URL: {}", url);
    }

    let id = resource["id"]
        .as_str()
        .with_context(|| format!("No subscribable id for {}", url))?;

    if !resource["viewerCanSubscribe"].as_bool().unwrap_or(false) {
        anyhow::bail!("Not allowed to change the subscription for {}", url);
    }

    let new_state = match resource["viewerSubscription"].as_str() {
        Some("SUBSCRIBED") => SubscriptionState::Unsubscribed,
        Some("UNSUBSCRIBED") | Some("IGNORED") => SubscriptionState::Subscribed,
        other => anyhow::bail!("Unexpected subscription state {:?} for {}", other, url),
    };

    let mutation = r#"
      mutation($id: ID!, $state: SubscriptionState!) {
        updateSubscription(input: {subscribableId: $id, state: $state}) {
          subscribable {
            viewerSubscription
          }
        }
      }
    "#;

    graphql(
        &config.token,
        mutation,
        serde_json::json!({ "id": id, "state": new_state.label() }),
    )
    .await
    .with_context(|| format!("Failed to update subscription for {}", url))?;

    Ok(new_state)
}
