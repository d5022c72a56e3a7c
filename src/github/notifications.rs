//! The page fetcher: one page of raw notification threads.

use super::{check_status, with_headers, GITHUB_API_URL, HTTP_CLIENT};
use crate::config::Config;
use crate::data::Thread;
use anyhow::{Context, Result};

/// The largest page size the notifications endpoint accepts.
pub const MAX_PAGE_SIZE: u8 = 50;

/// Fetch a single page of notification threads.
///
/// An empty result signals end-of-data. Any failure here is fatal to the
/// whole pipeline; pages are never retried individually.
pub async fn fetch_page(
    config: &Config,
    page: u32,
    per_page: u8,
    participating: bool,
    include_read: bool,
) -> Result<Vec<Thread>> {
    let response = with_headers(
        HTTP_CLIENT.get(format!("{}/notifications", GITHUB_API_URL)),
        &config.token,
    )
    .query(&[
        ("page", page.to_string()),
        ("per_page", per_page.min(MAX_PAGE_SIZE).to_string()),
        ("participating", participating.to_string()),
        ("all", include_read.to_string()),
    ])
    .send()
    .await
    .context("Failed to fetch notifications")?;

    check_status(&response, "notifications")?;

    let threads: Vec<Thread> = response
        .json()
        .await
        .context("Failed to parse notifications page")?;

    tracing::debug!("fetched page {} ({} threads)", page, threads.len());
    Ok(threads)
}
