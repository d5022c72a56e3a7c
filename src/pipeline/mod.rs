//! The enrichment pipeline: drives the page fetcher until the requested
//! count is satisfied or the source is exhausted, resolving each thread
//! into a display row along the way.

pub mod filter;

pub use filter::{FilterContext, Filtered};

use crate::data::{Row, Thread};
use crate::github::notifications::MAX_PAGE_SIZE;
use crate::github::resolver::Resolution;
use anyhow::Result;
use chrono::Utc;

/// The seam between the pipeline and the remote API. The live
/// implementation is [`crate::github::GitHubClient`]; tests inject a
/// source with scripted pages.
#[allow(async_fn_in_trait)]
pub trait Source {
    async fn fetch_page(&self, page: u32, per_page: u8) -> Result<Vec<Thread>>;
    async fn resolve(&self, thread: &Thread) -> Result<Resolution>;
}

/// Collect up to `requested` notifications (pre-skip) into ordered rows.
///
/// `None` or `Some(0)` means unbounded: fetch until the source runs dry.
/// Rows keep the remote API's order within and across pages; resolver
/// skips reduce the row count but never re-order what remains. A fetch or
/// resolver failure aborts the whole collection.
pub async fn collect<S: Source>(source: &S, requested: Option<usize>) -> Result<Vec<Row>> {
    let bound = requested.filter(|n| *n > 0);
    let now = Utc::now();

    let mut rows = Vec::new();
    let mut fetched = 0usize;
    let mut page: u32 = 1;

    loop {
        let per_page = match bound {
            Some(n) => (n - fetched).min(MAX_PAGE_SIZE as usize) as u8,
            None => MAX_PAGE_SIZE,
        };

        let mut threads = source.fetch_page(page, per_page).await?;
        if threads.is_empty() {
            break;
        }

        // The server cannot always honor an arbitrarily small page size;
        // trim to the remainder so already-seen records are not re-counted.
        if bound.is_some() && per_page < MAX_PAGE_SIZE {
            threads.truncate(per_page as usize);
        }

        let got = threads.len();
        fetched += got;

        for thread in &threads {
            match source.resolve(thread).await? {
                Resolution::Resolved {
                    display,
                    number,
                    prerelease,
                } => rows.push(Row::from_thread(thread, display, number, prerelease, now)),
                Resolution::Skip => {}
            }
        }

        if got < per_page as usize {
            // Short page: the source is exhausted.
            break;
        }
        if bound.is_some_and(|n| fetched >= n) {
            break;
        }
        page += 1;
    }

    tracing::debug!("collected {} rows from {} fetched threads", rows.len(), fetched);
    Ok(rows)
}
