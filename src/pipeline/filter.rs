//! Regex-based row filtering applied after enrichment.

use crate::data::Row;
use regex::Regex;

/// Message shown instead of an empty table when a filter-free reload comes
/// back with nothing left to read.
pub const ALL_CAUGHT_UP: &str = "All caught up!";

/// Explicit pipeline state the sentinel decision needs. Tracked directly
/// rather than inferred from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterContext {
    /// This collection was triggered from inside the interactive loop.
    pub is_reload: bool,
    /// A live interactive query is narrowing the visible set.
    pub has_query: bool,
}

/// Result of applying the text filter.
#[derive(Debug)]
pub enum Filtered {
    Rows(Vec<Row>),
    /// Nothing left and nothing hidden: show the sentinel, not an empty table.
    AllCaughtUp,
}

/// Apply exclude/include patterns over each row's full serialized form.
///
/// A row matching the exclude pattern is dropped even if it also matches
/// the include pattern. The sentinel replaces an empty result only on a
/// reload with no pattern and no live query; otherwise the (possibly
/// empty) matching set is returned as-is.
pub fn apply(
    rows: Vec<Row>,
    exclude: Option<&Regex>,
    include: Option<&Regex>,
    ctx: FilterContext,
) -> Filtered {
    let filtered: Vec<Row> = rows
        .into_iter()
        .filter(|row| {
            let line = row.machine_line();
            if exclude.is_some_and(|re| re.is_match(&line)) {
                return false;
            }
            include.is_none_or(|re| re.is_match(&line))
        })
        .collect();

    if filtered.is_empty()
        && ctx.is_reload
        && !ctx.has_query
        && exclude.is_none()
        && include.is_none()
    {
        Filtered::AllCaughtUp
    } else {
        Filtered::Rows(filtered)
    }
}
