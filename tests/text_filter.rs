//! Tests for the post-enrichment text filter and the "all caught up"
//! sentinel conditions.

use pigeonhole::data::{Row, SubjectType};
use pigeonhole::pipeline::filter::{apply, FilterContext, Filtered};
use regex::Regex;

fn row(repo: &str, title: &str) -> Row {
    Row {
        updated_at: None,
        thread_id: "1".to_string(),
        unread: true,
        has_comments: false,
        repo_full_name: repo.to_string(),
        repo_abbrev: repo.to_string(),
        relative_time: "1h".to_string(),
        subject_type: SubjectType::Issue,
        prerelease: false,
        display: "#1".to_string(),
        number: Some(1),
        reason: "mention".to_string(),
        title: title.to_string(),
        subject_url: None,
    }
}

fn rows(filtered: Filtered) -> Vec<Row> {
    match filtered {
        Filtered::Rows(rows) => rows,
        Filtered::AllCaughtUp => panic!("expected rows, got the sentinel"),
    }
}

#[test]
fn exclude_drops_matching_rows() {
    let input = vec![row("org/noise", "ci failed"), row("org/signal", "review")];
    let exclude = Regex::new("noise").unwrap();

    let out = rows(apply(
        input,
        Some(&exclude),
        None,
        FilterContext::default(),
    ));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].repo_full_name, "org/signal");
}

#[test]
fn include_keeps_only_matching_rows() {
    let input = vec![row("org/a", "alpha"), row("org/b", "beta")];
    let include = Regex::new("alpha").unwrap();

    let out = rows(apply(input, None, Some(&include), FilterContext::default()));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "alpha");
}

#[test]
fn exclude_wins_over_include() {
    // A row matching both patterns must not survive.
    let input = vec![row("org/repo", "alpha beta")];
    let exclude = Regex::new("beta").unwrap();
    let include = Regex::new("alpha").unwrap();

    let out = rows(apply(
        input,
        Some(&exclude),
        Some(&include),
        FilterContext::default(),
    ));
    assert!(out.is_empty());
}

#[test]
fn patterns_match_the_full_machine_line() {
    // The thread id only appears in the leading diagnostic columns.
    let input = vec![row("org/repo", "title")];
    let include = Regex::new("^[0-9-]+ 1 unread").unwrap();

    let out = rows(apply(input, None, Some(&include), FilterContext::default()));
    assert_eq!(out.len(), 1);
}

#[test]
fn sentinel_on_unfiltered_reload_with_nothing_left() {
    let ctx = FilterContext {
        is_reload: true,
        has_query: false,
    };
    assert!(matches!(apply(vec![], None, None, ctx), Filtered::AllCaughtUp));
}

#[test]
fn no_sentinel_on_first_run() {
    let ctx = FilterContext {
        is_reload: false,
        has_query: false,
    };
    let out = rows(apply(vec![], None, None, ctx));
    assert!(out.is_empty());
}

#[test]
fn no_sentinel_when_a_pattern_is_active() {
    let ctx = FilterContext {
        is_reload: true,
        has_query: false,
    };
    let exclude = Regex::new(".*").unwrap();
    let out = rows(apply(
        vec![row("org/repo", "t")],
        Some(&exclude),
        None,
        ctx,
    ));
    assert!(out.is_empty());
}

#[test]
fn no_sentinel_while_a_live_query_is_active() {
    let ctx = FilterContext {
        is_reload: true,
        has_query: true,
    };
    let out = rows(apply(vec![], None, None, ctx));
    assert!(out.is_empty());
}
