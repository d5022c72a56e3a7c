//! Tests for the pure resolver transforms: commit hashes, trailing
//! numbers, and discussion search query construction.

use anyhow::anyhow;
use chrono::{TimeZone, Utc};
use pigeonhole::github::resolver::{
    discussion_resolution, discussion_search_query, release_resolution, short_sha,
    trailing_number, Resolution, SHORT_SHA_LEN,
};
use pretty_assertions::assert_eq;

#[test]
fn short_sha_takes_fixed_length_prefix() {
    let sha = short_sha("https://api.github.com/repos/org/repo/commits/abcdef1234567890").unwrap();
    assert_eq!(sha, "abcdef1");
    assert_eq!(sha.len(), SHORT_SHA_LEN);
}

#[test]
fn short_sha_tolerates_trailing_slash_and_short_hashes() {
    assert_eq!(
        short_sha("https://api.github.com/repos/o/r/commits/abc/").as_deref(),
        Some("abc")
    );
    assert_eq!(short_sha(""), None);
}

#[test]
fn trailing_number_extracts_the_last_path_segment() {
    assert_eq!(
        trailing_number("https://api.github.com/repos/org/repo/issues/123"),
        Some(123)
    );
    assert_eq!(
        trailing_number("https://api.github.com/repos/org/repo/pulls/7/"),
        Some(7)
    );
}

#[test]
fn trailing_number_rejects_non_numeric_segments() {
    assert_eq!(
        trailing_number("https://api.github.com/repos/org/repo/commits/abcdef"),
        None
    );
}

#[test]
fn discussion_query_scopes_title_month_and_repo() {
    let updated = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
    assert_eq!(
        discussion_search_query("Foo", Some(updated), "org/repo"),
        "\"Foo\" in:title updated:>=2024-03 repo:org/repo"
    );
}

#[test]
fn discussion_query_omits_time_filter_without_a_timestamp() {
    assert_eq!(
        discussion_search_query("Foo", None, "org/repo"),
        "\"Foo\" in:title repo:org/repo"
    );
}

#[test]
fn deleted_release_is_silently_skipped() {
    let lookup = Err(anyhow!("GitHub API error for release: 404 Not Found"));
    assert_eq!(release_resolution(lookup, "42", false).unwrap(), Resolution::Skip);
}

#[test]
fn deleted_release_aborts_the_run_in_debug_mode() {
    let lookup = Err(anyhow!("GitHub API error for release: 404 Not Found"));
    let err = release_resolution(lookup, "42", true).unwrap_err();
    assert!(format!("{:#}", err).contains("thread 42"));
    assert!(format!("{:#}", err).contains("404"));
}

#[test]
fn resolved_release_carries_tag_and_prerelease_flag() {
    let lookup = Ok(("v2.0.0-rc.1".to_string(), true));
    assert_eq!(
        release_resolution(lookup, "42", false).unwrap(),
        Resolution::Resolved {
            display: "v2.0.0-rc.1".to_string(),
            number: None,
            prerelease: true,
        }
    );
}

#[test]
fn discussion_search_miss_is_a_skip_not_an_error() {
    assert_eq!(
        discussion_resolution(Ok(None), "7", false).unwrap(),
        Resolution::Skip
    );
    // Even in debug mode: only lookup failures turn fatal.
    assert_eq!(
        discussion_resolution(Ok(None), "7", true).unwrap(),
        Resolution::Skip
    );
}

#[test]
fn discussion_lookup_failure_skips_unless_debug() {
    assert_eq!(
        discussion_resolution(Err(anyhow!("search timed out")), "7", false).unwrap(),
        Resolution::Skip
    );
    let err = discussion_resolution(Err(anyhow!("search timed out")), "7", true).unwrap_err();
    assert!(format!("{:#}", err).contains("thread 7"));
}

#[test]
fn discussion_match_resolves_to_its_number() {
    assert_eq!(
        discussion_resolution(Ok(Some(123)), "7", false).unwrap(),
        Resolution::Resolved {
            display: "#123".to_string(),
            number: Some(123),
            prerelease: false,
        }
    );
}
