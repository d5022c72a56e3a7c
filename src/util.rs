//! Utility functions and helpers.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Send a value through a channel, logging a warning if it fails.
pub async fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) {
    if let Err(e) = tx.send(value).await {
        tracing::warn!("Failed to send {}: {}", context, e);
    }
}

/// Compact relative-time label for the table ("now", "5m", "3h", "2d").
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0..=59 => "now".to_string(),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// Repo paths longer than this get the owner shortened to its initial.
const REPO_WIDTH_LIMIT: usize = 30;

/// Abbreviate "longownername/repo" to "l/repo" when the full path is wide.
pub fn abbreviate_repo(full_name: &str) -> String {
    if full_name.chars().count() <= REPO_WIDTH_LIMIT {
        return full_name.to_string();
    }
    match full_name.split_once('/') {
        Some((owner, name)) => {
            let initial = owner.chars().next().unwrap_or('?');
            format!("{}/{}", initial, name)
        }
        None => full_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_send_or_log_closed_channel() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let (tx, rx) = mpsc::channel::<i32>(1);
            drop(rx);
            // Should not panic, just log
            send_or_log(&tx, 42, "test value").await;
        });
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let cases = [
            (now, "now"),
            (now - chrono::Duration::minutes(5), "5m"),
            (now - chrono::Duration::hours(3), "3h"),
            (now - chrono::Duration::days(2), "2d"),
        ];
        for (then, expected) in cases {
            assert_eq!(relative_time(then, now), expected);
        }
    }

    #[test]
    fn test_abbreviate_repo() {
        assert_eq!(abbreviate_repo("org/repo"), "org/repo");
        assert_eq!(
            abbreviate_repo("some-very-long-organization-name/repo"),
            "s/repo"
        );
    }
}
