use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::util;

/// Marker shown in the unread column.
pub const UNREAD_MARKER: &str = "●";
/// Marker shown for already-read threads.
pub const READ_MARKER: &str = "·";

/// A single notification thread as returned by `GET /notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
    pub unread: bool,
    pub reason: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub subject: Subject,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subject {
    pub title: String,
    pub url: Option<String>,
    pub latest_comment_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: SubjectType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// The closed set of subject kinds a notification can point at.
///
/// Anything GitHub adds later deserializes as `Other` and gets the
/// trailing-number fallback treatment everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SubjectType {
    Commit,
    Issue,
    PullRequest,
    Release,
    Discussion,
    CheckSuite,
    #[serde(other)]
    Other,
}

impl SubjectType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Commit => "Commit",
            Self::Issue => "Issue",
            Self::PullRequest => "PullRequest",
            Self::Release => "Release",
            Self::Discussion => "Discussion",
            Self::CheckSuite => "CheckSuite",
            Self::Other => "Other",
        }
    }

    /// Only issues and pull requests accept comments through the API.
    pub fn supports_comments(&self) -> bool {
        matches!(self, Self::Issue | Self::PullRequest)
    }
}

/// The flattened, fixed-arity projection of a thread used for display,
/// regex filtering, and as the unit passed to every action.
///
/// Every row has the same field arity regardless of subject type, so the
/// serialized forms have stable column positions.
#[derive(Debug, Clone)]
pub struct Row {
    pub updated_at: Option<DateTime<Utc>>,
    pub thread_id: String,
    pub unread: bool,
    pub has_comments: bool,
    pub repo_full_name: String,
    pub repo_abbrev: String,
    pub relative_time: String,
    pub subject_type: SubjectType,
    /// Release resolved as a pre-release; changes the type label only.
    pub prerelease: bool,
    /// Resolved display identifier: "#123", a short SHA, or a release tag.
    pub display: String,
    /// Numeric id where one exists (issues, PRs, discussions).
    pub number: Option<u64>,
    pub reason: String,
    pub title: String,
    pub subject_url: Option<String>,
}

impl Row {
    /// Build a row from a fetched thread plus its resolved display parts.
    pub fn from_thread(
        thread: &Thread,
        display: String,
        number: Option<u64>,
        prerelease: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            updated_at: thread.updated_at,
            thread_id: thread.id.clone(),
            unread: thread.unread,
            has_comments: thread.subject.latest_comment_url.is_some(),
            repo_full_name: thread.repository.full_name.clone(),
            repo_abbrev: util::abbreviate_repo(&thread.repository.full_name),
            relative_time: thread
                .updated_at
                .map(|t| util::relative_time(t, now))
                .unwrap_or_default(),
            subject_type: thread.subject.kind,
            prerelease,
            display,
            number,
            reason: thread.reason.clone(),
            title: thread.subject.title.clone(),
            subject_url: thread.subject.url.clone(),
        }
    }

    /// Type label shown in the table; pre-releases are called out.
    pub fn type_label(&self) -> &'static str {
        if self.prerelease {
            "Pre-release"
        } else {
            self.subject_type.label()
        }
    }

    pub fn unread_marker(&self) -> &'static str {
        if self.unread {
            UNREAD_MARKER
        } else {
            READ_MARKER
        }
    }

    /// Full serialization including the leading diagnostic columns.
    /// This is the form exclude/include patterns are matched against.
    pub fn machine_line(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.updated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
            self.thread_id,
            if self.unread { "unread" } else { "read" },
            if self.has_comments { "+" } else { "-" },
            self.repo_full_name,
            self.display_line(),
        )
    }

    /// Serialization with the leading diagnostic columns stripped; what
    /// static (non-interactive) output prints.
    pub fn display_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.unread_marker(),
            self.relative_time,
            self.repo_abbrev,
            self.type_label(),
            self.display,
            self.reason,
            self.title,
        )
    }

    /// Web URL the browse action opens, derived per subject type.
    pub fn browse_url(&self) -> String {
        let repo = &self.repo_full_name;
        match self.subject_type {
            SubjectType::Issue => match self.number {
                Some(n) => format!("https://github.com/{}/issues/{}", repo, n),
                None => format!("https://github.com/{}/issues", repo),
            },
            SubjectType::PullRequest => match self.number {
                Some(n) => format!("https://github.com/{}/pull/{}", repo, n),
                None => format!("https://github.com/{}/pulls", repo),
            },
            SubjectType::Discussion => match self.number {
                Some(n) => format!("https://github.com/{}/discussions/{}", repo, n),
                None => format!("https://github.com/{}/discussions", repo),
            },
            SubjectType::Commit => format!("https://github.com/{}/commit/{}", repo, self.display),
            SubjectType::Release => {
                format!("https://github.com/{}/releases/tag/{}", repo, self.display)
            }
            SubjectType::CheckSuite => format!("https://github.com/{}/actions", repo),
            SubjectType::Other => format!("https://github.com/{}", repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(kind: SubjectType) -> Row {
        Row {
            updated_at: None,
            thread_id: "42".to_string(),
            unread: true,
            has_comments: false,
            repo_full_name: "org/repo".to_string(),
            repo_abbrev: "org/repo".to_string(),
            relative_time: "3h".to_string(),
            subject_type: kind,
            prerelease: false,
            display: "#7".to_string(),
            number: Some(7),
            reason: "mention".to_string(),
            title: "Fix the thing".to_string(),
            subject_url: None,
        }
    }

    #[test]
    fn browse_url_per_type() {
        assert_eq!(
            sample_row(SubjectType::Issue).browse_url(),
            "https://github.com/org/repo/issues/7"
        );
        assert_eq!(
            sample_row(SubjectType::PullRequest).browse_url(),
            "https://github.com/org/repo/pull/7"
        );
        assert_eq!(
            sample_row(SubjectType::CheckSuite).browse_url(),
            "https://github.com/org/repo/actions"
        );
    }

    #[test]
    fn display_line_is_suffix_of_machine_line() {
        let row = sample_row(SubjectType::Issue);
        assert!(row.machine_line().ends_with(&row.display_line()));
    }

    #[test]
    fn prerelease_changes_type_label_only() {
        let mut row = sample_row(SubjectType::Release);
        row.display = "v1.2.0".to_string();
        assert_eq!(row.type_label(), "Release");
        row.prerelease = true;
        assert_eq!(row.type_label(), "Pre-release");
        assert_eq!(
            row.browse_url(),
            "https://github.com/org/repo/releases/tag/v1.2.0"
        );
    }
}
