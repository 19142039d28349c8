//! Pure predicate and sort composition over catalog lists.
//!
//! Everything here is deterministic and side-effect-free: the clock is an
//! explicit parameter and sorts operate on copies, so the engine is testable
//! without a render layer or a network.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Project, Session};

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;

/// Half-open byte-size ranges. Together the buckets partition all
/// non-negative sizes with no gaps or overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeBucket {
    /// Below 10 KiB.
    #[serde(rename = "<10KB")]
    Under10Kb,
    /// 10 KiB up to (excluding) 100 KiB.
    #[serde(rename = "10-100KB")]
    TenTo100Kb,
    /// 100 KiB up to (excluding) 1 MiB.
    #[serde(rename = "100KB-1MB")]
    HundredKbTo1Mb,
    /// 1 MiB and above.
    #[serde(rename = ">1MB")]
    Over1Mb,
}

impl SizeBucket {
    /// Whether a byte size falls in this bucket.
    #[must_use]
    pub fn contains(self, size: u64) -> bool {
        match self {
            Self::Under10Kb => size < 10 * KIB,
            Self::TenTo100Kb => (10 * KIB..100 * KIB).contains(&size),
            Self::HundredKbTo1Mb => (100 * KIB..MIB).contains(&size),
            Self::Over1Mb => size >= MIB,
        }
    }

    /// The unique bucket containing a byte size.
    #[must_use]
    pub fn for_size(size: u64) -> Self {
        [
            Self::Under10Kb,
            Self::TenTo100Kb,
            Self::HundredKbTo1Mb,
            Self::Over1Mb,
        ]
        .into_iter()
        .find(|bucket| bucket.contains(size))
        .expect("size buckets partition all sizes")
    }
}

/// Activity-recency buckets evaluated against a session's last activity
/// (last timestamp, falling back to first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBucket {
    /// Since midnight.
    Today,
    /// Since the start of the week (Sunday).
    Week,
    /// Since the first of the month.
    Month,
    /// Strictly before the start of the month. A session with no timestamp
    /// at all matches only this bucket.
    Older,
}

impl DateBucket {
    /// Whether a last-activity timestamp falls in this bucket at time `now`.
    #[must_use]
    pub fn contains(self, activity: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(ts) = activity else {
            return self == Self::Older;
        };

        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();
        let start_of_week =
            start_of_day - chrono::Duration::days(i64::from(now.weekday().num_days_from_sunday()));
        let start_of_month = now
            .date_naive()
            .with_day(1)
            .expect("day 1 is valid for every month")
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();

        match self {
            Self::Today => ts >= start_of_day,
            Self::Week => ts >= start_of_week,
            Self::Month => ts >= start_of_month,
            Self::Older => ts < start_of_month,
        }
    }
}

/// Session list orderings. All sorts are stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recent last timestamp first; missing sorts as epoch.
    #[default]
    Newest,
    /// Oldest last timestamp first; missing sorts as epoch.
    Oldest,
    /// Largest byte size first.
    Largest,
    /// Most messages first.
    Messages,
}

/// The session list's combined filter and sort state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilters {
    /// Size bucket, `None` for all sizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeBucket>,
    /// Date bucket, `None` for all dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateBucket>,
    /// Active ordering.
    #[serde(default)]
    pub sort: SortKey,
}

/// Filter projects by case-insensitive substring query and exact tag
/// membership, combined with logical AND. An empty query matches all; the
/// query matches against name, custom name, and each tag.
#[must_use]
pub fn filter_projects(
    projects: &[Project],
    text_query: &str,
    active_tag: Option<&str>,
) -> Vec<Project> {
    let query = text_query.trim().to_lowercase();

    projects
        .iter()
        .filter(|p| query.is_empty() || project_matches_query(p, &query))
        .filter(|p| active_tag.is_none_or(|tag| p.has_tag(tag)))
        .cloned()
        .collect()
}

fn project_matches_query(project: &Project, lowercase_query: &str) -> bool {
    project.name.to_lowercase().contains(lowercase_query)
        || project
            .custom_name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(lowercase_query))
        || project
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(lowercase_query))
}

/// Filter and sort sessions. Operates on a copy; the input order is used as
/// the tie-break because the sort is stable.
#[must_use]
pub fn filter_sessions(
    sessions: &[Session],
    filters: &SessionFilters,
    now: DateTime<Utc>,
) -> Vec<Session> {
    let mut filtered: Vec<Session> = sessions
        .iter()
        .filter(|s| filters.size.is_none_or(|bucket| bucket.contains(s.size)))
        .filter(|s| {
            filters
                .date
                .is_none_or(|bucket| bucket.contains(s.last_activity(), now))
        })
        .cloned()
        .collect();

    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    match filters.sort {
        SortKey::Newest => {
            filtered.sort_by_key(|s| std::cmp::Reverse(s.last_timestamp.unwrap_or(epoch)));
        }
        SortKey::Oldest => filtered.sort_by_key(|s| s.last_timestamp.unwrap_or(epoch)),
        SortKey::Largest => filtered.sort_by_key(|s| std::cmp::Reverse(s.size)),
        SortKey::Messages => filtered.sort_by_key(|s| std::cmp::Reverse(s.message_count)),
    }

    filtered
}
