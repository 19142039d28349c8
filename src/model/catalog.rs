//! Catalog records: sources, projects, sessions, search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A selectable logical backend (e.g. a distinct CLI tool log store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Stable source identifier (e.g. "claude-code").
    pub id: String,
    /// Display name (e.g. "Claude Code").
    pub name: String,
    /// Whether the backing store exists and can be browsed.
    #[serde(default)]
    pub available: bool,
}

/// The source list together with the backend's current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCatalog {
    /// All known sources, available or not.
    pub sources: Vec<SourceInfo>,
    /// The source the backend considers current.
    pub current: String,
}

/// A named grouping of sessions within a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable project identifier.
    pub id: String,
    /// Derived display name (e.g. decoded path).
    pub name: String,
    /// User-assigned name, overrides `name` for display when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// User-assigned labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Number of sessions recorded under this project.
    #[serde(default)]
    pub session_count: usize,
}

impl Project {
    /// The name shown in lists: custom name when set and non-empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.custom_name.as_deref() {
            Some(custom) if !custom.is_empty() => custom,
            _ => &self.name,
        }
    }

    /// Exact tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Summary metadata for one recorded conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable session identifier.
    pub id: String,
    /// First summary line, or a fallback derived from the first user turn.
    #[serde(default)]
    pub summary: String,
    /// Number of user/assistant turns.
    #[serde(default)]
    pub message_count: usize,
    /// Log size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Timestamp of the first recorded entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<DateTime<Utc>>,
    /// Timestamp of the last recorded entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,
    /// Number of sub-agent sessions spawned from this one.
    #[serde(default)]
    pub subagent_count: usize,
}

impl Session {
    /// Last activity: last timestamp, falling back to the first.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp.or(self.first_timestamp)
    }
}

/// One hit from a free-text search, enough to navigate to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Project the hit belongs to.
    pub project_id: String,
    /// Session the hit belongs to.
    pub session_id: String,
    /// Label shown for the session (usually the session id).
    pub session_label: String,
    /// Display name of the project.
    pub project_name: String,
}

/// Last-sync state reported by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// When the source last synced, if it ever has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Partial update of a project's user-assigned metadata.
///
/// `None` fields are left untouched by the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetaUpdate {
    /// New custom name; empty string clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// Replacement tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
