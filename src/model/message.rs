//! Message turns and their parts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::UnknownFields;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human input (or a tool-result acknowledgement turn).
    User,
    /// Model output.
    Assistant,
}

/// One tool invocation inside an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    /// Tool name (e.g. "Bash", "Edit").
    pub name: String,
    /// Structured input object, or a plain string for simple tools.
    #[serde(default)]
    pub input: Value,
}

impl ToolUse {
    /// Input rendered as display text: strings as-is, structures pretty-printed.
    #[must_use]
    pub fn input_text(&self) -> String {
        match &self.input {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }
}

/// Token accounting for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens consumed.
    #[serde(default)]
    pub input_tokens: u64,
    /// Output tokens generated.
    #[serde(default)]
    pub output_tokens: u64,
    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

impl Usage {
    /// Total tokens (input + output).
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the turn.
    pub role: Role,
    /// When the turn was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Visible text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Extended-thinking text, assistant turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Tool invocations, in issue order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_uses: Vec<ToolUse>,
    /// Token accounting, when the log records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Model identifier, assistant turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Working directory at the time of a user turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Git branch at the time of a user turn.
    #[serde(default, rename = "gitBranch", skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

impl Message {
    /// Create a bare message with the given role.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            timestamp: None,
            content: None,
            thinking: None,
            tool_uses: Vec::new(),
            usage: None,
            model: None,
            cwd: None,
            git_branch: None,
            extra: UnknownFields::new(),
        }
    }

    /// Whether the turn carries non-blank visible text.
    #[must_use]
    pub fn has_visible_text(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// Whether the turn invokes any tools.
    #[must_use]
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses.is_empty()
    }

    /// A protocol-only acknowledgement turn: a user message carrying
    /// neither visible text nor tool invocations. Dropped at normalization.
    #[must_use]
    pub fn is_protocol_ack(&self) -> bool {
        self.role == Role::User && !self.has_visible_text() && !self.has_tool_uses()
    }
}
