//! The fully loaded message sequence for a session.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// Full message sequence plus context-management summaries for one session.
///
/// Immutable once cached: a resync clears the cache wholesale rather than
/// patching entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Session this conversation belongs to.
    pub session_id: String,
    /// Context-management summary lines, in log order.
    #[serde(default)]
    pub summaries: Vec<String>,
    /// All turns, in log order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Drop protocol-only acknowledgement turns (user messages with neither
    /// visible text nor tool invocations). Presentation-data cleanup, not a
    /// transport concern; applying it twice has no further effect.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.messages.retain(|m| !m.is_protocol_ack());
        self
    }

    /// Total tokens across all turns that record usage.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.messages
            .iter()
            .filter_map(|m| m.usage.as_ref())
            .map(|u| u.total_tokens())
            .sum()
    }
}
