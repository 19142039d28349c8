//! Bounded-batch pagination over a conversation's message list.
//!
//! The pager is a resumable lazy sequence: the scheduling trigger (scroll
//! proximity, a "load more" button) lives in the adapter; the core only
//! exposes an explicit next-batch operation. The rendered prefix is
//! monotonically non-decreasing until the conversation changes.

use std::ops::Range;

use crate::model::{Message, Role};

/// Pagination lifecycle for one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerPhase {
    /// No batches rendered yet.
    Pending,
    /// Some, but not all, messages rendered.
    Rendering,
    /// Every message rendered. Terminal for this conversation.
    Exhausted,
}

/// Paginates a message list into fixed-size batches, in stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePager {
    total: usize,
    rendered: usize,
    batch_size: usize,
}

impl MessagePager {
    /// Create a pager over `total` messages. A zero batch size is clamped
    /// to one so a trigger always makes progress.
    #[must_use]
    pub fn new(total: usize, batch_size: usize) -> Self {
        Self {
            total,
            rendered: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PagerPhase {
        if self.rendered >= self.total {
            PagerPhase::Exhausted
        } else if self.rendered == 0 {
            PagerPhase::Pending
        } else {
            PagerPhase::Rendering
        }
    }

    /// Messages rendered so far (a prefix of the stored order).
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// Total messages in the conversation.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Messages not yet rendered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total - self.rendered
    }

    /// Advance by one batch: the next contiguous index range of at most
    /// `batch_size` messages, or `None` once exhausted.
    pub fn next_batch(&mut self) -> Option<Range<usize>> {
        if self.rendered >= self.total {
            return None;
        }
        let start = self.rendered;
        let end = (start + self.batch_size).min(self.total);
        self.rendered = end;
        Some(start..end)
    }
}

/// Which message kinds to show. An empty set shows everything; an active
/// set shows the union of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleFilter {
    /// User turns.
    User,
    /// Assistant turns.
    Assistant,
    /// Turns that invoke tools.
    Tools,
}

/// The presentational role/type filter's data side. Survives pagination:
/// the controller re-applies it to the rendered prefix after every batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFilterSet {
    user: bool,
    assistant: bool,
    tools: bool,
}

impl RoleFilterSet {
    /// Flip one filter on or off.
    pub fn toggle(&mut self, filter: RoleFilter) {
        match filter {
            RoleFilter::User => self.user = !self.user,
            RoleFilter::Assistant => self.assistant = !self.assistant,
            RoleFilter::Tools => self.tools = !self.tools,
        }
    }

    /// Whether a filter is active.
    #[must_use]
    pub fn is_active(&self, filter: RoleFilter) -> bool {
        match filter {
            RoleFilter::User => self.user,
            RoleFilter::Assistant => self.assistant,
            RoleFilter::Tools => self.tools,
        }
    }

    /// No filters active (everything shows).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.user || self.assistant || self.tools)
    }

    /// Deactivate all filters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether a message passes the filter.
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        if self.is_empty() {
            return true;
        }
        (self.user && message.role == Role::User)
            || (self.assistant && message.role == Role::Assistant)
            || (self.tools && message.has_tool_uses())
    }

    /// Indices of the visible messages within the rendered prefix.
    #[must_use]
    pub fn visible_indices(&self, messages: &[Message], rendered: usize) -> Vec<usize> {
        messages
            .iter()
            .take(rendered)
            .enumerate()
            .filter(|(_, m)| self.matches(m))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolUse;

    #[test]
    fn test_phase_transitions() {
        let mut pager = MessagePager::new(120, 50);
        assert_eq!(pager.phase(), PagerPhase::Pending);

        assert_eq!(pager.next_batch(), Some(0..50));
        assert_eq!(pager.phase(), PagerPhase::Rendering);

        assert_eq!(pager.next_batch(), Some(50..100));
        assert_eq!(pager.phase(), PagerPhase::Rendering);

        // Final batch is smaller than batch_size
        assert_eq!(pager.next_batch(), Some(100..120));
        assert_eq!(pager.phase(), PagerPhase::Exhausted);

        // Exhausted is terminal: further triggers do nothing
        assert_eq!(pager.next_batch(), None);
        assert_eq!(pager.phase(), PagerPhase::Exhausted);
        assert_eq!(pager.rendered(), 120);
    }

    #[test]
    fn test_batches_never_exceed_batch_size_and_converge() {
        let mut pager = MessagePager::new(237, 50);
        let mut covered = Vec::new();
        while let Some(batch) = pager.next_batch() {
            assert!(batch.len() <= 50);
            covered.extend(batch);
        }
        // Every index exactly once, in stored order
        assert_eq!(covered, (0..237).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_conversation_is_immediately_exhausted() {
        let mut pager = MessagePager::new(0, 50);
        assert_eq!(pager.phase(), PagerPhase::Exhausted);
        assert_eq!(pager.next_batch(), None);
    }

    #[test]
    fn test_zero_batch_size_still_progresses() {
        let mut pager = MessagePager::new(2, 0);
        assert_eq!(pager.next_batch(), Some(0..1));
        assert_eq!(pager.next_batch(), Some(1..2));
        assert_eq!(pager.next_batch(), None);
    }

    fn sample_messages() -> Vec<Message> {
        let mut user = Message::new(Role::User);
        user.content = Some("question".to_string());

        let mut assistant = Message::new(Role::Assistant);
        assistant.content = Some("answer".to_string());

        let mut with_tools = Message::new(Role::Assistant);
        with_tools.tool_uses.push(ToolUse {
            name: "Bash".to_string(),
            input: serde_json::json!("ls"),
        });

        vec![user, assistant, with_tools]
    }

    #[test]
    fn test_empty_filter_shows_everything() {
        let messages = sample_messages();
        let filters = RoleFilterSet::default();
        assert_eq!(filters.visible_indices(&messages, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_filters_union() {
        let messages = sample_messages();
        let mut filters = RoleFilterSet::default();

        filters.toggle(RoleFilter::User);
        assert_eq!(filters.visible_indices(&messages, 3), vec![0]);

        filters.toggle(RoleFilter::Tools);
        assert_eq!(filters.visible_indices(&messages, 3), vec![0, 2]);

        // Toggling off restores
        filters.toggle(RoleFilter::User);
        filters.toggle(RoleFilter::Tools);
        assert!(filters.is_empty());
        assert_eq!(filters.visible_indices(&messages, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_filter_respects_rendered_prefix() {
        let messages = sample_messages();
        let filters = RoleFilterSet::default();
        // Only the rendered prefix is considered, pagination order preserved
        assert_eq!(filters.visible_indices(&messages, 2), vec![0, 1]);
    }
}
