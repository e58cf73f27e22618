//! Bounded conversation state
//!
//! [`ConversationState`] is an ordered, size-bounded log of
//! [`ConversationEntry`] values. After every append `len() <= capacity()`.
//!
//! # Eviction
//!
//! 1. Exactly one entry leaves per step: the oldest non-`system` one.
//! 2. Only when nothing but `system` entries remain is the oldest `system`
//!    entry evicted.
//!
//! The retained entries are always the most recent ones. A `tool` entry may
//! outlive the `assistant` request it answers; completion adapters render
//! such entries without the request.

use super::entities::ConversationEntry;

/// Default window size when none is configured
pub const DEFAULT_CAPACITY: usize = 30;

/// Ordered, size-bounded conversation log owned by one session
#[derive(Debug, Clone)]
pub struct ConversationState {
    entries: Vec<ConversationEntry>,
    capacity: usize,
}

impl ConversationState {
    /// Create an empty state. A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Create a state that starts with a system instruction
    pub fn with_system_prompt(capacity: usize, system_prompt: impl Into<String>) -> Self {
        let mut state = Self::new(capacity);
        state.append(ConversationEntry::system(system_prompt));
        state
    }

    /// Append an entry, then evict until the capacity invariant holds.
    pub fn append(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
        self.enforce_capacity();
    }

    /// Current ordered entries; read-only.
    pub fn window(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Clear every non-system entry.
    pub fn reset(&mut self) {
        self.entries.retain(ConversationEntry::is_system);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn system_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_system()).count()
    }

    /// Number of entries associated with tool calls
    pub fn tool_call_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_tool_calls()).count()
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    fn enforce_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            let idx = self
                .entries
                .iter()
                .position(|e| !e.is_system())
                .unwrap_or(0);
            self.entries.remove(idx);
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::entities::Role;
    use crate::tool::entities::ToolCall;

    fn contents(state: &ConversationState) -> Vec<&str> {
        state.window().iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_bounded_history_keeps_most_recent() {
        let capacity = 5;
        let mut state = ConversationState::new(capacity);

        for i in 0..23usize {
            state.append(ConversationEntry::user(format!("m{}", i)));
            assert!(state.len() <= capacity);

            let expected: Vec<String> = (i.saturating_sub(capacity - 1)..=i)
                .map(|j| format!("m{}", j))
                .collect();
            assert_eq!(contents(&state), expected);
        }
    }

    #[test]
    fn test_system_entries_are_exempt() {
        let mut state = ConversationState::with_system_prompt(3, "rules");
        for i in 0..6 {
            state.append(ConversationEntry::user(format!("m{}", i)));
        }

        assert_eq!(state.len(), 3);
        assert_eq!(contents(&state), vec!["rules", "m4", "m5"]);
        assert!(state.window()[0].is_system());
    }

    #[test]
    fn test_system_overflow_evicts_oldest_system() {
        let mut state = ConversationState::new(2);
        state.append(ConversationEntry::system("s1"));
        state.append(ConversationEntry::system("s2"));
        state.append(ConversationEntry::system("s3"));

        assert_eq!(contents(&state), vec!["s2", "s3"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut state = ConversationState::new(0);
        state.append(ConversationEntry::user("a"));
        state.append(ConversationEntry::user("b"));
        assert_eq!(state.capacity(), 1);
        assert_eq!(contents(&state), vec!["b"]);
    }

    #[test]
    fn test_eviction_removes_one_entry_at_a_time() {
        let mut state = ConversationState::new(4);
        state.append(ConversationEntry::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "a_x"), ToolCall::new("c2", "a_y")],
        ));
        state.append(ConversationEntry::tool("c1", "r1"));
        state.append(ConversationEntry::tool("c2", "r2"));
        state.append(ConversationEntry::assistant("done"));

        state.append(ConversationEntry::user("next"));

        assert_eq!(contents(&state), vec!["r1", "r2", "done", "next"]);
    }

    #[test]
    fn test_turn_larger_than_window_keeps_newest_results() {
        let mut state = ConversationState::new(3);
        state.append(ConversationEntry::user("q"));
        state.append(ConversationEntry::assistant_with_tool_calls(
            "",
            vec![
                ToolCall::new("c1", "a_x"),
                ToolCall::new("c2", "a_x"),
                ToolCall::new("c3", "a_x"),
            ],
        ));
        for id in ["c1", "c2", "c3"] {
            state.append(ConversationEntry::tool(id, format!("r-{}", id)));
            assert_eq!(state.last().unwrap().tool_call_id.as_deref(), Some(id));
        }

        assert_eq!(contents(&state), vec!["r-c1", "r-c2", "r-c3"]);
        assert!(state.window().iter().all(|e| e.role == Role::Tool));
    }

    #[test]
    fn test_reset_keeps_system_entries() {
        let mut state = ConversationState::with_system_prompt(10, "rules");
        state.append(ConversationEntry::user("hello"));
        state.append(ConversationEntry::assistant("hi"));

        state.reset();

        assert_eq!(state.len(), 1);
        assert_eq!(state.system_count(), 1);
        assert_eq!(contents(&state), vec!["rules"]);
    }

    #[test]
    fn test_tool_call_count() {
        let mut state = ConversationState::new(10);
        state.append(ConversationEntry::user("q"));
        state.append(ConversationEntry::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "a_x")],
        ));
        state.append(ConversationEntry::tool("c1", "r1"));
        state.append(ConversationEntry::assistant("answer"));

        assert_eq!(state.tool_call_count(), 2);
        assert_eq!(state.last().unwrap().content, "answer");
    }
}
