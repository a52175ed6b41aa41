//! Bounded record of previously current states.

use super::state::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What the stack does when a push would exceed its capacity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackPolicy {
    /// Drop the oldest entry to make room.
    #[default]
    Evict,
    /// Clear the whole stack, then push.
    Flush,
}

/// A state that was current before a successful transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    /// Registry handle of the state.
    pub id: StateId,
    /// Name of the state at the time it was left.
    pub name: String,
    /// When the machine left the state.
    pub left_at: DateTime<Utc>,
}

impl StackEntry {
    pub fn new(id: StateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            left_at: Utc::now(),
        }
    }
}

/// Result of a single push, so the driver can report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// Tracking is disabled or the capacity is zero.
    Skipped,
    /// The entry was appended, possibly after evicting the oldest one.
    Pushed { evicted: Option<StackEntry> },
    /// The stack was full and cleared before the entry was appended.
    Flushed { cleared: Vec<StackEntry> },
}

/// Bounded FIFO history of states.
///
/// The newest entry is at the back. The length never exceeds `capacity`.
///
/// # Example
///
/// ```rust
/// use xtension_fsm::core::{StackPolicy, StateStack};
///
/// let stack = StateStack::new(true, 2, StackPolicy::Evict);
/// assert!(stack.is_empty());
/// assert_eq!(stack.capacity(), 2);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StackRecord")]
pub struct StateStack {
    entries: VecDeque<StackEntry>,
    enabled: bool,
    capacity: usize,
    policy: StackPolicy,
}

/// Serialized form of a [`StateStack`], checked against its capacity on load.
#[derive(Deserialize)]
struct StackRecord {
    entries: VecDeque<StackEntry>,
    enabled: bool,
    capacity: usize,
    policy: StackPolicy,
}

impl From<StackRecord> for StateStack {
    fn from(record: StackRecord) -> Self {
        let mut stack = StateStack::new(record.enabled, record.capacity, record.policy);
        stack.entries = record.entries;
        stack.set_capacity(record.capacity);
        stack
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new(true, 3, StackPolicy::Evict)
    }
}

impl StateStack {
    pub fn new(enabled: bool, capacity: usize, policy: StackPolicy) -> Self {
        Self {
            entries: VecDeque::new(),
            enabled,
            capacity,
            policy,
        }
    }

    /// Record a state that just stopped being current.
    pub fn push(&mut self, entry: StackEntry) -> PushOutcome {
        if !self.enabled || self.capacity == 0 {
            return PushOutcome::Skipped;
        }

        let outcome = if self.entries.len() >= self.capacity {
            match self.policy {
                StackPolicy::Flush => PushOutcome::Flushed {
                    cleared: self.entries.drain(..).collect(),
                },
                StackPolicy::Evict => PushOutcome::Pushed {
                    evicted: self.entries.pop_front(),
                },
            }
        } else {
            PushOutcome::Pushed { evicted: None }
        };

        self.entries.push_back(entry);
        outcome
    }

    /// Most recently pushed entry.
    pub fn last(&self) -> Option<&StackEntry> {
        self.entries.back()
    }

    /// Remove and return the most recently pushed entry.
    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter()
    }

    /// Names from oldest to newest.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
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

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn policy(&self) -> StackPolicy {
        self.policy
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_policy(&mut self, policy: StackPolicy) {
        self.policy = policy;
    }

    /// Change the capacity. Entries above the new limit are dropped, oldest first.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }
}
