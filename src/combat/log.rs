//! Bounded combat log
//!
//! Rendered by the UI; the oldest entry is evicted once capacity is reached.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::combat::constants::LOG_CAPACITY;

/// Category of a log line, used by the UI for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    System,
    PlayerAttack,
    EnemyAttack,
    Dodge,
    Critical,
    Boss,
    Reward,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Combat time when the entry was written
    pub at: Duration,
    pub kind: LogKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLog {
    entries: VecDeque<CombatLogEntry>,
    capacity: usize,
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl CombatLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, at: Duration, kind: LogKind, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(CombatLogEntry {
            at,
            kind,
            message: message.into(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &CombatLogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&CombatLogEntry> {
        self.entries.back()
    }

    pub fn count(&self, kind: LogKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}
