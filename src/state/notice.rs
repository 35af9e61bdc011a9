//! Operator-facing notifications
//!
//! Every caught failure ends up here instead of leaving its handler.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

/// Bounded list of notices, newest first
#[derive(Debug)]
pub struct NoticeBoard {
    entries: VecDeque<Notice>,
    capacity: usize,
    next_id: u64,
}

impl NoticeBoard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message.into());
    }

    pub fn error(&mut self, error: &dyn std::error::Error) {
        self.push(NoticeLevel::Error, error.to_string());
    }

    fn push(&mut self, level: NoticeLevel, message: String) {
        self.next_id += 1;
        self.entries.push_front(Notice {
            id: self.next_id,
            level,
            message,
            at: Local::now(),
        });
        self.entries.truncate(self.capacity);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
