use iced::widget::image::Handle;
use std::collections::{HashMap, HashSet};

use crate::error::ThumbnailError;

#[derive(Debug, Clone)]
pub enum ThumbnailState {
    Pending,
    Ready(Handle),
    Failed,
}

/// In-memory thumbnails keyed by keyframe path
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    entries: HashMap<String, ThumbnailState>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every unknown path as pending and return those paths, each once.
    /// Paths already pending, ready or failed are skipped.
    pub fn claim_missing<'a, I>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut claimed = Vec::new();
        for path in paths {
            if !self.entries.contains_key(path) {
                self.entries.insert(path.to_string(), ThumbnailState::Pending);
                claimed.push(path.to_string());
            }
        }
        claimed
    }

    pub fn complete(&mut self, path: String, result: Result<Handle, ThumbnailError>) {
        let state = match result {
            Ok(handle) => ThumbnailState::Ready(handle),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "Thumbnail failed");
                ThumbnailState::Failed
            }
        };
        self.entries.insert(path, state);
    }

    pub fn get(&self, path: &str) -> Option<&Handle> {
        match self.entries.get(path) {
            Some(ThumbnailState::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn state(&self, path: &str) -> Option<&ThumbnailState> {
        self.entries.get(path)
    }

    /// Drop settled entries for keyframes no longer referenced. Pending
    /// entries stay so their answers still land.
    pub fn retain_paths<'a, I>(&mut self, keep: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = keep.into_iter().collect();
        let before = self.entries.len();
        self.entries.retain(|path, state| {
            matches!(state, ThumbnailState::Pending) || keep.contains(path.as_str())
        });
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = self.entries.len(), "Pruned thumbnails");
        }
    }

    /// Forget failures so the next claim retries them
    pub fn clear_failed(&mut self) {
        self.entries
            .retain(|_, state| !matches!(state, ThumbnailState::Failed));
    }
}
