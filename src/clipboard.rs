use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{ClipboardOperation, ClipboardState, FileEntry};

/// Process-wide pending copy/cut batch. Shared across tabs.
#[derive(Debug, Default)]
pub struct Clipboard {
    state: Mutex<Option<ClipboardState>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ClipboardState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn copy(&self, items: Vec<FileEntry>) {
        *self.lock() = Some(ClipboardState { items, operation: ClipboardOperation::Copy });
    }

    pub fn cut(&self, items: Vec<FileEntry>) {
        *self.lock() = Some(ClipboardState { items, operation: ClipboardOperation::Cut });
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn has_items(&self) -> bool {
        self.lock().is_some()
    }

    pub fn snapshot(&self) -> Option<ClipboardState> {
        self.lock().clone()
    }

    /// Clears only if the clipboard still holds `batch`, so a cut made while a paste
    /// was running survives.
    pub(crate) fn clear_if(&self, batch: &ClipboardState) {
        let mut state = self.lock();
        if state.as_ref() == Some(batch) {
            *state = None;
        }
    }
}
