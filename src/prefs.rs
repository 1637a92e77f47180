use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::{SortBy, SortOrder, ViewMode};

/// View settings remembered for one folder. Unset fields fall back to the global ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderPref {
    pub view_mode: Option<ViewMode>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

impl FolderPref {
    fn merge(&mut self, other: FolderPref) {
        self.view_mode = other.view_mode.or(self.view_mode);
        self.sort_by = other.sort_by.or(self.sort_by);
        self.sort_order = other.sort_order.or(self.sort_order);
    }
}

/// Per-folder preferences for the lifetime of the process.
#[derive(Debug, Default)]
pub struct FolderPrefs {
    prefs: Mutex<HashMap<String, FolderPref>>,
}

/// `C:\Users\` and `c:\users` name the same folder.
pub fn normalize_key(path: &str) -> String {
    path.trim_end_matches(['\\', '/']).to_lowercase()
}

impl FolderPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<FolderPref> {
        let prefs = self.prefs.lock().unwrap_or_else(PoisonError::into_inner);
        prefs.get(&normalize_key(path)).copied()
    }

    pub fn set(&self, path: &str, pref: FolderPref) {
        let mut prefs = self.prefs.lock().unwrap_or_else(PoisonError::into_inner);
        prefs.entry(normalize_key(path)).or_default().merge(pref);
    }

    pub fn set_view_mode(&self, path: &str, view_mode: ViewMode) {
        self.set(path, FolderPref { view_mode: Some(view_mode), ..FolderPref::default() });
    }

    pub fn set_sorting(&self, path: &str, sort_by: SortBy, sort_order: SortOrder) {
        self.set(
            path,
            FolderPref { sort_by: Some(sort_by), sort_order: Some(sort_order), ..FolderPref::default() },
        );
    }
}
