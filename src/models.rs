use std::fmt;

use serde::{Deserialize, Serialize};

/// A file or directory as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: String,
    pub extension: String,
    #[serde(default)]
    pub is_cloud_placeholder: bool,
}

impl FileEntry {
    pub fn file(path: &str, size: u64, modified: &str) -> Self {
        let name = crate::utils::path_title(path);
        let extension = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
            _ => String::new(),
        };
        Self {
            name,
            path: path.to_string(),
            is_dir: false,
            size,
            modified: modified.to_string(),
            extension,
            is_cloud_placeholder: false,
        }
    }

    pub fn dir(path: &str, modified: &str) -> Self {
        Self {
            name: crate::utils::path_title(path),
            path: path.to_string(),
            is_dir: true,
            size: 0,
            modified: modified.to_string(),
            extension: String::new(),
            is_cloud_placeholder: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveInfo {
    pub name: String,
    pub path: String,
    pub total_space: u64,
    pub free_space: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProperties {
    pub created: String,
    pub accessed: String,
    pub modified: String,
    pub readonly: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: TabId,
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Name,
    Date,
    Size,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl SortBy {
    /// Result of clicking the `column` header while sorted by `self`/`order`.
    pub fn toggle(self, order: SortOrder, column: SortBy) -> (SortBy, SortOrder) {
        if self == column {
            (column, order.flipped())
        } else {
            (column, SortOrder::Asc)
        }
    }
}

/// Per-tab view state. The file listing itself lives next to it in the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TabState {
    pub path: String,
    pub title: String,
    pub history: Vec<String>,
    pub history_index: usize,
    /// Insertion order is selection order; the last element is the lead row.
    pub selected_paths: Vec<String>,
    pub last_selected_path: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub search_query: String,
    pub is_searching: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl TabState {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            title: crate::utils::path_title(path),
            history: vec![path.to_string()],
            history_index: 0,
            selected_paths: Vec::new(),
            last_selected_path: None,
            is_loading: false,
            error: None,
            search_query: String::new(),
            is_searching: false,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected_paths.iter().any(|p| p == path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardOperation {
    Copy,
    Cut,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardState {
    pub items: Vec<FileEntry>,
    pub operation: ClipboardOperation,
}

/// Modifier keys held during a click or key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, shift: false, alt: false, meta: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true, shift: false, alt: false, meta: false };
    pub const SHIFT: Modifiers = Modifiers { ctrl: false, shift: true, alt: false, meta: false };
    pub const CTRL_SHIFT: Modifiers = Modifiers { ctrl: true, shift: true, alt: false, meta: false };

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Dialogs the UI has to show before an operation can proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    NewFolder,
    Rename,
    Delete,
}
