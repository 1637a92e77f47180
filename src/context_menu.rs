use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FileEntry;

/// Item picked from the native context menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextMenuAction {
    Open,
    Cut,
    Copy,
    Paste,
    NewFolder,
    Rename,
    Delete,
    OpenTerminal,
    Properties,
}

impl ContextMenuAction {
    pub const ALL: [ContextMenuAction; 9] = [
        ContextMenuAction::Open,
        ContextMenuAction::Cut,
        ContextMenuAction::Copy,
        ContextMenuAction::Paste,
        ContextMenuAction::NewFolder,
        ContextMenuAction::Rename,
        ContextMenuAction::Delete,
        ContextMenuAction::OpenTerminal,
        ContextMenuAction::Properties,
    ];

    /// Identifier the native menu reports back.
    pub fn id(&self) -> &'static str {
        match self {
            ContextMenuAction::Open => "open",
            ContextMenuAction::Cut => "cut",
            ContextMenuAction::Copy => "copy",
            ContextMenuAction::Paste => "paste",
            ContextMenuAction::NewFolder => "new_folder",
            ContextMenuAction::Rename => "rename",
            ContextMenuAction::Delete => "delete",
            ContextMenuAction::OpenTerminal => "open_terminal",
            ContextMenuAction::Properties => "properties",
        }
    }

    /// Ignored when the menu was opened on the background.
    pub fn needs_target(&self) -> bool {
        !matches!(
            self,
            ContextMenuAction::Paste | ContextMenuAction::NewFolder | ContextMenuAction::OpenTerminal
        )
    }
}

impl fmt::Display for ContextMenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown context menu action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for ContextMenuAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextMenuAction::ALL
            .into_iter()
            .find(|action| action.id() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Payload of a native context-menu request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuRequest {
    pub x: f64,
    pub y: f64,
    pub file_path: Option<String>,
    pub is_file: bool,
    pub has_clipboard: bool,
}

/// Entry the open menu was raised on.
#[derive(Debug, Default)]
pub struct ContextMenuState {
    target: Option<FileEntry>,
}

impl ContextMenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&FileEntry> {
        self.target.as_ref()
    }

    pub fn open_on_entry(&mut self, entry: &FileEntry, x: f64, y: f64, has_clipboard: bool) -> ContextMenuRequest {
        self.target = Some(entry.clone());
        ContextMenuRequest {
            x,
            y,
            file_path: Some(entry.path.clone()),
            is_file: !entry.is_dir,
            has_clipboard,
        }
    }

    pub fn open_on_background(&mut self, x: f64, y: f64, has_clipboard: bool) -> ContextMenuRequest {
        self.target = None;
        ContextMenuRequest { x, y, file_path: None, is_file: false, has_clipboard }
    }
}
