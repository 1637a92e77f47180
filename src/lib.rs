//! State core of a tabbed file explorer: tabs with navigation history, multi-selection,
//! a process-wide clipboard and a bounded, deduplicating thumbnail loader.
//!
//! Filesystem access goes through the [`FileService`], [`SystemService`] and
//! [`ThumbnailService`] traits; rendering is left to the host.

pub mod app;
pub mod backend;
pub mod clipboard;
pub mod context_menu;
pub mod error;
pub mod keyboard;
pub mod lru;
pub mod models;
pub mod operations;
pub mod prefs;
pub mod selection;
pub mod settings;
pub mod sort;
pub mod tabs;
pub mod thumbnails;
pub mod utils;
pub mod visibility;

pub use app::Explorer;
pub use backend::{FileService, SystemService, ThumbnailService};
pub use clipboard::Clipboard;
pub use error::{BackendError, SettingsError, ThumbnailError};
pub use models::{
    ClipboardOperation, ClipboardState, Dialog, DriveInfo, FileEntry, FileProperties, Modifiers, SortBy, SortOrder,
    Tab, TabId, TabState, ViewMode,
};
pub use operations::FileOperations;
pub use settings::ExplorerSettings;
pub use tabs::TabStore;
pub use thumbnails::ThumbnailLoader;
