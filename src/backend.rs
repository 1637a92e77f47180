//! Contracts of the native backend. The stores only ever talk to these traits; the
//! transport (IPC, in-process, mock) is up to the host application.

use async_trait::async_trait;

use crate::context_menu::ContextMenuRequest;
use crate::error::BackendError;
use crate::models::{DriveInfo, FileEntry, FileProperties};

#[async_trait]
pub trait FileService: Send + Sync {
    async fn read_directory(&self, path: &str) -> Result<Vec<FileEntry>, BackendError>;

    /// Recursive name search below `path`, at most `max_results` entries.
    async fn search_files(&self, path: &str, query: &str, max_results: usize) -> Result<Vec<FileEntry>, BackendError>;

    async fn create_folder(&self, path: &str, name: &str) -> Result<(), BackendError>;

    async fn delete_item(&self, path: &str) -> Result<(), BackendError>;

    async fn rename_item(&self, old_path: &str, new_name: &str) -> Result<(), BackendError>;

    /// Copies `source` into the `destination` directory.
    async fn copy_item(&self, source: &str, destination: &str) -> Result<(), BackendError>;

    /// Moves `source` into the `destination` directory.
    async fn move_item(&self, source: &str, destination: &str) -> Result<(), BackendError>;

    async fn file_properties(&self, path: &str) -> Result<FileProperties, BackendError>;

    /// Opens a file with the OS default handler.
    async fn open_path(&self, path: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait SystemService: Send + Sync {
    async fn get_drives(&self) -> Result<Vec<DriveInfo>, BackendError>;

    async fn get_quick_access(&self) -> Result<Vec<FileEntry>, BackendError>;

    /// `None` at a filesystem root.
    async fn get_parent_directory(&self, path: &str) -> Result<Option<String>, BackendError>;

    async fn show_context_menu(&self, request: ContextMenuRequest) -> Result<(), BackendError>;

    async fn open_in_terminal(&self, path: &str) -> Result<(), BackendError>;

    async fn show_native_properties(&self, path: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ThumbnailService: Send + Sync {
    /// Encoded preview image (a data URL) at most `size` pixels on its long edge.
    async fn get_thumbnail(&self, path: &str, size: u32) -> Result<String, BackendError>;

    /// Whether the backend can render shell thumbnails for videos and documents.
    fn shell_thumbnails(&self) -> bool {
        false
    }
}
