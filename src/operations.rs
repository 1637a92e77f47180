//! File operations on the active tab: clipboard, create, rename, delete and open.
//!
//! Failures are reported on the active tab's error banner and stop the operation.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::FileService;
use crate::clipboard::Clipboard;
use crate::error::BackendError;
use crate::models::{ClipboardOperation, FileEntry, FileProperties, TabId};
use crate::tabs::TabStore;

pub struct FileOperations {
    files: Arc<dyn FileService>,
    tabs: Arc<TabStore>,
    clipboard: Arc<Clipboard>,
}

impl FileOperations {
    pub fn new(files: Arc<dyn FileService>, tabs: Arc<TabStore>, clipboard: Arc<Clipboard>) -> Self {
        Self { files, tabs, clipboard }
    }

    fn active(&self) -> Option<(TabId, String)> {
        let id = self.tabs.active_tab_id()?;
        let state = self.tabs.state(id)?;
        Some((id, state.path))
    }

    fn report(&self, id: TabId, err: BackendError) {
        warn!("{} operation failed: {}", id, err);
        self.tabs.set_error(id, err.to_string());
    }

    /// Copies the selection to the clipboard. Returns false when nothing is selected.
    pub fn copy_selected(&self) -> bool {
        let selected = self.tabs.selected_entries();
        if selected.is_empty() {
            return false;
        }
        debug!("copied {} items", selected.len());
        self.clipboard.copy(selected);
        true
    }

    pub fn cut_selected(&self) -> bool {
        let selected = self.tabs.selected_entries();
        if selected.is_empty() {
            return false;
        }
        debug!("cut {} items", selected.len());
        self.clipboard.cut(selected);
        true
    }

    /// Copies or moves the clipboard batch into the active tab's directory, one item at a
    /// time. A failure stops the batch; items already done stay done. A cut batch is
    /// cleared only after every item moved.
    pub async fn paste(&self) {
        let Some(batch) = self.clipboard.snapshot() else {
            return;
        };
        let Some((id, destination)) = self.active() else {
            return;
        };

        for item in &batch.items {
            let result = match batch.operation {
                ClipboardOperation::Copy => self.files.copy_item(&item.path, &destination).await,
                ClipboardOperation::Cut => self.files.move_item(&item.path, &destination).await,
            };
            if let Err(err) = result {
                self.report(id, err);
                return;
            }
        }

        info!("pasted {} items into {}", batch.items.len(), destination);
        if batch.operation == ClipboardOperation::Cut {
            self.clipboard.clear_if(&batch);
        }
        self.tabs.refresh().await;
    }

    pub async fn create_folder(&self, name: &str) {
        let Some((id, path)) = self.active() else {
            return;
        };
        match self.files.create_folder(&path, name).await {
            Ok(()) => {
                info!("created folder {} in {}", name, path);
                self.tabs.refresh().await;
            }
            Err(err) => self.report(id, err),
        }
    }

    /// Renames the single selected entry. Does nothing unless exactly one is selected.
    pub async fn rename_selected(&self, new_name: &str) {
        let Some((id, _)) = self.active() else {
            return;
        };
        let mut selected = self.tabs.selected_entries();
        if selected.len() != 1 {
            return;
        }
        let Some(entry) = selected.pop() else {
            return;
        };

        match self.files.rename_item(&entry.path, new_name).await {
            Ok(()) => {
                info!("renamed {} to {}", entry.path, new_name);
                self.tabs.refresh().await;
                self.tabs.clear_selection();
            }
            Err(err) => self.report(id, err),
        }
    }

    /// Deletes the selection sequentially. On failure the listing is left alone so the
    /// error stays visible.
    pub async fn delete_selected(&self) {
        let Some((id, _)) = self.active() else {
            return;
        };
        let selected = self.tabs.selected_entries();
        if selected.is_empty() {
            return;
        }

        for entry in &selected {
            if let Err(err) = self.files.delete_item(&entry.path).await {
                self.report(id, err);
                return;
            }
        }

        info!("deleted {} items", selected.len());
        self.tabs.refresh().await;
        self.tabs.clear_selection();
    }

    /// Directories open in the active tab; files go to the OS default handler.
    pub async fn open(&self, entry: &FileEntry) {
        if entry.is_dir {
            self.tabs.navigate_to(&entry.path, false).await;
            return;
        }
        let Some((id, _)) = self.active() else {
            return;
        };
        if let Err(err) = self.files.open_path(&entry.path).await {
            warn!("failed to open {}: {}", entry.path, err);
            self.tabs.set_error(id, format!("Failed to open: {}", err));
        }
    }

    /// Properties of the lead selected entry. Failures are logged only.
    pub async fn properties_of_selected(&self) -> Option<(FileEntry, FileProperties)> {
        let entry = self.tabs.selected_entries().pop()?;
        match self.files.file_properties(&entry.path).await {
            Ok(properties) => Some((entry, properties)),
            Err(err) => {
                warn!("failed to read properties of {}: {}", entry.path, err);
                None
            }
        }
    }
}
