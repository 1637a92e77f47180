//! The explorer context object: one per running application, shared by every view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{debug, info, warn};

use crate::backend::{FileService, SystemService, ThumbnailService};
use crate::clipboard::Clipboard;
use crate::context_menu::{ContextMenuAction, ContextMenuState};
use crate::keyboard::{self, Key, KeyCommand, TypeAhead};
use crate::models::{Dialog, DriveInfo, FileEntry, Modifiers, SortBy, SortOrder, TabId, ViewMode};
use crate::operations::FileOperations;
use crate::prefs::FolderPrefs;
use crate::settings::ExplorerSettings;
use crate::tabs::TabStore;
use crate::thumbnails::ThumbnailLoader;
use crate::visibility::ThumbnailSlot;

/// Opened when quick access gives nothing better.
pub const FALLBACK_PATH: &str = "C:\\";

const USER_FOLDER_SUFFIXES: [&str; 3] = ["\\Desktop", "\\Downloads", "\\Documents"];

pub struct Explorer {
    settings: ExplorerSettings,
    system: Arc<dyn SystemService>,
    tabs: Arc<TabStore>,
    clipboard: Arc<Clipboard>,
    operations: FileOperations,
    thumbnails: Arc<ThumbnailLoader>,
    prefs: FolderPrefs,
    session: Mutex<Session>,
}

struct Session {
    initialized: bool,
    drives: Vec<DriveInfo>,
    quick_access: Vec<FileEntry>,
    type_ahead: TypeAhead,
    menu: ContextMenuState,
}

/// Home folder guessed from the first quick-access entry (usually the Desktop).
pub fn user_folder(quick_access: &[FileEntry]) -> String {
    let Some(first) = quick_access.first() else {
        return FALLBACK_PATH.to_string();
    };
    USER_FOLDER_SUFFIXES
        .iter()
        .fold(first.path.clone(), |path, suffix| path.replacen(*suffix, "", 1))
}

impl Explorer {
    pub fn new(
        files: Arc<dyn FileService>,
        system: Arc<dyn SystemService>,
        thumbnail_service: Arc<dyn ThumbnailService>,
        settings: ExplorerSettings,
    ) -> Self {
        let tabs = Arc::new(TabStore::new(Arc::clone(&files), Arc::clone(&system), settings.search_max_results));
        let clipboard = Arc::new(Clipboard::new());
        let operations = FileOperations::new(files, Arc::clone(&tabs), Arc::clone(&clipboard));
        let thumbnails = Arc::new(ThumbnailLoader::new(thumbnail_service, settings.loader_config()));
        let session = Session {
            initialized: false,
            drives: Vec::new(),
            quick_access: Vec::new(),
            type_ahead: TypeAhead::new(settings.type_ahead_window()),
            menu: ContextMenuState::new(),
        };

        Self {
            settings,
            system,
            tabs,
            clipboard,
            operations,
            thumbnails,
            prefs: FolderPrefs::new(),
            session: Mutex::new(session),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    pub fn tabs(&self) -> &Arc<TabStore> {
        &self.tabs
    }

    pub fn clipboard(&self) -> &Arc<Clipboard> {
        &self.clipboard
    }

    pub fn operations(&self) -> &FileOperations {
        &self.operations
    }

    pub fn thumbnails(&self) -> &Arc<ThumbnailLoader> {
        &self.thumbnails
    }

    pub fn prefs(&self) -> &FolderPrefs {
        &self.prefs
    }

    pub fn drives(&self) -> Vec<DriveInfo> {
        self.session().drives.clone()
    }

    pub fn quick_access(&self) -> Vec<FileEntry> {
        self.session().quick_access.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.session().initialized
    }

    /// Loads the sidebar lists and opens the first tab. Only the first call does anything.
    pub async fn initialize(&self) -> Option<TabId> {
        {
            let mut session = self.session();
            if session.initialized {
                return None;
            }
            session.initialized = true;
        }

        let (drives, quick_access) = tokio::join!(self.system.get_drives(), self.system.get_quick_access());
        let drives = drives.unwrap_or_else(|err| {
            warn!("failed to list drives: {}", err);
            Vec::new()
        });
        let quick_access = quick_access.unwrap_or_else(|err| {
            warn!("failed to list quick access: {}", err);
            Vec::new()
        });

        let home = user_folder(&quick_access);
        {
            let mut session = self.session();
            session.drives = drives;
            session.quick_access = quick_access;
        }

        info!("starting in {}", home);
        let id = self.tabs.initialize_first_tab(&home).await;
        self.apply_folder_prefs(id);
        Some(id)
    }

    // Tabs and navigation

    /// Opens a tab at the active tab's path.
    pub async fn new_tab(&self) -> TabId {
        let path = self
            .tabs
            .current_state()
            .map(|state| state.path)
            .unwrap_or_else(|| FALLBACK_PATH.to_string());
        let id = self.tabs.add_tab(&path).await;
        self.apply_folder_prefs(id);
        id
    }

    pub fn close_active_tab(&self) {
        if let Some(id) = self.tabs.active_tab_id() {
            self.tabs.close_tab(id);
        }
    }

    pub async fn navigate_to(&self, path: &str) {
        let tab = self.tabs.active_tab_id();
        self.tabs.navigate_to(path, false).await;
        self.apply_folder_prefs_to(tab);
    }

    pub async fn go_back(&self) {
        let tab = self.tabs.active_tab_id();
        self.tabs.go_back().await;
        self.apply_folder_prefs_to(tab);
    }

    pub async fn go_forward(&self) {
        let tab = self.tabs.active_tab_id();
        self.tabs.go_forward().await;
        self.apply_folder_prefs_to(tab);
    }

    pub async fn go_up(&self) {
        let tab = self.tabs.active_tab_id();
        self.tabs.go_up().await;
        self.apply_folder_prefs_to(tab);
    }

    pub async fn open(&self, entry: &FileEntry) {
        let tab = self.tabs.active_tab_id();
        self.operations.open(entry).await;
        if entry.is_dir {
            self.apply_folder_prefs_to(tab);
        }
    }

    /// Opens the selected entry when exactly one is selected.
    pub async fn open_selected(&self) {
        let selected = self.tabs.selected_entries();
        if let [entry] = selected.as_slice() {
            self.open(entry).await;
        }
    }

    // View state

    fn apply_folder_prefs_to(&self, tab: Option<TabId>) {
        if let Some(id) = tab {
            self.apply_folder_prefs(id);
        }
    }

    /// Remembered sort of the tab's folder, or the configured default. Applied to the tab
    /// that navigated, even if another tab became active while it loaded.
    fn apply_folder_prefs(&self, id: TabId) {
        let Some(state) = self.tabs.state(id) else {
            return;
        };
        let pref = self.prefs.get(&state.path).unwrap_or_default();
        self.tabs.set_sort_for(
            id,
            pref.sort_by.unwrap_or(self.settings.sort_by),
            pref.sort_order.unwrap_or(self.settings.sort_order),
        );
    }

    pub fn view_mode(&self) -> ViewMode {
        self.tabs
            .current_state()
            .and_then(|state| self.prefs.get(&state.path))
            .and_then(|pref| pref.view_mode)
            .unwrap_or(self.settings.view_mode)
    }

    pub fn set_view_mode(&self, view_mode: ViewMode) {
        if let Some(state) = self.tabs.current_state() {
            self.prefs.set_view_mode(&state.path, view_mode);
        }
    }

    /// Column header click; the result is remembered for the folder.
    pub fn toggle_sort(&self, column: SortBy) {
        let Some((sort_by, sort_order)) = self.tabs.toggle_sort(column) else {
            return;
        };
        self.remember_sort(sort_by, sort_order);
    }

    pub fn set_sort(&self, sort_by: SortBy, sort_order: SortOrder) {
        self.tabs.set_sort(sort_by, sort_order);
        self.remember_sort(sort_by, sort_order);
    }

    fn remember_sort(&self, sort_by: SortBy, sort_order: SortOrder) {
        if let Some(state) = self.tabs.current_state() {
            debug!("remembering {:?}/{:?} for {}", sort_by, sort_order, state.path);
            self.prefs.set_sorting(&state.path, sort_by, sort_order);
        }
    }

    /// Thumbnail slot for a rendered entry, or `None` when thumbnails are turned off.
    pub fn thumbnail_slot(&self, entry: &FileEntry) -> Option<ThumbnailSlot> {
        if !self.settings.enable_thumbnails {
            return None;
        }
        Some(ThumbnailSlot::new(entry, self.settings.thumbnail_margin))
    }

    // Keyboard

    /// Runs the command bound to `key`. Returns the dialog the UI must show, if any.
    pub async fn handle_key(&self, key: Key, modifiers: Modifiers, now: Instant) -> Option<Dialog> {
        let command = keyboard::resolve(key, modifiers)?;
        let selected = self.tabs.current_state().map(|state| state.selected_paths.len()).unwrap_or(0);

        match command {
            KeyCommand::Copy => {
                self.operations.copy_selected();
            }
            KeyCommand::Cut => {
                self.operations.cut_selected();
            }
            KeyCommand::Paste => {
                if self.clipboard.has_items() {
                    self.operations.paste().await;
                }
            }
            KeyCommand::NewFolderDialog => return Some(Dialog::NewFolder),
            KeyCommand::NewTab => {
                self.new_tab().await;
            }
            KeyCommand::CloseTab => self.close_active_tab(),
            KeyCommand::SelectAll => self.tabs.handle_select_all(),
            KeyCommand::DeleteDialog if selected > 0 => {
                if self.settings.confirm_deletions {
                    return Some(Dialog::Delete);
                }
                self.operations.delete_selected().await;
            }
            KeyCommand::RenameDialog if selected == 1 => return Some(Dialog::Rename),
            KeyCommand::DeleteDialog | KeyCommand::RenameDialog => {}
            KeyCommand::Refresh => self.tabs.refresh().await,
            KeyCommand::GoUp => self.go_up().await,
            KeyCommand::OpenSelected => self.open_selected().await,
            KeyCommand::Move { step, extend } => self.tabs.step_selection(step, extend),
            KeyCommand::SelectFirst => self.tabs.select_first(),
            KeyCommand::SelectLast => self.tabs.select_last(),
            KeyCommand::TypeAhead(ch) => {
                let prefix = self.session().type_ahead.push(ch, now).to_string();
                if !self.tabs.select_prefix(&prefix) {
                    debug!("no entry starts with '{}'", prefix);
                }
            }
        }
        None
    }

    // Context menu

    /// Right-click on an entry. The entry becomes the selection unless it already is part
    /// of it.
    pub async fn show_context_menu(&self, entry: &FileEntry, x: f64, y: f64) {
        let already_selected = self.tabs.current_state().is_some_and(|state| state.is_selected(&entry.path));
        if !already_selected {
            self.tabs.select_only(&entry.path);
        }
        let request = self.session().menu.open_on_entry(entry, x, y, self.clipboard.has_items());
        if let Err(err) = self.system.show_context_menu(request).await {
            warn!("failed to show context menu: {}", err);
        }
    }

    pub async fn show_background_context_menu(&self, x: f64, y: f64) {
        let request = self.session().menu.open_on_background(x, y, self.clipboard.has_items());
        if let Err(err) = self.system.show_context_menu(request).await {
            warn!("failed to show context menu: {}", err);
        }
    }

    /// Action id reported back by the native menu.
    pub async fn handle_context_action_id(&self, id: &str) -> Option<Dialog> {
        match id.parse::<ContextMenuAction>() {
            Ok(action) => self.handle_context_action(action).await,
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    pub async fn handle_context_action(&self, action: ContextMenuAction) -> Option<Dialog> {
        let target = self.session().menu.target().cloned();
        debug!("context menu action {} on {:?}", action, target.as_ref().map(|entry| &entry.path));
        if action.needs_target() && target.is_none() {
            return None;
        }

        match action {
            ContextMenuAction::Open => {
                if let Some(entry) = target {
                    self.open(&entry).await;
                }
            }
            ContextMenuAction::Cut => {
                self.operations.cut_selected();
            }
            ContextMenuAction::Copy => {
                self.operations.copy_selected();
            }
            ContextMenuAction::Paste => self.operations.paste().await,
            ContextMenuAction::NewFolder => return Some(Dialog::NewFolder),
            ContextMenuAction::Rename => return Some(Dialog::Rename),
            ContextMenuAction::Delete => return Some(Dialog::Delete),
            ContextMenuAction::OpenTerminal => {
                let path = match target {
                    Some(entry) if entry.is_dir => entry.path,
                    _ => self.tabs.current_state().map(|state| state.path)?,
                };
                if let Err(err) = self.system.open_in_terminal(&path).await {
                    warn!("failed to open terminal in {}: {}", path, err);
                }
            }
            ContextMenuAction::Properties => {
                if let Some(entry) = target {
                    if let Err(err) = self.system.show_native_properties(&entry.path).await {
                        warn!("failed to show properties of {}: {}", entry.path, err);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_folder_strips_known_suffixes() {
        let desktop = vec![FileEntry::dir(r"C:\Users\Test\Desktop", "")];
        assert_eq!(user_folder(&desktop), r"C:\Users\Test");

        let documents = vec![FileEntry::dir(r"C:\Users\Test\Documents", ""), FileEntry::dir(r"D:\", "")];
        assert_eq!(user_folder(&documents), r"C:\Users\Test");

        let other = vec![FileEntry::dir(r"D:\Projects", "")];
        assert_eq!(user_folder(&other), r"D:\Projects");

        assert_eq!(user_folder(&[]), FALLBACK_PATH);
    }
}
