//! Tabs, per-tab navigation history, listing and selection.
//!
//! All backend failures end up in `TabState::error`; nothing here returns them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::backend::{FileService, SystemService};
use crate::models::{FileEntry, Modifiers, SortBy, SortOrder, Tab, TabId, TabState};
use crate::selection::{Selection, Step};
use crate::sort::compare_entries;
use crate::utils::path_title;

pub struct TabStore {
    files: Arc<dyn FileService>,
    system: Arc<dyn SystemService>,
    search_limit: usize,
    inner: Mutex<Tabs>,
}

#[derive(Clone, Copy)]
enum History {
    Back,
    Forward,
}

#[derive(Default)]
struct Tabs {
    slots: Vec<TabSlot>,
    active: Option<TabId>,
    next_id: u64,
}

struct TabSlot {
    tab: Tab,
    state: TabState,
    files: Vec<FileEntry>,
    /// Bumped by every load or search; responses carrying an older value are stale.
    generation: u64,
}

impl Tabs {
    fn allocate_id(&mut self) -> TabId {
        self.next_id += 1;
        TabId(self.next_id)
    }

    fn position(&self, id: TabId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.tab.id == id)
    }

    fn slot(&self, id: TabId) -> Option<&TabSlot> {
        self.slots.iter().find(|slot| slot.tab.id == id)
    }

    fn slot_mut(&mut self, id: TabId) -> Option<&mut TabSlot> {
        self.slots.iter_mut().find(|slot| slot.tab.id == id)
    }

    fn active_slot(&self) -> Option<&TabSlot> {
        self.active.and_then(|id| self.slot(id))
    }

    fn active_slot_mut(&mut self) -> Option<&mut TabSlot> {
        let id = self.active?;
        self.slot_mut(id)
    }
}

impl TabSlot {
    fn new(id: TabId, path: &str) -> Self {
        Self {
            tab: Tab { id, path: path.to_string(), title: path_title(path) },
            state: TabState::new(path),
            files: Vec::new(),
            generation: 0,
        }
    }

    fn set_location(&mut self, path: &str) {
        let title = path_title(path);
        self.tab.path = path.to_string();
        self.tab.title = title.clone();
        self.state.path = path.to_string();
        self.state.title = title;
    }

    fn clear_search(&mut self) {
        self.state.search_query.clear();
        self.state.is_searching = false;
    }

    fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.state.is_loading = true;
        self.state.error = None;
        self.generation
    }

    fn display_order(&self) -> Vec<&FileEntry> {
        let mut entries: Vec<&FileEntry> = self.files.iter().collect();
        entries.sort_by(|a, b| compare_entries(a, b, self.state.sort_by, self.state.sort_order));
        entries
    }

    fn ordered_paths(&self) -> Vec<&str> {
        self.display_order().into_iter().map(|e| e.path.as_str()).collect()
    }

    fn selection(&self) -> Selection {
        Selection::new(self.state.selected_paths.clone(), self.state.last_selected_path.clone())
    }

    fn apply_selection(&mut self, selection: Selection) {
        self.state.selected_paths = selection.paths;
        self.state.last_selected_path = selection.anchor;
    }
}

impl TabStore {
    pub fn new(files: Arc<dyn FileService>, system: Arc<dyn SystemService>, search_limit: usize) -> Self {
        Self { files, system, search_limit, inner: Mutex::new(Tabs::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, Tabs> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_tab<R>(&self, id: TabId, f: impl FnOnce(&mut TabSlot) -> R) -> Option<R> {
        self.lock().slot_mut(id).map(f)
    }

    fn with_active<R>(&self, f: impl FnOnce(&mut TabSlot) -> R) -> Option<R> {
        self.lock().active_slot_mut().map(f)
    }

    // Tab management

    /// Replaces whatever tabs exist with a single tab at `path` and loads it.
    pub async fn initialize_first_tab(&self, path: &str) -> TabId {
        let id = {
            let mut tabs = self.lock();
            let id = tabs.allocate_id();
            tabs.slots = vec![TabSlot::new(id, path)];
            tabs.active = Some(id);
            id
        };
        info!("opened {} at {}", id, path);
        self.load_directory(id, path).await;
        id
    }

    /// Opens and activates a new tab. When the active tab already shows `path`, its
    /// listing is shown as a placeholder until the load completes.
    pub async fn add_tab(&self, path: &str) -> TabId {
        let id = {
            let mut tabs = self.lock();
            let id = tabs.allocate_id();
            let mut slot = TabSlot::new(id, path);
            if let Some(active) = tabs.active_slot() {
                if active.state.path == path {
                    slot.files = active.files.clone();
                }
            }
            tabs.slots.push(slot);
            tabs.active = Some(id);
            id
        };
        info!("opened {} at {}", id, path);
        self.load_directory(id, path).await;
        id
    }

    /// The last remaining tab cannot be closed.
    pub fn close_tab(&self, id: TabId) {
        let mut tabs = self.lock();
        if tabs.slots.len() <= 1 {
            return;
        }
        let Some(index) = tabs.position(id) else {
            return;
        };

        tabs.slots.remove(index);
        if tabs.active == Some(id) {
            let next = index.min(tabs.slots.len() - 1);
            tabs.active = Some(tabs.slots[next].tab.id);
        }
        debug!("closed {}", id);
    }

    pub fn set_active_tab(&self, id: TabId) -> bool {
        let mut tabs = self.lock();
        if tabs.position(id).is_none() {
            return false;
        }
        tabs.active = Some(id);
        true
    }

    // Read access

    pub fn tabs(&self) -> Vec<Tab> {
        self.lock().slots.iter().map(|slot| slot.tab.clone()).collect()
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.lock().active
    }

    pub fn state(&self, id: TabId) -> Option<TabState> {
        self.lock().slot(id).map(|slot| slot.state.clone())
    }

    pub fn current_state(&self) -> Option<TabState> {
        self.lock().active_slot().map(|slot| slot.state.clone())
    }

    /// Listing of a tab in backend order.
    pub fn files(&self, id: TabId) -> Vec<FileEntry> {
        self.lock().slot(id).map(|slot| slot.files.clone()).unwrap_or_default()
    }

    pub fn current_files(&self) -> Vec<FileEntry> {
        self.lock().active_slot().map(|slot| slot.files.clone()).unwrap_or_default()
    }

    /// Listing of the active tab in display order.
    pub fn sorted_files(&self) -> Vec<FileEntry> {
        self.lock()
            .active_slot()
            .map(|slot| slot.display_order().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Selected entries of the active tab, in selection order.
    pub fn selected_entries(&self) -> Vec<FileEntry> {
        let tabs = self.lock();
        let Some(slot) = tabs.active_slot() else {
            return Vec::new();
        };
        slot.state
            .selected_paths
            .iter()
            .filter_map(|path| slot.files.iter().find(|entry| &entry.path == path))
            .cloned()
            .collect()
    }

    pub fn can_go_back(&self) -> bool {
        self.lock().active_slot().is_some_and(|slot| slot.state.can_go_back())
    }

    pub fn can_go_forward(&self) -> bool {
        self.lock().active_slot().is_some_and(|slot| slot.state.can_go_forward())
    }

    // Navigation

    pub async fn navigate_to(&self, path: &str, replace_history: bool) {
        if let Some(id) = self.active_tab_id() {
            self.navigate_tab(id, path, replace_history).await;
        }
    }

    /// Like `navigate_to`, for a specific tab whether or not it is active.
    pub async fn navigate_tab(&self, id: TabId, path: &str, replace_history: bool) {
        let found = self.with_tab(id, |slot| {
            slot.set_location(path);
            slot.clear_search();
            let state = &mut slot.state;
            if replace_history {
                state.history = vec![path.to_string()];
                state.history_index = 0;
            } else {
                state.history.truncate(state.history_index + 1);
                state.history.push(path.to_string());
                state.history_index = state.history.len() - 1;
            }
        });
        if found.is_none() {
            return;
        }

        info!("{} navigating to {}", id, path);
        self.load_directory(id, path).await;
    }

    pub async fn go_back(&self) {
        self.travel(History::Back).await;
    }

    pub async fn go_forward(&self) {
        self.travel(History::Forward).await;
    }

    async fn travel(&self, direction: History) {
        let target = self.with_active(|slot| {
            let state = &mut slot.state;
            let index = match direction {
                History::Back if state.can_go_back() => state.history_index - 1,
                History::Forward if state.can_go_forward() => state.history_index + 1,
                _ => return None,
            };
            state.history_index = index;
            let path = state.history[index].clone();
            slot.set_location(&path);
            slot.clear_search();
            Some((slot.tab.id, path))
        });

        if let Some((id, path)) = target.flatten() {
            debug!("{} history -> {}", id, path);
            self.load_directory(id, &path).await;
        }
    }

    pub async fn go_up(&self) {
        let Some((id, current)) = self.with_active(|slot| (slot.tab.id, slot.state.path.clone())) else {
            return;
        };

        match self.system.get_parent_directory(&current).await {
            Ok(Some(parent)) if parent != current => {
                let moved = self.state(id).is_none_or(|state| state.path != current);
                if moved {
                    debug!("{} left {} before its parent resolved", id, current);
                    return;
                }
                self.navigate_tab(id, &parent, false).await
            }
            Ok(_) => debug!("{} has no parent", current),
            Err(err) => warn!("failed to resolve parent of {}: {}", current, err),
        }
    }

    // Loading

    /// Replaces the tab's listing with the contents of `path`. Clears the selection on
    /// success; on failure records the error and empties the listing.
    pub async fn load_directory(&self, id: TabId, path: &str) {
        let Some(ticket) = self.with_tab(id, TabSlot::begin_request) else {
            return;
        };

        let result = self.files.read_directory(path).await;

        self.with_tab(id, |slot| {
            if slot.generation != ticket {
                debug!("{} dropping stale listing of {}", id, path);
                return;
            }
            slot.state.is_loading = false;
            match result {
                Ok(entries) => {
                    debug!("{} loaded {} entries from {}", id, entries.len(), path);
                    slot.files = entries;
                    slot.apply_selection(Selection::default());
                }
                Err(err) => {
                    warn!("{} failed to read {}: {}", id, path, err);
                    slot.state.error = Some(err.to_string());
                    slot.files.clear();
                }
            }
        });
    }

    /// Searches below the active tab's path. A blank query goes back to the plain listing.
    pub async fn search_files(&self, query: &str) {
        let trimmed = query.trim().to_string();
        let Some((id, path, ticket)) = self.with_active(|slot| {
            slot.state.search_query = query.to_string();
            if trimmed.is_empty() {
                slot.state.is_searching = false;
                return (slot.tab.id, slot.state.path.clone(), None);
            }
            slot.state.is_searching = true;
            (slot.tab.id, slot.state.path.clone(), Some(slot.begin_request()))
        }) else {
            return;
        };

        let Some(ticket) = ticket else {
            self.load_directory(id, &path).await;
            return;
        };

        let result = self.files.search_files(&path, &trimmed, self.search_limit).await;

        self.with_tab(id, |slot| {
            if slot.generation != ticket {
                debug!("{} dropping stale results for '{}'", id, trimmed);
                return;
            }
            slot.state.is_loading = false;
            match result {
                Ok(entries) => {
                    debug!("{} found {} matches for '{}'", id, entries.len(), trimmed);
                    slot.files = entries;
                    let mut selection = slot.selection();
                    selection.retain(&slot.ordered_paths());
                    slot.apply_selection(selection);
                }
                Err(err) => {
                    warn!("{} search for '{}' failed: {}", id, trimmed, err);
                    slot.state.error = Some(err.to_string());
                    slot.files.clear();
                }
            }
        });
    }

    /// Repeats the last search, or reloads the directory when not searching.
    pub async fn refresh(&self) {
        let Some((id, state)) = self.with_active(|slot| (slot.tab.id, slot.state.clone())) else {
            return;
        };

        if state.is_searching && !state.search_query.is_empty() {
            self.search_files(&state.search_query).await;
        } else {
            self.load_directory(id, &state.path).await;
        }
    }

    // Selection

    fn update_selection(&self, f: impl FnOnce(&mut Selection, &[&str])) {
        self.with_active(|slot| {
            let mut selection = slot.selection();
            f(&mut selection, &slot.ordered_paths());
            slot.apply_selection(selection);
        });
    }

    /// Pointer click with Ctrl/Cmd toggling and Shift range semantics.
    pub fn handle_select(&self, path: &str, modifiers: Modifiers) {
        self.update_selection(|selection, ordered| selection.click(path, modifiers, ordered));
    }

    pub fn select_only(&self, path: &str) {
        self.update_selection(|selection, _| selection.select_single(path));
    }

    pub fn handle_select_all(&self) {
        self.update_selection(|selection, ordered| selection.select_all(ordered));
    }

    pub fn clear_selection(&self) {
        self.update_selection(|selection, _| selection.clear());
    }

    pub fn step_selection(&self, direction: Step, extend: bool) {
        self.update_selection(|selection, ordered| selection.step(direction, extend, ordered));
    }

    pub fn select_first(&self) {
        self.update_selection(|selection, ordered| selection.select_first(ordered));
    }

    pub fn select_last(&self) {
        self.update_selection(|selection, ordered| selection.select_last(ordered));
    }

    /// Selects the first displayed entry whose name starts with `prefix` (case-insensitive).
    pub fn select_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.to_lowercase();
        self.with_active(|slot| {
            let Some(path) = slot
                .display_order()
                .into_iter()
                .find(|entry| entry.name.to_lowercase().starts_with(&prefix))
                .map(|entry| entry.path.clone())
            else {
                return false;
            };
            let mut selection = slot.selection();
            selection.select_single(&path);
            slot.apply_selection(selection);
            true
        })
        .unwrap_or(false)
    }

    // Sorting and errors

    pub fn set_sort(&self, sort_by: SortBy, sort_order: SortOrder) {
        if let Some(id) = self.active_tab_id() {
            self.set_sort_for(id, sort_by, sort_order);
        }
    }

    pub fn set_sort_for(&self, id: TabId, sort_by: SortBy, sort_order: SortOrder) {
        self.with_tab(id, |slot| {
            slot.state.sort_by = sort_by;
            slot.state.sort_order = sort_order;
        });
    }

    /// Column header click. Returns the resulting sort.
    pub fn toggle_sort(&self, column: SortBy) -> Option<(SortBy, SortOrder)> {
        self.with_active(|slot| {
            let (sort_by, sort_order) = slot.state.sort_by.toggle(slot.state.sort_order, column);
            slot.state.sort_by = sort_by;
            slot.state.sort_order = sort_order;
            (sort_by, sort_order)
        })
    }

    pub fn set_error(&self, id: TabId, message: String) {
        self.with_tab(id, |slot| slot.state.error = Some(message));
    }

    pub fn dismiss_error(&self) {
        self.with_active(|slot| slot.state.error = None);
    }
}
