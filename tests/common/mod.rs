//! In-memory backend shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fileexp_core::context_menu::ContextMenuRequest;
use fileexp_core::{BackendError, DriveInfo, FileEntry, FileProperties, FileService, SystemService, TabStore, ThumbnailService};
use tokio::sync::Semaphore;

pub const HOME: &str = r"C:\Users\Test";
pub const DOCS: &str = r"C:\Users\Test\Docs";
pub const SUB: &str = r"C:\Users\Test\Docs\Sub";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn join(dir: &str, name: &str) -> String {
    format!("{}\\{}", dir.trim_end_matches('\\'), name)
}

/// Files and directories keyed by their parent directory.
#[derive(Default)]
pub struct MockBackend {
    dirs: Mutex<HashMap<String, Vec<FileEntry>>>,
    parents: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
    quick_access: Mutex<Vec<FileEntry>>,
    drives: Mutex<Vec<DriveInfo>>,
    menus: Mutex<Vec<ContextMenuRequest>>,
}

impl MockBackend {
    /// `HOME` with `Docs`, `Docs\Sub` and five text files `a.txt`..`e.txt`.
    pub fn home() -> Arc<Self> {
        let backend = MockBackend::default();
        let mut home = vec![FileEntry::dir(DOCS, "2024-01-01 10:00")];
        for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
            home.push(FileEntry::file(&join(HOME, name), 10, "2024-01-02 10:00"));
        }
        backend.set_dir(HOME, home);
        backend.set_dir(DOCS, vec![FileEntry::dir(SUB, ""), FileEntry::file(&join(DOCS, "report.pdf"), 2048, "")]);
        backend.set_dir(SUB, vec![FileEntry::file(&join(SUB, "deep.txt"), 1, "")]);
        backend.set_parent(SUB, DOCS);
        backend.set_parent(DOCS, HOME);
        backend.set_parent(HOME, r"C:\Users");
        backend.set_dir(r"C:\Users", vec![FileEntry::dir(HOME, "")]);
        backend.set_parent(r"C:\Users", r"C:\");
        Arc::new(backend)
    }

    pub fn set_dir(&self, path: &str, entries: Vec<FileEntry>) {
        self.dirs.lock().unwrap().insert(path.to_string(), entries);
    }

    pub fn set_parent(&self, path: &str, parent: &str) {
        self.parents.lock().unwrap().insert(path.to_string(), parent.to_string());
    }

    pub fn set_quick_access(&self, entries: Vec<FileEntry>) {
        *self.quick_access.lock().unwrap() = entries;
    }

    pub fn set_drives(&self, drives: Vec<DriveInfo>) {
        *self.drives.lock().unwrap() = drives;
    }

    /// Any operation naming `key` fails.
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    /// Holds `read_directory(path)` until permits are added. A `parent <path>` key holds
    /// the parent lookup instead.
    pub fn gate(&self, path: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(path.to_string(), Arc::clone(&gate));
        gate
    }

    async fn pass_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls().into_iter().filter(|call| call.starts_with(prefix)).collect()
    }

    pub fn menus(&self) -> Vec<ContextMenuRequest> {
        self.menus.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, key: &str) -> Result<(), BackendError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(BackendError::PermissionDenied(key.to_string()));
        }
        Ok(())
    }

    fn remove_entry(&self, path: &str) -> Option<FileEntry> {
        let mut dirs = self.dirs.lock().unwrap();
        for entries in dirs.values_mut() {
            if let Some(index) = entries.iter().position(|entry| entry.path == path) {
                return Some(entries.remove(index));
            }
        }
        None
    }

    fn insert_entry(&self, dir: &str, entry: FileEntry) {
        self.dirs.lock().unwrap().entry(dir.to_string()).or_default().push(entry);
    }

    fn find(&self, path: &str) -> Option<FileEntry> {
        let dirs = self.dirs.lock().unwrap();
        dirs.values().flatten().find(|entry| entry.path == path).cloned()
    }
}

fn relocated(entry: &FileEntry, dir: &str) -> FileEntry {
    let path = join(dir, &entry.name);
    if entry.is_dir {
        FileEntry::dir(&path, &entry.modified)
    } else {
        FileEntry::file(&path, entry.size, &entry.modified)
    }
}

#[async_trait]
impl FileService for MockBackend {
    async fn read_directory(&self, path: &str) -> Result<Vec<FileEntry>, BackendError> {
        self.record(format!("read {}", path));
        self.pass_gate(path).await;
        self.check(path)?;
        self.dirs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(path.to_string()))
    }

    async fn search_files(&self, path: &str, query: &str, max_results: usize) -> Result<Vec<FileEntry>, BackendError> {
        self.record(format!("search {} {} {}", path, query, max_results));
        self.check(path)?;
        let query = query.to_lowercase();
        let dirs = self.dirs.lock().unwrap();
        let mut found: Vec<FileEntry> = dirs
            .iter()
            .filter(|(dir, _)| dir.starts_with(path))
            .flat_map(|(_, entries)| entries.iter())
            .filter(|entry| entry.name.to_lowercase().contains(&query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found.truncate(max_results);
        Ok(found)
    }

    async fn create_folder(&self, path: &str, name: &str) -> Result<(), BackendError> {
        self.record(format!("mkdir {} {}", path, name));
        self.check(name)?;
        let folder = join(path, name);
        if self.find(&folder).is_some() {
            return Err(BackendError::AlreadyExists(name.to_string()));
        }
        self.insert_entry(path, FileEntry::dir(&folder, ""));
        Ok(())
    }

    async fn delete_item(&self, path: &str) -> Result<(), BackendError> {
        self.record(format!("delete {}", path));
        self.check(path)?;
        self.remove_entry(path).map(|_| ()).ok_or_else(|| BackendError::NotFound(path.to_string()))
    }

    async fn rename_item(&self, old_path: &str, new_name: &str) -> Result<(), BackendError> {
        self.record(format!("rename {} {}", old_path, new_name));
        self.check(old_path)?;
        let entry = self.remove_entry(old_path).ok_or_else(|| BackendError::NotFound(old_path.to_string()))?;
        let dir = old_path.rsplit_once('\\').map(|(dir, _)| dir.to_string()).unwrap_or_default();
        let renamed = relocated(&FileEntry { name: new_name.to_string(), ..entry }, &dir);
        self.insert_entry(&dir, renamed);
        Ok(())
    }

    async fn copy_item(&self, source: &str, destination: &str) -> Result<(), BackendError> {
        self.record(format!("copy {} -> {}", source, destination));
        self.check(source)?;
        let entry = self.find(source).ok_or_else(|| BackendError::NotFound(source.to_string()))?;
        self.insert_entry(destination, relocated(&entry, destination));
        Ok(())
    }

    async fn move_item(&self, source: &str, destination: &str) -> Result<(), BackendError> {
        self.record(format!("move {} -> {}", source, destination));
        self.check(source)?;
        let entry = self.remove_entry(source).ok_or_else(|| BackendError::NotFound(source.to_string()))?;
        self.insert_entry(destination, relocated(&entry, destination));
        Ok(())
    }

    async fn file_properties(&self, path: &str) -> Result<FileProperties, BackendError> {
        self.record(format!("properties {}", path));
        self.check(path)?;
        Ok(FileProperties {
            created: "2024-01-01 09:00".to_string(),
            accessed: "2024-01-03 09:00".to_string(),
            modified: "2024-01-02 09:00".to_string(),
            readonly: false,
            hidden: false,
        })
    }

    async fn open_path(&self, path: &str) -> Result<(), BackendError> {
        self.record(format!("open {}", path));
        self.check(path)
    }
}

#[async_trait]
impl SystemService for MockBackend {
    async fn get_drives(&self) -> Result<Vec<DriveInfo>, BackendError> {
        self.check("drives")?;
        Ok(self.drives.lock().unwrap().clone())
    }

    async fn get_quick_access(&self) -> Result<Vec<FileEntry>, BackendError> {
        self.check("quick_access")?;
        Ok(self.quick_access.lock().unwrap().clone())
    }

    async fn get_parent_directory(&self, path: &str) -> Result<Option<String>, BackendError> {
        let key = format!("parent {}", path);
        self.record(key.clone());
        self.pass_gate(&key).await;
        self.check(&key)?;
        Ok(self.parents.lock().unwrap().get(path).cloned())
    }

    async fn show_context_menu(&self, request: ContextMenuRequest) -> Result<(), BackendError> {
        self.menus.lock().unwrap().push(request);
        self.check("menu")
    }

    async fn open_in_terminal(&self, path: &str) -> Result<(), BackendError> {
        self.record(format!("terminal {}", path));
        self.check(path)
    }

    async fn show_native_properties(&self, path: &str) -> Result<(), BackendError> {
        self.record(format!("native-properties {}", path));
        self.check(path)
    }
}

pub fn store(backend: &Arc<MockBackend>) -> Arc<TabStore> {
    Arc::new(TabStore::new(backend.clone(), backend.clone(), 100))
}

/// Store with one tab open at `HOME`.
pub async fn home_store() -> (Arc<MockBackend>, Arc<TabStore>) {
    init_logging();
    let backend = MockBackend::home();
    let tabs = store(&backend);
    tabs.initialize_first_tab(HOME).await;
    (backend, tabs)
}

/// Thumbnail backend counting calls and concurrency. When gated, every call waits for a
/// permit from `release`.
pub struct MockThumbnails {
    shell: bool,
    gate: Option<Semaphore>,
    failing: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockThumbnails {
    pub fn open() -> Arc<Self> {
        Arc::new(Self::build(false, None))
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self::build(false, Some(Semaphore::new(0))))
    }

    pub fn with_shell_thumbnails() -> Arc<Self> {
        Arc::new(Self::build(true, None))
    }

    fn build(shell: bool, gate: Option<Semaphore>) -> Self {
        Self {
            shell,
            gate,
            failing: Mutex::new(HashSet::new()),
            panicking: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
        self.panicking.lock().unwrap().remove(path);
    }

    /// The next fetches of `path` panic inside the service until healed.
    pub fn panic_on(&self, path: &str) {
        self.panicking.lock().unwrap().insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThumbnailService for MockThumbnails {
    async fn get_thumbnail(&self, path: &str, size: u32) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(path.to_string());
        let explode = self.panicking.lock().unwrap().contains(path);
        if explode {
            panic!("thumbnail decoder crashed on {}", path);
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(path) {
            return Err(BackendError::Io(format!("cannot decode {}", path)));
        }
        Ok(format!("data:image/png;base64,{}@{}", path, size))
    }

    fn shell_thumbnails(&self) -> bool {
        self.shell
    }
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
