//! Lazy thumbnail loading.
//!
//! One loader is shared by every thumbnail consumer in the application. It answers from an
//! LRU cache when it can, folds concurrent requests for the same path into one backend
//! call and never has more than `max_concurrent` backend calls in flight; the rest wait in
//! FIFO order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};

use crate::backend::ThumbnailService;
use crate::error::ThumbnailError;
use crate::lru::LruCache;

/// Decoded by the backend directly.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "ico", "tiff", "tif"];

/// Rendered by the OS shell when the backend supports it.
pub const SHELL_THUMBNAIL_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpeg", "mpg", "pdf", "doc", "docx", "xls", "xlsx",
    "ppt", "pptx",
];

pub fn is_thumbnail_supported(extension: &str, shell_thumbnails: bool) -> bool {
    let extension = extension.to_lowercase();
    IMAGE_EXTENSIONS.contains(&extension.as_str())
        || (shell_thumbnails && SHELL_THUMBNAIL_EXTENSIONS.contains(&extension.as_str()))
}

type Fetched = Result<Arc<str>, ThumbnailError>;

#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    pub size: u32,
    pub capacity: usize,
    pub max_concurrent: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { size: 96, capacity: 200, max_concurrent: 4 }
    }
}

pub struct ThumbnailLoader {
    service: Arc<dyn ThumbnailService>,
    size: u32,
    limiter: Arc<RequestLimiter>,
    shared: Arc<Mutex<Shared>>,
    runtime: Option<Handle>,
}

struct Shared {
    cache: LruCache<String, Arc<str>>,
    pending: HashMap<String, watch::Receiver<Option<Fetched>>>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ThumbnailLoader {
    /// Fetches are spawned on the runtime current at construction, if any, so the loader
    /// can later be driven from a thread outside it (build it under `Runtime::enter`).
    pub fn new(service: Arc<dyn ThumbnailService>, config: LoaderConfig) -> Self {
        Self::with_runtime(service, config, Handle::try_current().ok())
    }

    pub fn with_runtime(service: Arc<dyn ThumbnailService>, config: LoaderConfig, runtime: Option<Handle>) -> Self {
        Self {
            service,
            size: config.size,
            limiter: Arc::new(RequestLimiter::new(config.max_concurrent)),
            shared: Arc::new(Mutex::new(Shared {
                cache: LruCache::new(config.capacity),
                pending: HashMap::new(),
            })),
            runtime,
        }
    }

    pub fn supports(&self, extension: &str) -> bool {
        is_thumbnail_supported(extension, self.service.shell_thumbnails())
    }

    /// Cache lookup; a hit counts as a use.
    pub fn cached(&self, path: &str) -> Option<Arc<str>> {
        lock(&self.shared).cache.get(path)
    }

    pub fn cache_len(&self) -> usize {
        lock(&self.shared).cache.len()
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.shared).pending.len()
    }

    /// Backend calls currently running.
    pub fn in_flight(&self) -> usize {
        self.limiter.active()
    }

    /// Starts (or joins) the fetch for `path` and returns a handle to its result.
    ///
    /// The fetch runs on a spawned task, so it completes and fills the cache even when
    /// the handle is dropped.
    pub fn request(&self, path: &str, extension: &str) -> ThumbnailRequest {
        if !self.supports(extension) {
            return ThumbnailRequest::Done(Err(ThumbnailError::Unsupported { extension: extension.to_lowercase() }));
        }

        let mut shared = lock(&self.shared);
        if let Some(hit) = shared.cache.get(path) {
            return ThumbnailRequest::Done(Ok(hit));
        }
        if let Some(pending) = shared.pending.get(path) {
            debug!("joining in-flight thumbnail request for {}", path);
            return ThumbnailRequest::Pending(pending.clone());
        }

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            warn!("no runtime to fetch thumbnail for {}", path);
            return ThumbnailRequest::Done(Err(ThumbnailError::NoRuntime));
        };

        let (tx, rx) = watch::channel(None);
        shared.pending.insert(path.to_string(), rx.clone());
        let ticket = self.limiter.reserve();
        drop(shared);

        let service = Arc::clone(&self.service);
        let mut fetch = PendingFetch { shared: Arc::clone(&self.shared), path: path.to_string(), tx: Some(tx) };
        let size = self.size;

        runtime.spawn(async move {
            let permit = ticket.ready().await;
            let result: Fetched = service
                .get_thumbnail(&fetch.path, size)
                .await
                .map(Arc::from)
                .map_err(ThumbnailError::from);
            drop(permit);
            fetch.finish(result);
        });

        ThumbnailRequest::Pending(rx)
    }

    pub async fn load(&self, path: &str, extension: &str) -> Result<Arc<str>, ThumbnailError> {
        self.request(path, extension).wait().await
    }
}

/// Owns a path's `pending` entry for the lifetime of its fetch task. Dropping it without
/// `finish` (panic, abort, runtime shutdown) still frees the path; subscribers then see
/// `Interrupted` and the next request fetches again.
struct PendingFetch {
    shared: Arc<Mutex<Shared>>,
    path: String,
    tx: Option<watch::Sender<Option<Fetched>>>,
}

impl PendingFetch {
    fn finish(&mut self, result: Fetched) {
        {
            let mut shared = lock(&self.shared);
            shared.pending.remove(&self.path);
            match &result {
                Ok(data) => {
                    if let Some(evicted) = shared.cache.put(self.path.clone(), Arc::clone(data)) {
                        debug!("evicted thumbnail for {}", evicted);
                    }
                }
                Err(err) => warn!("thumbnail for {} failed: {}", self.path, err),
            }
        }

        if let Some(tx) = self.tx.take() {
            // Nobody listening is fine; the cache already has the result.
            let _ = tx.send(Some(result));
        }
    }
}

impl Drop for PendingFetch {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!("thumbnail fetch for {} ended without a result", self.path);
            lock(&self.shared).pending.remove(&self.path);
        }
    }
}

/// Handle to a thumbnail result, possibly still being fetched.
#[derive(Debug)]
pub enum ThumbnailRequest {
    Done(Fetched),
    Pending(watch::Receiver<Option<Fetched>>),
}

impl ThumbnailRequest {
    pub async fn wait(self) -> Result<Arc<str>, ThumbnailError> {
        match self {
            ThumbnailRequest::Done(result) => result,
            ThumbnailRequest::Pending(mut rx) => match rx.wait_for(Option::is_some).await {
                Ok(value) => value.clone().unwrap_or(Err(ThumbnailError::Interrupted)),
                Err(_) => Err(ThumbnailError::Interrupted),
            },
        }
    }
}

/// Global cap on concurrent backend calls with a FIFO wait queue.
///
/// A slot is reserved synchronously (`reserve`), so queue position is the order in which
/// requests were made, not the order in which their tasks first run.
struct RequestLimiter {
    max: usize,
    state: Mutex<LimiterState>,
}

#[derive(Default)]
struct LimiterState {
    active: usize,
    waiting: VecDeque<oneshot::Sender<()>>,
}

impl RequestLimiter {
    fn new(max: usize) -> Self {
        Self { max: max.max(1), state: Mutex::new(LimiterState::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active(&self) -> usize {
        self.lock().active
    }

    fn reserve(self: &Arc<Self>) -> Ticket {
        let mut state = self.lock();
        if state.active < self.max {
            state.active += 1;
            return Ticket::Ready(Permit { limiter: Arc::clone(self) });
        }
        let (tx, rx) = oneshot::channel();
        state.waiting.push_back(tx);
        Ticket::Queued(Waiter { limiter: Arc::clone(self), rx, granted: false })
    }

    /// Hands the slot to the oldest live waiter, or frees it.
    fn release(&self) {
        let mut state = self.lock();
        while let Some(next) = state.waiting.pop_front() {
            if next.send(()).is_ok() {
                return;
            }
        }
        state.active = state.active.saturating_sub(1);
    }
}

enum Ticket {
    Ready(Permit),
    Queued(Waiter),
}

impl Ticket {
    async fn ready(self) -> Permit {
        match self {
            Ticket::Ready(permit) => permit,
            Ticket::Queued(waiter) => waiter.wait().await,
        }
    }
}

struct Permit {
    limiter: Arc<RequestLimiter>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}

struct Waiter {
    limiter: Arc<RequestLimiter>,
    rx: oneshot::Receiver<()>,
    granted: bool,
}

impl Waiter {
    async fn wait(mut self) -> Permit {
        // The sender is only dropped unsent when this receiver is already gone.
        let _ = (&mut self.rx).await;
        self.granted = true;
        Permit { limiter: Arc::clone(&self.limiter) }
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if self.granted {
            return;
        }
        // A slot handed over after we stopped waiting must not leak.
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            self.limiter.release();
        }
    }
}
