//! Viewport bookkeeping: which rows are rendered and when a thumbnail may be requested.

use std::ops::Range;
use std::sync::Arc;

use crate::error::ThumbnailError;
use crate::models::FileEntry;
use crate::thumbnails::{ThumbnailLoader, ThumbnailRequest};

pub const DEFAULT_MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn expand(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Edges touching counts as intersecting.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

/// One-shot "has this item come near the viewport" detector.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityGate {
    margin: f32,
    triggered: bool,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl VisibilityGate {
    pub fn new(margin: f32) -> Self {
        Self { margin: margin.max(0.0), triggered: false }
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// True exactly once: on the first observation where `item` intersects the viewport
    /// grown by the margin. Later observations are ignored.
    pub fn observe(&mut self, item: Rect, viewport: Rect) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = viewport.expand(self.margin).intersects(&item);
        self.triggered
    }
}

/// Window of rows rendered out of a long listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub top_index: usize,
    pub rows: usize,
    pub overscan: usize,
}

impl RowWindow {
    pub fn new(rows: usize, overscan: usize) -> Self {
        Self { top_index: 0, rows: rows.max(1), overscan }
    }

    fn max_top(&self, total: usize) -> usize {
        total.saturating_sub(self.rows)
    }

    /// Rows to render, overscan included.
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let top = self.top_index.min(self.max_top(total));
        let start = top.saturating_sub(self.overscan);
        let end = (top + self.rows + self.overscan).min(total);
        start..end
    }

    /// Scrolls the minimum amount needed to show `index`.
    pub fn reveal(&mut self, index: usize, total: usize) {
        if index < self.top_index {
            self.top_index = index;
        } else if index >= self.top_index + self.rows {
            self.top_index = index + 1 - self.rows;
        }
        self.clamp(total);
    }

    /// Wheel scroll by `rows`; negative scrolls up.
    pub fn scroll(&mut self, rows: isize, total: usize) {
        self.top_index = if rows > 0 {
            self.top_index.saturating_add(rows.unsigned_abs())
        } else {
            self.top_index.saturating_sub(rows.unsigned_abs())
        };
        self.clamp(total);
    }

    pub fn resize(&mut self, rows: usize, total: usize) {
        self.rows = rows.max(1);
        self.clamp(total);
    }

    pub fn clamp(&mut self, total: usize) {
        self.top_index = self.top_index.min(self.max_top(total));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    /// Not requested yet, or the request is running.
    Waiting,
    Loaded(Arc<str>),
    /// Show the file-type icon.
    Fallback,
}

/// Thumbnail of one rendered entry.
#[derive(Debug)]
pub struct ThumbnailSlot {
    path: String,
    extension: String,
    is_dir: bool,
    gate: VisibilityGate,
    state: SlotState,
}

impl ThumbnailSlot {
    pub fn new(entry: &FileEntry, margin: f32) -> Self {
        Self {
            path: entry.path.clone(),
            extension: entry.extension.clone(),
            is_dir: entry.is_dir,
            gate: VisibilityGate::new(margin),
            state: SlotState::Waiting,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    /// Feeds a layout pass. Returns the request to await when this observation made the
    /// entry eligible and the cache could not answer.
    pub fn observe(&mut self, item: Rect, viewport: Rect, loader: &ThumbnailLoader) -> Option<ThumbnailRequest> {
        if self.state != SlotState::Waiting || self.gate.triggered() {
            return None;
        }
        if self.is_dir || !loader.supports(&self.extension) {
            self.state = SlotState::Fallback;
            return None;
        }
        if !self.gate.observe(item, viewport) {
            return None;
        }
        if let Some(data) = loader.cached(&self.path) {
            self.state = SlotState::Loaded(data);
            return None;
        }
        Some(loader.request(&self.path, &self.extension))
    }

    pub fn resolve(&mut self, result: Result<Arc<str>, ThumbnailError>) {
        self.state = match result {
            Ok(data) => SlotState::Loaded(data),
            Err(_) => SlotState::Fallback,
        };
    }
}
