//! Multi-selection over a displayed (sorted) listing.
//!
//! `paths` keeps selection order and its last element is the lead row used by keyboard
//! navigation. `anchor` is the fixed end of shift ranges.

use crate::models::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub paths: Vec<String>,
    pub anchor: Option<String>,
}

impl Selection {
    pub fn new(paths: Vec<String>, anchor: Option<String>) -> Self {
        Self { paths, anchor }
    }

    pub fn lead(&self) -> Option<&str> {
        self.paths.last().map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.anchor = None;
    }

    pub fn select_single(&mut self, path: &str) {
        self.paths = vec![path.to_string()];
        self.anchor = Some(path.to_string());
    }

    /// Pointer click on `path`. `ordered` is the listing in display order.
    pub fn click(&mut self, path: &str, modifiers: Modifiers, ordered: &[&str]) {
        if modifiers.shift {
            if let Some(range) = self.anchor.as_deref().and_then(|anchor| range_between(ordered, anchor, path)) {
                if modifiers.command() {
                    self.paths.retain(|p| !range.contains(p));
                    self.paths.extend(range);
                } else {
                    self.paths = range;
                }
                return;
            }
            self.select_single(path);
            return;
        }

        if modifiers.command() {
            self.toggle(path);
            return;
        }

        self.select_single(path);
    }

    /// Ctrl/Cmd click. Removing a member moves the anchor to the most recently added
    /// remaining member.
    pub fn toggle(&mut self, path: &str) {
        if let Some(index) = self.paths.iter().position(|p| p == path) {
            self.paths.remove(index);
            self.anchor = self.paths.last().cloned();
        } else {
            self.paths.push(path.to_string());
            self.anchor = Some(path.to_string());
        }
    }

    pub fn select_all(&mut self, ordered: &[&str]) {
        self.paths = ordered.iter().map(|p| p.to_string()).collect();
        self.anchor = self.paths.last().cloned();
    }

    /// Arrow-key movement with wrap-around. With `extend`, the anchor stays put and the
    /// selection becomes the range from the anchor to the new lead row.
    pub fn step(&mut self, direction: Step, extend: bool, ordered: &[&str]) {
        if ordered.is_empty() {
            return;
        }

        let current = self.lead().and_then(|lead| ordered.iter().position(|p| *p == lead));
        let last = ordered.len() - 1;
        let next = match (direction, current) {
            (Step::Down, Some(i)) if i < last => i + 1,
            (Step::Down, _) => 0,
            (Step::Up, Some(i)) if i > 0 => i - 1,
            (Step::Up, _) => last,
        };
        let target = ordered[next];

        if extend && current.is_some() {
            let anchor = match &self.anchor {
                Some(anchor) if ordered.contains(&anchor.as_str()) => anchor.clone(),
                _ => self.lead().unwrap_or(target).to_string(),
            };
            if let Some(range) = range_between(ordered, &anchor, target) {
                self.paths = range;
                self.anchor = Some(anchor);
                return;
            }
        }

        self.select_single(target);
    }

    pub fn select_first(&mut self, ordered: &[&str]) {
        if let Some(first) = ordered.first() {
            self.select_single(first);
        }
    }

    pub fn select_last(&mut self, ordered: &[&str]) {
        if let Some(last) = ordered.last() {
            self.select_single(last);
        }
    }

    /// Drops members (and the anchor) that are not part of `ordered`.
    pub fn retain(&mut self, ordered: &[&str]) {
        self.paths.retain(|p| ordered.contains(&p.as_str()));
        if self.anchor.as_deref().is_some_and(|a| !ordered.contains(&a)) {
            self.anchor = self.paths.last().cloned();
        }
    }
}

/// Inclusive range between `from` and `to`, ordered from `from` toward `to`.
fn range_between(ordered: &[&str], from: &str, to: &str) -> Option<Vec<String>> {
    let start = ordered.iter().position(|p| *p == from)?;
    let end = ordered.iter().position(|p| *p == to)?;

    let range: Vec<String> = if start <= end {
        ordered[start..=end].iter().map(|p| p.to_string()).collect()
    } else {
        ordered[end..=start].iter().rev().map(|p| p.to_string()).collect()
    };
    Some(range)
}
