//! In-memory `NoteHost` for tests, benchmarks and the perf binary.

use crate::interface::{NoteHost, RawNote, ResolvedLink};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryHost {
    notes: RwLock<Vec<RawNote>>,
    active_file: RwLock<Option<String>>,
    last_opened: RwLock<Vec<String>>,
    resolved: RwLock<Vec<ResolvedLink>>,
    unresolved: RwLock<Vec<String>>,
    /// (source, target) -> offset of the first link
    link_offsets: RwLock<HashMap<(String, String), u64>>,
}

impl InMemoryHost {
    pub fn new(notes: Vec<RawNote>) -> Self {
        Self { notes: RwLock::new(notes), ..Self::default() }
    }

    pub fn set_notes(&self, notes: Vec<RawNote>) {
        *self.notes.write() = notes;
    }

    pub fn set_active_file(&self, path: Option<&str>) {
        *self.active_file.write() = path.map(str::to_string);
    }

    /// Most recent first
    pub fn set_last_opened(&self, paths: &[&str]) {
        *self.last_opened.write() = paths.iter().map(|p| p.to_string()).collect();
    }

    /// Record one link. `offset` is the position of the first occurrence in `source`.
    pub fn add_link(&self, source: &str, target: &str, offset: u64) {
        let mut resolved = self.resolved.write();
        match resolved.iter_mut().find(|l| l.source == source && l.target == target) {
            Some(link) => link.count += 1,
            None => {
                resolved.push(ResolvedLink { source: source.to_string(), target: target.to_string(), count: 1 });
                self.link_offsets.write().insert((source.to_string(), target.to_string()), offset);
            }
        }
    }

    pub fn add_unresolved(&self, target: &str) {
        self.unresolved.write().push(target.to_string());
    }
}

impl NoteHost for InMemoryHost {
    fn notes(&self) -> Vec<RawNote> {
        self.notes.read().clone()
    }

    fn active_file_path(&self) -> Option<String> {
        self.active_file.read().clone()
    }

    fn last_opened_paths(&self) -> Vec<String> {
        self.last_opened.read().clone()
    }

    fn resolved_links(&self) -> Vec<ResolvedLink> {
        self.resolved.read().clone()
    }

    fn unresolved_link_targets(&self) -> Vec<String> {
        self.unresolved.read().clone()
    }

    fn first_link_offset(&self, source_path: String, target_path: String) -> Option<u64> {
        self.link_offsets.read().get(&(source_path, target_path)).copied()
    }
}
