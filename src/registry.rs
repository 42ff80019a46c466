use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::edit::Edit;

/// All pending edits targeting one file, in the order they were recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdits {
    pub file: PathBuf,
    pub edits: Vec<Edit>,
}

/// Collection of pending inline-snapshot edits, grouped by file.
///
/// Append-only while tests run; drained exactly once at flush start, before
/// any flush I/O begins, so a reset never races with an in-flight `record`.
#[derive(Debug, Default)]
pub struct EditRegistry {
    pending: Mutex<BTreeMap<PathBuf, Vec<Edit>>>,
}

impl EditRegistry {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// The process-wide registry. A `static` is the single, idempotently
    /// initialized handle every caller in the process shares.
    pub fn global() -> &'static EditRegistry {
        static GLOBAL: EditRegistry = EditRegistry::new();
        &GLOBAL
    }

    /// Appends one pending edit. Safe to call from concurrently running
    /// assertions; the edit becomes visible atomically as a unit.
    pub fn record(&self, edit: Edit) {
        let mut pending = self.lock_pending();
        pending.entry(edit.file.clone()).or_default().push(edit);
    }

    /// Returns every file group and clears the collection in one step.
    pub fn drain_all(&self) -> Vec<FileEdits> {
        let drained = std::mem::take(&mut *self.lock_pending());
        drained
            .into_iter()
            .map(|(file, edits)| FileEdits { file, edits })
            .collect()
    }

    pub fn pending_edits(&self) -> usize {
        self.lock_pending().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_pending().is_empty()
    }

    fn lock_pending(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<Edit>>> {
        // The map is append-only between drains, so a panicked writer
        // cannot leave it in a torn state.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
