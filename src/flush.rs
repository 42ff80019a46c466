use std::fs;
use std::path::Path;
use std::thread;

use serde::Serialize;

use crate::apply::io::{acquire_flush_lock, write_text_atomically};
use crate::apply::{ResolvedEdit, apply_edits};
use crate::edit::Edit;
use crate::error::{ErrorBody, SnapError};
use crate::line_index::LineIndex;
use crate::literal::encode_argument;
use crate::locate::locate_last_argument;
use crate::registry::{EditRegistry, FileEdits};

/// Outcome of one flush: every file group's result plus rollup counts.
#[derive(Debug, Clone, Serialize)]
pub struct FlushReport {
    pub files: Vec<FileFlushResult>,
    pub summary: FlushSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFlushResult {
    pub file: String,
    pub edits_applied: usize,
    pub edits_total: usize,
    pub status: FileFlushStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileFlushStatus {
    Written,
    Failed,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FlushSummary {
    pub files_written: usize,
    pub files_failed: usize,
    pub edits_applied: usize,
    pub edits_failed: usize,
}

impl FlushReport {
    /// Overall success is the conjunction of every file's outcome.
    pub fn is_success(&self) -> bool {
        self.files
            .iter()
            .all(|result| result.status == FileFlushStatus::Written)
    }

    pub fn to_json(&self) -> Result<String, SnapError> {
        serde_json::to_string_pretty(self)
            .map_err(|source| SnapError::ReportSerialization { source })
    }
}

/// Drains the registry and rewrites every file with pending edits.
///
/// File groups are drained once, before any I/O, then processed
/// concurrently; one file's failure never blocks or aborts another file's
/// flush. The registry is empty afterwards whether or not every file
/// succeeded.
pub fn flush(registry: &EditRegistry) -> FlushReport {
    let batches = registry.drain_all();

    let files = thread::scope(|scope| {
        let workers = batches
            .iter()
            .map(|batch| scope.spawn(move || flush_file(batch)))
            .collect::<Vec<_>>();

        workers
            .into_iter()
            .map(|worker| match worker.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Vec<_>>()
    });

    let summary = summarize(&files);
    FlushReport { files, summary }
}

/// Flushes the process-wide registry.
pub fn flush_global() -> FlushReport {
    flush(EditRegistry::global())
}

fn flush_file(batch: &FileEdits) -> FileFlushResult {
    let edits_total = batch.edits.len();
    match rewrite_file(&batch.file, &batch.edits) {
        Ok(()) => FileFlushResult {
            file: batch.file.display().to_string(),
            edits_applied: edits_total,
            edits_total,
            status: FileFlushStatus::Written,
            error: None,
        },
        Err(error) => FileFlushResult {
            file: batch.file.display().to_string(),
            edits_applied: 0,
            edits_total,
            status: FileFlushStatus::Failed,
            error: Some(error.to_error_response().error),
        },
    }
}

/// One read-transform-write sequence: lock, read once, resolve every edit
/// against the original text, splice, write once.
fn rewrite_file(file: &Path, edits: &[Edit]) -> Result<(), SnapError> {
    let _lock = acquire_flush_lock(file)?;
    let source = fs::read_to_string(file).map_err(|error| SnapError::io(file, error))?;
    let line_index = LineIndex::new(&source);

    let mut resolved = Vec::with_capacity(edits.len());
    for edit in edits {
        resolved.push(resolve_edit(file, &source, &line_index, edit)?);
    }

    let rewritten = apply_edits(file, &source, resolved)?;
    write_text_atomically(file, &rewritten)
}

fn resolve_edit(
    file: &Path,
    source: &str,
    line_index: &LineIndex,
    edit: &Edit,
) -> Result<ResolvedEdit, SnapError> {
    let located = line_index
        .offset_at(edit.line, edit.column)
        .and_then(|offset| locate_last_argument(source, offset))
        .ok_or_else(|| SnapError::LocateFailed {
            file: file.display().to_string(),
            line: edit.line,
            column: edit.column,
            stack: edit.stack.clone(),
        })?;

    Ok(ResolvedEdit {
        start: located.start,
        end: located.end,
        text: encode_argument(&edit.output, located.is_insertion()),
        stack: edit.stack.clone(),
    })
}

fn summarize(files: &[FileFlushResult]) -> FlushSummary {
    let files_written = files
        .iter()
        .filter(|result| result.status == FileFlushStatus::Written)
        .count();
    let edits_applied = files.iter().map(|result| result.edits_applied).sum();
    let edits_failed = files
        .iter()
        .map(|result| result.edits_total.saturating_sub(result.edits_applied))
        .sum();

    FlushSummary {
        files_written,
        files_failed: files.len() - files_written,
        edits_applied,
        edits_failed,
    }
}
