use std::path::Path;

use crate::edit::CapturedStack;
use crate::error::{ConflictingEdit, SnapError};
use crate::locate::ArgumentRange;

pub(crate) mod io;

/// One edit with its argument range resolved against the current source
/// text and its replacement already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub stack: CapturedStack,
}

impl ResolvedEdit {
    fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    fn conflicting(&self) -> ConflictingEdit {
        ConflictingEdit {
            range: ArgumentRange {
                start: self.start,
                end: self.end,
            },
            stack: self.stack.clone(),
        }
    }
}

/// Splices `edits` into `source`, producing the rewritten file text.
///
/// Edits are sorted by range internally, so input order never affects the
/// output. Conflicts are rejected before any text is built, carrying both
/// colliding edits' captured stacks; no partial result is ever returned.
pub fn apply_edits(
    file: &Path,
    source: &str,
    mut edits: Vec<ResolvedEdit>,
) -> Result<String, SnapError> {
    edits.sort_by_key(|edit| (edit.start, edit.end));
    ensure_non_overlapping(file, &edits)?;

    let mut rewritten = String::with_capacity(source.len());
    let mut cursor = 0usize;

    for edit in &edits {
        if source.get(edit.start..edit.end).is_none() {
            return Err(invalid_span(file, edit));
        }
        let unedited = source
            .get(cursor..edit.start)
            .ok_or_else(|| invalid_span(file, edit))?;
        rewritten.push_str(unedited);
        rewritten.push_str(&edit.text);
        cursor = edit.end;
    }

    match source.get(cursor..) {
        Some(tail) => rewritten.push_str(tail),
        None => {
            return Err(SnapError::InvalidSpan {
                path: file.display().to_string(),
                start: cursor,
                end: source.len(),
            });
        }
    }

    Ok(rewritten)
}

/// Rejects intersecting ranges in a sorted edit list. Adjacent non-empty
/// ranges are fine; a zero-width insertion touching any other edit is a
/// conflict, since two pieces of replacement text would land at one point.
fn ensure_non_overlapping(file: &Path, edits: &[ResolvedEdit]) -> Result<(), SnapError> {
    for window in edits.windows(2) {
        let first = &window[0];
        let second = &window[1];

        if first.end > second.start
            || (first.end == second.start && (first.is_insertion() || second.is_insertion()))
        {
            return Err(SnapError::Conflict {
                file: file.display().to_string(),
                first: first.conflicting(),
                second: second.conflicting(),
            });
        }
    }

    Ok(())
}

fn invalid_span(file: &Path, edit: &ResolvedEdit) -> SnapError {
    SnapError::InvalidSpan {
        path: file.display().to_string(),
        start: edit.start,
        end: edit.end,
    }
}

#[cfg(test)]
mod tests;
