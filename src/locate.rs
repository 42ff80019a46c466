use serde::{Deserialize, Serialize};

/// Byte range of a call's trailing literal argument. A zero-width range
/// (`start == end`) marks the insertion point immediately before the call's
/// closing parenthesis when no literal argument exists yet; replacement text
/// for such a range must carry its own comma separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentRange {
    pub start: usize,
    pub end: usize,
}

impl ArgumentRange {
    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Nested construct the scanner is currently inside. The active frame
/// decides which byte closes the construct and whether argument boundaries
/// are visible at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Bottom frame of an argument-list scan: terminated by a top-level
    /// comma followed by a literal opener, or by the call's closing paren.
    Arguments,
    /// A parenthesis, brace or bracket group, closed by `closer`.
    Group { closer: u8 },
    /// Template-literal content, closed by an unescaped backtick.
    Template,
    /// An embedded `${...}` expression inside a template literal.
    TemplateExpr,
}

/// What ended a scan that ran to a terminator.
enum ScanResult {
    /// Closing paren of the call reached with no trailing literal; carries
    /// the offset of the paren itself.
    Close(usize),
    /// Offset of the opening quote or backtick of the trailing literal.
    LiteralStart(usize),
    /// Offset just past the closing backtick of a template-literal scan.
    End(usize),
}

/// Locates the byte range of the last argument of the call expression
/// starting at `call_start`, or the zero-width insertion point before its
/// closing paren when no trailing string/template literal is present.
///
/// Returns `None` when no call opens at `call_start` (a stale recorded
/// position) or when an unterminated string, template or comment prevents
/// the scan from reaching the call's closing paren.
pub fn locate_last_argument(source: &str, call_start: usize) -> Option<ArgumentRange> {
    let bytes = source.as_bytes();
    let args_start = skip_callee(bytes, call_start)?;

    match scan_from(bytes, args_start, Frame::Arguments)? {
        ScanResult::Close(paren) => Some(ArgumentRange {
            start: paren,
            end: paren,
        }),
        ScanResult::LiteralStart(start) => {
            let end = match bytes[start] {
                b'`' => scan_template_literal(bytes, start + 1)?,
                quote @ (b'\'' | b'"') => scan_quoted(bytes, start, quote)?,
                _ => return None,
            };
            Some(ArgumentRange { start, end })
        }
        ScanResult::End(_) => None,
    }
}

/// Skips the identifier/property-access chain of the call expression and
/// returns the offset just past the opening parenthesis. The chain must
/// lead directly to `(`; anything else means the recorded position no
/// longer points at a call.
fn skip_callee(bytes: &[u8], call_start: usize) -> Option<usize> {
    let mut pos = call_start;
    while pos < bytes.len() && is_callee_byte(bytes[pos]) {
        pos += 1;
    }

    if bytes.get(pos) == Some(&b'(') {
        Some(pos + 1)
    } else {
        None
    }
}

fn is_callee_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'$' | b'_')
}

/// Bytes that can never open a nested construct or close the current one,
/// skipped in runs.
fn is_ignored_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'$' | b'#' | b'@' | b'.')
}

/// The token-scanning stack machine shared by argument-list scans and
/// template-literal scans. `bottom` selects which terminator ends the whole
/// scan; every nested construct pushes a frame and pops it at its closer.
///
/// Structural bytes are all ASCII, so scanning bytewise is safe: a cursor
/// can only pause inside a multi-byte sequence while skipping content, and
/// every returned offset lands on an ASCII delimiter.
fn scan_from(bytes: &[u8], from: usize, bottom: Frame) -> Option<ScanResult> {
    let mut frames = vec![bottom];
    let mut pos = from;

    while pos < bytes.len() {
        let Some(&frame) = frames.last() else {
            break;
        };

        if frame == Frame::Template {
            match bytes[pos] {
                b'\\' => pos += 2,
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    frames.push(Frame::TemplateExpr);
                    pos += 2;
                }
                b'`' => {
                    frames.pop();
                    pos += 1;
                    if frames.is_empty() {
                        return Some(ScanResult::End(pos));
                    }
                }
                _ => pos += 1,
            }
            continue;
        }

        match bytes[pos] {
            byte if is_ignored_byte(byte) => {
                pos += 1;
                while pos < bytes.len() && is_ignored_byte(bytes[pos]) {
                    pos += 1;
                }
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos += 2;
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = scan_block_comment(bytes, pos + 2)?;
            }
            b'(' => {
                frames.push(Frame::Group { closer: b')' });
                pos += 1;
            }
            b'{' => {
                frames.push(Frame::Group { closer: b'}' });
                pos += 1;
            }
            b'[' => {
                frames.push(Frame::Group { closer: b']' });
                pos += 1;
            }
            quote @ (b'\'' | b'"') => {
                pos = scan_quoted(bytes, pos, quote)?;
            }
            b'`' => {
                frames.push(Frame::Template);
                pos += 1;
            }
            byte => {
                if byte == b'/'
                    && let Some(end) = scan_regex_literal(bytes, pos)
                {
                    pos = end;
                    continue;
                }

                match frame {
                    Frame::Arguments if byte == b')' => {
                        return Some(ScanResult::Close(pos));
                    }
                    Frame::Arguments if byte == b',' => {
                        if let Some(opener) = literal_opener_after_comma(bytes, pos + 1) {
                            return Some(ScanResult::LiteralStart(opener));
                        }
                        pos += 1;
                    }
                    Frame::Group { closer } if byte == closer => {
                        frames.pop();
                        pos += 1;
                    }
                    Frame::TemplateExpr if byte == b'}' => {
                        frames.pop();
                        pos += 1;
                    }
                    _ => pos += 1,
                }
            }
        }
    }

    None
}

/// After a top-level comma, the trailing literal starts at the next
/// non-whitespace byte when that byte opens a string or template literal.
fn literal_opener_after_comma(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }

    match bytes.get(pos) {
        Some(b'`' | b'\'' | b'"') => Some(pos),
        _ => None,
    }
}

/// Scans a template literal whose content begins at `content_start` (just
/// past the opening backtick) and returns the offset after its closing
/// backtick. Embedded `${...}` expressions are scanned with the full token
/// set, so nested calls, strings and further templates do not end the span.
fn scan_template_literal(bytes: &[u8], content_start: usize) -> Option<usize> {
    match scan_from(bytes, content_start, Frame::Template)? {
        ScanResult::End(end) => Some(end),
        _ => None,
    }
}

/// Advances past a quoted string opened at `start`, honoring backslash
/// escapes. Returns the offset after the closing quote, or `None` when the
/// string never closes.
fn scan_quoted(bytes: &[u8], start: usize, quote: u8) -> Option<usize> {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            byte if byte == quote => return Some(pos + 1),
            _ => pos += 1,
        }
    }

    None
}

/// Advances past a block comment whose content begins at `from` (just past
/// the `/*`). Returns the offset after the closing `*/`, or `None` when the
/// comment never closes.
fn scan_block_comment(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos + 1 < bytes.len() {
        if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
            return Some(pos + 2);
        }
        pos += 1;
    }

    None
}

/// Attempts to scan a `/pattern/flags` regular-expression literal starting
/// at the slash at `start`. Returns the offset past the flags, or `None`
/// when no closing slash completes the literal, in which case the caller
/// treats the slash as a plain byte (a division operator).
fn scan_regex_literal(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 1;
    let mut has_content = false;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                pos += 2;
                has_content = true;
            }
            b'[' => {
                pos = scan_regex_class(bytes, pos + 1)?;
                has_content = true;
            }
            b'/' => {
                if !has_content {
                    return None;
                }
                pos += 1;
                while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
                    pos += 1;
                }
                return Some(pos);
            }
            _ => {
                pos += 1;
                has_content = true;
            }
        }
    }

    None
}

/// Scans a regex character class from just past its `[` to just past its
/// `]`; a closing slash inside the class does not end the regex literal.
fn scan_regex_class(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b']' => return Some(pos + 1),
            _ => pos += 1,
        }
    }

    None
}
