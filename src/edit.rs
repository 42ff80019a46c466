use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Captured stack-trace text retained for diagnostics. A plain data record:
/// locate failures and conflicts carry this alongside their message instead
/// of reusing a live error object as the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedStack(pub String);

impl CapturedStack {
    pub fn new(stack: impl Into<String>) -> Self {
        Self(stack.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapturedStack {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// One pending rewrite: the call site starting at zero-based
/// (`line`, `column`) in `file` must have its trailing literal argument
/// replaced with `output`, serialized as a template literal.
///
/// The position refers to the start of the call expression in the original,
/// unmodified source; the locator re-parses that same text at flush time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Edit {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub output: String,
    pub stack: CapturedStack,
}

impl Edit {
    /// Builds an edit, normalizing the output's newlines so replacement
    /// text carries one consistent newline style regardless of platform.
    pub fn new(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        output: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            output: normalize_newlines(&output.into()),
            stack: CapturedStack::new(stack),
        }
    }

    /// Builds an edit from a captured V8-style stack trace, taking the call
    /// site from the first `at name (file:line:column)` frame. Trace
    /// positions are one-based; the stored position is zero-based.
    pub fn from_stack_trace(stack: &str, output: impl Into<String>) -> Option<Self> {
        static STACK_FRAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let frame_regex = STACK_FRAME_REGEX.get_or_init(|| {
            Regex::new(r"(?m)^\s*at\s*\S+ \((.*?):(\d+):(\d+)\)\s*$")
                .expect("stack frame regex should compile")
        });

        let captures = frame_regex.captures(stack)?;
        let file = PathBuf::from(&captures[1]);
        let line = captures[2].parse::<usize>().ok()?.checked_sub(1)?;
        let column = captures[3].parse::<usize>().ok()?.checked_sub(1)?;

        Some(Self::new(file, line, column, output, stack))
    }
}

/// Collapses `\r\n` pairs and lone `\r` to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            normalized.push('\n');
        } else {
            normalized.push(ch);
        }
    }

    normalized
}
