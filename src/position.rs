//! Source positions for SIMPL-2021 diagnostics.
//!
//! Lines and columns are 1-indexed, matching the original compiler's
//! `SourcePos` (`scanner.c`), so positions printed in error messages read
//! the way a programmer expects when looking at the source file.

/// A (line, column) pair, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub line: u32,
    pub col: u32,
}

impl SourcePos {
    pub fn new(line: u32, col: u32) -> Self {
        SourcePos { line, col }
    }

    /// The position of the very first character of a file.
    pub fn start() -> Self {
        SourcePos { line: 1, col: 0 }
    }
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
