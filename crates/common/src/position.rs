//! Restorable stream positions.

use std::fmt;

/// A snapshot of a token stream: byte cursor plus line/column counters.
///
/// Lines and columns are 1-based. Every token records the position the
/// stream was at just before the token was pulled, so loading a token's
/// position makes the next pull return that same token again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The position of the first byte of a source.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_start() {
        assert_eq!(Position::default(), Position::new(0, 1, 1));
    }

    #[test]
    fn display_is_line_colon_column() {
        assert_eq!(Position::new(17, 3, 9).to_string(), "3:9");
    }

    #[test]
    fn ordering_follows_offset() {
        assert!(Position::new(1, 1, 2) < Position::new(2, 1, 3));
    }
}
