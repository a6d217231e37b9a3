//! Source locations.
//!
//! Every node the parser hands over carries the file, line and column of
//! the token that produced it; diagnostics render locations as
//! `file:line:column`.

use std::fmt;

/// A position in some source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Loc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Loc {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Loc {
        Loc {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location for nodes the analyzer synthesizes itself.
    pub fn none() -> Loc {
        Loc {
            file: "<builtin>".to_string(),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
