//! Error types for bibyml parsing

use std::fmt;

/// Errors that can occur while parsing a bibyml document
///
/// Both variants are fatal to the parse and carry the raw offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibYmlError {
    /// The line does not have the `indent key: value` shape
    MalformedLine {
        line_number: usize,
        line: String,
        reason: String,
    },
    /// The indentation of the line matches no open level
    Indentation { line_number: usize, line: String },
}

impl BibYmlError {
    /// 1-based number of the offending line
    pub fn line_number(&self) -> usize {
        match self {
            BibYmlError::MalformedLine { line_number, .. }
            | BibYmlError::Indentation { line_number, .. } => *line_number,
        }
    }

    /// Raw text of the offending line
    pub fn line(&self) -> &str {
        match self {
            BibYmlError::MalformedLine { line, .. } | BibYmlError::Indentation { line, .. } => line,
        }
    }
}

impl fmt::Display for BibYmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BibYmlError::MalformedLine {
                line_number,
                line,
                reason,
            } => {
                writeln!(f, "BibYml parsing error at line {}:", line_number)?;
                writeln!(f, "    line: \"{}\"", line)?;
                write!(f, "    message: {}", reason)
            }
            BibYmlError::Indentation { line_number, line } => {
                writeln!(f, "BibYml parsing error at line {}:", line_number)?;
                writeln!(f, "    line: \"{}\"", line)?;
                write!(f, "    message: indentation problem")
            }
        }
    }
}

impl std::error::Error for BibYmlError {}
