//! bibyml parser
//!
//!     The parser is a line-by-line state machine over an indentation path, not a recursive descent:
//!     the indentation width of a key's children is only known once the next line is seen.
//!
//! Algorithm
//!
//!     The path is a stack of levels. The bottom level is the root, whose children sit at column 0.
//!     Every other level is an open key together with the column of its children, which stays
//!     pending until the first line after the key. For each non-blank line indented by `n` spaces:
//!
//!     1. If the top level is pending: when `n` is deeper than the level below it, `n` becomes the
//!        children column; otherwise the key had no children and its level is popped.
//!     2. Levels whose children column is deeper than `n` are closed.
//!     3. The top level must now have its children at exactly `n`, or the line is an indentation error.
//!     4. The key is inserted in the node at the current path (with its inline value, if any).
//!     5. The key is pushed as a new pending level.
//!
//!     Levels still open at the end of the input need no closing.

use crate::bibyml::error::BibYmlError;
use crate::bibyml::tree::BibYmlNode;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)([^:]+):(.*)$").unwrap());

/// Column of the children of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Known(usize),
    /// No child line seen yet
    Pending,
}

#[derive(Debug)]
struct Level {
    /// `None` for the root level
    key: Option<String>,
    width: Width,
}

/// The chain of open keys from the root to the last parsed line
#[derive(Debug)]
struct IndentationPath {
    levels: Vec<Level>,
}

impl IndentationPath {
    fn new() -> Self {
        IndentationPath {
            levels: vec![Level {
                key: None,
                width: Width::Known(0),
            }],
        }
    }

    /// Move the path to the level whose children are at column `indent`
    ///
    /// Returns false when no open level matches.
    fn enter(&mut self, indent: usize) -> bool {
        let depth = self.levels.len();
        if depth > 1 && self.levels[depth - 1].width == Width::Pending {
            match self.levels[depth - 2].width {
                Width::Known(parent) if indent > parent => {
                    self.levels[depth - 1].width = Width::Known(indent);
                }
                _ => {
                    self.levels.pop();
                }
            }
        }

        while self.levels.len() > 1 && self.top_width() > Some(indent) {
            self.levels.pop();
        }

        self.top_width() == Some(indent)
    }

    fn top_width(&self) -> Option<usize> {
        match self.levels.last().map(|level| level.width) {
            Some(Width::Known(width)) => Some(width),
            _ => None,
        }
    }

    fn keys(&self) -> Vec<&str> {
        self.levels
            .iter()
            .filter_map(|level| level.key.as_deref())
            .collect()
    }

    fn push(&mut self, key: String) {
        self.levels.push(Level {
            key: Some(key),
            width: Width::Pending,
        });
    }
}

/// Parse a bibyml document
pub fn parse(source: &str) -> Result<BibYmlNode, BibYmlError> {
    parse_lines(source.lines())
}

/// Parse a bibyml document given as a sequence of lines (without line terminators)
pub fn parse_lines<'a, I>(lines: I) -> Result<BibYmlNode, BibYmlError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut root = BibYmlNode::new();
    let mut path = IndentationPath::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let (indent, key, value) = split_line(line).map_err(|reason| BibYmlError::MalformedLine {
            line_number,
            line: line.to_string(),
            reason: reason.to_string(),
        })?;

        if !path.enter(indent) {
            return Err(BibYmlError::Indentation {
                line_number,
                line: line.to_string(),
            });
        }

        let node = if value.is_empty() {
            BibYmlNode::new()
        } else {
            BibYmlNode::with_value(value)
        };
        let parent = root
            .get_path_mut(&path.keys())
            .expect("indentation path always points to inserted nodes");
        parent.insert(key, node);
        path.push(key.to_string());
    }

    Ok(root)
}

/// Split a line into (indentation width, trimmed key, trimmed value)
fn split_line(line: &str) -> Result<(usize, &str, &str), &'static str> {
    let captures = LINE_REGEX
        .captures(line)
        .ok_or("expected a line of the form `key: value`")?;
    let (Some(indent), Some(key), Some(value)) = (captures.get(1), captures.get(2), captures.get(3))
    else {
        return Err("expected a line of the form `key: value`");
    };

    let indent = indent.as_str();
    if indent.chars().any(|c| c != ' ') {
        return Err("only spaces are accepted");
    }
    let key = key.as_str().trim();
    if key.is_empty() {
        return Err("empty key");
    }

    Ok((indent.len(), key, value.as_str().trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let source = "eurocrypt: test\n    2013: aa\n    2015: bb\n";
        let root = parse(source).unwrap();

        assert_eq!(root.len(), 1);
        let eurocrypt = root.get("eurocrypt").unwrap();
        assert_eq!(eurocrypt.value(), Some("test"));
        assert_eq!(eurocrypt.keys().collect::<Vec<_>>(), vec!["2013", "2015"]);
        assert_eq!(eurocrypt.value_of("2013"), Some("aa"));
        assert_eq!(eurocrypt.value_of("2015"), Some("bb"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let source = "\na: 1\n   \n    b: 2\n\n\nc: 3\n";
        let root = parse(source).unwrap();
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(root.get_path(&["a", "b"]).unwrap().value(), Some("2"));
    }

    #[test]
    fn test_empty_value_is_pure_container() {
        let root = parse("confs:\n  EC:\n  C: Crypto\n").unwrap();
        let confs = root.get("confs").unwrap();
        assert_eq!(confs.value(), None);
        assert_eq!(confs.get("EC"), Some(&BibYmlNode::new()));
        assert_eq!(confs.value_of("C"), Some("Crypto"));
    }

    #[test]
    fn test_dedent_several_levels() {
        let source = "a:\n  b:\n      c: 1\n      d: 2\ne: 3\n";
        let root = parse(source).unwrap();
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "e"]);
        let b = root.get_path(&["a", "b"]).unwrap();
        assert_eq!(b.keys().collect::<Vec<_>>(), vec!["c", "d"]);
    }

    #[test]
    fn test_dedent_to_intermediate_level() {
        let source = "a:\n  b:\n    c: 1\n  d: 2\n";
        let root = parse(source).unwrap();
        let a = root.get("a").unwrap();
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["b", "d"]);
    }

    #[test]
    fn test_value_may_contain_colons() {
        let root = parse("url: https://eprint.iacr.org/2020/123\n").unwrap();
        assert_eq!(root.value_of("url"), Some("https://eprint.iacr.org/2020/123"));
    }

    #[test]
    fn test_tab_is_rejected() {
        let err = parse("a:\n\tb: 1\n").unwrap_err();
        match err {
            BibYmlError::MalformedLine {
                line_number, reason, ..
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(reason, "only spaces are accepted");
            }
            other => panic!("Expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_line_without_colon_is_rejected() {
        let err = parse("a: 1\nnot a key value line\n").unwrap_err();
        assert!(matches!(err, BibYmlError::MalformedLine { line_number: 2, .. }));
        assert_eq!(err.line(), "not a key value line");
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = parse("   : value\n").unwrap_err();
        assert!(matches!(err, BibYmlError::MalformedLine { .. }));
    }

    #[test]
    fn test_unmatched_dedent_is_rejected() {
        let err = parse("a:\n    b: 1\n  c: 2\n").unwrap_err();
        assert_eq!(
            err,
            BibYmlError::Indentation {
                line_number: 3,
                line: "  c: 2".to_string()
            }
        );
    }

    #[test]
    fn test_indented_first_line_is_rejected() {
        let err = parse("  a: 1\n").unwrap_err();
        assert!(matches!(err, BibYmlError::Indentation { line_number: 1, .. }));
    }

    #[test]
    fn test_sibling_after_leaf_keeps_level() {
        let root = parse("a:\n   x: 1\n   y: 2\n   z: 3\n").unwrap();
        let a = root.get("a").unwrap();
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_deeper_line_after_established_width_is_child() {
        let root = parse("a:\n  x: 1\n     y: 2\n").unwrap();
        assert_eq!(root.get_path(&["a", "x", "y"]).unwrap().value(), Some("2"));
    }

    #[test]
    fn test_duplicate_key_overwrites() {
        let root = parse("a: 1\nb: 2\na: 3\n").unwrap();
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(root.value_of("a"), Some("3"));
    }

    #[test]
    fn test_crlf_lines() {
        let root = parse("a: 1\r\n  b: 2\r\n").unwrap();
        assert_eq!(root.value_of("a"), Some("1"));
        assert_eq!(root.get_path(&["a", "b"]).unwrap().value(), Some("2"));
    }
}
