//! bibyml writer
//!
//! Renders a [BibYmlNode] back to text. Each key is written on its own line, indented by
//! `indent_width` spaces per level, and inline values are aligned on `value_column`. Parsing the
//! output gives back the same tree; only the alignment of the original text is lost.

use crate::bibyml::tree::BibYmlNode;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt::{self, Write};

/// Layout of the written text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WriterOptions {
    /// Spaces per nesting level, at least 1
    ///
    /// A width of 0 would write every level at column 0. Deserialization rejects it and the
    /// writer treats it as 1.
    #[serde(deserialize_with = "nonzero_indent")]
    pub indent_width: usize,
    /// Column where inline values start (when the key is short enough)
    pub value_column: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent_width: 4,
            value_column: 24,
        }
    }
}

fn nonzero_indent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    match usize::deserialize(deserializer)? {
        0 => Err(D::Error::custom("indent_width must be at least 1")),
        width => Ok(width),
    }
}

/// Write the children of `node` into `out`
///
/// The inline value of `node` itself is not written: only keys carry values in the text form.
pub fn write<W: Write>(out: &mut W, node: &BibYmlNode, options: &WriterOptions) -> fmt::Result {
    write_level(out, node, options, 0)
}

/// Render a tree to a string
pub fn write_str(node: &BibYmlNode, options: &WriterOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write(&mut out, node, options);
    out
}

fn write_level<W: Write>(
    out: &mut W,
    node: &BibYmlNode,
    options: &WriterOptions,
    depth: usize,
) -> fmt::Result {
    let indent = options.indent_width.max(1) * depth;
    for (key, child) in node.children() {
        match child.value().filter(|value| !value.is_empty()) {
            Some(value) => {
                let used = indent + key.chars().count() + 2;
                let padding = options.value_column.saturating_sub(used);
                writeln!(
                    out,
                    "{:indent$}{}: {:padding$}{}",
                    "",
                    key,
                    "",
                    value,
                    indent = indent,
                    padding = padding
                )?;
            }
            None => writeln!(out, "{:indent$}{}: ", "", key, indent = indent)?,
        }
        write_level(out, child, options, depth + 1)?;
    }
    Ok(())
}
