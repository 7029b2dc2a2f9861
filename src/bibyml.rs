//! bibyml: the indentation-based key/value notation used for the bibliography configuration
//!
//!     bibyml is a small subset of YAML. A document only encodes nested dictionaries: every line is
//!     `key: value`, nesting is given by leading spaces, and there are no closing markers. A key may
//!     carry an inline value, children, or both. Tabs are rejected.
//!
//!     ```text
//!     eurocrypt: test
//!         2013: aa
//!         2015: bb
//!     ```
//!
//!     parses into a root with one child `eurocrypt` (value `test`) which itself has the children
//!     `2013` (value `aa`) and `2015` (value `bb`).
//!
//!     The parser ([parser]) and the writer ([writer]) are inverses up to column alignment:
//!     `parse(write(tree)) == tree` for any tree without duplicate sibling keys.

pub mod error;
pub mod parser;
pub mod tree;
pub mod writer;

pub use error::BibYmlError;
pub use parser::{parse, parse_lines};
pub use tree::BibYmlNode;
pub use writer::{write, write_str, WriterOptions};
