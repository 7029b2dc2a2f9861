//! # cryptobib
//!
//! Tooling for a cryptography bibliography: the bibyml indentation format, compact entry keys and
//! the display order of entries.
//!
//! - [bibyml]: parser and writer of the indentation-based key/value format.
//! - [bib]: entry keys, the conference registry, the entry database and its ordering and rendering.
//! - [settings]: layered configuration with embedded defaults.

pub mod bib;
pub mod bibyml;
pub mod settings;
