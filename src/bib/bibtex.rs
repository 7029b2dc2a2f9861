//! Bibtex rendering of sorted entries
//!
//! Output looks like:
//!
//! ```text
//! @InProceedings{EC:Smith15,
//!   author =       "Alice Smith and
//!                   Bob Doe",
//!   title =        "A paper",
//!   pages =        "1--20",
//!   crossref =     "EC15",
//! }
//! ```
//!
//! Fields listed in the style's `first_keys` come first, in that order, the others follow
//! alphabetically. Output is pure ASCII: other characters are replaced with `?` and reported.

use crate::bib::database::{Database, DatabaseError, EntryFields, EntryView};
use crate::bib::entry_key::EntryKey;
use crate::bib::ordering::EntrySort;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Indentation of the continuation lines of an author list
const AUTHOR_CONTINUATION: usize = 18;

/// Presentation rules of the bibtex output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BibtexStyle {
    /// Fields written first, in this order
    pub first_keys: Vec<String>,
    /// Lower-case entry type to rendered type name
    pub types: BTreeMap<String, String>,
    /// Width of the `name =` column
    pub name_column: usize,
}

impl Default for BibtexStyle {
    fn default() -> Self {
        BibtexStyle {
            first_keys: Vec::new(),
            types: BTreeMap::new(),
            name_column: 15,
        }
    }
}

impl BibtexStyle {
    pub fn format_type(&self, entry_type: &str) -> String {
        let lower = entry_type.to_lowercase();
        match self.types.get(&lower) {
            Some(name) => name.clone(),
            None => capitalize(&lower),
        }
    }

    fn field_rank<'k>(&self, name: &'k str) -> (usize, &'k str) {
        let position = self
            .first_keys
            .iter()
            .position(|key| key == name)
            .unwrap_or(self.first_keys.len());
        (position, name)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// What to write besides the entries themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BibtexOptions {
    /// Merge the fields of the crossref target into the entry and drop `crossref`
    pub expand_crossrefs: bool,
    /// Append the crossref targets of the written entries (ignored when expanding)
    pub include_crossrefs: bool,
    /// Skip fields whose value is empty
    pub remove_empty_fields: bool,
}

/// Renders entries of one database
#[derive(Debug, Clone, Copy)]
pub struct BibtexWriter<'a> {
    database: &'a Database,
    style: &'a BibtexStyle,
    options: BibtexOptions,
}

impl<'a> BibtexWriter<'a> {
    pub fn new(database: &'a Database, style: &'a BibtexStyle, options: BibtexOptions) -> Self {
        BibtexWriter {
            database,
            style,
            options,
        }
    }

    /// Sort `entries` and render them, followed by their crossref targets if requested
    pub fn render<S: EntrySort>(
        &self,
        mut entries: Vec<EntryView<'a>>,
        sort: &S,
    ) -> Result<String, DatabaseError> {
        sort.sort(&mut entries);
        let mut out = String::new();
        for view in &entries {
            out.push_str(&self.render_entry(view)?);
            out.push_str("\n\n");
        }

        if self.options.include_crossrefs && !self.options.expand_crossrefs {
            let mut crossrefs = self.crossref_targets(&entries)?;
            sort.sort(&mut crossrefs);
            for view in &crossrefs {
                out.push_str(&self.render_entry(view)?);
                out.push_str("\n\n");
            }
        }
        Ok(out)
    }

    /// Distinct crossref targets, in order of first reference
    fn crossref_targets(
        &self,
        entries: &[EntryView<'a>],
    ) -> Result<Vec<EntryView<'a>>, DatabaseError> {
        let mut seen: HashSet<&EntryKey> = HashSet::new();
        let mut targets = Vec::new();
        for view in entries {
            let Some(target) = view.entry.crossref() else {
                continue;
            };
            if !seen.insert(target) {
                continue;
            }
            let target_view = self.database.get(target).ok_or_else(|| {
                DatabaseError::MissingCrossref {
                    entry: view.key.clone(),
                    target: target.clone(),
                }
            })?;
            targets.push(target_view);
        }
        Ok(targets)
    }

    /// Render one entry (without trailing newline)
    pub fn render_entry(&self, view: &EntryView<'a>) -> Result<String, DatabaseError> {
        let mut fields: BTreeMap<&str, &str> = view
            .entry
            .fields()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        if self.options.expand_crossrefs {
            if let Some(target) = view.entry.crossref() {
                let target_view =
                    view.crossref_entry()
                        .ok_or_else(|| DatabaseError::MissingCrossref {
                            entry: view.key.clone(),
                            target: target.clone(),
                        })?;
                for (name, value) in target_view.entry.fields() {
                    if name != "key" {
                        fields.entry(name.as_str()).or_insert(value.as_str());
                    }
                }
                fields.remove("crossref");
            }
        }

        let mut names: Vec<&str> = fields.keys().copied().collect();
        names.sort_by_key(|name| self.style.field_rank(*name));

        let mut out = format!(
            "@{}{{{},\n",
            self.style.format_type(&view.entry.entry_type),
            view.key
        );
        for name in names {
            let value = fields[name];
            if self.options.remove_empty_fields && value.trim().is_empty() {
                continue;
            }
            let rendered = to_ascii(view.key, name, &format_value(name, value));
            out.push_str(&format!(
                "  {:<width$}{},\n",
                format!("{} =", name),
                rendered,
                width = self.style.name_column
            ));
        }
        out.push('}');
        Ok(out)
    }
}

/// Bibtex representation of an expanded field value
fn format_value(name: &str, value: &str) -> String {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    if name == "author" {
        let separator = format!(" and\n{}", " ".repeat(AUTHOR_CONTINUATION));
        return format!("\"{}\"", value.replace(" and ", &separator));
    }
    format!("\"{}\"", value)
}

fn to_ascii(key: &EntryKey, field: &str, value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    tracing::warn!(
        entry = %key,
        field,
        value,
        "encoding problem, replacing non-ascii characters with '?'"
    );
    value
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}
