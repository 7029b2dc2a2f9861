//! Entry repository
//!
//! Entries are plain records: a type and a map of already-expanded field values. The database keeps
//! them in insertion order, keyed by [EntryKey]. A paper usually points to its proceedings volume
//! through the `crossref` field; field lookups through [EntryView] fall back to that volume (one
//! level, a proceedings volume never crossrefs another entry). The sort fields (`pages`, `volume`,
//! `number`, `howpublished`) never fall back.
//!
//! Databases are loaded from JSON:
//!
//! ```text
//! [
//!   {"key": "EC15", "type": "proceedings", "fields": {"volume": "9056", "year": "2015"}},
//!   {"key": "EC:Smith15", "type": "inproceedings", "fields": {"crossref": "EC15", "pages": "1--20"}}
//! ]
//! ```

use crate::bib::entry_key::{EntryKey, KeyParseError};
use crate::bib::filter::HasKey;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Field lookup used by the ordering engine and the renderers
pub trait EntryFields {
    /// Expanded value of a field
    fn field(&self, name: &str) -> Option<&str>;

    /// Decoded `crossref` field
    fn crossref(&self) -> Option<&EntryKey>;

    /// Value of a field set on the entry itself, ignoring any crossref target
    fn own_field(&self, name: &str) -> Option<&str> {
        self.field(name)
    }

    fn pages(&self) -> Option<&str> {
        self.own_field("pages")
    }

    fn volume(&self) -> Option<&str> {
        self.own_field("volume")
    }

    fn number(&self) -> Option<&str> {
        self.own_field("number")
    }

    fn how_published(&self) -> Option<&str> {
        self.own_field("howpublished")
    }
}

/// Errors while building a database
#[derive(Debug)]
pub enum DatabaseError {
    /// An entry key could not be decoded
    Key(KeyParseError),
    /// The `crossref` field of an entry could not be decoded
    Crossref { entry: String, source: KeyParseError },
    /// The crossref target of an entry is not in the database
    MissingCrossref { entry: EntryKey, target: EntryKey },
    Json(serde_json::Error),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Key(err) => write!(f, "{}", err),
            DatabaseError::Crossref { entry, source } => {
                write!(f, "Invalid crossref in entry \"{}\": {}", entry, source)
            }
            DatabaseError::MissingCrossref { entry, target } => write!(
                f,
                "Entry \"{}\" crossrefs missing entry \"{}\"",
                entry, target
            ),
            DatabaseError::Json(err) => write!(f, "Invalid entries file: {}", err),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Key(err) => Some(err),
            DatabaseError::Crossref { source, .. } => Some(source),
            DatabaseError::Json(err) => Some(err),
            DatabaseError::MissingCrossref { .. } => None,
        }
    }
}

impl From<KeyParseError> for DatabaseError {
    fn from(err: KeyParseError) -> Self {
        DatabaseError::Key(err)
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Json(err)
    }
}

/// One bibliography record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry type as written in the source (`inproceedings`, `proceedings`, ...)
    pub entry_type: String,
    fields: BTreeMap<String, String>,
    crossref: Option<EntryKey>,
}

impl Entry {
    /// Create an entry, decoding its `crossref` field if present
    pub fn new(
        entry_type: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) -> Result<Self, KeyParseError> {
        let crossref = fields.get("crossref").map(|c| EntryKey::parse(c)).transpose()?;
        Ok(Entry {
            entry_type: entry_type.into(),
            fields,
            crossref,
        })
    }

    /// Own fields, without crossref fallback
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

impl EntryFields for Entry {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn crossref(&self) -> Option<&EntryKey> {
        self.crossref.as_ref()
    }
}

/// An entry seen through its database, with crossref fallback
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
    database: &'a Database,
    pub key: &'a EntryKey,
    pub entry: &'a Entry,
}

impl<'a> EntryView<'a> {
    /// The crossref target, if any and present in the database
    pub fn crossref_entry(&self) -> Option<EntryView<'a>> {
        self.entry
            .crossref()
            .and_then(|target| self.database.get(target))
    }
}

impl EntryFields for EntryView<'_> {
    fn field(&self, name: &str) -> Option<&str> {
        self.entry.field(name).or_else(|| {
            self.crossref_entry()
                .and_then(|target| target.entry.field(name))
        })
    }

    fn crossref(&self) -> Option<&EntryKey> {
        self.entry.crossref()
    }

    fn own_field(&self, name: &str) -> Option<&str> {
        self.entry.field(name)
    }
}

impl<T: EntryFields + ?Sized> EntryFields for &T {
    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }

    fn crossref(&self) -> Option<&EntryKey> {
        (**self).crossref()
    }

    fn own_field(&self, name: &str) -> Option<&str> {
        (**self).own_field(name)
    }
}

/// A detached `(key, entry)` pair, as produced when entries are taken out of a database
impl HasKey for (EntryKey, Entry) {
    fn entry_key(&self) -> &EntryKey {
        &self.0
    }
}

impl EntryFields for (EntryKey, Entry) {
    fn field(&self, name: &str) -> Option<&str> {
        self.1.field(name)
    }

    fn crossref(&self) -> Option<&EntryKey> {
        self.1.crossref()
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    key: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

/// Insertion-ordered collection of entries
#[derive(Debug, Clone, Default)]
pub struct Database {
    entries: Vec<(EntryKey, Entry)>,
    index: HashMap<EntryKey, usize>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from their JSON representation
    pub fn from_json(source: &str) -> Result<Self, DatabaseError> {
        let raw: Vec<RawEntry> = serde_json::from_str(source)?;
        let mut database = Database::new();
        for raw_entry in raw {
            let key = EntryKey::parse(&raw_entry.key)?;
            let entry = Entry::new(raw_entry.entry_type, raw_entry.fields).map_err(|source| {
                DatabaseError::Crossref {
                    entry: raw_entry.key.clone(),
                    source,
                }
            })?;
            database.add_entry(key, entry);
        }
        Ok(database)
    }

    /// Add an entry
    ///
    /// A repeated key is reported and ignored: the first entry wins. Returns whether the entry was
    /// added.
    pub fn add_entry(&mut self, key: EntryKey, entry: Entry) -> bool {
        if self.index.contains_key(&key) {
            tracing::warn!(key = %key, "repeated bibliography entry");
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, entry));
        true
    }

    pub fn get(&self, key: &EntryKey) -> Option<EntryView<'_>> {
        self.index.get(key).map(|&i| self.view(i))
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = EntryView<'_>> {
        (0..self.entries.len()).map(move |i| self.view(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every crossref points to an entry of the database
    pub fn check_crossrefs(&self) -> Result<(), DatabaseError> {
        for (key, entry) in &self.entries {
            if let Some(target) = entry.crossref() {
                if !self.index.contains_key(target) {
                    return Err(DatabaseError::MissingCrossref {
                        entry: key.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn view(&self, i: usize) -> EntryView<'_> {
        let (key, entry) = &self.entries[i];
        EntryView {
            database: self,
            key,
            entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRIES: &str = r#"[
        {"key": "EC15", "type": "proceedings",
         "fields": {"volume": "9056", "publisher": "Springer"}},
        {"key": "EC:Smith15", "type": "inproceedings",
         "fields": {"crossref": "EC15", "pages": "1--20", "title": "A paper"}},
        {"key": "EC:Doe15", "type": "inproceedings",
         "fields": {"crossref": "EC15", "volume": "9057"}}
    ]"#;

    #[test]
    fn test_from_json_keeps_order() {
        let db = Database::from_json(ENTRIES).unwrap();
        let keys: Vec<String> = db.iter().map(|view| view.key.to_string()).collect();
        assert_eq!(keys, vec!["EC15", "EC:Smith15", "EC:Doe15"]);
        db.check_crossrefs().unwrap();
    }

    #[test]
    fn test_crossref_fallback() {
        let db = Database::from_json(ENTRIES).unwrap();
        let smith = db.get(&EntryKey::paper("EC", "Smith", 15, "")).unwrap();
        assert_eq!(smith.crossref(), Some(&EntryKey::conference("EC", 15, "")));
        assert_eq!(smith.field("volume"), Some("9056"));
        assert_eq!(smith.pages(), Some("1--20"));
        assert_eq!(smith.field("publisher"), Some("Springer"));
        assert_eq!(smith.entry.volume(), None);

        let doe = db.get(&EntryKey::paper("EC", "Doe", 15, "")).unwrap();
        assert_eq!(doe.volume(), Some("9057"));
    }

    #[test]
    fn test_sort_fields_ignore_crossref() {
        let db = Database::from_json(ENTRIES).unwrap();
        let smith = db.get(&EntryKey::paper("EC", "Smith", 15, "")).unwrap();
        assert_eq!(smith.own_field("publisher"), None);
        assert_eq!(smith.volume(), None);
        assert_eq!(smith.number(), None);
    }

    #[test]
    fn test_repeated_entry_is_ignored() {
        let mut db = Database::new();
        let key = EntryKey::conference("EC", 15, "");
        let first = Entry::new("proceedings", BTreeMap::new()).unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("volume".to_string(), "1".to_string());
        let second = Entry::new("proceedings", fields).unwrap();

        assert!(db.add_entry(key.clone(), first));
        assert!(!db.add_entry(key.clone(), second));
        assert_eq!(db.len(), 1);
        assert_eq!(db.get(&key).unwrap().volume(), None);
    }

    #[test]
    fn test_invalid_key() {
        let err = Database::from_json(r#"[{"key": "15EC", "type": "misc"}]"#).unwrap_err();
        assert!(matches!(err, DatabaseError::Key(KeyParseError { ref key }) if key == "15EC"));
    }

    #[test]
    fn test_invalid_crossref() {
        let err = Database::from_json(
            r#"[{"key": "EC:Smith15", "type": "misc", "fields": {"crossref": "??"}}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::Crossref { ref entry, .. } if entry == "EC:Smith15"));
    }

    #[test]
    fn test_missing_crossref() {
        let db = Database::from_json(
            r#"[{"key": "EC:Smith15", "type": "misc", "fields": {"crossref": "EC15"}}]"#,
        )
        .unwrap();
        assert!(matches!(
            db.check_crossrefs(),
            Err(DatabaseError::MissingCrossref { .. })
        ));
    }
}
