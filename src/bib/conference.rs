//! Conference registry
//!
//! The registry maps each confkey to the venue's display name and type. It is read from a bibyml
//! document with one top-level key per venue:
//!
//! ```text
//! EC:
//!     name:                   Eurocrypt
//!     type:                   conf
//! JC:
//!     name:                   Journal of Cryptology
//!     type:                   journal
//!     missing_years:          1987
//! ```
//!
//! `missing_years` lists years (space or comma separated) known to have no entries, so that gaps in
//! the database are not reported for them.

use crate::bibyml::BibYmlNode;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueType {
    Conference,
    Journal,
    Other(String),
}

impl VenueType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "conf" => VenueType::Conference,
            "journal" => VenueType::Journal,
            other => VenueType::Other(other.to_string()),
        }
    }

    pub fn is_conference(&self) -> bool {
        matches!(self, VenueType::Conference)
    }
}

/// One registered venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conference {
    pub name: String,
    pub venue_type: VenueType,
    pub missing_years: BTreeSet<u16>,
}

/// Errors while reading the registry from a bibyml tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    MissingName { confkey: String },
    InvalidMissingYear { confkey: String, value: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::MissingName { confkey } => {
                write!(f, "Conference \"{}\" has no name", confkey)
            }
            RegistryError::InvalidMissingYear { confkey, value } => write!(
                f,
                "Conference \"{}\": invalid missing year \"{}\"",
                confkey, value
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Read-only view of the known venues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConferenceRegistry {
    confs: BTreeMap<String, Conference>,
}

impl ConferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, confkey: impl Into<String>, conference: Conference) {
        self.confs.insert(confkey.into(), conference);
    }

    /// Build the registry from a parsed bibyml document
    ///
    /// A venue without `type` is treated as a conference.
    pub fn from_bibyml(root: &BibYmlNode) -> Result<Self, RegistryError> {
        let mut registry = ConferenceRegistry::new();
        for (confkey, node) in root.children() {
            let name = node
                .value_of("name")
                .ok_or_else(|| RegistryError::MissingName {
                    confkey: confkey.to_string(),
                })?;
            let venue_type = VenueType::from_name(node.value_of("type").unwrap_or("conf"));
            let missing_years = node
                .value_of("missing_years")
                .map(|years| parse_missing_years(confkey, years))
                .transpose()?
                .unwrap_or_default();

            registry.register(
                confkey,
                Conference {
                    name: name.to_string(),
                    venue_type,
                    missing_years,
                },
            );
        }
        Ok(registry)
    }

    pub fn get(&self, confkey: &str) -> Option<&Conference> {
        self.confs.get(confkey)
    }

    pub fn contains(&self, confkey: &str) -> bool {
        self.confs.contains_key(confkey)
    }

    /// Declared missing years of every venue that has some
    pub fn missing_years(&self) -> BTreeMap<String, BTreeSet<u16>> {
        self.confs
            .iter()
            .filter(|(_, conf)| !conf.missing_years.is_empty())
            .map(|(key, conf)| (key.clone(), conf.missing_years.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Conference)> {
        self.confs.iter().map(|(key, conf)| (key.as_str(), conf))
    }

    pub fn len(&self) -> usize {
        self.confs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confs.is_empty()
    }
}

fn parse_missing_years(confkey: &str, years: &str) -> Result<BTreeSet<u16>, RegistryError> {
    years
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|year| !year.is_empty())
        .map(|year| {
            year.parse::<u16>()
                .map_err(|_| RegistryError::InvalidMissingYear {
                    confkey: confkey.to_string(),
                    value: year.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibyml::parse;

    const CONFS: &str = "\
EC:
    name: Eurocrypt
    type: conf
JC:
    name: Journal of Cryptology
    type: journal
    missing_years: 1987, 1989
C:
    name: Crypto
";

    #[test]
    fn test_from_bibyml() {
        let registry = ConferenceRegistry::from_bibyml(&parse(CONFS).unwrap()).unwrap();
        assert_eq!(registry.len(), 3);

        let ec = registry.get("EC").unwrap();
        assert_eq!(ec.name, "Eurocrypt");
        assert!(ec.venue_type.is_conference());

        let jc = registry.get("JC").unwrap();
        assert_eq!(jc.venue_type, VenueType::Journal);
        assert_eq!(jc.missing_years.iter().copied().collect::<Vec<_>>(), vec![1987, 1989]);

        assert!(registry.get("C").unwrap().venue_type.is_conference());
        assert!(!registry.contains("AC"));
        assert_eq!(registry.missing_years().len(), 1);
    }

    #[test]
    fn test_missing_name() {
        let root = parse("EC:\n    type: conf\n").unwrap();
        assert_eq!(
            ConferenceRegistry::from_bibyml(&root),
            Err(RegistryError::MissingName {
                confkey: "EC".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_missing_year() {
        let root = parse("EC:\n    name: Eurocrypt\n    missing_years: 1990 soon\n").unwrap();
        assert!(matches!(
            ConferenceRegistry::from_bibyml(&root),
            Err(RegistryError::InvalidMissingYear { value, .. }) if value == "soon"
        ));
    }
}
