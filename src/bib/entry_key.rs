//! Entry keys
//!
//! Every entry of the bibliography is identified by a compact key:
//!
//! ```text
//! EC15          proceedings of conference EC, 2015
//! C:Smith99a    paper in conference C, author part "Smith", 1999, disambiguation "a"
//! ESORICS13-2   second volume of the ESORICS 2013 proceedings
//! ```
//!
//! The year is stored on two digits. A key without author part denotes a proceedings volume rather
//! than a paper.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z]+)(?::([a-zA-Z\-_']+))?([0-9]+)(.*)$").unwrap());

/// The key did not match `confkey[:auth]year[dis]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParseError {
    pub key: String,
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error while parsing key \"{}\"", self.key)
    }
}

impl std::error::Error for KeyParseError {}

/// Structured form of an entry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    /// Conference abbreviation (letters only)
    pub confkey: String,
    /// Author part, `None` for a proceedings volume
    pub auth: Option<String>,
    /// Year modulo 100
    pub year: u8,
    /// Disambiguation suffix: "", "a", "b", "-1", "-2", ...
    pub dis: String,
}

impl EntryKey {
    /// Key of a proceedings volume. `year` may be given on two or four digits.
    pub fn conference(confkey: impl Into<String>, year: u32, dis: impl Into<String>) -> Self {
        EntryKey {
            confkey: confkey.into(),
            auth: None,
            year: (year % 100) as u8,
            dis: dis.into(),
        }
    }

    /// Key of a paper. `year` may be given on two or four digits.
    pub fn paper(
        confkey: impl Into<String>,
        auth: impl Into<String>,
        year: u32,
        dis: impl Into<String>,
    ) -> Self {
        EntryKey {
            confkey: confkey.into(),
            auth: Some(auth.into()),
            year: (year % 100) as u8,
            dis: dis.into(),
        }
    }

    /// True for papers, false for proceedings volumes
    pub fn is_paper(&self) -> bool {
        self.auth.is_some()
    }

    /// Decode a key string
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        let error = || KeyParseError { key: s.to_string() };
        let captures = KEY_REGEX.captures(s).ok_or_else(error)?;
        let (Some(confkey), Some(year)) = (captures.get(1), captures.get(3)) else {
            return Err(error());
        };

        // Only the last two digits matter, which also keeps long digit runs from overflowing
        let digits = year.as_str();
        let last_two = &digits[digits.len().saturating_sub(2)..];
        let year = last_two.parse::<u8>().map_err(|_| error())?;

        Ok(EntryKey {
            confkey: confkey.as_str().to_string(),
            auth: captures.get(2).map(|auth| auth.as_str().to_string()),
            year,
            dis: captures
                .get(4)
                .map(|dis| dis.as_str().to_string())
                .unwrap_or_default(),
        })
    }
}

impl FromStr for EntryKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKey::parse(s)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.auth {
            None => write!(f, "{}{:02}{}", self.confkey, self.year, self.dis),
            Some(auth) => write!(f, "{}:{}{:02}{}", self.confkey, auth, self.year, self.dis),
        }
    }
}
