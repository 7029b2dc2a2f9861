//! Display order of entries
//!
//!     Entries are listed grouped by venue (conferences first), newest year first, then grouped by
//!     the proceedings volume they crossref, then by ePrint report, volume, number and pages.
//!
//!     Each entry gets a [SortKey], a tuple of typed fragments compared left to right. Sorting is a
//!     stable sort on that key, so entries with equal keys keep their input order.
//!
//! Fragments
//!
//!     1. venue: `a-<name>` for registered conferences, `b-<name>` for other registered venues,
//!        `xxxxx<confkey>` for unknown confkeys
//!     2. year: `9999 - full year`, so that recent years come first
//!     3. disambiguation of the crossref target (`""` without crossref)
//!     4. ePrint report `year/number`; entries that are not ePrint reports come last
//!     5. volume and 6. number, in decreasing order (see [Descending])
//!     7. first page and 8. last page, compared as strings left-padded with `0` to 20 characters

use crate::bib::conference::ConferenceRegistry;
use crate::bib::database::{EntryFields, EntryView};
use crate::bib::entry_key::EntryKey;
use crate::bib::filter::HasKey;
use crate::bib::years::YearRule;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

static EPRINT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Cryptology ePrint Archive, Report ([0-9]+)/([0-9]+)").unwrap());

const PAGE_WIDTH: usize = 20;

/// Read-only configuration the ordering depends on
#[derive(Debug, Clone, Copy)]
pub struct OrderingContext<'a> {
    pub registry: &'a ConferenceRegistry,
    pub years: YearRule,
}

/// ePrint report fragment
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum EprintKey {
    Report { year: Digits, number: Digits },
    /// Sorts after every report
    NotEprint,
}

impl EprintKey {
    pub fn from_how_published(how_published: Option<&str>) -> Self {
        match how_published.and_then(|text| EPRINT_REGEX.captures(text)) {
            Some(captures) => EprintKey::Report {
                year: Digits::new(&captures[1]),
                number: Digits::new(&captures[2]),
            },
            None => EprintKey::NotEprint,
        }
    }
}

impl fmt::Display for EprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EprintKey::Report { year, number } => write!(f, "{:0>4}/{:0>5}", year, number),
            EprintKey::NotEprint => write!(f, "xxxx/xxxxx"),
        }
    }
}

/// Unsigned decimal integer of any width, compared by value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits(String);

impl Digits {
    /// `digits` must be ASCII digits; leading zeros are dropped
    pub fn new(digits: &str) -> Self {
        Digits(digits.trim_start_matches('0').to_string())
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_magnitude(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(if self.0.is_empty() { "0" } else { &self.0 })
    }
}

/// Volume or number fragment, ordered so that larger values come first
///
/// A field made only of ASCII digits is [Descending::Numeric] and compares by numeric value. Any
/// other text is [Descending::Text] and compares as the big-endian integer of its UTF-8 bytes.
/// Both orders are decreasing. A missing or empty field is [Descending::Absent] and comes first.
///
/// Mixing numeric and text values of the same field across a collection is not meaningful: all
/// numeric values then sort before all text values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descending {
    Absent,
    /// Digits without leading zeros
    Numeric(String),
    /// Bytes without leading zero bytes
    Text(Vec<u8>),
}

impl Descending {
    pub fn encode(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Descending::Absent,
            Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => {
                Descending::Numeric(digits.trim_start_matches('0').to_string())
            }
            Some(text) => {
                let bytes = text.as_bytes();
                let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
                Descending::Text(bytes[start..].to_vec())
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Descending::Absent => 0,
            Descending::Numeric(_) => 1,
            Descending::Text(_) => 2,
        }
    }
}

/// Compare two big-endian magnitudes without leading zeros
fn cmp_magnitude(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for Descending {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Descending::Numeric(a), Descending::Numeric(b)) => {
                cmp_magnitude(b.as_bytes(), a.as_bytes())
            }
            (Descending::Text(a), Descending::Text(b)) => cmp_magnitude(b, a),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Descending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Descending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descending::Absent => write!(f, "0"),
            Descending::Numeric(digits) => write!(f, "n:{}", digits),
            Descending::Text(bytes) => {
                write!(f, "t:")?;
                bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
            }
        }
    }
}

/// Composite sort key of one entry
///
/// Field order is comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub venue: String,
    pub reversed_year: u16,
    pub dis: String,
    pub eprint: EprintKey,
    pub volume: Descending,
    pub number: Descending,
    pub first_page: String,
    pub last_page: String,
}

/// Renders the key as one fixed-width string, for diagnostics
impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<15}-{:04}-{:<10}-{}-{:>10}-{:>10}-{}-{}",
            self.venue,
            self.reversed_year,
            self.dis,
            self.eprint,
            self.volume.to_string(),
            self.number.to_string(),
            self.first_page,
            self.last_page
        )
    }
}

/// A sort order over entries
pub trait EntrySort {
    type Key: Ord;

    fn key<T: HasKey + EntryFields>(&self, item: &T) -> Self::Key;

    /// Stable sort of `items` by key
    fn sort<T: HasKey + EntryFields>(&self, items: &mut [T]) {
        items.sort_by_cached_key(|item| self.key(item));
    }
}

/// The display order: venue, year (newest first), crossref volume, ePrint report, volume, number,
/// pages
#[derive(Debug, Clone, Copy)]
pub struct SortConfYearPage<'a> {
    context: OrderingContext<'a>,
}

impl<'a> SortConfYearPage<'a> {
    pub fn new(context: OrderingContext<'a>) -> Self {
        SortConfYearPage { context }
    }

    pub fn venue(&self, confkey: &str) -> String {
        match self.context.registry.get(confkey) {
            Some(conf) if conf.venue_type.is_conference() => format!("a-{}", conf.name),
            Some(conf) => format!("b-{}", conf.name),
            None => format!("xxxxx{}", confkey),
        }
    }

    pub fn reversed_year(&self, year: u8) -> u16 {
        9999 - self.context.years.short_to_full(year)
    }

    /// Sort key of one entry
    ///
    /// Only `dis` looks at the crossref target; the other fragments read the entry's own fields.
    pub fn sort_key<E: EntryFields + ?Sized>(&self, key: &EntryKey, entry: &E) -> SortKey {
        let (first_page, last_page) = page_range(key, entry.pages());
        SortKey {
            venue: self.venue(&key.confkey),
            reversed_year: self.reversed_year(key.year),
            dis: entry
                .crossref()
                .map(|target| target.dis.clone())
                .unwrap_or_default(),
            eprint: EprintKey::from_how_published(entry.how_published()),
            volume: Descending::encode(entry.volume()),
            number: Descending::encode(entry.number()),
            first_page: pad_page(&first_page),
            last_page: pad_page(&last_page),
        }
    }
}

impl EntrySort for SortConfYearPage<'_> {
    type Key = SortKey;

    fn key<T: HasKey + EntryFields>(&self, item: &T) -> SortKey {
        self.sort_key(item.entry_key(), item)
    }
}

/// Split a `start--end` page range
///
/// A single page gives `(page, page)`. Anything else is reported and degrades to `("0", "0")`;
/// a missing field is `("0", "0")` without warning. Pages are kept as text: `5:1--5:10` is valid.
pub fn page_range(key: &EntryKey, pages: Option<&str>) -> (String, String) {
    let Some(pages) = pages else {
        return ("0".to_string(), "0".to_string());
    };
    let parts: Vec<&str> = pages.split("--").map(str::trim).collect();
    let valid = |page: &str| !page.is_empty() && !page.contains(char::is_whitespace);

    match parts.as_slice() {
        [page] if valid(*page) => (page.to_string(), page.to_string()),
        [first, last] if valid(*first) && valid(*last) => (first.to_string(), last.to_string()),
        _ => {
            tracing::warn!(entry = %key, pages, "incorrect pages");
            ("0".to_string(), "0".to_string())
        }
    }
}

fn pad_page(page: &str) -> String {
    format!("{:0>width$}", page, width = PAGE_WIDTH)
}

/// Sort database entries in display order
pub fn sort_entries<'d>(entries: &mut [EntryView<'d>], context: OrderingContext<'_>) {
    SortConfYearPage::new(context).sort(entries);
}
