//! Years: two-digit year expansion and year-range queries
//!
//! Entry keys only store two-digit years. [YearRule] maps them back to full years. The year-range
//! parser handles the per-conference selection strings of the web front end (`2010`, `2010-`,
//! `2010-2015`, `-2015`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

static YEAR_RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]*)\s*(-\s*([0-9]*)\s*)?$").unwrap());

/// Expansion of two-digit years: below `pivot` is 20xx, otherwise 19xx
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearRule {
    pub pivot: u8,
}

impl Default for YearRule {
    fn default() -> Self {
        YearRule { pivot: 70 }
    }
}

impl YearRule {
    pub fn new(pivot: u8) -> Self {
        YearRule { pivot }
    }

    pub fn short_to_full(&self, year: u8) -> u16 {
        let year = u16::from(year % 100);
        if year < u16::from(self.pivot) {
            2000 + year
        } else {
            1900 + year
        }
    }

    pub fn full_to_short(&self, year: u16) -> u8 {
        (year % 100) as u8
    }
}

/// Errors of the year-range query parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearRangeError {
    /// The query is not of the form `a`, `a-`, `a-b` or `-b`
    Malformed { conf: String, input: String },
    /// The selected range is empty once clamped to the conference years
    Empty { conf: String, start: u16, end: u16 },
}

impl fmt::Display for YearRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearRangeError::Malformed { conf, input } => {
                write!(f, "Invalid year range \"{}\" for conference {}", input, conf)
            }
            YearRangeError::Empty { conf, start, end } => write!(
                f,
                "Empty year range {}-{} for conference {}",
                start, end, conf
            ),
        }
    }
}

impl std::error::Error for YearRangeError {}

/// Years available for one conference, as offered to the query parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfYearBounds {
    pub key: String,
    pub start_year: u16,
    pub end_year: u16,
}

/// Parse a year-range query for one conference
///
/// Returns `Ok(None)` when the query selects nothing (blank input). The selected range is clamped
/// to the bounds of the conference.
pub fn parse_year_range(
    input: &str,
    bounds: &ConfYearBounds,
) -> Result<Option<(u16, u16)>, YearRangeError> {
    let malformed = || YearRangeError::Malformed {
        conf: bounds.key.clone(),
        input: input.to_string(),
    };
    let captures = YEAR_RANGE_REGEX.captures(input).ok_or_else(malformed)?;

    let start = parse_year(captures.get(1).map(|m| m.as_str())).map_err(|_| malformed())?;
    let dash = captures.get(2).is_some();
    let end = parse_year(captures.get(3).map(|m| m.as_str())).map_err(|_| malformed())?;

    if start.is_none() && !dash {
        return Ok(None);
    }

    // A single year without dash selects only that year
    let end = if dash { end } else { start };

    let start = start.map_or(bounds.start_year, |y| y.max(bounds.start_year));
    let end = end.map_or(bounds.end_year, |y| y.min(bounds.end_year));

    if start > end {
        return Err(YearRangeError::Empty {
            conf: bounds.key.clone(),
            start,
            end,
        });
    }
    Ok(Some((start, end)))
}

fn parse_year(digits: Option<&str>) -> Result<Option<u16>, std::num::ParseIntError> {
    match digits {
        None | Some("") => Ok(None),
        Some(digits) => digits.parse().map(Some),
    }
}

/// Outcome of [parse_year_ranges]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSelection {
    /// Conferences whose query could not be honored
    pub errors: BTreeMap<String, YearRangeError>,
    /// Selected ranges, per conference
    pub years: BTreeMap<String, (u16, u16)>,
}

impl YearSelection {
    /// Number of conferences with a selected range
    pub fn count(&self) -> usize {
        self.years.len()
    }
}

/// Parse the year-range queries of several conferences
///
/// `query` gives the raw input per conference key; conferences without input select nothing.
pub fn parse_year_ranges<'a, I>(confs: I, query: &BTreeMap<String, String>) -> YearSelection
where
    I: IntoIterator<Item = &'a ConfYearBounds>,
{
    let mut selection = YearSelection::default();
    for bounds in confs {
        let Some(input) = query.get(&bounds.key) else {
            continue;
        };
        match parse_year_range(input, bounds) {
            Ok(Some(range)) => {
                selection.years.insert(bounds.key.clone(), range);
            }
            Ok(None) => {}
            Err(err) => {
                selection.errors.insert(bounds.key.clone(), err);
            }
        }
    }
    selection
}
