//! Years covered by each conference
//!
//! The database is expected to hold every year of a conference between the first and the last
//! one. Gaps are reported, and the interval is then cut so that it only covers the contiguous
//! years after the last gap. Years a venue genuinely skipped are declared in the registry
//! (`missing_years`) and do not count as gaps.

use crate::bib::database::Database;
use crate::bib::years::YearRule;
use std::collections::{BTreeMap, BTreeSet};

/// Full years of the papers of each confkey (proceedings volumes are ignored)
pub fn confs_years(database: &Database, years: YearRule) -> BTreeMap<String, BTreeSet<u16>> {
    let mut confs: BTreeMap<String, BTreeSet<u16>> = BTreeMap::new();
    for view in database.iter().filter(|view| view.key.is_paper()) {
        confs
            .entry(view.key.confkey.clone())
            .or_default()
            .insert(years.short_to_full(view.key.year));
    }
    confs
}

/// Turn year sets into `(min, max)` intervals
///
/// When years are missing between min and max (and not declared in `missing_years`), a warning
/// lists them and the min year becomes the year after the last missing one.
pub fn confs_years_intervals(
    confs: &BTreeMap<String, BTreeSet<u16>>,
    missing_years: &BTreeMap<String, BTreeSet<u16>>,
) -> BTreeMap<String, (u16, u16)> {
    let no_exception = BTreeSet::new();
    confs
        .iter()
        .filter_map(|(conf, years)| {
            let (&min, &max) = (years.first()?, years.last()?);
            let declared = missing_years.get(conf).unwrap_or(&no_exception);
            let missing: Vec<u16> = (min..=max)
                .filter(|year| !years.contains(year) && !declared.contains(year))
                .collect();

            let min = match missing.last() {
                Some(&last_missing) => {
                    let corrected = last_missing + 1;
                    let listed = missing
                        .iter()
                        .map(u16::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    tracing::warn!(
                        conference = %conf,
                        missing = %listed,
                        min_year = corrected,
                        "years are missing, min year corrected; declare missing_years in the \
                         conference registry to silence this"
                    );
                    corrected
                }
                None => min,
            };
            Some((conf.clone(), (min, max)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bib::database::Entry;
    use crate::bib::entry_key::EntryKey;

    fn set(years: &[u16]) -> BTreeSet<u16> {
        years.iter().copied().collect()
    }

    #[test]
    fn test_confs_years_only_counts_papers() {
        let mut db = Database::new();
        for key in ["EC:Smith15", "EC:Doe99", "EC16", "C:Smith01"] {
            db.add_entry(
                EntryKey::parse(key).unwrap(),
                Entry::new("misc", BTreeMap::new()).unwrap(),
            );
        }
        let confs = confs_years(&db, YearRule::default());
        assert_eq!(confs.get("EC"), Some(&set(&[1999, 2015])));
        assert_eq!(confs.get("C"), Some(&set(&[2001])));
    }

    #[test]
    fn test_contiguous_years() {
        let mut confs = BTreeMap::new();
        confs.insert("EC".to_string(), set(&[2013, 2014, 2015]));
        let intervals = confs_years_intervals(&confs, &BTreeMap::new());
        assert_eq!(intervals.get("EC"), Some(&(2013, 2015)));
    }

    #[test]
    fn test_gap_moves_min_year() {
        let mut confs = BTreeMap::new();
        confs.insert("EC".to_string(), set(&[2010, 2012, 2014, 2015]));
        let intervals = confs_years_intervals(&confs, &BTreeMap::new());
        assert_eq!(intervals.get("EC"), Some(&(2014, 2015)));
    }

    #[test]
    fn test_declared_missing_years_are_not_gaps() {
        let mut confs = BTreeMap::new();
        confs.insert("EC".to_string(), set(&[2010, 2012, 2014, 2015]));
        let mut missing = BTreeMap::new();
        missing.insert("EC".to_string(), set(&[2011, 2013]));
        let intervals = confs_years_intervals(&confs, &missing);
        assert_eq!(intervals.get("EC"), Some(&(2010, 2015)));
    }
}
