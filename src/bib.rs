//! Bibliography model
//!
//! Entries are identified by an [EntryKey] (`EC15`, `C:Smith99a`), stored in a [Database], and
//! listed in the order defined by [SortConfYearPage].

pub mod bibtex;
pub mod conference;
pub mod confs_years;
pub mod database;
pub mod entry_key;
pub mod filter;
pub mod ordering;
pub mod years;

pub use conference::{Conference, ConferenceRegistry, VenueType};
pub use database::{Database, DatabaseError, Entry, EntryFields, EntryView};
pub use entry_key::{EntryKey, KeyParseError};
pub use filter::{EntryFilter, FilterAll, FilterConf, FilterPaper, HasKey};
pub use ordering::{sort_entries, EntrySort, OrderingContext, SortConfYearPage, SortKey};
pub use years::YearRule;
