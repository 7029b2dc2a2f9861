//! Entry filters
//!
//! Filters select entries by key. They compose by chaining: `FilterConf::new("EC").and(FilterPaper)`
//! keeps only the papers of EC.

use crate::bib::entry_key::EntryKey;

pub trait EntryFilter {
    fn is_selected(&self, key: &EntryKey) -> bool;

    /// Keep the items whose key is selected
    fn filter<'a, T, I>(&'a self, items: I) -> Box<dyn Iterator<Item = T> + 'a>
    where
        Self: Sized,
        T: HasKey + 'a,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Box::new(
            items
                .into_iter()
                .filter(move |item| self.is_selected(item.entry_key())),
        )
    }

    /// Both filters must select the entry
    fn and<F: EntryFilter>(self, other: F) -> And<Self, F>
    where
        Self: Sized,
    {
        And(self, other)
    }
}

/// Anything carrying an entry key
pub trait HasKey {
    fn entry_key(&self) -> &EntryKey;
}

impl HasKey for EntryKey {
    fn entry_key(&self) -> &EntryKey {
        self
    }
}

impl HasKey for crate::bib::database::EntryView<'_> {
    fn entry_key(&self) -> &EntryKey {
        self.key
    }
}

impl<T: HasKey + ?Sized> HasKey for &T {
    fn entry_key(&self) -> &EntryKey {
        (**self).entry_key()
    }
}

/// Selects everything
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterAll;

impl EntryFilter for FilterAll {
    fn is_selected(&self, _key: &EntryKey) -> bool {
        true
    }
}

/// Selects papers, filters out proceedings volumes
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPaper;

impl EntryFilter for FilterPaper {
    fn is_selected(&self, key: &EntryKey) -> bool {
        key.is_paper()
    }
}

/// Selects entries of one conference
#[derive(Debug, Clone)]
pub struct FilterConf {
    confkey: String,
}

impl FilterConf {
    pub fn new(confkey: impl Into<String>) -> Self {
        FilterConf {
            confkey: confkey.into(),
        }
    }
}

impl EntryFilter for FilterConf {
    fn is_selected(&self, key: &EntryKey) -> bool {
        key.confkey == self.confkey
    }
}

#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<A: EntryFilter, B: EntryFilter> EntryFilter for And<A, B> {
    fn is_selected(&self, key: &EntryKey) -> bool {
        self.0.is_selected(key) && self.1.is_selected(key)
    }
}
