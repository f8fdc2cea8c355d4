use std::collections::BTreeMap;

use super::Filterable;

/// Facet value that means "no filter" in a dropdown
pub const ALL_VALUES: &str = "all";

/// Search text plus categorical filters, all AND-ed together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    search: String,
    facets: BTreeMap<String, String>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.set_search(search);
        self
    }

    pub fn with_facet(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_facet(key, value);
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Select a facet value; empty or [`ALL_VALUES`] removes the filter
    pub fn set_facet(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() || value == ALL_VALUES {
            self.facets.remove(&key);
        } else {
            self.facets.insert(key, value);
        }
    }

    pub fn facet(&self, key: &str) -> Option<&str> {
        self.facets.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.facets.is_empty()
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.facets.clear();
    }

    pub fn matches<E: Filterable>(&self, record: &E) -> bool {
        self.matches_search(record) && self.matches_facets(record)
    }

    /// Records passing the filter, in their original order
    pub fn apply<E: Filterable + Clone>(&self, records: &[E]) -> Vec<E> {
        records.iter().filter(|r| self.matches(*r)).cloned().collect()
    }

    fn matches_search<E: Filterable>(&self, record: &E) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_facets<E: Filterable>(&self, record: &E) -> bool {
        self.facets
            .iter()
            .all(|(key, wanted)| record.facet(key).as_deref() == Some(wanted.as_str()))
    }
}
