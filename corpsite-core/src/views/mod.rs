//! Admin list pages
//!
//! Each entity kind gets the same page: a filtered table over the admin list,
//! a loading and empty state, and a confirm-before-delete modal.

mod delete;
mod filter;
mod list;

pub use delete::{ConfirmOutcome, DeleteFlow, DeleteState};
pub use filter::{ListFilter, ALL_VALUES};
pub use list::{ListRender, ListView};

use thiserror::Error;

use crate::store::StoreError;

/// Record types a list page can search and narrow down
pub trait Filterable {
    /// Categorical filters the page offers, as facet keys
    const FACETS: &'static [&'static str];

    /// Text the search box is matched against
    fn search_fields(&self) -> Vec<&str>;

    /// Value of one facet for this record; `None` for unknown keys
    fn facet(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Error)]
pub enum ViewError {
    /// The session does not carry the super-admin role
    #[error("Only super admins can delete records")]
    NotPermitted,

    #[error(transparent)]
    Store(#[from] StoreError),
}
