use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::delete::DeleteFlow;
use super::filter::ListFilter;
use super::Filterable;
use crate::entities::Entity;
use crate::session::SessionStore;
use crate::store::{EntitySlice, FetchOutcome, StoreResult};

/// What a list page shows right now
#[derive(Debug, Clone, PartialEq)]
pub enum ListRender<E> {
    Loading,
    /// Last fetch failed and there is nothing cached to fall back on
    Error(String),
    /// Not loading and nothing passes the filter
    Empty,
    Rows(Vec<E>),
}

impl<E> ListRender<E> {
    pub fn rows(&self) -> &[E] {
        match self {
            ListRender::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Admin list page for one entity kind
pub struct ListView<E: Entity> {
    slice: Arc<EntitySlice<E>>,
    session: Arc<SessionStore>,
    filter: ListFilter,
    delete: DeleteFlow<E>,
}

impl<E: Entity> ListView<E> {
    pub fn new(slice: Arc<EntitySlice<E>>, session: Arc<SessionStore>) -> Self {
        let delete = DeleteFlow::new(slice.clone(), session.clone());
        Self {
            slice,
            session,
            filter: ListFilter::new(),
            delete,
        }
    }

    /// Page opened: load the admin list
    pub async fn mount(&self) -> StoreResult<FetchOutcome> {
        debug!(kind = %E::KIND, "list mounted");
        self.slice.fetch_admin().await
    }

    pub fn render(&self) -> ListRender<E> {
        let state = self.slice.snapshot();
        if state.admin_loading {
            return ListRender::Loading;
        }
        if state.items.is_empty() {
            if let Some(message) = state.error {
                return ListRender::Error(message);
            }
        }
        let rows = self.filter.apply(&state.items);
        if rows.is_empty() {
            ListRender::Empty
        } else {
            ListRender::Rows(rows)
        }
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.set_search(search);
    }

    pub fn set_facet(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.filter.set_facet(key, value);
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    /// Distinct values of one facet across the admin list, sorted
    pub fn facet_values(&self, key: &str) -> Vec<String> {
        self.slice
            .snapshot()
            .items
            .iter()
            .filter_map(|item| item.facet(key))
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Facet keys offered by this page
    pub fn facets(&self) -> &'static [&'static str] {
        <E as Filterable>::FACETS
    }

    /// Whether to show delete buttons
    pub fn can_delete(&self) -> bool {
        self.session.is_super_admin()
    }

    pub fn delete(&self) -> &DeleteFlow<E> {
        &self.delete
    }

    pub fn slice(&self) -> &Arc<EntitySlice<E>> {
        &self.slice
    }
}

impl<E: Entity> std::fmt::Debug for ListView<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("kind", &E::KIND)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
