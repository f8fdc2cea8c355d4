//! Client-side entity cache
//!
//! One [`EntitySlice`] per entity kind, bundled into an [`EntityStore`] that
//! views share. The store is the only writer of entity state; views read
//! snapshots or subscribe for changes.

mod error;
mod guard;
mod slice;
mod state;

pub use error::{StoreError, StoreResult};
pub(crate) use guard::DropGuard;
pub use slice::{EntitySlice, FetchOutcome};
pub use state::{Lane, LaneStatus, SliceState};

use std::sync::Arc;
use tracing::info;

use crate::api::ApiClient;
use crate::entities::{Award, Career, Company, EntityKind, Partnership, Press, Project};

/// All six slices over one API client
#[derive(Debug)]
pub struct EntityStore {
    pub projects: Arc<EntitySlice<Project>>,
    pub partnerships: Arc<EntitySlice<Partnership>>,
    pub awards: Arc<EntitySlice<Award>>,
    pub careers: Arc<EntitySlice<Career>>,
    pub press: Arc<EntitySlice<Press>>,
    pub companies: Arc<EntitySlice<Company>>,
}

impl EntityStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            projects: Arc::new(EntitySlice::new(client.clone())),
            partnerships: Arc::new(EntitySlice::new(client.clone())),
            awards: Arc::new(EntitySlice::new(client.clone())),
            careers: Arc::new(EntitySlice::new(client.clone())),
            press: Arc::new(EntitySlice::new(client.clone())),
            companies: Arc::new(EntitySlice::new(client)),
        }
    }

    /// Load the public list of every kind, as the landing page does
    ///
    /// Failures are recorded on each slice; the count of kinds that loaded is
    /// returned.
    pub async fn load_public(&self) -> usize {
        let results = tokio::join!(
            self.projects.fetch_public(),
            self.partnerships.fetch_public(),
            self.awards.fetch_public(),
            self.careers.fetch_public(),
            self.press.fetch_public(),
            self.companies.fetch_public(),
        );
        let loaded = [
            results.0.is_ok(),
            results.1.is_ok(),
            results.2.is_ok(),
            results.3.is_ok(),
            results.4.is_ok(),
            results.5.is_ok(),
        ]
        .into_iter()
        .filter(|ok| *ok)
        .count();
        info!(loaded, total = EntityKind::ALL.len(), "public content loaded");
        loaded
    }

    /// Admin-list sizes per kind, for the dashboard
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        vec![
            (EntityKind::Projects, self.projects.snapshot().items.len()),
            (EntityKind::Partnerships, self.partnerships.snapshot().items.len()),
            (EntityKind::Awards, self.awards.snapshot().items.len()),
            (EntityKind::Careers, self.careers.snapshot().items.len()),
            (EntityKind::Press, self.press.snapshot().items.len()),
            (EntityKind::Companies, self.companies.snapshot().items.len()),
        ]
    }
}
