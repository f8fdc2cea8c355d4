//! Slice state and its transitions

use crate::entities::{Entity, EntityId};

/// One of the three independent request lanes of a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Admin,
    Public,
    Mutate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaneStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Everything a list or carousel needs to render one entity kind
#[derive(Debug, Clone)]
pub struct SliceState<E> {
    /// Admin-scoped list, may include hidden records
    pub items: Vec<E>,
    /// Public-scoped list, filtered by the backend
    pub public_items: Vec<E>,
    pub admin_loading: bool,
    pub public_loading: bool,
    /// At least one create/update/remove is in flight
    pub mutating: bool,
    /// Last admin fetch failure
    pub error: Option<String>,
    /// Last public fetch failure
    pub public_error: Option<String>,
    /// Last mutation failure
    pub mutation_error: Option<String>,
    pub admin_status: LaneStatus,
    pub public_status: LaneStatus,
    pub mutate_status: LaneStatus,
    pending_mutations: usize,
}

impl<E> Default for SliceState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            public_items: Vec::new(),
            admin_loading: false,
            public_loading: false,
            mutating: false,
            error: None,
            public_error: None,
            mutation_error: None,
            admin_status: LaneStatus::Idle,
            public_status: LaneStatus::Idle,
            mutate_status: LaneStatus::Idle,
            pending_mutations: 0,
        }
    }
}

impl<E: Entity> SliceState<E> {
    pub fn status(&self, lane: Lane) -> LaneStatus {
        match lane {
            Lane::Admin => self.admin_status,
            Lane::Public => self.public_status,
            Lane::Mutate => self.mutate_status,
        }
    }

    pub fn find(&self, id: &EntityId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == Some(id))
    }

    pub(crate) fn begin_fetch(&mut self, lane: Lane) {
        match lane {
            Lane::Admin => {
                self.admin_loading = true;
                self.admin_status = LaneStatus::Pending;
            }
            Lane::Public => {
                self.public_loading = true;
                self.public_status = LaneStatus::Pending;
            }
            Lane::Mutate => unreachable!("mutations use begin_mutation"),
        }
    }

    pub(crate) fn fulfil_fetch(&mut self, lane: Lane, records: Vec<E>) {
        match lane {
            Lane::Admin => {
                self.items = records;
                self.admin_loading = false;
                self.error = None;
                self.admin_status = LaneStatus::Fulfilled;
            }
            Lane::Public => {
                self.public_items = records;
                self.public_loading = false;
                self.public_error = None;
                self.public_status = LaneStatus::Fulfilled;
            }
            Lane::Mutate => unreachable!("mutations use finish_mutation"),
        }
    }

    pub(crate) fn reject_fetch(&mut self, lane: Lane, message: String) {
        match lane {
            Lane::Admin => {
                self.admin_loading = false;
                self.error = Some(message);
                self.admin_status = LaneStatus::Rejected;
            }
            Lane::Public => {
                self.public_loading = false;
                self.public_error = Some(message);
                self.public_status = LaneStatus::Rejected;
            }
            Lane::Mutate => unreachable!("mutations use fail_mutation"),
        }
    }

    /// End an in-flight fetch whose response will never be applied
    ///
    /// Used when the request future was dropped, or when a mutation made the
    /// pending response obsolete. The list and last error are kept.
    pub(crate) fn settle_fetch(&mut self, lane: Lane) {
        let (loading, status) = match lane {
            Lane::Admin => (&mut self.admin_loading, &mut self.admin_status),
            Lane::Public => (&mut self.public_loading, &mut self.public_status),
            Lane::Mutate => unreachable!("mutations use abandon_mutation"),
        };
        *loading = false;
        if *status == LaneStatus::Pending {
            *status = LaneStatus::Idle;
        }
    }

    pub(crate) fn begin_mutation(&mut self) {
        self.pending_mutations += 1;
        self.mutating = true;
        self.mutate_status = LaneStatus::Pending;
    }

    pub(crate) fn finish_mutation(&mut self) {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        self.mutating = self.pending_mutations > 0;
        self.mutation_error = None;
        self.mutate_status = LaneStatus::Fulfilled;
    }

    pub(crate) fn fail_mutation(&mut self, message: String) {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        self.mutating = self.pending_mutations > 0;
        self.mutation_error = Some(message);
        self.mutate_status = LaneStatus::Rejected;
    }

    /// A mutation future was dropped before the backend answered
    pub(crate) fn abandon_mutation(&mut self) {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        self.mutating = self.pending_mutations > 0;
        if !self.mutating && self.mutate_status == LaneStatus::Pending {
            self.mutate_status = LaneStatus::Idle;
        }
    }

    /// Append, or replace the record with the same id
    pub(crate) fn upsert(&mut self, record: E) {
        let position = record
            .id()
            .and_then(|id| self.items.iter().position(|item| item.id() == Some(id)));
        match position {
            Some(index) => self.items[index] = record.clone(),
            None => self.items.push(record.clone()),
        }
        self.reconcile_public(record);
    }

    /// Keep an already-public copy in step with an edit
    fn reconcile_public(&mut self, record: E) {
        let Some(id) = record.id() else { return };
        let Some(index) = self.public_items.iter().position(|item| item.id() == Some(id)) else {
            return;
        };
        if record.is_visible() {
            self.public_items[index] = record;
        } else {
            self.public_items.remove(index);
        }
    }

    pub(crate) fn remove(&mut self, id: &EntityId) {
        self.items.retain(|item| item.id() != Some(id));
        self.public_items.retain(|item| item.id() != Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Project;

    fn project(id: i64, title: &str, active: bool) -> Project {
        Project {
            id: Some(EntityId::Int(id)),
            title: title.to_string(),
            is_active: active,
            ..Default::default()
        }
    }

    #[test]
    fn test_fetch_transitions() {
        let mut state = SliceState::<Project>::default();
        assert_eq!(state.status(Lane::Admin), LaneStatus::Idle);

        state.begin_fetch(Lane::Admin);
        assert!(state.admin_loading);
        assert!(!state.public_loading);

        state.fulfil_fetch(Lane::Admin, vec![project(1, "A", true)]);
        assert!(!state.admin_loading);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.status(Lane::Admin), LaneStatus::Fulfilled);

        state.begin_fetch(Lane::Admin);
        state.reject_fetch(Lane::Admin, "boom".to_string());
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.items.len(), 1, "failed fetch keeps the previous list");
    }

    #[test]
    fn test_upsert_appends_then_replaces() {
        let mut state = SliceState::<Project>::default();
        state.upsert(project(1, "A", true));
        state.upsert(project(2, "B", true));
        state.upsert(project(1, "A2", true));

        let titles: Vec<_> = state.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A2", "B"]);
    }

    #[test]
    fn test_hiding_a_record_drops_it_from_public_list() {
        let mut state = SliceState::<Project>::default();
        state.fulfil_fetch(Lane::Public, vec![project(1, "A", true)]);
        state.fulfil_fetch(Lane::Admin, vec![project(1, "A", true)]);

        state.upsert(project(1, "A", false));
        assert!(state.public_items.is_empty());
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_remove_from_both_lists() {
        let mut state = SliceState::<Project>::default();
        state.fulfil_fetch(Lane::Admin, vec![project(1, "A", true), project(2, "B", false)]);
        state.fulfil_fetch(Lane::Public, vec![project(1, "A", true)]);

        state.remove(&EntityId::Int(1));
        assert_eq!(state.items.len(), 1);
        assert!(state.public_items.is_empty());
    }

    #[test]
    fn test_overlapping_mutations() {
        let mut state = SliceState::<Project>::default();
        state.begin_mutation();
        state.begin_mutation();
        state.finish_mutation();
        assert!(state.mutating);
        state.fail_mutation("nope".to_string());
        assert!(!state.mutating);
        assert_eq!(state.mutate_status, LaneStatus::Rejected);
    }

    #[test]
    fn test_abandoned_mutation_releases_flag() {
        let mut state = SliceState::<Project>::default();
        state.begin_mutation();
        state.begin_mutation();
        state.abandon_mutation();
        assert!(state.mutating);
        assert_eq!(state.mutate_status, LaneStatus::Pending);

        state.abandon_mutation();
        assert!(!state.mutating);
        assert_eq!(state.mutate_status, LaneStatus::Idle);
        assert_eq!(state.mutation_error, None);
    }

    #[test]
    fn test_settle_fetch_keeps_list_and_error() {
        let mut state = SliceState::<Project>::default();
        state.fulfil_fetch(Lane::Admin, vec![project(1, "A", true)]);
        state.begin_fetch(Lane::Admin);
        state.begin_fetch(Lane::Public);

        state.settle_fetch(Lane::Admin);
        assert!(!state.admin_loading);
        assert!(state.public_loading);
        assert_eq!(state.status(Lane::Admin), LaneStatus::Idle);
        assert_eq!(state.items.len(), 1);

        state.reject_fetch(Lane::Public, "down".to_string());
        state.settle_fetch(Lane::Public);
        assert_eq!(state.status(Lane::Public), LaneStatus::Rejected);
        assert_eq!(state.public_error.as_deref(), Some("down"));
    }
}
