//! Confirm-before-delete modal

use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::ViewError;
use crate::entities::{Entity, EntityId};
use crate::session::SessionStore;
use crate::store::{DropGuard, EntitySlice};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    /// Modal open; `error` holds the last failed attempt, if any
    Confirming { id: EntityId, error: Option<String> },
    /// Delete request in flight
    Removing { id: EntityId },
}

impl DeleteState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DeleteState::Idle)
    }

    pub fn selected(&self) -> Option<&EntityId> {
        match self {
            DeleteState::Idle => None,
            DeleteState::Confirming { id, .. } | DeleteState::Removing { id } => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Removed(EntityId),
    /// A delete is already in flight; nothing was sent
    AlreadyPending,
    /// Confirm pressed with no open modal
    NothingSelected,
}

/// Two-step delete: select a row, then confirm
///
/// Each confirmation sends at most one request no matter how often the
/// confirm button is pressed while it is in flight.
pub struct DeleteFlow<E: Entity> {
    slice: Arc<EntitySlice<E>>,
    session: Arc<SessionStore>,
    state: Mutex<DeleteState>,
}

impl<E: Entity> DeleteFlow<E> {
    pub fn new(slice: Arc<EntitySlice<E>>, session: Arc<SessionStore>) -> Self {
        Self {
            slice,
            session,
            state: Mutex::new(DeleteState::Idle),
        }
    }

    pub fn state(&self) -> DeleteState {
        self.lock().clone()
    }

    /// Open the modal for `id`
    ///
    /// Refused when the session lacks the super-admin role. The backend has
    /// the final say either way.
    pub fn select(&self, id: EntityId) -> Result<(), ViewError> {
        if !self.session.is_super_admin() {
            return Err(ViewError::NotPermitted);
        }
        let mut state = self.lock();
        if matches!(*state, DeleteState::Removing { .. }) {
            debug!(kind = %E::KIND, "delete in flight, selection ignored");
            return Ok(());
        }
        *state = DeleteState::Confirming { id, error: None };
        Ok(())
    }

    pub fn cancel(&self) {
        let mut state = self.lock();
        if !matches!(*state, DeleteState::Removing { .. }) {
            *state = DeleteState::Idle;
        }
    }

    /// Send the delete for the selected record
    ///
    /// On failure the modal stays open with the error message attached. If the
    /// returned future is dropped before the backend answers, the modal goes
    /// back to `Confirming` without an error.
    pub async fn confirm(&self) -> Result<ConfirmOutcome, ViewError> {
        let id = {
            let mut state = self.lock();
            match &*state {
                DeleteState::Idle => return Ok(ConfirmOutcome::NothingSelected),
                DeleteState::Removing { .. } => return Ok(ConfirmOutcome::AlreadyPending),
                DeleteState::Confirming { id, .. } => {
                    let id = id.clone();
                    *state = DeleteState::Removing { id: id.clone() };
                    id
                }
            }
        };

        // dropped midway: reopen the modal so the operator can retry or cancel
        let guard = DropGuard::new(|| {
            let mut state = self.lock();
            if matches!(&*state, DeleteState::Removing { id: pending } if *pending == id) {
                *state = DeleteState::Confirming {
                    id: id.clone(),
                    error: None,
                };
                debug!(kind = %E::KIND, %id, "delete abandoned, modal reopened");
            }
        });
        let result = self.slice.remove(&id).await;
        guard.disarm();

        match result {
            Ok(()) => {
                *self.lock() = DeleteState::Idle;
                info!(kind = %E::KIND, %id, "delete confirmed");
                Ok(ConfirmOutcome::Removed(id))
            }
            Err(e) => {
                let message = e.user_message(self.slice.language());
                *self.lock() = DeleteState::Confirming {
                    id,
                    error: Some(message),
                };
                Err(e.into())
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DeleteState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl<E: Entity> std::fmt::Debug for DeleteFlow<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteFlow")
            .field("kind", &E::KIND)
            .field("state", &self.state())
            .finish()
    }
}
