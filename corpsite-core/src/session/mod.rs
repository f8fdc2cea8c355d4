//! Admin session record
//!
//! The session is a bearer token plus the operator's profile, persisted as a
//! single JSON record. Its absence means "not logged in". It is created on
//! login/signup, read for every outbound request and destroyed on logout or on
//! any 401 from the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::storage::{ClientStorage, StorageError, StorageResult, SESSION_KEY};

/// Operator role as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
    /// Roles this client does not know about are kept but grant nothing
    #[serde(other)]
    Unknown,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Editor => "editor",
            AdminRole::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub username: String,
    pub email: String,
    pub role: AdminRole,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub admin: AdminProfile,
}

// Keep tokens out of logs
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("admin", &self.admin)
            .finish()
    }
}

/// Read/write surface for the persisted session
///
/// The record is cached in memory after [`SessionStore::load`]. `save` writes
/// storage before the cache; `clear` drops the cache first so a failing disk
/// can never keep a revoked token in use.
pub struct SessionStore {
    storage: Arc<dyn ClientStorage>,
    current: RwLock<Option<AuthSession>>,
}

impl SessionStore {
    /// Load the persisted session, discarding a record that no longer parses
    pub fn load(storage: Arc<dyn ClientStorage>) -> Self {
        let current = match storage.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable session record");
                    if let Err(e) = storage.remove(SESSION_KEY) {
                        warn!(error = %e, "could not remove unreadable session record");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read session record");
                None
            }
        };

        debug!(authenticated = current.is_some(), "session store loaded");
        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    /// Persist a freshly issued session
    pub fn save(&self, session: AuthSession) -> StorageResult<()> {
        let raw = serde_json::to_string(&session).map_err(|e| StorageError::Encode {
            key: SESSION_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.storage.set(SESSION_KEY, &raw)?;
        info!(username = %session.admin.username, role = session.admin.role.as_str(), "session started");
        *self.write() = Some(session);
        Ok(())
    }

    /// Forget the session in memory and in storage
    pub fn clear(&self) -> StorageResult<()> {
        let had_session = self.write().take().is_some();
        self.storage.remove(SESSION_KEY)?;
        if had_session {
            info!("session cleared");
        }
        Ok(())
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// UI affordance hint for destructive actions
    ///
    /// The backend makes the real decision; never gate anything security
    /// relevant on this.
    pub fn is_super_admin(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|s| s.admin.role == AdminRole::SuperAdmin)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthSession>> {
        self.current.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthSession>> {
        self.current.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &*self.read())
            .finish()
    }
}
