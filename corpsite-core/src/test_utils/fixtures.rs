//! Test fixtures
//!
//! Factories for records, sessions and a fully wired [`AppContext`] that
//! keeps everything in memory.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::Config;
use crate::context::AppContext;
use crate::entities::{Career, EntityId, Press, Project};
use crate::session::{AdminProfile, AdminRole, AuthSession};
use crate::storage::{ClientStorage, MemoryStorage};

pub const SUPER_ADMIN_EMAIL: &str = "root@corpsite.test";
pub const EDITOR_EMAIL: &str = "editor@corpsite.test";
pub const TEST_PASSWORD: &str = "password123";

/// Config pointing at `base_url` with in-memory storage
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.storage.ephemeral = true;
    config
}

/// Context over fresh in-memory storage
pub fn test_context(base_url: &str) -> AppContext {
    test_context_with_storage(base_url, Arc::new(MemoryStorage::new()))
}

pub fn test_context_with_storage(base_url: &str, storage: Arc<dyn ClientStorage>) -> AppContext {
    AppContext::with_storage(test_config(base_url), storage).expect("test context should build")
}

pub fn session(token: &str, role: AdminRole) -> AuthSession {
    AuthSession {
        token: token.to_string(),
        admin: AdminProfile {
            username: "tester".to_string(),
            email: "tester@corpsite.test".to_string(),
            role,
        },
    }
}

pub fn project(id: i64, title: &str) -> Project {
    Project {
        id: Some(EntityId::Int(id)),
        title: title.to_string(),
        category: "commercial".to_string(),
        location: "Riyadh".to_string(),
        is_active: true,
        ..Default::default()
    }
}

/// Unsaved project that passes validation
pub fn new_project(title: &str) -> Project {
    Project {
        id: None,
        ..project(0, title)
    }
}

pub fn career(id: i64, title: &str, department: &str) -> Career {
    Career {
        id: Some(EntityId::Int(id)),
        title: title.to_string(),
        department: department.to_string(),
        location: "Jeddah".to_string(),
        employment_type: "full-time".to_string(),
        is_active: true,
        ..Default::default()
    }
}

pub fn press(id: i64, title: &str, published: bool) -> Press {
    Press {
        id: Some(EntityId::Int(id)),
        title: title.to_string(),
        category: "news".to_string(),
        is_published: published,
        ..Default::default()
    }
}

/// Raw project record as the backend stores it
pub fn project_json(title: &str, active: bool) -> Value {
    json!({
        "title": title,
        "category": "commercial",
        "location": "Riyadh",
        "isActive": active,
    })
}
