//! Shared state of the mock backend

use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use super::types::{AdminAccount, RecordedRequest};
use crate::entities::EntityKind;
use crate::session::{AdminProfile, AdminRole};

/// Records, accounts and a request log, shared across handlers
#[derive(Debug, Default)]
pub struct MockState {
    accounts: RwLock<HashMap<String, AdminAccount>>,
    tokens: RwLock<HashMap<String, String>>,
    records: RwLock<HashMap<EntityKind, Vec<Map<String, Value>>>>,
    requests: RwLock<Vec<RecordedRequest>>,
    list_delays: RwLock<VecDeque<Duration>>,
    next_id: AtomicI64,
    deletes: AtomicUsize,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Backend with one account of the given role
    pub fn with_admin(username: &str, email: &str, password: &str, role: AdminRole) -> Self {
        let state = Self::new();
        state.add_account(AdminAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        });
        state
    }

    /// A populated backend for manual testing
    pub fn demo() -> Self {
        let state = Self::with_admin("root", "admin@corpsite.test", "password", AdminRole::SuperAdmin);
        state.seed(
            EntityKind::Projects,
            (1..=8).map(|n| {
                serde_json::json!({
                    "title": format!("Project {n}"),
                    "category": if n % 2 == 0 { "commercial" } else { "residential" },
                    "location": "Riyadh",
                    "isActive": n != 8,
                })
            }),
        );
        state.seed(
            EntityKind::Careers,
            [serde_json::json!({
                "title": "Site Engineer",
                "department": "Engineering",
                "employmentType": "full-time",
                "isActive": true,
            })],
        );
        state.seed(
            EntityKind::Press,
            [serde_json::json!({
                "title": "Tower topping-out ceremony",
                "category": "news",
                "isPublished": true,
            })],
        );
        state
    }

    pub fn add_account(&self, account: AdminAccount) {
        write(&self.accounts).insert(account.email.to_lowercase(), account);
    }

    pub fn has_accounts(&self) -> bool {
        !read(&self.accounts).is_empty()
    }

    pub fn has_account(&self, email: &str) -> bool {
        read(&self.accounts).contains_key(&email.to_lowercase())
    }

    /// Check credentials and hand out a fresh token
    pub fn authenticate(&self, email: &str, password: &str) -> Option<(String, AdminProfile)> {
        let account = read(&self.accounts).get(&email.to_lowercase()).cloned()?;
        if account.password != password {
            return None;
        }
        Some((self.issue_token(&account.email), profile(&account)))
    }

    pub fn issue_token(&self, email: &str) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        write(&self.tokens).insert(token.clone(), email.to_lowercase());
        token
    }

    pub fn revoke_tokens(&self) {
        write(&self.tokens).clear();
    }

    pub fn admin_for_token(&self, token: &str) -> Option<AdminProfile> {
        let email = read(&self.tokens).get(token).cloned()?;
        read(&self.accounts).get(&email).map(profile)
    }

    /// Insert records, assigning ids to those without one
    pub fn seed(&self, kind: EntityKind, records: impl IntoIterator<Item = Value>) {
        for record in records {
            if let Value::Object(map) = record {
                self.insert(kind, map);
            }
        }
    }

    pub fn insert(&self, kind: EntityKind, mut record: Map<String, Value>) -> Map<String, Value> {
        record.remove("lang");
        if !record.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            record.insert("id".to_string(), Value::from(id));
        }
        write(&self.records).entry(kind).or_default().push(record.clone());
        record
    }

    pub fn list(&self, kind: EntityKind) -> Vec<Map<String, Value>> {
        read(&self.records).get(&kind).cloned().unwrap_or_default()
    }

    /// Records whose visibility flag is set
    pub fn list_public(&self, kind: EntityKind) -> Vec<Map<String, Value>> {
        let field = kind.visibility_field();
        self.list(kind)
            .into_iter()
            .filter(|record| record.get(field).and_then(Value::as_bool).unwrap_or(false))
            .collect()
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<Map<String, Value>> {
        self.list(kind).into_iter().find(|record| id_matches(record, id))
    }

    /// Apply `change` to the record with `id`; `None` when it does not exist
    pub fn modify<F>(&self, kind: EntityKind, id: &str, change: F) -> Option<Map<String, Value>>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut records = write(&self.records);
        let record = records.get_mut(&kind)?.iter_mut().find(|r| id_matches(r, id))?;
        let original_id = record.get("id").cloned();
        change(record);
        record.remove("lang");
        if let Some(original_id) = original_id {
            record.insert("id".to_string(), original_id);
        }
        Some(record.clone())
    }

    pub fn delete(&self, kind: EntityKind, id: &str) -> bool {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut records = write(&self.records);
        let Some(list) = records.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|record| !id_matches(record, id));
        list.len() != before
    }

    /// Delete requests received, successful or not
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Hold the next GET responses back for these durations, in order
    pub fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        write(&self.list_delays).extend(delays);
    }

    pub(crate) fn next_list_delay(&self) -> Option<Duration> {
        write(&self.list_delays).pop_front()
    }

    pub fn record_request(&self, request: RecordedRequest) {
        write(&self.requests).push(request);
    }

    pub(crate) fn record_body_lang(&self, lang: Option<String>) {
        if let Some(last) = write(&self.requests).last_mut() {
            last.body_lang = lang;
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        read(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        read(&self.requests).last().cloned()
    }
}

fn profile(account: &AdminAccount) -> AdminProfile {
    AdminProfile {
        username: account.username.clone(),
        email: account.email.clone(),
        role: account.role.clone(),
    }
}

fn id_matches(record: &Map<String, Value>, id: &str) -> bool {
    match record.get("id") {
        Some(Value::Number(n)) => n.to_string() == id,
        Some(Value::String(s)) => s == id,
        _ => false,
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|p| p.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|p| p.into_inner())
}
