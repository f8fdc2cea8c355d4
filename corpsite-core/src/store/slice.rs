//! Per-kind slice: fetch lanes, mutations and change notification

use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::{StoreError, StoreResult};
use super::guard::DropGuard;
use super::state::{Lane, SliceState};
use crate::api::{decode, ApiClient, ApiError, ApiResult};
use crate::entities::{Entity, EntityId};
use crate::i18n::Language;

/// Whether a completed fetch made it into the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with this many records
    Applied(usize),
    /// A newer fetch or a mutation on the same slice came first; result dropped
    Stale,
}

/// Monotonic request counter for one fetch lane
#[derive(Debug, Default)]
struct RequestToken(AtomicU64);

impl RequestToken {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}

/// Client-side cache of one entity kind
///
/// Admin and public lists load independently and each carries its own loading
/// flag. Only the most recently issued fetch on a lane may write to the state;
/// an older response that arrives late is discarded. A successful mutation or
/// [`EntitySlice::seed`] also supersedes fetches already in flight, so a list
/// requested before a create cannot wipe out the created record. Mutations
/// update the lists in place on success and leave them untouched on failure.
///
/// Tokens are issued and checked inside the state channel's write lock, so a
/// check and the write it guards cannot interleave with another request.
pub struct EntitySlice<E: Entity> {
    client: Arc<ApiClient>,
    state: watch::Sender<SliceState<E>>,
    admin_token: RequestToken,
    public_token: RequestToken,
}

impl<E: Entity> EntitySlice<E> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(SliceState::default());
        Self {
            client,
            state,
            admin_token: RequestToken::default(),
            public_token: RequestToken::default(),
        }
    }

    pub fn snapshot(&self) -> SliceState<E> {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change
    pub fn subscribe(&self) -> watch::Receiver<SliceState<E>> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Vec<E> {
        self.state.borrow().items.clone()
    }

    pub fn public_items(&self) -> Vec<E> {
        self.state.borrow().public_items.clone()
    }

    pub fn find(&self, id: &EntityId) -> Option<E> {
        self.state.borrow().find(id).cloned()
    }

    /// Replace the admin list without a request, e.g. from cached data
    pub fn seed(&self, records: Vec<E>) {
        self.apply(|s| s.fulfil_fetch(Lane::Admin, records));
    }

    pub async fn fetch_admin(&self) -> StoreResult<FetchOutcome> {
        self.fetch(Lane::Admin).await
    }

    pub async fn fetch_public(&self) -> StoreResult<FetchOutcome> {
        self.fetch(Lane::Public).await
    }

    /// Reload both lists concurrently
    pub async fn refresh(&self) -> StoreResult<()> {
        let (admin, public) = tokio::join!(self.fetch_admin(), self.fetch_public());
        admin?;
        public?;
        Ok(())
    }

    fn token(&self, lane: Lane) -> &RequestToken {
        match lane {
            Lane::Public => &self.public_token,
            _ => &self.admin_token,
        }
    }

    async fn fetch(&self, lane: Lane) -> StoreResult<FetchOutcome> {
        let endpoint = match lane {
            Lane::Public => E::public_endpoint(),
            _ => E::collection_endpoint(),
        };
        let token = self.token(lane);

        let mut issued = 0;
        self.state.send_modify(|s| {
            issued = token.issue();
            s.begin_fetch(lane);
        });

        // dropped midway: clear the loading flag unless a newer fetch owns it
        let guard = DropGuard::new(move || {
            self.state.send_if_modified(|s| {
                if !token.is_latest(issued) {
                    return false;
                }
                s.settle_fetch(lane);
                true
            });
        });
        let result = self
            .client
            .get(&endpoint)
            .await
            .and_then(decode_list::<E>);
        guard.disarm();

        let message = result.as_ref().err().map(|e| e.user_message(self.language()));
        let mut settled = None;
        self.state.send_if_modified(|s| {
            if !token.is_latest(issued) {
                return false;
            }
            settled = Some(match result {
                Ok(records) => {
                    let count = records.len();
                    s.fulfil_fetch(lane, records);
                    Ok(count)
                }
                Err(e) => {
                    s.reject_fetch(lane, message.unwrap_or_default());
                    Err(e)
                }
            });
            true
        });

        match settled {
            None => {
                self.client.record_stale_discard();
                debug!(kind = %E::KIND, ?lane, issued, "discarded stale response");
                Ok(FetchOutcome::Stale)
            }
            Some(Ok(count)) => {
                debug!(kind = %E::KIND, ?lane, count, "list loaded");
                Ok(FetchOutcome::Applied(count))
            }
            Some(Err(e)) => {
                warn!(kind = %E::KIND, ?lane, error = %e, "list fetch failed");
                Err(e.into())
            }
        }
    }

    /// Validate, POST, then append the saved record
    ///
    /// `lang` picks the locale the content is written for; `None` uses the
    /// current UI language. A reply without the saved record must at least
    /// carry the new id.
    pub async fn create(&self, record: &E, lang: Option<Language>) -> StoreResult<E> {
        record.validate()?;
        let lang = lang.unwrap_or_else(|| self.language());
        let body = to_body(record)?;
        let endpoint = E::collection_endpoint();

        let saved = self
            .mutate(async {
                let response = self.client.post_with_lang(&endpoint, body, lang).await?;
                if let Some(saved) = echoed_record::<E>(&response) {
                    return Ok(saved);
                }
                let id = echoed_id(&response).ok_or(StoreError::MissingId("create"))?;
                with_id(record, &id)
            })
            .await?;

        self.apply(|s| s.upsert(saved.clone()));
        info!(kind = %E::KIND, id = ?saved.id(), lang = lang.code(), "record created");
        Ok(saved)
    }

    /// Validate, PUT the full record, then replace it in place
    pub async fn update(&self, id: &EntityId, record: &E) -> StoreResult<E> {
        record.validate()?;
        let body = to_body(record)?;
        let endpoint = E::item_endpoint(id);

        let saved = self
            .mutate(async {
                let response = self.client.put(&endpoint, body).await.map_err(StoreError::from)?;
                match echoed_record::<E>(&response) {
                    Some(saved) => Ok(saved),
                    None => with_id(record, id),
                }
            })
            .await?;

        self.apply(|s| s.upsert(saved.clone()));
        info!(kind = %E::KIND, %id, "record updated");
        Ok(saved)
    }

    /// Partial update, e.g. toggling visibility from a list row
    ///
    /// Without a record in the response the cached copy is merged with
    /// `changes` locally.
    pub async fn patch(&self, id: &EntityId, changes: Value) -> StoreResult<E> {
        let endpoint = E::item_endpoint(id);
        let cached = self.find(id);

        let saved = self
            .mutate(async {
                let response = self
                    .client
                    .patch(&endpoint, changes.clone())
                    .await
                    .map_err(StoreError::from)?;
                if let Some(saved) = echoed_record::<E>(&response) {
                    return Ok(saved);
                }
                let cached = cached.ok_or(StoreError::MissingId("patch"))?;
                merge(&cached, changes)
            })
            .await?;

        self.apply(|s| s.upsert(saved.clone()));
        info!(kind = %E::KIND, %id, "record patched");
        Ok(saved)
    }

    /// DELETE, then drop the record from both lists
    pub async fn remove(&self, id: &EntityId) -> StoreResult<()> {
        let endpoint = E::item_endpoint(id);
        self.mutate(async {
            self.client.delete(&endpoint).await?;
            Ok::<_, StoreError>(())
        })
        .await?;

        self.apply(|s| s.remove(id));
        info!(kind = %E::KIND, %id, "record removed");
        Ok(())
    }

    async fn mutate<T, F>(&self, request: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.state.send_modify(|s| s.begin_mutation());
        let guard = DropGuard::new(|| {
            self.state.send_modify(|s| s.abandon_mutation());
            debug!(kind = %E::KIND, "mutation dropped before the backend answered");
        });
        let result = request.await;
        guard.disarm();

        match result {
            Ok(value) => {
                self.state.send_modify(|s| s.finish_mutation());
                Ok(value)
            }
            Err(e) => {
                let message = e.user_message(self.language());
                self.state.send_modify(|s| s.fail_mutation(message));
                warn!(kind = %E::KIND, error = %e, "mutation failed");
                Err(e)
            }
        }
    }

    /// Write a confirmed change; fetches still in flight become stale
    fn apply(&self, change: impl FnOnce(&mut SliceState<E>)) {
        self.state.send_modify(|s| {
            for lane in [Lane::Admin, Lane::Public] {
                self.token(lane).issue();
                s.settle_fetch(lane);
            }
            change(s);
        });
    }

    /// Current UI language, for error banners
    pub(crate) fn language(&self) -> Language {
        self.client.language().language()
    }
}

impl<E: Entity> std::fmt::Debug for EntitySlice<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EntitySlice")
            .field("kind", &E::KIND)
            .field("items", &state.items.len())
            .field("public_items", &state.public_items.len())
            .finish()
    }
}

fn to_body<E: Entity>(record: &E) -> StoreResult<Value> {
    serde_json::to_value(record).map_err(|e| ApiError::InvalidPayload(e.to_string()).into())
}

/// Bare object or the object inside a `{"data": ...}` envelope
fn payload(response: &Value) -> Option<&Value> {
    let inner = response.get("data").unwrap_or(response);
    inner.is_object().then_some(inner)
}

/// The saved record a mutation reply echoes back, if it has one
///
/// Acknowledgements such as `{"message": "Project updated"}` are not records:
/// only an object that decodes as `E` and carries an id counts.
fn echoed_record<E: Entity>(response: &Value) -> Option<E> {
    let record = decode::<E>(payload(response)?.clone()).ok()?;
    if record.id().is_none() {
        debug!(kind = %E::KIND, "reply carried no record");
        return None;
    }
    Some(record)
}

/// An id reported next to an acknowledgement, e.g. `{"message": "...", "id": 7}`
fn echoed_id(response: &Value) -> Option<EntityId> {
    let payload = payload(response)?;
    ["id", "_id"]
        .iter()
        .find_map(|key| payload.get(*key))
        .and_then(|id| serde_json::from_value(id.clone()).ok())
}

/// Lists arrive bare or as `{"data": [...]}`
pub(crate) fn decode_list<E: Entity>(response: Value) -> ApiResult<Vec<E>> {
    match response {
        Value::Array(_) => decode(response),
        Value::Object(mut map) => match map.remove("data") {
            Some(list @ Value::Array(_)) => decode(list),
            _ => Err(ApiError::Decode("expected a list of records".to_string())),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(ApiError::Decode("expected a list of records".to_string())),
    }
}

/// The submitted record as saved under `id`
fn with_id<E: Entity>(submitted: &E, id: &EntityId) -> StoreResult<E> {
    let mut body = to_body(submitted)?;
    if let Value::Object(map) = &mut body {
        let id = serde_json::to_value(id).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
        map.insert("id".to_string(), id);
    }
    Ok(decode(body)?)
}

fn merge<E: Entity>(base: &E, changes: Value) -> StoreResult<E> {
    let mut merged = to_body(base)?;
    if let (Value::Object(target), Value::Object(changes)) = (&mut merged, changes) {
        for (key, value) in changes {
            target.insert(key, value);
        }
    }
    Ok(decode(merged)?)
}
