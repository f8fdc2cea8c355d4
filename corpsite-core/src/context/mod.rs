//! Application wiring
//!
//! Builds the process-wide services from a [`Config`] in dependency order:
//! storage, session, language, navigation, API client, store. Everything is
//! shared through `Arc` so views and background tasks can hold their own
//! handles.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::AuthService;
use crate::carousel::Carousel;
use crate::config::{Config, ConfigError};
use crate::entities::Entity;
use crate::i18n::LanguageContext;
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;
use crate::storage::{ClientStorage, FileStorage, MemoryStorage, StorageError};
use crate::store::{EntitySlice, EntityStore};
use crate::views::ListView;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct AppContext {
    pub config: Config,
    pub storage: Arc<dyn ClientStorage>,
    pub session: Arc<SessionStore>,
    pub language: Arc<LanguageContext>,
    pub navigator: Arc<Navigator>,
    pub client: Arc<ApiClient>,
    pub store: Arc<EntityStore>,
}

impl AppContext {
    /// Open storage as configured and build every service on top of it
    pub fn init(config: Config) -> Result<Self, ContextError> {
        config.validate()?;
        let storage: Arc<dyn ClientStorage> = if config.storage.ephemeral {
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(FileStorage::open(&config.storage.data_dir)?)
        };
        Self::with_storage(config, storage)
    }

    /// Build on an already opened storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn ClientStorage>) -> Result<Self, ContextError> {
        let session = Arc::new(SessionStore::load(storage.clone()));
        let language = Arc::new(LanguageContext::init(storage.clone(), config.locale.default_language));

        let landing = if session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Public
        };
        let navigator = Arc::new(Navigator::new(landing));

        let client = Arc::new(ApiClient::new(
            &config.api,
            session.clone(),
            language.clone(),
            navigator.clone(),
        )?);
        let store = Arc::new(EntityStore::new(client.clone()));

        info!(
            api = client.base_url(),
            language = %language.language(),
            authenticated = session.is_authenticated(),
            "application context ready"
        );

        Ok(Self {
            config,
            storage,
            session,
            language,
            navigator,
            client,
            store,
        })
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone(), self.navigator.clone())
    }

    pub fn list_view<E: Entity>(&self, slice: &Arc<EntitySlice<E>>) -> ListView<E> {
        ListView::new(slice.clone(), self.session.clone())
    }

    /// Carousel for `item_count` cards in the current text direction
    pub fn carousel(&self, item_count: usize, container_width: u32) -> Carousel {
        Carousel::new(
            self.config.carousel,
            item_count,
            container_width,
            self.language.direction(),
        )
    }

    /// Reload public content whenever the language changes
    ///
    /// The task holds the store alive; abort the handle to stop it.
    pub fn spawn_language_refresh(&self) -> JoinHandle<()> {
        let mut events = self.language.subscribe();
        let store = self.store.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        debug!(language = %event.language, "reloading public content");
                        store.load_public().await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "language events lagged, reloading once");
                        store.load_public().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("api", &self.client.base_url())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
