//! Corpsite client core
//!
//! Headless client for the corporate CMS: an authenticated, language-aware
//! REST client, a per-kind entity store, the admin list/delete flows, the
//! public carousel arithmetic and the language context. The in-memory mock
//! backend and test fixtures sit behind the `test-utils` feature.

pub mod api;
pub mod auth;
pub mod carousel;
pub mod config;
pub mod context;
pub mod entities;
pub mod i18n;
pub mod logging;
pub mod metrics;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod store;
#[cfg(feature = "test-utils")]
pub mod test_harness;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod validation;
pub mod views;

pub use api::{ApiClient, ApiError, ApiResult};
pub use auth::{AuthError, AuthService, LoginForm, SignupForm};
pub use carousel::Carousel;
pub use config::Config;
pub use context::{AppContext, ContextError};
pub use entities::{Award, Career, Company, Entity, EntityId, EntityKind, Partnership, Press, Project};
pub use i18n::{Language, LanguageContext, TextDirection};
pub use logging::{init_logging, LogLevel};
pub use navigation::{Navigator, Route};
pub use session::{AdminRole, AuthSession, SessionStore};
pub use store::{EntitySlice, EntityStore, StoreError};
pub use views::{DeleteFlow, ListFilter, ListRender, ListView};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = LogLevel::Info;
        let _ = Language::default();
        assert_eq!(EntityKind::ALL.len(), 6);
    }
}
