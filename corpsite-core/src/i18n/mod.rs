//! Language context
//!
//! A single process-wide language preference with its derived text direction.
//! The preference is read from durable storage once at startup and written back
//! on every change; every change is broadcast as a [`LanguageChanged`] event so
//! components that fetch localized data can react on their own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::storage::{ClientStorage, LANGUAGE_KEY};

/// Capacity of the change broadcast; slow subscribers see `Lagged`
const EVENT_CAPACITY: usize = 16;

/// UI language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported language '{0}' (expected 'en' or 'ar')")]
pub struct UnknownLanguage(pub String);

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    /// ISO 639-1 code, as sent in `Accept-Language` and the `lang` field
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::En => TextDirection::Ltr,
            Language::Ar => TextDirection::Rtl,
        }
    }

    /// The language the toggle button switches to
    pub fn other(&self) -> Language {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reading direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, TextDirection::Rtl)
    }
}

/// The `lang`/`dir` attributes of the root document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAttributes {
    pub lang: Language,
    pub dir: TextDirection,
}

impl DocumentAttributes {
    fn for_language(lang: Language) -> Self {
        Self {
            lang,
            dir: lang.direction(),
        }
    }
}

/// Broadcast payload sent after every language change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageChanged {
    pub language: Language,
}

struct LanguageState {
    language: Language,
    document: DocumentAttributes,
}

/// Process-wide language + direction
pub struct LanguageContext {
    state: RwLock<LanguageState>,
    storage: Arc<dyn ClientStorage>,
    events: broadcast::Sender<LanguageChanged>,
}

impl LanguageContext {
    /// Read the persisted preference and apply it to the document attributes
    ///
    /// A missing or unreadable preference falls back to `default`.
    pub fn init(storage: Arc<dyn ClientStorage>, default: Language) -> Self {
        let language = match storage.get(LANGUAGE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: UnknownLanguage| {
                warn!(error = %e, "ignoring stored language preference");
                default
            }),
            Ok(None) => default,
            Err(e) => {
                warn!(error = %e, "could not read language preference");
                default
            }
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        debug!(language = %language, "language context initialized");

        Self {
            state: RwLock::new(LanguageState {
                language,
                document: DocumentAttributes::for_language(language),
            }),
            storage,
            events,
        }
    }

    pub fn language(&self) -> Language {
        self.read().language
    }

    pub fn direction(&self) -> TextDirection {
        self.language().direction()
    }

    pub fn is_rtl(&self) -> bool {
        self.direction().is_rtl()
    }

    /// Attributes currently applied to the document root
    pub fn document(&self) -> DocumentAttributes {
        self.read().document
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LanguageChanged> {
        self.events.subscribe()
    }

    /// Switch language, persist it, re-apply document attributes and notify
    ///
    /// Returns `false` (and emits nothing) when `language` is already current.
    /// A storage failure is logged; the in-memory switch still happens.
    pub fn change_language(&self, language: Language) -> bool {
        let mut state = self.write();
        if state.language == language {
            return false;
        }

        state.language = language;
        if let Err(e) = self.storage.set(LANGUAGE_KEY, language.code()) {
            warn!(error = %e, "could not persist language preference");
        }
        state.document = DocumentAttributes::for_language(language);

        // Sent under the write lock so events are ordered like the changes
        let receivers = self.events.send(LanguageChanged { language }).unwrap_or(0);
        drop(state);

        info!(language = %language, receivers, "language changed");
        true
    }

    /// Flip between English and Arabic, returning the new language
    pub fn toggle(&self) -> Language {
        let next = self.language().other();
        self.change_language(next);
        next
    }

    fn read(&self) -> RwLockReadGuard<'_, LanguageState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LanguageState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for LanguageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageContext")
            .field("language", &self.language())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use tokio::sync::broadcast::error::TryRecvError;

    fn context_with(stored: Option<&str>) -> (LanguageContext, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(value) = stored {
            storage.set(LANGUAGE_KEY, value).unwrap();
        }
        (LanguageContext::init(storage.clone(), Language::En), storage)
    }

    #[test]
    fn test_language_codes_and_direction() {
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Ar.code(), "ar");
        assert_eq!(Language::Ar.direction(), TextDirection::Rtl);
        assert_eq!(Language::En.direction(), TextDirection::Ltr);
        assert_eq!("AR".parse::<Language>().unwrap(), Language::Ar);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(serde_json::to_string(&Language::Ar).unwrap(), "\"ar\"");
    }

    #[test]
    fn test_init_defaults_to_english() {
        let (ctx, _) = context_with(None);
        assert_eq!(ctx.language(), Language::En);
        assert_eq!(
            ctx.document(),
            DocumentAttributes {
                lang: Language::En,
                dir: TextDirection::Ltr
            }
        );
    }

    #[test]
    fn test_init_applies_stored_preference() {
        let (ctx, _) = context_with(Some("ar"));
        assert_eq!(ctx.language(), Language::Ar);
        assert!(ctx.is_rtl());
        assert_eq!(ctx.document().dir, TextDirection::Rtl);
    }

    #[test]
    fn test_init_ignores_garbage() {
        let (ctx, _) = context_with(Some("klingon"));
        assert_eq!(ctx.language(), Language::En);
    }

    #[test]
    fn test_change_language_persists_and_broadcasts_once() {
        let (ctx, storage) = context_with(None);
        let mut rx = ctx.subscribe();

        assert!(ctx.change_language(Language::Ar));

        assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("ar"));
        assert_eq!(ctx.document().dir, TextDirection::Rtl);
        assert_eq!(
            rx.try_recv().unwrap(),
            LanguageChanged {
                language: Language::Ar
            }
        );
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_reselecting_current_language_is_silent() {
        let (ctx, storage) = context_with(None);
        let mut rx = ctx.subscribe();

        assert!(!ctx.change_language(Language::En));
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap(), None);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_toggle() {
        let (ctx, _) = context_with(None);
        assert_eq!(ctx.toggle(), Language::Ar);
        assert_eq!(ctx.toggle(), Language::En);
        assert_eq!(ctx.language(), Language::En);
    }
}
