//! Language context: persistence, notification and consumers reacting to it

use corpsite_core::entities::EntityKind;
use corpsite_core::i18n::{Language, LanguageContext, TextDirection};
use corpsite_core::storage::{ClientStorage, FileStorage, LANGUAGE_KEY};
use corpsite_core::test_harness::{spawn, MockState};
use corpsite_core::test_utils::{
    drain_broadcast, project_json, recv_broadcast, test_context, test_context_with_storage,
    DEFAULT_TEST_TIMEOUT, SHORT_TEST_TIMEOUT,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_preference_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::open(dir.path()).unwrap());
        let ctx = LanguageContext::init(storage, Language::En);
        assert!(ctx.change_language(Language::Ar));
    }

    let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::open(dir.path()).unwrap());
    assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("ar"));

    let ctx = LanguageContext::init(storage, Language::En);
    assert_eq!(ctx.language(), Language::Ar);
    assert_eq!(ctx.direction(), TextDirection::Rtl);
    assert_eq!(ctx.document().dir, TextDirection::Rtl);
}

#[tokio::test]
async fn test_change_fires_exactly_one_event() {
    let ctx = test_context("http://127.0.0.1:9/api");
    let mut events = ctx.language.subscribe();

    ctx.language.change_language(Language::Ar);
    let event = recv_broadcast(&mut events, DEFAULT_TEST_TIMEOUT).await.unwrap();
    assert_eq!(event.language, Language::Ar);
    assert!(recv_broadcast(&mut events, SHORT_TEST_TIMEOUT).await.is_err());

    // re-selecting the current language is silent
    assert!(!ctx.language.change_language(Language::Ar));
    assert!(drain_broadcast(&mut events).is_empty());
}

#[tokio::test]
async fn test_carousel_follows_language_direction() {
    let ctx = test_context("http://127.0.0.1:9/api");
    assert_eq!(ctx.carousel(10, 1000).direction(), TextDirection::Ltr);

    ctx.language.toggle();
    let mut carousel = ctx.carousel(10, 1000);
    assert_eq!(carousel.direction(), TextDirection::Rtl);
    assert!(carousel.press_left());
    assert!(carousel.translate_offset() > 0);
}

#[tokio::test]
async fn test_public_content_reloads_on_language_change() {
    let state = MockState::new();
    state.seed(EntityKind::Projects, [project_json("Harbour Tower", true)]);
    let server = spawn(Arc::new(state)).await.unwrap();

    let ctx = test_context(&server.base_url());
    let refresher = ctx.spawn_language_refresh();
    ctx.language.change_language(Language::Ar);

    let mut reloaded = false;
    for _ in 0..50 {
        let arabic_lists = server
            .state
            .requests()
            .into_iter()
            .filter(|r| r.path.ends_with("/public") && r.accept_language.as_deref() == Some("ar"))
            .count();
        if arabic_lists == EntityKind::ALL.len() && ctx.store.projects.public_items().len() == 1 {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    refresher.abort();
    assert!(reloaded, "public lists were not refetched in Arabic");
}

#[tokio::test]
async fn test_context_reads_persisted_language_at_startup() {
    let storage: Arc<dyn ClientStorage> = Arc::new(corpsite_core::storage::MemoryStorage::new());
    storage.set(LANGUAGE_KEY, "ar").unwrap();
    let ctx = test_context_with_storage("http://127.0.0.1:9/api", storage);
    assert!(ctx.language.is_rtl());
}
