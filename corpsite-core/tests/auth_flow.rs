//! Login, signup and logout against the mock backend

use corpsite_core::auth::{AuthError, LoginForm, SignupForm};
use corpsite_core::navigation::Route;
use corpsite_core::session::AdminRole;
use corpsite_core::storage::{ClientStorage, MemoryStorage, SESSION_KEY};
use corpsite_core::test_harness::{spawn, MockState};
use corpsite_core::test_utils::{
    test_context, test_context_with_storage, EDITOR_EMAIL, SUPER_ADMIN_EMAIL, TEST_PASSWORD,
};
use std::sync::Arc;

fn signup_form(username: &str, email: &str) -> SignupForm {
    SignupForm {
        username: username.to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        confirm_password: TEST_PASSWORD.to_string(),
    }
}

#[tokio::test]
async fn test_login_persists_session_and_opens_dashboard() {
    let state = MockState::with_admin("root", SUPER_ADMIN_EMAIL, TEST_PASSWORD, AdminRole::SuperAdmin);
    let server = spawn(Arc::new(state)).await.unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let ctx = test_context_with_storage(&server.base_url(), storage.clone());

    let session = ctx
        .auth()
        .login(&LoginForm::new(SUPER_ADMIN_EMAIL, TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(session.admin.role, AdminRole::SuperAdmin);
    assert!(ctx.session.is_super_admin());
    assert!(storage.contains(SESSION_KEY).unwrap());
    assert_eq!(ctx.navigator.current(), Route::Dashboard);
    assert_eq!(
        server.state.last_request().unwrap().body_lang.as_deref(),
        Some("en")
    );
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let state = MockState::with_admin("root", SUPER_ADMIN_EMAIL, TEST_PASSWORD, AdminRole::SuperAdmin);
    let server = spawn(Arc::new(state)).await.unwrap();
    let ctx = test_context(&server.base_url());

    let err = ctx
        .auth()
        .login(&LoginForm::new(SUPER_ADMIN_EMAIL, "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!ctx.session.is_authenticated());
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let server = spawn(Arc::new(MockState::new())).await.unwrap();
    let ctx = test_context(&server.base_url());

    let err = ctx
        .auth()
        .login(&LoginForm::new("not-an-email", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
    assert!(server.state.requests().is_empty());
}

#[tokio::test]
async fn test_first_signup_is_super_admin_then_admins() {
    let server = spawn(Arc::new(MockState::new())).await.unwrap();

    let first = test_context(&server.base_url());
    let session = first
        .auth()
        .signup(&signup_form("root", SUPER_ADMIN_EMAIL))
        .await
        .unwrap();
    assert_eq!(session.admin.role, AdminRole::SuperAdmin);

    let second = test_context(&server.base_url());
    let session = second
        .auth()
        .signup(&signup_form("editor", EDITOR_EMAIL))
        .await
        .unwrap();
    assert_eq!(session.admin.role, AdminRole::Admin);
    assert!(!second.session.is_super_admin());

    let duplicate = test_context(&server.base_url())
        .auth()
        .signup(&signup_form("again", EDITOR_EMAIL))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AuthError::Api(ref e) if e.status() == Some(409)));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let state = MockState::with_admin("root", SUPER_ADMIN_EMAIL, TEST_PASSWORD, AdminRole::SuperAdmin);
    let server = spawn(Arc::new(state)).await.unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let ctx = test_context_with_storage(&server.base_url(), storage.clone());
    let auth = ctx.auth();

    auth.login(&LoginForm::new(SUPER_ADMIN_EMAIL, TEST_PASSWORD))
        .await
        .unwrap();
    auth.logout().unwrap();

    assert!(!ctx.session.is_authenticated());
    assert!(!storage.contains(SESSION_KEY).unwrap());
    assert_eq!(ctx.navigator.current(), Route::Login);
}

#[tokio::test]
async fn test_revoked_token_ends_session_on_next_request() {
    let state = MockState::with_admin("root", SUPER_ADMIN_EMAIL, TEST_PASSWORD, AdminRole::SuperAdmin);
    let server = spawn(Arc::new(state)).await.unwrap();
    let ctx = test_context(&server.base_url());
    ctx.auth()
        .login(&LoginForm::new(SUPER_ADMIN_EMAIL, TEST_PASSWORD))
        .await
        .unwrap();

    server.state.revoke_tokens();
    let err = ctx.store.companies.fetch_admin().await.unwrap_err();
    assert!(err.is_authentication());
    assert!(!ctx.session.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Login);
}
