//! Admin login, signup and logout
//!
//! Both forms are checked locally before anything is sent. A successful
//! response becomes the persisted session and the operator lands on the
//! dashboard.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::navigation::{Navigator, Route};
use crate::session::AuthSession;
use crate::storage::StorageError;
use crate::validation::{Rule, Validate, ValidationErrors, Validator};

pub const LOGIN_ENDPOINT: &str = "/admin/login";
pub const SIGNUP_ENDPOINT: &str = "/admin/signup";

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Api(ApiError),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for AuthError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Authentication => AuthError::InvalidCredentials,
            other => AuthError::Api(other),
        }
    }
}

#[derive(Clone, Default, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("email", &self.email, &[Rule::Required, Rule::Email])
            .check("password", &self.password, &[Rule::Required]);
        v.finish()
    }
}

#[derive(Clone, Default, Serialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for SignupForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("username", &self.username, &[Rule::Required, Rule::MinLength(3), Rule::MaxLength(50)])
            .check("email", &self.email, &[Rule::Required, Rule::Email])
            .check("password", &self.password, &[Rule::Required, Rule::MinLength(MIN_PASSWORD_LEN)])
            .check_matches("confirmPassword", &self.confirm_password, &self.password, "password");
        v.finish()
    }
}

pub struct AuthService {
    client: Arc<ApiClient>,
    navigator: Arc<Navigator>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, navigator: Arc<Navigator>) -> Self {
        Self { client, navigator }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthSession, AuthError> {
        form.validate()?;
        self.start_session(LOGIN_ENDPOINT, form).await
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<AuthSession, AuthError> {
        form.validate()?;
        self.start_session(SIGNUP_ENDPOINT, form).await
    }

    /// Drop the session and go back to the login page
    ///
    /// The local session is gone even if the storage record could not be
    /// removed; the error is still reported.
    pub fn logout(&self) -> Result<(), AuthError> {
        let cleared = self.client.session().clear();
        self.navigator.navigate(Route::Login);
        info!("logged out");
        cleared.map_err(AuthError::from)
    }

    async fn start_session<F: Serialize>(&self, endpoint: &str, form: &F) -> Result<AuthSession, AuthError> {
        let lang = self.client.language().language();
        let session: AuthSession = self
            .client
            .post_json(endpoint, form, lang)
            .await
            .inspect_err(|e| warn!(endpoint, error = %e, "authentication request failed"))?;

        self.client.session().save(session.clone())?;
        self.navigator.navigate(Route::Dashboard);
        Ok(session)
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_validation() {
        let errors = LoginForm::new("not-an-email", "").validate().unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("password"));
        assert!(LoginForm::new("ops@example.com", "secret").validate().is_ok());
    }

    #[test]
    fn test_signup_password_confirmation() {
        let form = SignupForm {
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "secret12".to_string(),
            confirm_password: "secret13".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has("confirmPassword"));
    }

    #[test]
    fn test_signup_body_shape() {
        let form = SignupForm {
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "secret12".to_string(),
            confirm_password: "secret12".to_string(),
        };
        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["confirmPassword"], "secret12");
        assert!(body.get("confirm_password").is_none());
    }

    #[test]
    fn test_unauthorized_maps_to_invalid_credentials() {
        assert!(matches!(AuthError::from(ApiError::Authentication), AuthError::InvalidCredentials));
        assert!(matches!(
            AuthError::from(ApiError::Network("down".into())),
            AuthError::Api(_)
        ));
    }

    #[test]
    fn test_form_debug_hides_password() {
        let form = LoginForm::new("ops@example.com", "hunter22");
        assert!(!format!("{form:?}").contains("hunter22"));
    }
}
