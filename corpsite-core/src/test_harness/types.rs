//! Request and response bodies of the mock backend

use serde::{Deserialize, Serialize};

use crate::session::AdminRole;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default)]
    pub lang: Option<String>,
}

/// Stored operator account
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One request as seen by the backend, for assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub accept_language: Option<String>,
    pub bearer: Option<String>,
    /// `lang` field of the JSON body, when there was one
    pub body_lang: Option<String>,
}
