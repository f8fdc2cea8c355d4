//! Store error types

use thiserror::Error;

use crate::api::ApiError;
use crate::i18n::Language;
use crate::validation::ValidationErrors;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Rejected before any request was made
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The backend answered a create/update without a usable record id
    #[error("{0} response carried no record id")]
    MissingId(&'static str),
}

impl StoreError {
    /// Text for an inline error banner
    pub fn user_message(&self, lang: Language) -> String {
        match self {
            StoreError::Api(e) => e.user_message(lang),
            StoreError::Validation(e) => e.to_string(),
            StoreError::MissingId(_) => crate::api::generic_message(lang).to_string(),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, StoreError::Api(e) if e.is_authentication())
    }
}
