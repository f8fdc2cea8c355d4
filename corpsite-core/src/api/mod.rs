//! REST backend access

mod client;
mod error;

pub use client::{tag_payload, ApiClient};
pub use error::{ApiError, ApiResult};

pub(crate) use client::decode;
pub(crate) use error::generic_message;
