//! Test utilities
//!
//! Fixtures for building a wired-up client against a mock backend, plus
//! timeout helpers for the notification channels the client exposes.

pub mod async_helpers;
pub mod fixtures;

pub use async_helpers::*;
pub use fixtures::*;
