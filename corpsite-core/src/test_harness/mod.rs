//! In-memory CMS backend
//!
//! Serves the same REST surface the client talks to, backed by JSON records
//! held in memory. Used by integration tests and by the `test-harness`
//! binary for manual runs against a local client.

pub mod api;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

pub use api::build_router;
pub use server::{spawn, start_server, MockServer, RunningServer};
pub use state::MockState;
