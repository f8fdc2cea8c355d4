//! Route table of the mock backend

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::MockState;

/// Prefix every route is mounted under, matching the default base URL
pub const API_PREFIX: &str = "/api";

/// Build the router with all endpoints under [`API_PREFIX`]
pub fn build_router(state: Arc<MockState>) -> Router {
    let routes = Router::new()
        // Auth
        .route("/admin/login", post(handlers::login))
        .route("/admin/signup", post(handlers::signup))
        // Collections
        .route("/:kind", get(handlers::list).post(handlers::create))
        .route("/:kind/public", get(handlers::list_public))
        .route(
            "/:kind/:id",
            get(handlers::get_one)
                .put(handlers::replace)
                .patch(handlers::patch)
                .delete(handlers::remove),
        );

    Router::new()
        .nest(API_PREFIX, routes)
        .fallback(handlers::not_found_route)
        .layer(middleware::from_fn_with_state(state.clone(), handlers::record_request))
        .with_state(state)
}
