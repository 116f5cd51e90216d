pub mod auth;
pub mod journals;
pub mod middleware;

use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use foodjournal_db::StoreError;

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Full HTTP surface: public auth routes plus the token-protected journal routes.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/journals",
            get(journals::list_journals).post(journals::create_journal),
        )
        .route(
            "/journals/{id}",
            get(journals::get_journal)
                .put(journals::update_journal)
                .delete(journals::delete_journal),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Clients only get a generic failure; the store has already logged the cause.
pub(crate) fn store_status(err: StoreError) -> StatusCode {
    if err.is_constraint_violation() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
