pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod storage;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Uploads are images; anything past this is refused before buffering.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Assemble the full application router.
///
/// Public routes sit alongside an admin sub-router that runs every request
/// through the bearer-token guard. Stored images are served directly from
/// the upload directory under `/uploads`.
pub fn app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/plants", post(handlers::admin::create_plant))
        .route("/admin/plants/:id", put(handlers::admin::update_plant))
        .route("/admin/plants/:id", delete(handlers::admin::delete_plant))
        .route("/admin/dashboard", get(handlers::admin::dashboard))
        .route("/auth/me", get(handlers::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ));

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/plants", get(handlers::plants::list))
        .route("/plants/stats", get(handlers::plants::stats))
        .route("/plants/families/list", get(handlers::plants::families))
        .route("/plants/:id", get(handlers::plants::get_by_id))
        .merge(admin_routes)
        .nest_service("/uploads", ServeDir::new(state.images.dir()))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
