pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{middleware, Router};
use presentser_core::config::AdminConfig;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, admin: AdminConfig) -> Router {
    let app_state = state::AppState::new(root, admin);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_routes = Router::new()
        .route("/api/stats", get(routes::visits::stats))
        .route("/api/admin/records", get(routes::admin::list_records))
        .route("/api/admin/export", get(routes::admin::export))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::admin_middleware,
        ));

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Projection
        .route("/api/calc", post(routes::calc::calc))
        // Records
        .route("/api/save", post(routes::records::save))
        .route("/api/status", get(routes::records::status))
        .route("/api/autosave", post(routes::records::autosave))
        // Visits
        .route("/api/track", post(routes::visits::track))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server on `bind:port`.
pub async fn serve(
    root: PathBuf,
    admin: AdminConfig,
    bind: &str,
    port: u16,
    open_browser: bool,
) -> anyhow::Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, admin, listener, open_browser).await
}

/// Start the API server on a pre-bound listener.
///
/// Lets the caller read the actual port first when binding to port 0.
pub async fn serve_on(
    root: PathBuf,
    admin: AdminConfig,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    tracing::info!(
        root = %root.display(),
        admin_locked = admin.key.is_some(),
        "presentser listening on http://localhost:{actual_port}"
    );
    let app = build_router(root, admin);

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/health");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
