//! TikTok Analytics Service — standalone binary serving content analytics.
//!
//! Loads two TikTok CSV exports into an in-memory store and hosts both an
//! RPC API and a dashboard UI on the same port.
//! Default: http://127.0.0.1:9104/

mod analytics;
mod dashboard;
mod ingest;
mod routes;
mod store;

use routes::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let port: u16 = std::env::var("TIKTOK_ANALYTICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9104);

    let overview_path = PathBuf::from(
        std::env::var("OVERVIEW_CSV_PATH").unwrap_or_else(|_| "./Overview.csv".to_string()),
    );
    let content_path = PathBuf::from(
        std::env::var("CONTENT_CSV_PATH").unwrap_or_else(|_| "./Content.csv".to_string()),
    );

    let data_store = Arc::new(store::Store::new());

    // The two loads are independent: one finishing while the other is still
    // pending (or failed) is a valid state, and every query tolerates an
    // empty collection.
    let overview_store = data_store.clone();
    tokio::spawn(async move {
        let records =
            tokio::task::spawn_blocking(move || ingest::load_overview_csv(&overview_path))
                .await
                .unwrap_or_default();
        overview_store.set_overview(records);
    });

    let content_store = data_store.clone();
    tokio::spawn(async move {
        let records = tokio::task::spawn_blocking(move || ingest::load_content_csv(&content_path))
            .await
            .unwrap_or_default();
        content_store.set_content(records);
    });

    let state = Arc::new(AppState {
        store: data_store,
        start_time: Instant::now(),
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/", axum::routing::get(dashboard::dashboard))
        // Data queries
        .route(
            "/rpc/overview/query",
            axum::routing::get(routes::overview_query),
        )
        .route(
            "/rpc/content/query",
            axum::routing::get(routes::content_query),
        )
        .route(
            "/rpc/aggregates/groups",
            axum::routing::get(routes::aggregates_groups),
        )
        // Filter state
        .route("/rpc/filters/get", axum::routing::get(routes::filters_get))
        .route("/rpc/filters/set", axum::routing::post(routes::filters_set))
        // Tag combinations
        .route(
            "/rpc/combinations/list",
            axum::routing::get(routes::combinations_list),
        )
        .route(
            "/rpc/combinations/add",
            axum::routing::post(routes::combinations_add),
        )
        .route(
            "/rpc/combinations/remove",
            axum::routing::post(routes::combinations_remove),
        )
        // Metric visibility
        .route(
            "/rpc/metrics/visibility",
            axum::routing::get(routes::metrics_visibility),
        )
        .route(
            "/rpc/metrics/toggle",
            axum::routing::post(routes::metrics_toggle),
        )
        // Service
        .route("/rpc/status", axum::routing::get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("TikTok Analytics Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
