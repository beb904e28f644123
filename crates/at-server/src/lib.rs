//! Controller HTTP API and runtime
//!
//! Exposes the configuration document over HTTP using axum:
//!
//! - `GET /config` - the current store as a JSON document
//! - `POST /config` - decode a document over the store and persist it
//!
//! Anything else is served from the optional static web root, or answered
//! with `404 Not found`.

pub mod runtime;

use at_config::{ConfigStorage, StorageError};
use at_store::SharedStore;
use axum::{
    body::Bytes,
    extract::State,
    handler::HandlerWithoutStateExt,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

pub use runtime::{Controller, TickRuntime};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub storage: Arc<dyn ConfigStorage>,
    /// Held from decode through the storage write, so saved documents land
    /// in the order they were applied
    save_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: SharedStore, storage: Arc<dyn ConfigStorage>) -> Self {
        Self {
            store,
            storage,
            save_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Create the API router, serving static files from `web_root` if given
pub fn create_router(state: AppState, web_root: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/config", get(get_config).post(post_config))
        .with_state(state);

    let router = match web_root {
        Some(root) => {
            info!("Serving static files from {:?}", root);
            let files = ServeDir::new(root).not_found_service(not_found.into_service());
            router.fallback_service(files)
        }
        None => router.fallback(not_found),
    };

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Start the API server
pub async fn start_server(router: Router, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on {}", addr);
    axum::serve(listener, router).await
}

// ==================== Handlers ====================

/// GET /config - Returns the full configuration document
async fn get_config(State(state): State<AppState>) -> Response {
    let encoded = {
        let store = state.store.read().await;
        at_config::encode(&store)
    };
    match encoded {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(err) => {
            error!(%err, "Failed to encode configuration");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode configuration").into_response()
        }
    }
}

/// POST /config - Applies a configuration document and saves it
///
/// A body that is not JSON is rejected without touching the store. Any
/// valid JSON document is applied with fallback-to-current semantics, then
/// the resulting store is written to storage. The applied state stays in
/// effect even if the write fails. Concurrent posts are applied and saved
/// one at a time; the store lock itself is not held across the write.
async fn post_config(State(state): State<AppState>, body: Bytes) -> Response {
    let _saving = state.save_lock.lock().await;
    let encoded = {
        let mut store = state.store.write().await;
        let report = at_config::decode(&mut store, &body);
        if !report.valid_json {
            return (StatusCode::BAD_REQUEST, "Failed to parse configuration JSON").into_response();
        }
        info!(
            applied = ?report.applied,
            dropped = report.dropped,
            "Configuration updated"
        );
        at_config::encode(&store)
    };

    let result = match encoded {
        Ok(bytes) => state.storage.write(&bytes).await,
        Err(err) => Err(StorageError::from(err)),
    };
    match result {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => {
            error!(%err, "Failed to save configuration");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save configuration").into_response()
        }
    }
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!(%uri, "No route");
    (StatusCode::NOT_FOUND, "Not found")
}
