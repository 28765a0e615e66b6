//! locus-api - HTTP API server for locus

mod error;
mod handlers;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use locus_db::Database;
use locus_inference::OpenAIBackend;
use locus_sync::{SyncOrchestrator, ZoteroClient, ZoteroConfig};

use handlers::{
    chats::{continue_chat, create_chat, list_chats},
    content::{download_attachment, download_file, get_content, list_content, update_content},
    documents::save_document,
    highlights::{create_highlight, list_highlights},
    sync::trigger_sync,
    users::{get_user, login, register_user},
};
use state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": "Hello, Locus!" }))
}

/// Assemble the application router.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sync", post(trigger_sync))
        .route("/content", get(list_content))
        .route("/content/:id", get(get_content).put(update_content))
        .route("/content/:id/file", get(download_file))
        .route("/content/attachment", post(download_attachment))
        .route("/documents", post(save_document))
        .route("/highlights", get(list_highlights).post(create_highlight))
        .route("/chats", get(list_chats).post(create_chat))
        .route("/chats/:id/messages", post(continue_chat))
        .route("/users", post(register_user))
        .route("/users/login", post(login))
        .route("/users/:username", get(get_user))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    //
    // Environment variables:
    //   LOG_FORMAT - "json" or "text" (default: "text")
    //   RUST_LOG   - standard env filter (default: "locus_api=debug,tower_http=debug")
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "locus_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url =
        std::env::var("LOCUS_DATABASE_URL").unwrap_or_else(|_| "sqlite://locus.db".to_string());
    let bind_addr =
        std::env::var("LOCUS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let files_dir =
        std::env::var("LOCUS_FILES_DIR").unwrap_or_else(|_| "./files".to_string());
    let zotero_api_key = std::env::var("ZOTERO_API_KEY")
        .map_err(|_| anyhow::anyhow!("ZOTERO_API_KEY must be set"))?;
    let zotero_user_id = std::env::var("ZOTERO_USER_ID")
        .map_err(|_| anyhow::anyhow!("ZOTERO_USER_ID must be set"))?;
    let zotero_collection =
        std::env::var("ZOTERO_COLLECTION").unwrap_or_else(|_| "locus".to_string());

    // Connect to database (schema is applied on connect)
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // File storage
    tokio::fs::create_dir_all(&files_dir).await?;
    info!("File storage initialized at {}", files_dir);

    // Remote library and sync driver
    let zotero = Arc::new(ZoteroClient::new(ZoteroConfig::new(
        zotero_user_id,
        zotero_api_key,
    ))?);
    let sync = Arc::new(SyncOrchestrator::new(
        db.clone(),
        zotero,
        zotero_collection,
        &files_dir,
    ));

    // Chat backend
    let chat = Arc::new(OpenAIBackend::from_env()?);

    let state = AppState {
        db,
        chat,
        sync,
        files_dir: files_dir.into(),
    };
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = bind_addr.parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
