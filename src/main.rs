use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sketchparty::persist::Storage;
use sketchparty::{api, AppState};

const DEFAULT_STATE_FILE: &str = "data/rooms.json";
const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchparty=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state_file = std::env::var("SKETCHPARTY_STATE_FILE")
        .unwrap_or_else(|_| DEFAULT_STATE_FILE.to_string());
    let storage = Storage::new(&state_file);
    let store = storage.load();
    let state = AppState::new(store, storage);

    let app = api::router(state)
        // Serve the client
        .nest_service("/", ServeDir::new("static"))
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🎨 Sketchparty server running on http://localhost:{}", port);
    tracing::info!("   State file: {}", state_file);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
