mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

pub fn build_router() -> Router {
    Router::new()
        .route("/api/forecast", post(handlers::forecast))
        .route("/api/analysis", post(handlers::analysis))
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
}

pub async fn start(host: &str, port: u16) {
    let app = build_router();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Heliocast server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
