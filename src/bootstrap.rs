use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn init_tracing() {
    tracing_subscriber::fmt().init();
}

pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Binds the listener and serves the app until the process is stopped.
pub async fn serve(service_name: &str, app: Router, bind_addr: &str) -> Result<()> {
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!("{service_name} listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
