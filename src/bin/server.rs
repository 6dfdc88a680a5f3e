//! HTTP server entry point. `PORT` selects the listen port (default 5000).

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use coursemarket::handlers;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".into());
    let addr = format!("0.0.0.0:{port}");

    let service = Arc::new(handlers::default_service());
    coursemarket::service::serve(service, &addr).await
}
