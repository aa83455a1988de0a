//! Planner Shape Server
//!
//! Persistence service for the floor planner. Shapes are kept in memory
//! and exchanged as JSON records:
//!
//! ```json
//! { "id": "…", "type": "line", "startX": 0, "startY": 0, "endX": 100, "endY": 0 }
//! ```

mod routes;
mod store;

use clap::Parser;
use routes::{AppState, router};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

/// Server configuration
#[derive(Debug, Parser)]
#[command(
    name = "planner-server",
    version,
    about = "Shape persistence service for the floor planner"
)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PLANNER_ADDR", default_value = "0.0.0.0:5000")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner_server=info,tower_http=info".into()),
        )
        .init();

    let app = router(Arc::new(AppState::new()));

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!("Planner shape server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
