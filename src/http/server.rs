//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the admin handlers
//! - Wire up middleware (tracing)
//! - Serve on a listener until shutdown

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::admin::{setup_admin_router, AppState};

/// Admin HTTP server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = setup_admin_router(state).layer(TraceLayer::new_for_http());
        Self { router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Admin HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Admin HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("Admin HTTP server stopped");
        Ok(())
    }
}
