//! Admin API: diagnostics and lookups for the proxying layer.
//!
//! | Route                  | Auth | Purpose                              |
//! |------------------------|------|--------------------------------------|
//! | `GET /healthz`         | no   | liveness + published generation      |
//! | `GET /admin/table`     | yes  | dump of the table, in match order    |
//! | `GET /admin/match`     | yes  | `?host=&path=` lookup                |
//! | `POST /admin/reconcile`| yes  | force a full rebuild                 |

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::routing::{TableHandle, TableReconciler};
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AppState {
    pub handle: TableHandle,
    pub reconciler: Arc<TableReconciler>,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(reconciler: Arc<TableReconciler>, api_key: Option<String>) -> Self {
        Self {
            handle: reconciler.handle().clone(),
            reconciler,
            api_key: api_key.map(Arc::from),
        }
    }
}

pub fn setup_admin_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/table", get(get_table))
        .route("/admin/match", get(get_match))
        .route("/admin/reconcile", post(post_reconcile))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));

    Router::new()
        .route("/healthz", get(get_health))
        .merge(admin)
        .with_state(state)
}
