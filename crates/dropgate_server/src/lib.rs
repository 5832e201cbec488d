use dropgate_core::traits::{AdminAuth, ObjectStore};

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

mod api;

pub mod auth;
pub mod state;

use state::{AdminState, GateState};

/// Builder for the admin-side service: upload, list, revoke.
#[derive(Clone, Debug, Default)]
pub struct AdminServer {
    config: AdminServerConfig,
}

#[derive(Clone, Debug)]
pub struct AdminServerConfig {
    /// Base URL of the public gate, used to render shareable download URLs.
    ///
    /// Defaults to `http://localhost:8081`.
    pub public_base_url: String,
}

impl Default for AdminServerConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8081".to_string(),
        }
    }
}

impl AdminServer {
    pub fn new(config: AdminServerConfig) -> Self {
        Self { config }
    }

    pub fn build<S: ObjectStore, A: AdminAuth>(self, storage: S, auth: A) -> Router {
        let state = AdminState {
            storage,
            auth,
            public_base_url: self.config.public_base_url,
        };

        Router::new()
            .route("/health", get(|| async { "OK" }))
            .route("/assets", post(api::upload_asset).get(api::list_assets))
            .route("/assets/{asset_id}", delete(api::revoke_asset))
            .route("/objects", get(api::list_objects))
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

/// Builder for the public gate: resolves download locators, nothing else.
/// Deployed separately from the admin service; the shared bucket is their
/// only connection.
#[derive(Clone, Debug, Default)]
pub struct GateServer;

impl GateServer {
    pub fn build<S: ObjectStore>(self, storage: S) -> Router {
        let state = GateState { storage };

        Router::new()
            .route("/health", get(|| async { "OK" }))
            .route("/d/{asset_id}", get(api::download))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

pub mod prelude {
    pub use crate::auth::*;
    pub use crate::state::*;
    pub use crate::{AdminServer, AdminServerConfig, GateServer};
}
