//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only on
//! the domain store and stay testable without a running server.

use std::sync::Arc;

use crate::domain::Store;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The indexed entity store every endpoint operates on.
    pub store: Arc<Store>,
}

impl AppState {
    /// Bundle the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}
