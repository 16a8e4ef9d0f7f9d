//! HTTP API for the Next Moment service

mod handlers;
mod twiml;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::db::Database;
use crate::engine::{ConversationEngine, DatabaseStorage, ProductionEngine, StateTable};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProductionEngine>,
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let storage = DatabaseStorage::new(db.clone());
        Self {
            engine: Arc::new(ConversationEngine::new(StateTable::new(), storage)),
            db,
        }
    }
}
