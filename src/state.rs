//! Application state shared across HTTP handlers.

use crate::auth::JwtKeys;
use crate::solana::{MintGateway, MockMintGateway};
use crate::store::{
    EventStore, MemoryEventStore, MemoryMintRecordStore, MemoryTemplateStore, MintRecordStore,
    TemplateStore,
};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// All dependencies are constructed once at process start and injected here;
/// handlers receive the state by cheap `Arc` clones. Nothing in the service
/// reaches for ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Event documents with embedded rosters
    pub events: Arc<dyn EventStore>,
    /// NFT templates
    pub templates: Arc<dyn TemplateStore>,
    /// Append-only mint ledger
    pub mint_records: Arc<dyn MintRecordStore>,
    /// Blockchain mint gateway
    pub mint_gateway: Arc<dyn MintGateway>,
    /// JWT verification keys
    pub jwt_keys: Arc<JwtKeys>,
    /// Base URL prepended to template image paths in mint metadata
    pub public_base_url: String,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(
        events: Arc<dyn EventStore>,
        templates: Arc<dyn TemplateStore>,
        mint_records: Arc<dyn MintRecordStore>,
        mint_gateway: Arc<dyn MintGateway>,
        jwt_keys: Arc<JwtKeys>,
        public_base_url: String,
    ) -> Self {
        Self {
            events,
            templates,
            mint_records,
            mint_gateway,
            jwt_keys,
            public_base_url,
        }
    }

    /// State backed by in-memory stores and the mock gateway.
    ///
    /// Used by the test suite and for running the service without Postgres.
    #[must_use]
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(MemoryEventStore::new()),
            Arc::new(MemoryTemplateStore::new()),
            Arc::new(MemoryMintRecordStore::new()),
            MockMintGateway::shared(),
            Arc::new(JwtKeys::from_secret(jwt_secret)),
            "http://localhost:8080".to_string(),
        )
    }

    /// Replaces the mint gateway, e.g. with a failing mock in tests.
    #[must_use]
    pub fn with_mint_gateway(mut self, gateway: Arc<dyn MintGateway>) -> Self {
        self.mint_gateway = gateway;
        self
    }
}
