//! NFT event mint service.
//!
//! A CRUD backend for managing NFT event templates, events, participant
//! rosters, and mint-transaction records. Entities are persisted as whole
//! JSON documents; the mint transaction itself goes through an injected
//! [`solana::MintGateway`] standing in for the blockchain SDK.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          HTTP layer (Axum)               │  ← auth extractors, JSON
//! │  - api::build_router                     │  ← error mapping
//! ├──────────────────────────────────────────┤
//! │          Workflows (mint)                │  ← single/bulk mint,
//! │  - pure orchestration over traits        │    ledger queries
//! ├──────────────────────────────────────────┤
//! │  Stores (Postgres / in-memory)  Gateway  │  ← injected at startup
//! └──────────────────────────────────────────┘
//! ```
//!
//! All dependencies (stores, gateway, JWT keys) are constructed once at
//! process start and passed to handlers through [`state::AppState`]. There is
//! no ambient global state.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod mint;
pub mod solana;
pub mod state;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
