//! HTTP surface.
//!
//! Thin Axum handlers over the workflows: request parsing, auth extraction,
//! and error mapping live here, the logic lives in the modules they call.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Router,
    async_trait,
    extract::{FromRequest, Request},
    routing::{delete, get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod events;
pub mod health;
pub mod mint;
pub mod templates;

/// Plain `{message}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

impl MessageResponse {
    /// Creates a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// JSON extractor whose rejection is an [`AppError`].
///
/// Malformed or missing request bodies surface as the same
/// `{message, error?}` JSON shape as every other failure instead of Axum's
/// plain-text rejection.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Build the complete Axum router.
///
/// `/health` is public; everything under `/api` requires bearer auth via
/// the extractors on each handler.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Event management
        .route("/events", post(events::create_event))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id", axum::routing::put(events::update_event))
        .route("/events/:id", delete(events::delete_event))
        .route("/events/:id/participants", post(events::add_participant))
        .route(
            "/events/:id/participants/:participant_id",
            delete(events::remove_participant),
        )
        // NFT templates
        .route("/templates", post(templates::create_template))
        .route("/templates", get(templates::list_templates))
        .route("/templates/:id", get(templates::get_template))
        .route("/templates/:id", axum::routing::put(templates::update_template))
        .route("/templates/:id", delete(templates::delete_template))
        // Mint workflow and ledger
        .route("/mint", post(mint::mint_nft))
        .route("/mint", get(mint::list_mint_records))
        .route("/mint/bulk", post(mint::bulk_mint_nft))
        .route("/mint/stats", get(mint::get_mint_stats))
        .route("/mint/airdrop", post(mint::airdrop))
        // Admin
        .route("/admin/dashboard", get(admin::get_dashboard));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
