//! Mint workflow and ledger endpoints.
//!
//! - `POST /api/mint` — mint for one participant
//! - `POST /api/mint/bulk` — mint for a list of participants
//! - `GET /api/mint` — paginated ledger history
//! - `GET /api/mint/stats` — aggregate counts
//! - `POST /api/mint/airdrop` — devnet SOL airdrop (admin only)

use super::AppJson;
use crate::auth::{AuthUser, RequireAdmin};
use crate::error::AppError;
use crate::mint;
use crate::state::AppState;
use crate::store::{MintRecordFilter, PageRequest};
use crate::types::{EventId, MintStatus, ParticipantId, UserId};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

/// Request body for a single mint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintBody {
    /// The event holding the roster
    pub event_id: EventId,
    /// The participant to mint for
    pub participant_id: ParticipantId,
}

/// Mint one NFT for one participant.
///
/// # Errors
///
/// See [`mint::mint_for_participant`].
pub async fn mint_nft(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<MintBody>,
) -> Result<Json<mint::SingleMintOutcome>, AppError> {
    let outcome =
        mint::mint_for_participant(&state, &auth, body.event_id, body.participant_id).await?;
    Ok(Json(outcome))
}

/// Request body for a bulk mint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMintBody {
    /// The event holding the roster
    pub event_id: EventId,
    /// Participants to mint for, processed in order
    pub participant_ids: Vec<ParticipantId>,
}

/// Mint NFTs for a list of participants, isolating per-item failures.
///
/// # Errors
///
/// See [`mint::bulk_mint`].
pub async fn bulk_mint_nft(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<BulkMintBody>,
) -> Result<Json<mint::BulkMintReport>, AppError> {
    let report = mint::bulk_mint(&state, &auth, body.event_id, &body.participant_ids).await?;
    Ok(Json(report))
}

/// Query parameters for the ledger history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintHistoryQuery {
    /// 1-indexed page (default 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size (default 10, max 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Filter by attempt outcome
    #[serde(default)]
    pub status: Option<MintStatus>,
    /// Filter by event
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Filter by user
    #[serde(default)]
    pub user_id: Option<UserId>,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    10
}

/// Page through the mint ledger, newest first.
///
/// # Errors
///
/// 500 if the ledger query fails.
pub async fn list_mint_records(
    _auth: AuthUser,
    Query(query): Query<MintHistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<mint::MintHistory>, AppError> {
    let page = PageRequest::clamped(query.page, query.limit);
    let filter = MintRecordFilter {
        status: query.status,
        event: query.event_id,
        user: query.user_id,
    };
    let history = mint::mint_history(&state, filter, page).await?;
    Ok(Json(history))
}

/// Query parameters for mint statistics.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintStatsQuery {
    /// Scope the counts to one event
    #[serde(default)]
    pub event_id: Option<EventId>,
}

/// Aggregate mint counts, optionally scoped to one event.
///
/// # Errors
///
/// 500 if the ledger query fails.
pub async fn get_mint_stats(
    _auth: AuthUser,
    Query(query): Query<MintStatsQuery>,
    State(state): State<AppState>,
) -> Result<Json<mint::MintStatsReport>, AppError> {
    let stats = mint::mint_stats(&state, query.event_id).await?;
    Ok(Json(stats))
}

/// Request body for a devnet airdrop.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropBody {
    /// Recipient public key
    pub public_key: String,
    /// Amount in SOL (default 1)
    #[serde(default = "default_airdrop_amount")]
    pub amount: f64,
}

const fn default_airdrop_amount() -> f64 {
    1.0
}

/// Response for a successful airdrop.
#[derive(Debug, Serialize)]
pub struct AirdropResponse {
    /// Human-readable confirmation
    pub message: String,
    /// Airdrop transaction signature
    pub signature: String,
}

/// Request a devnet SOL airdrop. Admin only.
///
/// # Errors
///
/// 400 if the public key is missing, 403 for non-admins, 500 with the
/// gateway message if the airdrop fails.
pub async fn airdrop(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    AppJson(body): AppJson<AirdropBody>,
) -> Result<Json<AirdropResponse>, AppError> {
    if body.public_key.trim().is_empty() {
        return Err(AppError::validation("Public key is required"));
    }

    let signature = state
        .mint_gateway
        .request_airdrop(body.public_key, body.amount)
        .await
        .map_err(|e| AppError::upstream("Airdrop failed", e.to_string()))?;

    Ok(Json(AirdropResponse {
        message: format!("Airdropped {} SOL", body.amount),
        signature,
    }))
}
