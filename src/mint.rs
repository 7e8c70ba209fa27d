//! Mint workflows and ledger queries.
//!
//! The single-mint workflow attempts exactly one mint for one participant;
//! the bulk workflow runs the same logic sequentially over a list of
//! participant ids, isolating per-item failures. Ledger queries aggregate
//! the append-only mint record history.

use crate::auth::{AuthUser, ensure_owner_or_admin};
use crate::error::AppError;
use crate::solana::MintRequest;
use crate::state::AppState;
use crate::store::{MintRecordFilter, PageRequest, StatusCount};
use crate::types::{
    EventId, MintRecord, MintStatus, NftTemplate, Pagination, Participant, ParticipantId,
    ParticipantStatus,
};
use chrono::Utc;
use serde::Serialize;

/// Outcome of a successful single mint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleMintOutcome {
    /// The appended ledger entry
    pub mint_record: MintRecord,
    /// The participant after the `pending → minted` transition
    pub participant: Participant,
    /// Address of the minted token
    pub mint_address: String,
    /// Transaction hash
    pub tx_hash: String,
}

/// One successful item in a bulk mint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMintItem {
    /// The participant that was minted for
    pub participant_id: ParticipantId,
    /// Always `true`; failures land in the errors list instead
    pub success: bool,
    /// Transaction hash
    pub tx_hash: String,
    /// Address of the minted token
    pub mint_address: String,
}

/// Tally over a bulk mint.
#[derive(Debug, Serialize)]
pub struct BulkMintSummary {
    /// Number of requested participant ids
    pub total: usize,
    /// Items that minted
    pub success: usize,
    /// Items that failed for any reason
    pub failed: usize,
}

/// Full bulk mint report.
#[derive(Debug, Serialize)]
pub struct BulkMintReport {
    /// True iff at least one item succeeded
    pub success: bool,
    /// Successful items, in input order
    pub results: Vec<BulkMintItem>,
    /// Failure messages, in input order
    pub errors: Vec<String>,
    /// Tally; `success + failed == total`
    pub summary: BulkMintSummary,
}

/// A page of the mint ledger.
#[derive(Debug, Serialize)]
pub struct MintHistory {
    /// Records, newest first
    pub records: Vec<MintRecord>,
    /// Pagination envelope
    pub pagination: Pagination,
}

/// Aggregate mint counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintStatsReport {
    /// Records with status `success`
    pub total_minted: u64,
    /// Records with status `pending`
    pub total_pending: u64,
    /// Records with status `failed`
    pub total_failed: u64,
    /// Count per status group
    pub breakdown: Vec<StatusCount>,
}

const NFT_SYMBOL: &str = "CERT";

fn mint_request(state: &AppState, template: &NftTemplate, address: Option<String>) -> MintRequest {
    MintRequest {
        to_public_key: address,
        metadata_url: format!("{}{}", state.public_base_url, template.image_url),
        name: template.name.clone(),
        symbol: NFT_SYMBOL.to_string(),
    }
}

/// Attempt exactly one mint for one participant.
///
/// On gateway success this appends a ledger entry, then marks the
/// participant minted, then persists the event. The two writes are not
/// transactional: a crash between them leaves a `success` record with a
/// still-pending participant. That window is inherited from the original
/// system and deliberately not papered over here.
///
/// # Errors
///
/// - 404 if the event or participant does not exist
/// - 400 conflict if the participant is already minted
/// - 403 unless the caller is the event creator or an admin
/// - 500 with the gateway message if the mint itself fails
pub async fn mint_for_participant(
    state: &AppState,
    actor: &AuthUser,
    event_id: EventId,
    participant_id: ParticipantId,
) -> Result<SingleMintOutcome, AppError> {
    let mut event = state
        .events
        .get(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", event_id))?;

    let (user, address) = match event.participant(participant_id) {
        None => return Err(AppError::not_found("Participant", participant_id)),
        Some(p) if p.status == ParticipantStatus::Minted => {
            return Err(AppError::conflict("Participant already minted"));
        }
        Some(p) => (p.user, p.solana_address.clone()),
    };

    ensure_owner_or_admin(actor, event.created_by)?;

    let template = state
        .templates
        .get(event.nft_template)
        .await?
        .ok_or_else(|| AppError::not_found("NFT template", event.nft_template))?;

    let receipt = state
        .mint_gateway
        .mint_nft(mint_request(state, &template, address))
        .await
        .map_err(|e| AppError::upstream("Mint failed", e.to_string()))?;

    let record = MintRecord::new(user, event_id, MintStatus::Success, Some(receipt.tx_hash.clone()));
    state.mint_records.append(&record).await?;

    // Second write of the non-atomic pair.
    let participant = match event.participant_mut(participant_id) {
        Some(p) => {
            p.status = ParticipantStatus::Minted;
            p.minted_at = Some(Utc::now());
            p.clone()
        }
        None => return Err(AppError::internal("Participant vanished during mint")),
    };
    state.events.update(&event).await?;

    tracing::info!(
        event = %event_id,
        participant = %participant_id,
        tx_hash = %receipt.tx_hash,
        "Mint confirmed"
    );

    Ok(SingleMintOutcome {
        mint_record: record,
        participant,
        mint_address: receipt.mint_address,
        tx_hash: receipt.tx_hash,
    })
}

/// Attempt a mint for each participant id, independently.
///
/// Authorization is checked once against the event, before the loop. Items
/// are processed strictly in input order with no concurrency; one failure
/// never halts the batch. Status mutations accumulate in memory and the
/// event is persisted exactly once after the loop.
///
/// # Errors
///
/// - 404 if the event or its template does not exist
/// - 403 unless the caller is the event creator or an admin
///
/// Per-item failures are reported in the returned errors list, never as an
/// overall error.
pub async fn bulk_mint(
    state: &AppState,
    actor: &AuthUser,
    event_id: EventId,
    participant_ids: &[ParticipantId],
) -> Result<BulkMintReport, AppError> {
    let mut event = state
        .events
        .get(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", event_id))?;

    ensure_owner_or_admin(actor, event.created_by)?;

    let template = state
        .templates
        .get(event.nft_template)
        .await?
        .ok_or_else(|| AppError::not_found("NFT template", event.nft_template))?;

    let mut results = Vec::new();
    let mut errors = Vec::new();

    for &participant_id in participant_ids {
        let (user, address) = match event.participant(participant_id) {
            None => {
                errors.push(format!("Participant {participant_id} not found"));
                continue;
            }
            Some(p) if p.status == ParticipantStatus::Minted => {
                errors.push(format!("Participant {participant_id} already minted"));
                continue;
            }
            Some(p) => (p.user, p.solana_address.clone()),
        };

        match state
            .mint_gateway
            .mint_nft(mint_request(state, &template, address))
            .await
        {
            Ok(receipt) => {
                let record =
                    MintRecord::new(user, event_id, MintStatus::Success, Some(receipt.tx_hash.clone()));
                if let Err(e) = state.mint_records.append(&record).await {
                    errors.push(format!(
                        "Unexpected error for participant {participant_id}: {e}"
                    ));
                    continue;
                }
                if let Some(p) = event.participant_mut(participant_id) {
                    p.status = ParticipantStatus::Minted;
                    p.minted_at = Some(Utc::now());
                }
                results.push(BulkMintItem {
                    participant_id,
                    success: true,
                    tx_hash: receipt.tx_hash,
                    mint_address: receipt.mint_address,
                });
            }
            Err(e) => {
                errors.push(format!("Mint failed for participant {participant_id}: {e}"));
            }
        }
    }

    // One flush for all accumulated status mutations.
    state.events.update(&event).await?;

    let summary = BulkMintSummary {
        total: participant_ids.len(),
        success: results.len(),
        failed: errors.len(),
    };

    tracing::info!(
        event = %event_id,
        total = summary.total,
        success = summary.success,
        failed = summary.failed,
        "Bulk mint finished"
    );

    Ok(BulkMintReport {
        success: !results.is_empty(),
        results,
        errors,
        summary,
    })
}

/// Page through the mint ledger, newest first.
///
/// # Errors
///
/// Returns an error if the ledger query fails.
pub async fn mint_history(
    state: &AppState,
    filter: MintRecordFilter,
    page: PageRequest,
) -> Result<MintHistory, AppError> {
    let (records, total) = state.mint_records.list(filter, page).await?;
    Ok(MintHistory {
        records,
        pagination: Pagination::new(page.page, page.limit, total),
    })
}

/// Aggregate mint counts, optionally scoped to one event.
///
/// # Errors
///
/// Returns an error if the ledger query fails.
pub async fn mint_stats(
    state: &AppState,
    event: Option<EventId>,
) -> Result<MintStatsReport, AppError> {
    let breakdown = state.mint_records.count_by_status(event).await?;

    let count_for = |status: MintStatus| {
        breakdown
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    };

    Ok(MintStatsReport {
        total_minted: count_for(MintStatus::Success),
        total_pending: count_for(MintStatus::Pending),
        total_failed: count_for(MintStatus::Failed),
        breakdown,
    })
}
