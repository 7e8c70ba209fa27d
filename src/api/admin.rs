//! Admin dashboard endpoint.
//!
//! `GET /api/admin/dashboard` — aggregate totals plus the most recent
//! events and mint attempts. User management lives in the external
//! identity service, so there is no user tally here.

use crate::auth::RequireAdmin;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{EventFilter, MintRecordFilter, PageRequest};
use crate::types::{Event, MintRecord, MintStatus};
use axum::{Json, extract::State};
use serde::Serialize;

const RECENT_LIMIT: u32 = 5;

/// Entity totals shown on the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    /// All events
    pub total_events: u64,
    /// All NFT templates
    pub total_templates: u64,
    /// Ledger entries with status `success`
    pub total_mints: u64,
}

/// Most recent activity, newest first.
#[derive(Debug, Serialize)]
pub struct RecentActivities {
    /// Latest events
    pub events: Vec<Event>,
    /// Latest mint attempts
    pub mints: Vec<MintRecord>,
}

/// Full dashboard response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    /// Entity totals
    pub stats: DashboardTotals,
    /// Recent events and mints
    pub recent_activities: RecentActivities,
}

/// Dashboard statistics. Admin only.
///
/// # Errors
///
/// 403 for non-admins, 500 if a store query fails.
pub async fn get_dashboard(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardReport>, AppError> {
    let recent = PageRequest::clamped(1, RECENT_LIMIT);

    let (events, total_events) = state.events.list(EventFilter::default(), recent).await?;
    let (_, total_templates) = state
        .templates
        .list(None, PageRequest::clamped(1, 1))
        .await?;
    let (mints, _) = state
        .mint_records
        .list(MintRecordFilter::default(), recent)
        .await?;

    let total_mints = state
        .mint_records
        .count_by_status(None)
        .await?
        .iter()
        .find(|c| c.status == MintStatus::Success)
        .map_or(0, |c| c.count);

    Ok(Json(DashboardReport {
        stats: DashboardTotals {
            total_events,
            total_templates,
            total_mints,
        },
        recent_activities: RecentActivities {
            events,
            mints,
        },
    }))
}
