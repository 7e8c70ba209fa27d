//! Event management endpoints.
//!
//! - `POST /api/events` — create event
//! - `GET /api/events` — list with pagination and phase/creator filters
//! - `GET /api/events/:id` — event details
//! - `PUT /api/events/:id` — update (creator or admin)
//! - `DELETE /api/events/:id` — delete (creator or admin)
//! - `POST /api/events/:id/participants` — add roster entry
//! - `DELETE /api/events/:id/participants/:participant_id` — remove entry

use super::{AppJson, MessageResponse};
use crate::auth::{AuthUser, ensure_owner_or_admin};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{EventFilter, PageRequest};
use crate::types::{
    Event, EventId, EventPhase, Metadata, Pagination, Participant, ParticipantId, TemplateId,
    UserId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_NAME_LEN: usize = 3;

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(AppError::validation(
            "Event name must be at least 3 characters",
        ));
    }
    Ok(())
}

fn validate_dates(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(AppError::validation("End date must be after start date"));
        }
    }
    Ok(())
}

/// Request to create a new event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Event name, at least 3 characters
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// NFT template to mint for participants; must exist
    pub nft_template: TemplateId,
    /// Eligibility criteria
    #[serde(default)]
    pub criteria: Metadata,
    /// Optional start timestamp
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end timestamp; must be after the start when both are set
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Create a new event. The caller becomes the event creator.
///
/// # Errors
///
/// 400 on validation failure, 404 if the template does not exist.
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    validate_name(&request.name)?;
    validate_dates(request.start_date, request.end_date)?;

    if state.templates.get(request.nft_template).await?.is_none() {
        return Err(AppError::not_found("NFT template", request.nft_template));
    }

    let event = Event::new(
        request.name,
        request.description,
        request.nft_template,
        request.criteria,
        request.start_date,
        request.end_date,
        auth.user_id,
    );
    state.events.insert(&event).await?;

    tracing::info!(event = %event.id, creator = %event.created_by, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Query parameters for listing events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    /// 1-indexed page (default 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size (default 10, max 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Filter by scheduling phase
    #[serde(default)]
    pub status: Option<EventPhase>,
    /// Filter by creator
    #[serde(default)]
    pub created_by: Option<UserId>,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    10
}

/// Response for listing events.
#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    /// The page of events, newest first
    pub events: Vec<Event>,
    /// Pagination envelope
    pub pagination: Pagination,
}

/// List events with pagination.
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn list_events(
    _auth: AuthUser,
    Query(query): Query<ListEventsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListEventsResponse>, AppError> {
    let page = PageRequest::clamped(query.page, query.limit);
    let filter = EventFilter {
        phase: query.status,
        created_by: query.created_by,
    };
    let (events, total) = state.events.list(filter, page).await?;
    Ok(Json(ListEventsResponse {
        events,
        pagination: Pagination::new(page.page, page.limit, total),
    }))
}

/// Get event details, roster included.
///
/// # Errors
///
/// 404 if the event does not exist.
pub async fn get_event(
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Event>, AppError> {
    let id = EventId::from_uuid(id);
    let event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    Ok(Json(event))
}

/// Request to update an event. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    /// Updated name
    #[serde(default)]
    pub name: Option<String>,
    /// Updated description
    #[serde(default)]
    pub description: Option<String>,
    /// Updated criteria
    #[serde(default)]
    pub criteria: Option<Metadata>,
    /// Updated start timestamp
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Updated end timestamp
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Update an event. Requires the creator or an admin.
///
/// # Errors
///
/// 404 if absent, 403 if not permitted, 400 if the merged dates are invalid.
pub async fn update_event(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    let id = EventId::from_uuid(id);
    let mut event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;

    ensure_owner_or_admin(&auth, event.created_by)?;

    if let Some(name) = request.name {
        validate_name(&name)?;
        event.name = name;
    }
    if let Some(description) = request.description {
        event.description = Some(description);
    }
    if let Some(criteria) = request.criteria {
        event.criteria = criteria;
    }
    if let Some(start) = request.start_date {
        event.start_date = Some(start);
    }
    if let Some(end) = request.end_date {
        event.end_date = Some(end);
    }
    validate_dates(event.start_date, event.end_date)?;

    state.events.update(&event).await?;
    Ok(Json(event))
}

/// Delete an event. Requires the creator or an admin.
///
/// # Errors
///
/// 404 if absent, 403 if not permitted.
pub async fn delete_event(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = EventId::from_uuid(id);
    let event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;

    ensure_owner_or_admin(&auth, event.created_by)?;

    state.events.delete(id).await?;
    tracing::info!(event = %id, "Event deleted");
    Ok(Json(MessageResponse::new("Event deleted")))
}

/// Request to add a participant to the roster.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    /// Optional reference to a known user
    #[serde(default)]
    pub user: Option<UserId>,
    /// Solana address the NFT is minted to
    #[serde(default)]
    pub solana_address: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
}

/// Add a participant. Requires the creator or an admin.
///
/// At least one of address/email is required; an entry with a matching
/// address or email is rejected as a duplicate.
///
/// # Errors
///
/// 400 on validation failure or duplicate, 404 if the event is absent,
/// 403 if not permitted.
pub async fn add_participant(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    AppJson(request): AppJson<AddParticipantRequest>,
) -> Result<Json<Vec<Participant>>, AppError> {
    if request.solana_address.is_none() && request.email.is_none() {
        return Err(AppError::validation("Solana address or email is required"));
    }

    let id = EventId::from_uuid(id);
    let mut event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;

    ensure_owner_or_admin(&auth, event.created_by)?;

    let duplicate = event.participants.iter().any(|p| {
        (p.solana_address.is_some() && p.solana_address == request.solana_address)
            || (p.email.is_some() && p.email == request.email)
    });
    if duplicate {
        return Err(AppError::conflict("Participant already exists in this event"));
    }

    event.participants.push(Participant::new(
        request.user,
        request.solana_address,
        request.email,
    ));
    state.events.update(&event).await?;

    Ok(Json(event.participants))
}

/// Remove a participant. Requires the creator or an admin.
///
/// # Errors
///
/// 404 if the event or participant is absent, 403 if not permitted.
pub async fn remove_participant(
    auth: AuthUser,
    Path((id, participant_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = EventId::from_uuid(id);
    let participant_id = ParticipantId::from_uuid(participant_id);

    let mut event = state
        .events
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;

    ensure_owner_or_admin(&auth, event.created_by)?;

    if event.participant(participant_id).is_none() {
        return Err(AppError::not_found("Participant", participant_id));
    }
    event.participants.retain(|p| p.id != participant_id);
    state.events.update(&event).await?;

    Ok(Json(MessageResponse::new("Participant removed")))
}
