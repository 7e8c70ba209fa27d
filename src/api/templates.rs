//! NFT template endpoints.
//!
//! CRUD over templates. File upload is handled by an external asset
//! service; templates reference the uploaded image by URL.

use super::{AppJson, MessageResponse};
use crate::auth::{AuthUser, ensure_owner_or_admin};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::PageRequest;
use crate::types::{Metadata, NftTemplate, Pagination, TemplateId, UserId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a template.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    /// Template name, at least 3 characters
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Image URL joined with the public base URL at mint time
    pub image_url: String,
    /// Free-form NFT metadata
    #[serde(default)]
    pub metadata: Metadata,
}

/// Create a template. The caller becomes the creator.
///
/// # Errors
///
/// 400 on validation failure.
pub async fn create_template(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<NftTemplate>), AppError> {
    if request.name.trim().chars().count() < 3 {
        return Err(AppError::validation("Name must be at least 3 characters"));
    }
    if request.image_url.trim().is_empty() {
        return Err(AppError::validation("Name and image are required"));
    }

    let template = NftTemplate::new(
        request.name,
        request.description,
        request.image_url,
        request.metadata,
        auth.user_id,
    );
    state.templates.insert(&template).await?;

    tracing::info!(template = %template.id, creator = %template.creator, "Template created");
    Ok((StatusCode::CREATED, Json(template)))
}

/// Query parameters for listing templates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplatesQuery {
    /// 1-indexed page (default 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size (default 10, max 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Filter by creator
    #[serde(default)]
    pub creator: Option<UserId>,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    10
}

/// Response for listing templates.
#[derive(Debug, Serialize)]
pub struct ListTemplatesResponse {
    /// The page of templates, newest first
    pub templates: Vec<NftTemplate>,
    /// Pagination envelope
    pub pagination: Pagination,
}

/// List templates with pagination.
///
/// # Errors
///
/// 500 if the store query fails.
pub async fn list_templates(
    _auth: AuthUser,
    Query(query): Query<ListTemplatesQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListTemplatesResponse>, AppError> {
    let page = PageRequest::clamped(query.page, query.limit);
    let (templates, total) = state.templates.list(query.creator, page).await?;
    Ok(Json(ListTemplatesResponse {
        templates,
        pagination: Pagination::new(page.page, page.limit, total),
    }))
}

/// Get template details.
///
/// # Errors
///
/// 404 if the template does not exist.
pub async fn get_template(
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<NftTemplate>, AppError> {
    let id = TemplateId::from_uuid(id);
    let template = state
        .templates
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("NFT template", id))?;
    Ok(Json(template))
}

/// Request to update a template. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    /// Updated name
    #[serde(default)]
    pub name: Option<String>,
    /// Updated description
    #[serde(default)]
    pub description: Option<String>,
    /// Updated metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Update a template. Requires the creator or an admin.
///
/// # Errors
///
/// 404 if absent, 403 if not permitted, 400 on validation failure.
pub async fn update_template(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateTemplateRequest>,
) -> Result<Json<NftTemplate>, AppError> {
    let id = TemplateId::from_uuid(id);
    let mut template = state
        .templates
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("NFT template", id))?;

    ensure_owner_or_admin(&auth, template.creator)?;

    if let Some(name) = request.name {
        if name.trim().chars().count() < 3 {
            return Err(AppError::validation("Name must be at least 3 characters"));
        }
        template.name = name;
    }
    if let Some(description) = request.description {
        template.description = Some(description);
    }
    if let Some(metadata) = request.metadata {
        template.metadata = metadata;
    }

    state.templates.update(&template).await?;
    Ok(Json(template))
}

/// Delete a template. Requires the creator or an admin.
///
/// Dangling references from events are not guarded against; a later mint
/// against such an event reports the missing template.
///
/// # Errors
///
/// 404 if absent, 403 if not permitted.
pub async fn delete_template(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = TemplateId::from_uuid(id);
    let template = state
        .templates
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("NFT template", id))?;

    ensure_owner_or_admin(&auth, template.creator)?;

    state.templates.delete(id).await?;
    tracing::info!(template = %id, "Template deleted");
    Ok(Json(MessageResponse::new("NFT template deleted")))
}
