use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::partner;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::multipart::{FormData, ensure_image};
use crate::models::banner::{PartnerForm, PartnerResponse};
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged};
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Partners",
    operation_id = "listPartners",
    summary = "List partners",
    description = "Newest first, five per page. `q` searches the alt text.",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of partners", body = ApiResponse<Paged<PartnerResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, query))]
pub async fn list_partners(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<PartnerResponse>>>, AppError> {
    let page = listing::list::<partner::Entity>(&state.db, Visibility::Admin, &query).await?;
    Ok(ApiResponse::ok(page.map(PartnerResponse::from)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Partners",
    operation_id = "getPartner",
    summary = "Get a partner",
    params(("id" = String, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Partner", body = ApiResponse<PartnerResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Partner not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn get_partner(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PartnerResponse>>, AppError> {
    let model = find_partner(&state.db, &id).await?;
    Ok(ApiResponse::ok(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Partners",
    operation_id = "createPartner",
    summary = "Create a partner",
    request_body(content = PartnerForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Partner created", body = ApiResponse<PartnerResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form))]
pub async fn create_partner(
    admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let PartnerForm { alt, image } = PartnerForm::parse(form)?;
    let alt = alt.ok_or_else(|| AppError::Validation("Field 'alt' is required".into()))?;
    let image = image.ok_or_else(|| AppError::Validation("File 'image' is required".into()))?;
    ensure_image(&image)?;

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create_one(Upload::new(folder::PARTNERS, &image), |stored| async move {
            let model = partner::ActiveModel {
                id: Set(ident::mint(IdKind::Partner)),
                alt: Set(alt),
                image_key: Set(stored.key),
                image_url: Set(stored.url),
                created_by: Set(admin.admin_id.clone()),
                updated_by: Set(admin.admin_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await?;
            Ok::<_, AppError>(model)
        })
        .await?;

    Ok(ApiResponse::created(PartnerResponse::from(model)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Partners",
    operation_id = "updatePartner",
    summary = "Update a partner",
    description = "A new `image` replaces the old one, which is removed after the partner is saved.",
    params(("id" = String, Path, description = "Partner ID")),
    request_body(content = PartnerForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Partner updated", body = ApiResponse<PartnerResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Partner not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn update_partner(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<ApiResponse<PartnerResponse>>, AppError> {
    let existing = find_partner(&state.db, &id).await?;
    let PartnerForm { alt, image } = PartnerForm::parse(form)?;
    if let Some(image) = &image {
        ensure_image(image)?;
    }

    let db = state.db.clone();
    let current_key = existing.image_key.clone();
    let model = state
        .blobs
        .replace_one(
            image.as_ref().map(|f| Upload::new(folder::PARTNERS, f)),
            &current_key,
            |stored| async move {
                let mut active: partner::ActiveModel = existing.into();
                if let Some(alt) = alt {
                    active.alt = Set(alt);
                }
                if let Some(stored) = stored {
                    active.image_key = Set(stored.key);
                    active.image_url = Set(stored.url);
                }
                active.updated_by = Set(admin.admin_id);
                active.updated_at = Set(Utc::now());
                Ok::<_, AppError>(active.update(&db).await?)
            },
        )
        .await?;

    Ok(ApiResponse::ok(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Partners",
    operation_id = "deletePartner",
    summary = "Delete a partner",
    params(("id" = String, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Partner deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Partner not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_partner(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_partner(&state.db, &id).await?;

    let db = state.db.clone();
    state
        .blobs
        .delete(&[existing.image_key], || async move {
            partner::Entity::delete_by_id(existing.id).exec(&db).await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

async fn find_partner<C: ConnectionTrait>(db: &C, id: &str) -> Result<partner::Model, AppError> {
    partner::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Partner not found".into()))
}
