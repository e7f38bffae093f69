use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::access_key;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, confirm_access_key};
use crate::extractors::json::AppJson;
use crate::models::access_key::*;
use crate::models::shared::{ApiResponse, IdResponse, require_text};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Access Keys",
    operation_id = "listAccessKeys",
    summary = "List access keys",
    responses(
        (status = 200, description = "Access keys, newest first", body = ApiResponse<Vec<AccessKeyResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Superadmin only (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin))]
pub async fn list_access_keys(
    admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AccessKeyResponse>>>, AppError> {
    admin.require_superadmin()?;

    let keys = access_key::Entity::find()
        .order_by_desc(access_key::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(ApiResponse::ok(keys.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Access Keys",
    operation_id = "createAccessKey",
    summary = "Store an access key",
    description = "Requires the shared access key in `access_key`.",
    request_body = CreateAccessKeyRequest,
    responses(
        (status = 201, description = "Access key stored", body = ApiResponse<AccessKeyResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a superadmin or wrong shared key (PERMISSION_DENIED, FORBIDDEN)", body = ErrorBody),
        (status = 409, description = "Key already stored (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload))]
pub async fn create_access_key(
    admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAccessKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require_superadmin()?;
    confirm_access_key(&state.config.auth.access_key, &payload.access_key)?;
    require_text(&payload.value, "value")?;

    let model = access_key::ActiveModel {
        id: Set(ident::mint(IdKind::AccessKey)),
        value: Set(payload.value.trim().to_string()),
        created_by: Set(admin.admin_id),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(key_id = %model.id, "Access key stored");
    Ok(ApiResponse::created(AccessKeyResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Access Keys",
    operation_id = "deleteAccessKey",
    summary = "Delete an access key",
    description = "Requires the shared access key in the JSON body.",
    params(("id" = String, Path, description = "Access key ID")),
    request_body = AccessKeyConfirmation,
    responses(
        (status = 200, description = "Access key deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a superadmin or wrong shared key (PERMISSION_DENIED, FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Access key not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id))]
pub async fn delete_access_key(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AccessKeyConfirmation>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    admin.require_superadmin()?;
    confirm_access_key(&state.config.auth.access_key, &payload.access_key)?;

    let result = access_key::Entity::delete_by_id(id.clone())
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Access key not found".into()));
    }
    Ok(ApiResponse::ok(IdResponse::new(id)))
}
