use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::admin;
use crate::entity::enums::AdminRole;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, confirm_access_key};
use crate::extractors::json::AppJson;
use crate::models::admin::*;
use crate::models::shared::{ApiResponse, IdResponse};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};
use crate::utils::password;
use crate::utils::text::capitalize;

/// The root superadmin. Never listed, read, changed or removed through the API.
pub const ROOT_ADMIN_ID: &str = "JPSSA1";

#[utoipa::path(
    get,
    path = "/",
    tag = "Admins",
    operation_id = "listAdmins",
    summary = "List admin accounts",
    responses(
        (status = 200, description = "Admins, newest first", body = ApiResponse<Vec<AdminResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Superadmin only (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, caller))]
pub async fn list_admins(
    caller: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AdminResponse>>>, AppError> {
    caller.require_superadmin()?;

    let admins = admin::Entity::find()
        .filter(admin::Column::Id.ne(ROOT_ADMIN_ID))
        .order_by_desc(admin::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(ApiResponse::ok(admins.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Admins",
    operation_id = "getAdmin",
    summary = "Get an admin account",
    params(("id" = String, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin", body = ApiResponse<AdminResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Superadmin only (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Admin not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, caller), fields(id))]
pub async fn get_admin(
    caller: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AdminResponse>>, AppError> {
    caller.require_superadmin()?;
    let model = find_admin(&state.db, &id).await?;
    Ok(ApiResponse::ok(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Admins",
    operation_id = "createAdmin",
    summary = "Create an admin account",
    description = "Requires the shared access key. The full name is stored with capitalised \
        words and the password as an argon2 hash.",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<AdminResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a superadmin or wrong shared key (PERMISSION_DENIED, FORBIDDEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, caller, payload))]
pub async fn create_admin(
    caller: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    caller.require_superadmin()?;
    confirm_access_key(&state.config.auth.access_key, &payload.access_key)?;
    validate_create(&payload)?;

    let password_hash = password::hash(&payload.password)?;
    let now = Utc::now();
    let model = admin::ActiveModel {
        id: Set(mint_admin_id(payload.role)),
        fullname: Set(normalize_fullname(&payload.fullname)),
        password_hash: Set(password_hash),
        role: Set(payload.role),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(admin_id = %model.id, role = model.role.as_str(), "Admin account created");
    Ok(ApiResponse::created(AdminResponse::from(model)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Admins",
    operation_id = "updateAdmin",
    summary = "Update an admin account",
    description = "Requires the shared access key. Only the fields sent are changed.",
    params(("id" = String, Path, description = "Admin ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = ApiResponse<AdminResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a superadmin or wrong shared key (PERMISSION_DENIED, FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Admin not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, caller, payload), fields(id))]
pub async fn update_admin(
    caller: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateAdminRequest>,
) -> Result<Json<ApiResponse<AdminResponse>>, AppError> {
    caller.require_superadmin()?;
    confirm_access_key(&state.config.auth.access_key, &payload.access_key)?;
    validate_update(&payload)?;
    let existing = find_admin(&state.db, &id).await?;

    let mut active: admin::ActiveModel = existing.into();
    if let Some(fullname) = &payload.fullname {
        active.fullname = Set(normalize_fullname(fullname));
    }
    if let Some(secret) = &payload.password {
        active.password_hash = Set(password::hash(secret)?);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(ApiResponse::ok(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Admins",
    operation_id = "deleteAdmin",
    summary = "Delete an admin account",
    params(("id" = String, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Superadmin only (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Admin not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Deleting your own account (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, caller), fields(id))]
pub async fn delete_admin(
    caller: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    caller.require_superadmin()?;
    if caller.admin_id == id {
        return Err(AppError::Conflict("You cannot delete your own account".into()));
    }
    let existing = find_admin(&state.db, &id).await?;

    admin::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;
    Ok(ApiResponse::ok(IdResponse::new(id)))
}

/// Lower-case, collapse whitespace, capitalise every word.
fn normalize_fullname(raw: &str) -> String {
    capitalize(&raw.to_lowercase())
}

fn mint_admin_id(role: AdminRole) -> String {
    match role {
        AdminRole::Superadmin => ident::mint(IdKind::Superadmin),
        AdminRole::Admin => ident::mint(IdKind::Admin),
    }
}

async fn find_admin<C: ConnectionTrait>(db: &C, id: &str) -> Result<admin::Model, AppError> {
    if id == ROOT_ADMIN_ID {
        return Err(AppError::NotFound("Admin not found".into()));
    }
    admin::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".into()))
}
