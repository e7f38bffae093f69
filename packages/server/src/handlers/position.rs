use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{position, team};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::position::{PositionRequest, PositionResponse};
use crate::models::shared::{ApiResponse, IdResponse, require_text};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Positions",
    operation_id = "listPositions",
    summary = "List positions",
    description = "Every position, alphabetically, flagged with whether it can be deleted.",
    responses(
        (status = 200, description = "Positions", body = ApiResponse<Vec<PositionResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_positions(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PositionResponse>>>, AppError> {
    let positions = position::Entity::find()
        .order_by_asc(position::Column::Name)
        .all(&state.db)
        .await?;

    let counts: HashMap<String, i64> = team::Entity::find()
        .select_only()
        .column(team::Column::PositionId)
        .column_as(team::Column::Id.count(), "count")
        .group_by(team::Column::PositionId)
        .into_tuple::<(String, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();

    Ok(ApiResponse::ok(
        positions
            .into_iter()
            .map(|p| {
                let members = std::cmp::Ord::max(counts.get(&p.id).copied().unwrap_or(0), 0) as u64;
                PositionResponse::build(p, members)
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Positions",
    operation_id = "createPosition",
    summary = "Create a position",
    request_body = PositionRequest,
    responses(
        (status = 201, description = "Position created", body = ApiResponse<PositionResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload))]
pub async fn create_position(
    admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PositionRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_text(&payload.name, "name")?;

    let now = Utc::now();
    let model = position::ActiveModel {
        id: Set(ident::mint(IdKind::Position)),
        name: Set(payload.name.trim().to_string()),
        created_by: Set(admin.admin_id.clone()),
        updated_by: Set(admin.admin_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok(ApiResponse::created(PositionResponse::build(model, 0)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Positions",
    operation_id = "updatePosition",
    summary = "Rename a position",
    params(("id" = String, Path, description = "Position ID")),
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position updated", body = ApiResponse<PositionResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Position not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id))]
pub async fn update_position(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<PositionRequest>,
) -> Result<Json<ApiResponse<PositionResponse>>, AppError> {
    require_text(&payload.name, "name")?;
    let existing = find_position(&state.db, &id).await?;

    let mut active: position::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.updated_by = Set(admin.admin_id);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let members = member_count(&state.db, &model.id).await?;
    Ok(ApiResponse::ok(PositionResponse::build(model, members)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Positions",
    operation_id = "deletePosition",
    summary = "Delete a position",
    description = "Refused while any team member holds the position.",
    params(("id" = String, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Position not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Position in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_position(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_position(&state.db, &id).await?;
    let members = member_count(&state.db, &existing.id).await?;
    if members > 0 {
        return Err(AppError::Conflict(format!(
            "Position is held by {members} team member(s)"
        )));
    }

    position::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;
    Ok(ApiResponse::ok(IdResponse::new(id)))
}

async fn member_count<C: ConnectionTrait>(db: &C, position_id: &str) -> Result<u64, DbErr> {
    team::Entity::find()
        .filter(team::Column::PositionId.eq(position_id))
        .count(db)
        .await
}

async fn find_position<C: ConnectionTrait>(db: &C, id: &str) -> Result<position::Model, AppError> {
    position::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Position not found".into()))
}
