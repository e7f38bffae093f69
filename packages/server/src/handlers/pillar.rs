use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{pillar, sub_pillar};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::json::AppJson;
use crate::models::pillar::*;
use crate::models::shared::{ApiResponse, IdResponse, ListQuery};
use crate::services::listing::{self, Visibility};
use crate::services::slug::unique_slug;
use crate::services::taxonomy;
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Pillars",
    operation_id = "listPillars",
    summary = "List pillars",
    description = "Public readers get every pillar with its subpillars. Admin readers get a \
        page of five searched by `q`.",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Pillar tree or one page of pillars", body = ApiResponse<PillarListing>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_pillars(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PillarListing>>, AppError> {
    if visibility == Visibility::Public {
        let pillars = pillar::Entity::find()
            .order_by_asc(pillar::Column::Name)
            .all(&state.db)
            .await?;
        let tree = with_subpillars(&state.db, pillars).await?;
        return Ok(ApiResponse::ok(PillarListing::Tree(tree)));
    }

    let page = listing::list::<pillar::Entity>(&state.db, visibility, &query).await?;
    let mut subs = subpillars_of(&state.db, page.items.iter().map(|p| p.id.clone())).await?;
    Ok(ApiResponse::ok(PillarListing::Table(page.map(|p| {
        let children = subs.remove(&p.id).unwrap_or_default();
        PillarResponse::build(p, children)
    }))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Pillars",
    operation_id = "getPillar",
    summary = "Get a pillar with its subpillars",
    params(("id" = String, Path, description = "Pillar ID")),
    responses(
        (status = 200, description = "Pillar", body = ApiResponse<PillarResponse>),
        (status = 404, description = "Pillar not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_pillar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PillarResponse>>, AppError> {
    let model = find_pillar(&state.db, &id).await?;
    Ok(ApiResponse::ok(detail(&state.db, model).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Pillars",
    operation_id = "createPillar",
    summary = "Create a pillar with its subpillars",
    request_body = CreatePillarRequest,
    responses(
        (status = 201, description = "Pillar created", body = ApiResponse<PillarResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload))]
pub async fn create_pillar(
    admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePillarRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create(&payload)?;

    let txn = state.db.begin().await?;
    let name = payload.name.trim().to_string();
    let slug =
        unique_slug::<pillar::Entity, _>(&txn, pillar::Column::Slug, pillar::Column::Id, &name, None)
            .await?;

    let now = Utc::now();
    let model = pillar::ActiveModel {
        id: Set(ident::mint(IdKind::Pillar)),
        name: Set(name),
        slug: Set(slug),
        created_by: Set(admin.admin_id.clone()),
        updated_by: Set(admin.admin_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    upsert_subpillars(&txn, &model.id, payload.subpillars, &admin.admin_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::created(detail(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Pillars",
    operation_id = "updatePillar",
    summary = "Update a pillar",
    description = "Subpillars carrying the `id` of one of this pillar's subpillars are renamed; \
        the rest are created. Subpillars not listed are kept.",
    params(("id" = String, Path, description = "Pillar ID")),
    request_body = UpdatePillarRequest,
    responses(
        (status = 200, description = "Pillar updated", body = ApiResponse<PillarResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Pillar not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id))]
pub async fn update_pillar(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePillarRequest>,
) -> Result<Json<ApiResponse<PillarResponse>>, AppError> {
    validate_update(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_pillar(&txn, &id).await?;

    let mut active: pillar::ActiveModel = existing.clone().into();
    if let Some(name) = payload.name.map(|n| n.trim().to_string())
        && name != existing.name
    {
        let slug = unique_slug::<pillar::Entity, _>(
            &txn,
            pillar::Column::Slug,
            pillar::Column::Id,
            &name,
            Some(&id),
        )
        .await?;
        active.name = Set(name);
        active.slug = Set(slug);
    }
    active.updated_by = Set(admin.admin_id.clone());
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;

    upsert_subpillars(&txn, &model.id, payload.subpillars, &admin.admin_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(detail(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Pillars",
    operation_id = "deletePillar",
    summary = "Delete a pillar and its subpillars",
    description = "Records filed under the pillar or any of its subpillars become uncategorized.",
    params(("id" = String, Path, description = "Pillar ID")),
    responses(
        (status = 200, description = "Pillar deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Pillar not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_pillar(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_pillar(&txn, &id).await?;
    let sub_ids: Vec<String> = sub_pillar::Entity::find()
        .select_only()
        .column(sub_pillar::Column::Id)
        .filter(sub_pillar::Column::PillarId.eq(existing.id.as_str()))
        .into_tuple()
        .all(&txn)
        .await?;

    taxonomy::detach(&txn, std::slice::from_ref(&existing.id), &sub_ids).await?;
    sub_pillar::Entity::delete_many()
        .filter(sub_pillar::Column::PillarId.eq(existing.id.as_str()))
        .exec(&txn)
        .await?;
    pillar::Entity::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    info!(subpillars = sub_ids.len(), "Pillar deleted");
    Ok(ApiResponse::ok(IdResponse::new(id)))
}

#[utoipa::path(
    delete,
    path = "/{id}/subpillars/{sub_pillar_id}",
    tag = "Pillars",
    operation_id = "deleteSubPillar",
    summary = "Delete one subpillar",
    description = "Records filed under the subpillar keep their pillar and lose the subpillar.",
    params(
        ("id" = String, Path, description = "Pillar ID"),
        ("sub_pillar_id" = String, Path, description = "Subpillar ID"),
    ),
    responses(
        (status = 200, description = "Subpillar deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Subpillar not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id, sub_pillar_id))]
pub async fn delete_sub_pillar(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((id, sub_pillar_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let txn = state.db.begin().await?;
    let sub = sub_pillar::Entity::find_by_id(sub_pillar_id.clone())
        .filter(sub_pillar::Column::PillarId.eq(id.as_str()))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Subpillar not found".into()))?;

    taxonomy::detach(&txn, &[], std::slice::from_ref(&sub.id)).await?;
    sub_pillar::Entity::delete_by_id(sub.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(IdResponse::new(sub_pillar_id)))
}

/// Rename subpillars of `pillar_id` whose id is sent, create the others.
async fn upsert_subpillars<C: ConnectionTrait>(
    db: &C,
    pillar_id: &str,
    items: Vec<SubPillarInput>,
    by: &str,
) -> Result<(), DbErr> {
    let known: HashMap<String, sub_pillar::Model> = sub_pillar::Entity::find()
        .filter(sub_pillar::Column::PillarId.eq(pillar_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();

    let now = Utc::now();
    for item in items {
        let name = item.name.trim().to_string();
        match item.id.as_ref().and_then(|id| known.get(id)) {
            Some(current) if current.name == name => {}
            Some(current) => {
                let slug = unique_slug::<sub_pillar::Entity, _>(
                    db,
                    sub_pillar::Column::Slug,
                    sub_pillar::Column::Id,
                    &name,
                    Some(&current.id),
                )
                .await?;
                let mut active: sub_pillar::ActiveModel = current.clone().into();
                active.name = Set(name);
                active.slug = Set(slug);
                active.updated_by = Set(by.to_string());
                active.updated_at = Set(now);
                active.update(db).await?;
            }
            None => {
                let slug = unique_slug::<sub_pillar::Entity, _>(
                    db,
                    sub_pillar::Column::Slug,
                    sub_pillar::Column::Id,
                    &name,
                    None,
                )
                .await?;
                sub_pillar::ActiveModel {
                    id: Set(ident::mint(IdKind::SubPillar)),
                    pillar_id: Set(pillar_id.to_string()),
                    name: Set(name),
                    slug: Set(slug),
                    created_by: Set(by.to_string()),
                    updated_by: Set(by.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?;
            }
        }
    }
    Ok(())
}

async fn subpillars_of<C: ConnectionTrait>(
    db: &C,
    pillar_ids: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, Vec<sub_pillar::Model>>, DbErr> {
    let ids: Vec<String> = pillar_ids.into_iter().collect();
    let mut grouped: HashMap<String, Vec<sub_pillar::Model>> = HashMap::new();
    if ids.is_empty() {
        return Ok(grouped);
    }
    for sub in sub_pillar::Entity::find()
        .filter(sub_pillar::Column::PillarId.is_in(ids))
        .all(db)
        .await?
    {
        grouped.entry(sub.pillar_id.clone()).or_default().push(sub);
    }
    Ok(grouped)
}

async fn with_subpillars<C: ConnectionTrait>(
    db: &C,
    pillars: Vec<pillar::Model>,
) -> Result<Vec<PillarResponse>, DbErr> {
    let mut subs = subpillars_of(db, pillars.iter().map(|p| p.id.clone())).await?;
    Ok(pillars
        .into_iter()
        .map(|p| {
            let children = subs.remove(&p.id).unwrap_or_default();
            PillarResponse::build(p, children)
        })
        .collect())
}

async fn detail<C: ConnectionTrait>(db: &C, model: pillar::Model) -> Result<PillarResponse, DbErr> {
    let mut tree = with_subpillars(db, vec![model]).await?;
    tree.pop()
        .ok_or_else(|| DbErr::Custom("pillar vanished while loading subpillars".into()))
}

async fn find_pillar<C: ConnectionTrait>(db: &C, id: &str) -> Result<pillar::Model, AppError> {
    pillar::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pillar not found".into()))
}
