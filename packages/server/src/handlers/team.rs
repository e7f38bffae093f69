use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{position, team, team_education, team_social};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::multipart::{FormData, ensure_image};
use crate::models::shared::{ApiResponse, IdResponse, ListQuery};
use crate::models::team::*;
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Teams",
    operation_id = "listTeams",
    summary = "List team members",
    description = "Public readers get the whole roster with educations and social links. \
        Admin readers get a page of five table rows searched by `q`.",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Roster or one page of members", body = ApiResponse<TeamListing>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_teams(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<TeamListing>>, AppError> {
    if visibility == Visibility::Public {
        return Ok(ApiResponse::ok(TeamListing::Roster(
            roster(&state.db).await?,
        )));
    }

    let page = listing::list::<team::Entity>(&state.db, visibility, &query).await?;
    let positions = position_names(&state.db, page.items.iter().map(|m| m.position_id.clone()))
        .await?;

    Ok(ApiResponse::ok(TeamListing::Table(page.map(|m| TeamItem {
        position: positions.get(&m.position_id).cloned().unwrap_or_default(),
        id: m.id,
        fullname: m.fullname,
        image_url: m.image_url,
        created_at: m.created_at,
    }))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Teams",
    operation_id = "getTeam",
    summary = "Get a team member",
    params(("id" = String, Path, description = "Team member ID")),
    responses(
        (status = 200, description = "Team member", body = ApiResponse<TeamResponse>),
        (status = 404, description = "Team member not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TeamResponse>>, AppError> {
    let model = find_team(&state.db, &id).await?;
    Ok(ApiResponse::ok(member(&state.db, model).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Create a team member",
    request_body(content = TeamForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Team member created", body = ApiResponse<TeamResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form))]
pub async fn create_team(
    admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let TeamForm {
        fullname,
        position_id,
        educations,
        socials,
        image,
    } = TeamForm::parse(form)?;

    let fullname =
        fullname.ok_or_else(|| AppError::Validation("Field 'fullname' is required".into()))?;
    let position_id = position_id
        .ok_or_else(|| AppError::Validation("Field 'position_id' is required".into()))?;
    let image = image.ok_or_else(|| AppError::Validation("File 'image' is required".into()))?;
    ensure_image(&image)?;
    ensure_position(&state.db, &position_id).await?;

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create_one(Upload::new(folder::TEAMS, &image), |photo| async move {
            let txn = db.begin().await?;
            let model = team::ActiveModel {
                id: Set(ident::mint(IdKind::Team)),
                fullname: Set(fullname),
                image_key: Set(photo.key),
                image_url: Set(photo.url),
                position_id: Set(position_id),
                created_by: Set(admin.admin_id.clone()),
                updated_by: Set(admin.admin_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            upsert_children(&txn, &model.id, educations, socials).await?;
            txn.commit().await?;
            Ok::<_, AppError>(model)
        })
        .await?;

    Ok(ApiResponse::created(member(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Teams",
    operation_id = "updateTeam",
    summary = "Update a team member",
    description = "Educations and social links carrying the `id` of one of this member's \
        entries update it; entries without a known `id` are added. Entries not sent are kept.",
    params(("id" = String, Path, description = "Team member ID")),
    request_body(content = TeamForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Team member updated", body = ApiResponse<TeamResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team member not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn update_team(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<ApiResponse<TeamResponse>>, AppError> {
    let existing = find_team(&state.db, &id).await?;
    let TeamForm {
        fullname,
        position_id,
        educations,
        socials,
        image,
    } = TeamForm::parse(form)?;

    if let Some(image) = &image {
        ensure_image(image)?;
    }
    if let Some(position_id) = &position_id {
        ensure_position(&state.db, position_id).await?;
    }

    let db = state.db.clone();
    let current_key = existing.image_key.clone();
    let model = state
        .blobs
        .replace_one(
            image.as_ref().map(|f| Upload::new(folder::TEAMS, f)),
            &current_key,
            |photo| async move {
                let txn = db.begin().await?;
                let mut active: team::ActiveModel = existing.into();
                if let Some(fullname) = fullname {
                    active.fullname = Set(fullname);
                }
                if let Some(position_id) = position_id {
                    active.position_id = Set(position_id);
                }
                if let Some(photo) = photo {
                    active.image_key = Set(photo.key);
                    active.image_url = Set(photo.url);
                }
                active.updated_by = Set(admin.admin_id);
                active.updated_at = Set(Utc::now());
                let model = active.update(&txn).await?;
                upsert_children(&txn, &model.id, educations, socials).await?;
                txn.commit().await?;
                Ok::<_, AppError>(model)
            },
        )
        .await?;

    Ok(ApiResponse::ok(member(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Teams",
    operation_id = "deleteTeam",
    summary = "Delete a team member",
    description = "Removes the photo, then the member with its educations and social links.",
    params(("id" = String, Path, description = "Team member ID")),
    responses(
        (status = 200, description = "Team member deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team member not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_team(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_team(&state.db, &id).await?;

    let db = state.db.clone();
    state
        .blobs
        .delete(&[existing.image_key], || async move {
            let txn = db.begin().await?;
            team_education::Entity::delete_many()
                .filter(team_education::Column::TeamId.eq(existing.id.as_str()))
                .exec(&txn)
                .await?;
            team_social::Entity::delete_many()
                .filter(team_social::Column::TeamId.eq(existing.id.as_str()))
                .exec(&txn)
                .await?;
            team::Entity::delete_by_id(existing.id).exec(&txn).await?;
            txn.commit().await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

#[utoipa::path(
    delete,
    path = "/{id}/educations/{education_id}",
    tag = "Teams",
    operation_id = "deleteTeamEducation",
    summary = "Remove one education entry",
    params(
        ("id" = String, Path, description = "Team member ID"),
        ("education_id" = String, Path, description = "Education entry ID"),
    ),
    responses(
        (status = 200, description = "Education removed", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Education not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id, education_id))]
pub async fn delete_team_education(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((id, education_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let result = team_education::Entity::delete_many()
        .filter(team_education::Column::Id.eq(education_id.as_str()))
        .filter(team_education::Column::TeamId.eq(id.as_str()))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Education not found".into()));
    }
    Ok(ApiResponse::ok(IdResponse::new(education_id)))
}

#[utoipa::path(
    delete,
    path = "/{id}/socials/{social_id}",
    tag = "Teams",
    operation_id = "deleteTeamSocial",
    summary = "Remove one social link",
    params(
        ("id" = String, Path, description = "Team member ID"),
        ("social_id" = String, Path, description = "Social link ID"),
    ),
    responses(
        (status = 200, description = "Social link removed", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Social link not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id, social_id))]
pub async fn delete_team_social(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((id, social_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let result = team_social::Entity::delete_many()
        .filter(team_social::Column::Id.eq(social_id.as_str()))
        .filter(team_social::Column::TeamId.eq(id.as_str()))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Social link not found".into()));
    }
    Ok(ApiResponse::ok(IdResponse::new(social_id)))
}

/// Every team member, oldest first, with educations and social links.
pub(crate) async fn roster<C: ConnectionTrait>(db: &C) -> Result<Vec<TeamResponse>, DbErr> {
    let members = team::Entity::find()
        .order_by_asc(team::Column::CreatedAt)
        .order_by_asc(team::Column::Id)
        .all(db)
        .await?;
    if members.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();
    let positions: HashMap<String, position::Model> = position::Entity::find()
        .filter(position::Column::Id.is_in(members.iter().map(|m| m.position_id.clone())))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    let mut educations: HashMap<String, Vec<team_education::Model>> = HashMap::new();
    for e in team_education::Entity::find()
        .filter(team_education::Column::TeamId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        educations.entry(e.team_id.clone()).or_default().push(e);
    }
    let mut socials: HashMap<String, Vec<team_social::Model>> = HashMap::new();
    for s in team_social::Entity::find()
        .filter(team_social::Column::TeamId.is_in(ids))
        .all(db)
        .await?
    {
        socials.entry(s.team_id.clone()).or_default().push(s);
    }

    Ok(members
        .into_iter()
        .map(|m| {
            let position = positions.get(&m.position_id).cloned();
            let educations = educations.remove(&m.id).unwrap_or_default();
            let socials = socials.remove(&m.id).unwrap_or_default();
            TeamResponse::build(m, position, educations, socials)
        })
        .collect())
}

async fn member<C: ConnectionTrait>(db: &C, model: team::Model) -> Result<TeamResponse, DbErr> {
    let position = position::Entity::find_by_id(model.position_id.clone())
        .one(db)
        .await?;
    let educations = team_education::Entity::find()
        .filter(team_education::Column::TeamId.eq(model.id.as_str()))
        .all(db)
        .await?;
    let socials = team_social::Entity::find()
        .filter(team_social::Column::TeamId.eq(model.id.as_str()))
        .all(db)
        .await?;
    Ok(TeamResponse::build(model, position, educations, socials))
}

/// Update entries whose `id` belongs to `team_id`, insert the rest.
async fn upsert_children<C: ConnectionTrait>(
    db: &C,
    team_id: &str,
    educations: Vec<EducationInput>,
    socials: Vec<SocialInput>,
) -> Result<(), DbErr> {
    let known_educations: HashMap<String, team_education::Model> = team_education::Entity::find()
        .filter(team_education::Column::TeamId.eq(team_id))
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();

    for input in educations {
        match input.id.as_ref().and_then(|id| known_educations.get(id)) {
            Some(current) => {
                let mut active: team_education::ActiveModel = current.clone().into();
                active.name = Set(input.name.trim().to_string());
                active.level = Set(input.level);
                active.update(db).await?;
            }
            None => {
                team_education::ActiveModel {
                    id: Set(ident::mint(IdKind::Education)),
                    team_id: Set(team_id.to_string()),
                    name: Set(input.name.trim().to_string()),
                    level: Set(input.level),
                }
                .insert(db)
                .await?;
            }
        }
    }

    let known_socials: HashMap<String, team_social::Model> = team_social::Entity::find()
        .filter(team_social::Column::TeamId.eq(team_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();

    for input in socials {
        match input.id.as_ref().and_then(|id| known_socials.get(id)) {
            Some(current) => {
                let mut active: team_social::ActiveModel = current.clone().into();
                active.platform = Set(input.platform);
                active.url = Set(input.url.trim().to_string());
                active.update(db).await?;
            }
            None => {
                team_social::ActiveModel {
                    id: Set(ident::mint(IdKind::Social)),
                    team_id: Set(team_id.to_string()),
                    platform: Set(input.platform),
                    url: Set(input.url.trim().to_string()),
                }
                .insert(db)
                .await?;
            }
        }
    }

    Ok(())
}

async fn position_names<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, String>, DbErr> {
    let ids: Vec<String> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(position::Entity::find()
        .select_only()
        .column(position::Column::Id)
        .column(position::Column::Name)
        .filter(position::Column::Id.is_in(ids))
        .into_tuple::<(String, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect())
}

async fn ensure_position<C: ConnectionTrait>(db: &C, id: &str) -> Result<(), AppError> {
    position::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(format!("Position '{id}' does not exist")))
}

async fn find_team<C: ConnectionTrait>(db: &C, id: &str) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team member not found".into()))
}
