use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{volunteer, volunteer_applicant};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::json::AppJson;
use crate::extractors::multipart::FormData;
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged, require_text, validate_title};
use crate::models::volunteer::*;
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::services::slug::unique_slug;
use crate::services::taxonomy::{self, TaxonomyNames};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};
use crate::utils::text::looks_like_email;

#[utoipa::path(
    get,
    path = "/",
    tag = "Volunteers",
    operation_id = "listVolunteers",
    summary = "List volunteer openings",
    description = "Admin readers additionally get the number of applicants per opening.",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "One page of openings", body = ApiResponse<Paged<VolunteerItem>>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_volunteers(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<VolunteerItem>>>, AppError> {
    let page = listing::list::<volunteer::Entity>(&state.db, visibility, &query).await?;
    let names = TaxonomyNames::load(
        &state.db,
        page.items.iter().map(|m| (&m.pillar_id, &m.sub_pillar_id)),
    )
    .await?;

    let counts = match visibility {
        Visibility::Admin => {
            applicant_counts(&state.db, page.items.iter().map(|m| m.id.clone())).await?
        }
        Visibility::Public => HashMap::new(),
    };

    Ok(ApiResponse::ok(page.map(|m| {
        let count = counts.get(&m.id).copied().unwrap_or(0);
        VolunteerItem::build(m, &names, visibility, Some(count))
    })))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Volunteers",
    operation_id = "getVolunteer",
    summary = "Get a volunteer opening by ID or slug",
    params(
        ("id" = String, Path, description = "Volunteer opening ID or slug"),
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Volunteer opening", body = ApiResponse<VolunteerDetail>),
        (status = 404, description = "Opening not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_volunteer(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<VolunteerDetail>>, AppError> {
    let model = volunteer::Entity::find()
        .filter(
            Condition::any()
                .add(volunteer::Column::Id.eq(key.as_str()))
                .add(volunteer::Column::Slug.eq(key.as_str())),
        )
        .one(&state.db)
        .await?
        .filter(|m| visibility == Visibility::Admin || m.is_active)
        .ok_or_else(|| AppError::NotFound("Volunteer opening not found".into()))?;

    let count = match visibility {
        Visibility::Admin => applicant_counts(&state.db, [model.id.clone()])
            .await?
            .get(&model.id)
            .copied(),
        Visibility::Public => None,
    };
    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::ok(VolunteerDetail::build(
        model,
        &names,
        visibility,
        Some(count.unwrap_or(0)),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Volunteers",
    operation_id = "createVolunteer",
    summary = "Create a volunteer opening",
    request_body = CreateVolunteerRequest,
    responses(
        (status = 201, description = "Opening created", body = ApiResponse<VolunteerDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload))]
pub async fn create_volunteer(
    admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateVolunteerRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_title(&payload.title)?;
    require_text(&payload.requirements, "requirements")?;
    taxonomy::ensure_refs(
        &state.db,
        payload.pillar_id.as_deref(),
        payload.sub_pillar_id.as_deref(),
    )
    .await?;

    let slug = unique_slug::<volunteer::Entity, _>(
        &state.db,
        volunteer::Column::Slug,
        volunteer::Column::Id,
        &payload.title,
        None,
    )
    .await?;

    let now = Utc::now();
    let model = volunteer::ActiveModel {
        id: Set(ident::mint(IdKind::Volunteer)),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        requirements: Set(payload.requirements),
        responsibilities: Set(payload.responsibilities),
        pillar_id: Set(payload.pillar_id),
        sub_pillar_id: Set(payload.sub_pillar_id),
        is_active: Set(payload.is_active),
        created_by: Set(admin.admin_id.clone()),
        updated_by: Set(admin.admin_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::created(VolunteerDetail::build(
        model,
        &names,
        Visibility::Admin,
        Some(0),
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Volunteers",
    operation_id = "updateVolunteer",
    summary = "Update a volunteer opening",
    description = "Only the fields sent are changed. `null` clears a nullable field.",
    params(("id" = String, Path, description = "Volunteer opening ID")),
    request_body = UpdateVolunteerRequest,
    responses(
        (status = 200, description = "Opening updated", body = ApiResponse<VolunteerDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Opening not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id))]
pub async fn update_volunteer(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateVolunteerRequest>,
) -> Result<Json<ApiResponse<VolunteerDetail>>, AppError> {
    let existing = find_volunteer(&state.db, &id).await?;

    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(requirements) = &payload.requirements {
        require_text(requirements, "requirements")?;
    }

    let pillar_id = payload
        .pillar_id
        .unwrap_or_else(|| existing.pillar_id.clone());
    let sub_pillar_id = payload
        .sub_pillar_id
        .unwrap_or_else(|| existing.sub_pillar_id.clone());
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let slug = match &payload.title {
        Some(title) if title.trim() != existing.title => Some(
            unique_slug::<volunteer::Entity, _>(
                &state.db,
                volunteer::Column::Slug,
                volunteer::Column::Id,
                title,
                Some(&id),
            )
            .await?,
        ),
        _ => None,
    };

    let mut active: volunteer::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(slug) = slug {
        active.slug = Set(slug);
    }
    if let Some(requirements) = payload.requirements {
        active.requirements = Set(requirements);
    }
    if let Some(responsibilities) = payload.responsibilities {
        active.responsibilities = Set(responsibilities);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.pillar_id = Set(pillar_id);
    active.sub_pillar_id = Set(sub_pillar_id);
    active.updated_by = Set(admin.admin_id);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    let count = applicant_counts(&state.db, [model.id.clone()])
        .await?
        .get(&model.id)
        .copied()
        .unwrap_or(0);
    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::ok(VolunteerDetail::build(
        model,
        &names,
        Visibility::Admin,
        Some(count),
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Volunteers",
    operation_id = "deleteVolunteer",
    summary = "Delete a volunteer opening",
    description = "Removes every applicant's files, then the applicants, then the opening.",
    params(("id" = String, Path, description = "Volunteer opening ID")),
    responses(
        (status = 200, description = "Opening deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Opening not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "File removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_volunteer(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_volunteer(&state.db, &id).await?;
    let applicants = volunteer_applicant::Entity::find()
        .filter(volunteer_applicant::Column::VolunteerId.eq(id.as_str()))
        .all(&state.db)
        .await?;

    let owned: Vec<String> = applicants
        .into_iter()
        .flat_map(|a| [a.cv_key, a.follow_key])
        .collect();

    let db = state.db.clone();
    state
        .blobs
        .delete_cascade(&owned, || async move {
            let txn = db.begin().await?;
            let removed = volunteer_applicant::Entity::delete_many()
                .filter(volunteer_applicant::Column::VolunteerId.eq(existing.id.as_str()))
                .exec_with_returning(&txn)
                .await?;
            volunteer::Entity::delete_by_id(existing.id).exec(&txn).await?;
            txn.commit().await?;
            let keys = removed
                .into_iter()
                .flat_map(|a| [a.cv_key, a.follow_key])
                .collect();
            Ok::<_, AppError>(((), keys))
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

#[utoipa::path(
    post,
    path = "/{id}/applicants",
    tag = "Volunteers",
    operation_id = "applyVolunteer",
    summary = "Apply to a volunteer opening",
    description = "Public. The CV and the follow proof are uploaded concurrently; if either \
        upload or the database write fails, both files are removed.",
    params(("id" = String, Path, description = "Volunteer opening ID")),
    request_body(content = VolunteerApplicationForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Application received", body = ApiResponse<VolunteerApplicantResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Opening not found or closed (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn apply_volunteer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let opening = find_volunteer(&state.db, &id).await?;
    if !opening.is_active {
        return Err(AppError::NotFound("Volunteer opening not found".into()));
    }

    let VolunteerApplicationForm {
        fullname,
        email,
        institution,
        level,
        study_program,
        reason,
        cv,
        follow_proof,
    } = VolunteerApplicationForm::parse(form)?;
    if !looks_like_email(&email) {
        return Err(AppError::Validation("Field 'email' is not a valid email".into()));
    }

    let uploads = [
        Upload::new(folder::VOLUNTEER_CVS, &cv),
        Upload::new(folder::VOLUNTEER_PROOFS, &follow_proof),
    ];

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create(&uploads, |blobs| async move {
            let [cv, proof]: [_; 2] = blobs
                .try_into()
                .map_err(|_| AppError::Internal("expected two stored blobs".into()))?;
            let model = volunteer_applicant::ActiveModel {
                id: Set(ident::mint(IdKind::VolunteerApplicant)),
                volunteer_id: Set(opening.id),
                fullname: Set(fullname),
                email: Set(email),
                institution: Set(institution),
                level: Set(level),
                study_program: Set(study_program),
                reason: Set(reason),
                cv_key: Set(cv.key),
                cv_url: Set(cv.url),
                follow_key: Set(proof.key),
                follow_url: Set(proof.url),
                is_approved: Set(false),
                approved_by: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await?;
            Ok::<_, AppError>(model)
        })
        .await?;

    Ok(ApiResponse::created(VolunteerApplicantResponse::from(model)))
}

#[utoipa::path(
    get,
    path = "/{id}/applicants",
    tag = "Volunteers",
    operation_id = "listVolunteerApplicants",
    summary = "List applicants of a volunteer opening",
    params(("id" = String, Path, description = "Volunteer opening ID")),
    responses(
        (status = 200, description = "Applicants, newest first", body = ApiResponse<Vec<VolunteerApplicantResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Opening not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn list_volunteer_applicants(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<VolunteerApplicantResponse>>>, AppError> {
    find_volunteer(&state.db, &id).await?;
    let applicants = volunteer_applicant::Entity::find()
        .filter(volunteer_applicant::Column::VolunteerId.eq(id.as_str()))
        .order_by_desc(volunteer_applicant::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok(
        applicants.into_iter().map(Into::into).collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}/applicants/{applicant_id}/approval",
    tag = "Volunteers",
    operation_id = "toggleVolunteerApproval",
    summary = "Toggle an applicant's approval",
    description = "Approving records the acting admin; revoking clears it.",
    params(
        ("id" = String, Path, description = "Volunteer opening ID"),
        ("applicant_id" = String, Path, description = "Applicant ID"),
    ),
    responses(
        (status = 200, description = "Approval toggled", body = ApiResponse<VolunteerApplicantResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Applicant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin), fields(id, applicant_id))]
pub async fn toggle_volunteer_approval(
    admin: AdminUser,
    State(state): State<AppState>,
    Path((id, applicant_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<VolunteerApplicantResponse>>, AppError> {
    let applicant = volunteer_applicant::Entity::find_by_id(applicant_id)
        .filter(volunteer_applicant::Column::VolunteerId.eq(id.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Applicant not found".into()))?;

    let approved = !applicant.is_approved;
    let mut active: volunteer_applicant::ActiveModel = applicant.into();
    active.is_approved = Set(approved);
    active.approved_by = Set(approved.then_some(admin.admin_id));
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(ApiResponse::ok(model.into()))
}

/// Number of applicants per opening, for the given opening IDs.
async fn applicant_counts<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, u64>, DbErr> {
    let ids: Vec<String> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i64)> = volunteer_applicant::Entity::find()
        .select_only()
        .column(volunteer_applicant::Column::VolunteerId)
        .column_as(volunteer_applicant::Column::Id.count(), "count")
        .filter(volunteer_applicant::Column::VolunteerId.is_in(ids))
        .group_by(volunteer_applicant::Column::VolunteerId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, std::cmp::Ord::max(count, 0) as u64))
        .collect())
}

async fn find_volunteer<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<volunteer::Model, AppError> {
    volunteer::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Volunteer opening not found".into()))
}
