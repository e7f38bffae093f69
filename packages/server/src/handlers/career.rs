use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{career, career_applicant};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::json::AppJson;
use crate::extractors::multipart::FormData;
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged, require_text, validate_title};
use crate::models::career::*;
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
    tag = "Careers",
    operation_id = "listCareers",
    summary = "List career postings",
    description = "Admin readers additionally get the number of applicants per posting.",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "One page of postings", body = ApiResponse<Paged<CareerItem>>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_careers(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<CareerItem>>>, AppError> {
    let page = listing::list::<career::Entity>(&state.db, visibility, &query).await?;
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
        CareerItem::build(m, &names, visibility, Some(count))
    })))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Careers",
    operation_id = "getCareer",
    summary = "Get a career posting by ID or slug",
    params(
        ("id" = String, Path, description = "Career posting ID or slug"),
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Career posting", body = ApiResponse<CareerDetail>),
        (status = 404, description = "Posting not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_career(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<CareerDetail>>, AppError> {
    let model = career::Entity::find()
        .filter(
            Condition::any()
                .add(career::Column::Id.eq(key.as_str()))
                .add(career::Column::Slug.eq(key.as_str())),
        )
        .one(&state.db)
        .await?
        .filter(|m| visibility == Visibility::Admin || m.is_active)
        .ok_or_else(|| AppError::NotFound("Career posting not found".into()))?;

    let count = match visibility {
        Visibility::Admin => applicant_counts(&state.db, [model.id.clone()])
            .await?
            .get(&model.id)
            .copied(),
        Visibility::Public => None,
    };
    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::ok(CareerDetail::build(
        model,
        &names,
        visibility,
        Some(count.unwrap_or(0)),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Careers",
    operation_id = "createCareer",
    summary = "Create a career posting",
    request_body = CreateCareerRequest,
    responses(
        (status = 201, description = "Posting created", body = ApiResponse<CareerDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload))]
pub async fn create_career(
    admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCareerRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_title(&payload.title)?;
    require_text(&payload.requirements, "requirements")?;
    taxonomy::ensure_refs(
        &state.db,
        payload.pillar_id.as_deref(),
        payload.sub_pillar_id.as_deref(),
    )
    .await?;

    let slug = unique_slug::<career::Entity, _>(
        &state.db,
        career::Column::Slug,
        career::Column::Id,
        &payload.title,
        None,
    )
    .await?;

    let now = Utc::now();
    let model = career::ActiveModel {
        id: Set(ident::mint(IdKind::Career)),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        location: Set(payload.location),
        employment_type: Set(payload.employment_type),
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
    Ok(ApiResponse::created(CareerDetail::build(
        model,
        &names,
        Visibility::Admin,
        Some(0),
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Careers",
    operation_id = "updateCareer",
    summary = "Update a career posting",
    description = "Only the fields sent are changed. `null` clears a nullable field.",
    params(("id" = String, Path, description = "Career posting ID")),
    request_body = UpdateCareerRequest,
    responses(
        (status = 200, description = "Posting updated", body = ApiResponse<CareerDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Posting not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id))]
pub async fn update_career(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCareerRequest>,
) -> Result<Json<ApiResponse<CareerDetail>>, AppError> {
    let existing = find_career(&state.db, &id).await?;

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
            unique_slug::<career::Entity, _>(
                &state.db,
                career::Column::Slug,
                career::Column::Id,
                title,
                Some(&id),
            )
            .await?,
        ),
        _ => None,
    };

    let mut active: career::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(slug) = slug {
        active.slug = Set(slug);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(employment_type) = payload.employment_type {
        active.employment_type = Set(employment_type);
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
    Ok(ApiResponse::ok(CareerDetail::build(
        model,
        &names,
        Visibility::Admin,
        Some(count),
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Careers",
    operation_id = "deleteCareer",
    summary = "Delete a career posting",
    description = "Removes every applicant's CV, then the applicants, then the posting.",
    params(("id" = String, Path, description = "Career posting ID")),
    responses(
        (status = 200, description = "Posting deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Posting not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "File removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_career(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_career(&state.db, &id).await?;
    let applicants = career_applicant::Entity::find()
        .filter(career_applicant::Column::CareerId.eq(id.as_str()))
        .all(&state.db)
        .await?;

    let owned: Vec<String> = applicants.into_iter().map(|a| a.cv_key).collect();

    let db = state.db.clone();
    state
        .blobs
        .delete_cascade(&owned, || async move {
            let txn = db.begin().await?;
            let removed = career_applicant::Entity::delete_many()
                .filter(career_applicant::Column::CareerId.eq(existing.id.as_str()))
                .exec_with_returning(&txn)
                .await?;
            career::Entity::delete_by_id(existing.id).exec(&txn).await?;
            txn.commit().await?;
            let keys = removed.into_iter().map(|a| a.cv_key).collect();
            Ok::<_, AppError>(((), keys))
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

#[utoipa::path(
    post,
    path = "/{id}/applicants",
    tag = "Careers",
    operation_id = "applyCareer",
    summary = "Apply to a career posting",
    description = "Public. The CV is removed again if the application cannot be stored.",
    params(("id" = String, Path, description = "Career posting ID")),
    request_body(content = CareerApplicationForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Application received", body = ApiResponse<CareerApplicantResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Posting not found or closed (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn apply_career(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let posting = find_career(&state.db, &id).await?;
    if !posting.is_active {
        return Err(AppError::NotFound("Career posting not found".into()));
    }

    let CareerApplicationForm {
        fullname,
        email,
        phone_number,
        address,
        instagram_url,
        portfolio_url,
        cv,
    } = CareerApplicationForm::parse(form)?;
    if !looks_like_email(&email) {
        return Err(AppError::Validation("Field 'email' is not a valid email".into()));
    }

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create_one(Upload::new(folder::CAREER_CVS, &cv), |cv| async move {
            let model = career_applicant::ActiveModel {
                id: Set(ident::mint(IdKind::CareerApplicant)),
                career_id: Set(posting.id),
                fullname: Set(fullname),
                email: Set(email),
                phone_number: Set(phone_number),
                address: Set(address),
                instagram_url: Set(instagram_url),
                portfolio_url: Set(portfolio_url),
                cv_key: Set(cv.key),
                cv_url: Set(cv.url),
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

    Ok(ApiResponse::created(CareerApplicantResponse::from(model)))
}

#[utoipa::path(
    get,
    path = "/{id}/applicants",
    tag = "Careers",
    operation_id = "listCareerApplicants",
    summary = "List applicants of a career posting",
    params(("id" = String, Path, description = "Career posting ID")),
    responses(
        (status = 200, description = "Applicants, newest first", body = ApiResponse<Vec<CareerApplicantResponse>>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Posting not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn list_career_applicants(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<CareerApplicantResponse>>>, AppError> {
    find_career(&state.db, &id).await?;
    let applicants = career_applicant::Entity::find()
        .filter(career_applicant::Column::CareerId.eq(id.as_str()))
        .order_by_desc(career_applicant::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok(
        applicants.into_iter().map(Into::into).collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}/applicants/{applicant_id}/approval",
    tag = "Careers",
    operation_id = "toggleCareerApproval",
    summary = "Toggle an applicant's approval",
    description = "Approving records the acting admin; revoking clears it.",
    params(
        ("id" = String, Path, description = "Career posting ID"),
        ("applicant_id" = String, Path, description = "Applicant ID"),
    ),
    responses(
        (status = 200, description = "Approval toggled", body = ApiResponse<CareerApplicantResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Applicant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin), fields(id, applicant_id))]
pub async fn toggle_career_approval(
    admin: AdminUser,
    State(state): State<AppState>,
    Path((id, applicant_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CareerApplicantResponse>>, AppError> {
    let applicant = career_applicant::Entity::find_by_id(applicant_id)
        .filter(career_applicant::Column::CareerId.eq(id.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Applicant not found".into()))?;

    let approved = !applicant.is_approved;
    let mut active: career_applicant::ActiveModel = applicant.into();
    active.is_approved = Set(approved);
    active.approved_by = Set(approved.then_some(admin.admin_id));
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(ApiResponse::ok(model.into()))
}

/// Number of applicants per posting, for the given posting IDs.
async fn applicant_counts<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, u64>, DbErr> {
    let ids: Vec<String> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i64)> = career_applicant::Entity::find()
        .select_only()
        .column(career_applicant::Column::CareerId)
        .column_as(career_applicant::Column::Id.count(), "count")
        .filter(career_applicant::Column::CareerId.is_in(ids))
        .group_by(career_applicant::Column::CareerId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, std::cmp::Ord::max(count, 0) as u64))
        .collect())
}

async fn find_career<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<career::Model, AppError> {
    career::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Career posting not found".into()))
}
