use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::event;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::multipart::{FormData, ensure_image};
use crate::models::event::*;
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged, require_text, validate_title};
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::services::slug::unique_slug;
use crate::services::taxonomy::{self, TaxonomyNames};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("Field '{field}' is required"))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List events",
    description = "Each item carries a `status` derived from its schedule at request time.",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "One page of events", body = ApiResponse<Paged<EventItem>>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_events(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<EventItem>>>, AppError> {
    let page = listing::list::<event::Entity>(&state.db, visibility, &query).await?;
    let names = TaxonomyNames::load(
        &state.db,
        page.items.iter().map(|m| (&m.pillar_id, &m.sub_pillar_id)),
    )
    .await?;

    let now = Utc::now();
    Ok(ApiResponse::ok(
        page.map(|m| EventItem::build(m, &names, visibility, now)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get an event by ID or slug",
    params(
        ("id" = String, Path, description = "Event ID or slug"),
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Event", body = ApiResponse<EventDetail>),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_event(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<EventDetail>>, AppError> {
    let model = event::Entity::find()
        .filter(
            Condition::any()
                .add(event::Column::Id.eq(key.as_str()))
                .add(event::Column::Slug.eq(key.as_str())),
        )
        .one(&state.db)
        .await?
        .filter(|m| visibility == Visibility::Admin || m.is_active)
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::ok(EventDetail::build(
        model,
        &names,
        visibility,
        Utc::now(),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event created", body = ApiResponse<EventDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form))]
pub async fn create_event(
    admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let EventForm {
        title,
        start,
        end,
        detail,
        r#type,
        location,
        map_url,
        payment_url,
        pillar_id,
        sub_pillar_id,
        is_active,
        image,
    } = EventForm::parse(form)?;

    let title = title.ok_or_else(|| missing("title"))?;
    validate_title(&title)?;
    let start = start.ok_or_else(|| missing("start"))?;
    let end = end.ok_or_else(|| missing("end"))?;
    validate_schedule(start, end)?;
    let detail = detail.ok_or_else(|| missing("detail"))?;
    let event_type = r#type.ok_or_else(|| missing("type"))?;
    let location = location.ok_or_else(|| missing("location"))?;
    require_text(&location, "location")?;
    let image = image.ok_or_else(|| AppError::Validation("File 'image' is required".into()))?;
    ensure_image(&image)?;

    let pillar_id = pillar_id.flatten();
    let sub_pillar_id = sub_pillar_id.flatten();
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let slug = unique_slug::<event::Entity, _>(
        &state.db,
        event::Column::Slug,
        event::Column::Id,
        &title,
        None,
    )
    .await?;

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create_one(Upload::new(folder::EVENTS, &image), |poster| async move {
            let model = event::ActiveModel {
                id: Set(ident::mint(IdKind::Event)),
                title: Set(title.trim().to_string()),
                slug: Set(slug),
                start: Set(start),
                end: Set(end),
                detail: Set(detail),
                event_type: Set(event_type),
                location: Set(location),
                map_url: Set(map_url.flatten()),
                payment_url: Set(payment_url.flatten()),
                image_key: Set(poster.key),
                image_url: Set(poster.url),
                pillar_id: Set(pillar_id),
                sub_pillar_id: Set(sub_pillar_id),
                is_active: Set(is_active.unwrap_or(true)),
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

    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::created(EventDetail::build(
        model,
        &names,
        Visibility::Admin,
        now,
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Update an event",
    description = "Only the fields sent are changed. The resulting schedule must still end no \
        earlier than it starts.",
    params(("id" = String, Path, description = "Event ID")),
    request_body(content = EventForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Event updated", body = ApiResponse<EventDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn update_event(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<ApiResponse<EventDetail>>, AppError> {
    let existing = find_event(&state.db, &id).await?;
    let EventForm {
        title,
        start,
        end,
        detail,
        r#type,
        location,
        map_url,
        payment_url,
        pillar_id,
        sub_pillar_id,
        is_active,
        image,
    } = EventForm::parse(form)?;

    if let Some(title) = &title {
        validate_title(title)?;
    }
    validate_schedule(start.unwrap_or(existing.start), end.unwrap_or(existing.end))?;
    if let Some(image) = &image {
        ensure_image(image)?;
    }

    let pillar_id = pillar_id.unwrap_or_else(|| existing.pillar_id.clone());
    let sub_pillar_id = sub_pillar_id.unwrap_or_else(|| existing.sub_pillar_id.clone());
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let slug = match &title {
        Some(title) if title.trim() != existing.title => Some(
            unique_slug::<event::Entity, _>(
                &state.db,
                event::Column::Slug,
                event::Column::Id,
                title,
                Some(&id),
            )
            .await?,
        ),
        _ => None,
    };

    let db = state.db.clone();
    let current_key = existing.image_key.clone();
    let model = state
        .blobs
        .replace_one(
            image.as_ref().map(|f| Upload::new(folder::EVENTS, f)),
            &current_key,
            |poster| async move {
                let mut active: event::ActiveModel = existing.into();
                if let Some(title) = title {
                    active.title = Set(title.trim().to_string());
                }
                if let Some(slug) = slug {
                    active.slug = Set(slug);
                }
                if let Some(start) = start {
                    active.start = Set(start);
                }
                if let Some(end) = end {
                    active.end = Set(end);
                }
                if let Some(detail) = detail {
                    active.detail = Set(detail);
                }
                if let Some(event_type) = r#type {
                    active.event_type = Set(event_type);
                }
                if let Some(location) = location {
                    active.location = Set(location);
                }
                if let Some(map_url) = map_url {
                    active.map_url = Set(map_url);
                }
                if let Some(payment_url) = payment_url {
                    active.payment_url = Set(payment_url);
                }
                if let Some(is_active) = is_active {
                    active.is_active = Set(is_active);
                }
                if let Some(poster) = poster {
                    active.image_key = Set(poster.key);
                    active.image_url = Set(poster.url);
                }
                active.pillar_id = Set(pillar_id);
                active.sub_pillar_id = Set(sub_pillar_id);
                active.updated_by = Set(admin.admin_id);
                active.updated_at = Set(Utc::now());
                Ok::<_, AppError>(active.update(&db).await?)
            },
        )
        .await?;

    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::ok(EventDetail::build(
        model,
        &names,
        Visibility::Admin,
        Utc::now(),
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    operation_id = "deleteEvent",
    summary = "Delete an event",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_event(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_event(&state.db, &id).await?;

    let db = state.db.clone();
    state
        .blobs
        .delete(&[existing.image_key], || async move {
            event::Entity::delete_by_id(existing.id).exec(&db).await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

async fn find_event<C: ConnectionTrait>(db: &C, id: &str) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}
