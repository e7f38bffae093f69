use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{documentation, documentation_image};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::multipart::{FormData, ensure_image};
use crate::models::documentation::*;
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged, validate_title};
use crate::services::lifecycle::{StoredBlob, Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::services::taxonomy::{self, TaxonomyNames};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Documentation",
    operation_id = "listDocumentation",
    summary = "List documentation galleries",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "One page of galleries", body = ApiResponse<Paged<DocumentationItem>>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_documentation(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<DocumentationItem>>>, AppError> {
    let page = listing::list::<documentation::Entity>(&state.db, visibility, &query).await?;
    let names = TaxonomyNames::load(
        &state.db,
        page.items.iter().map(|m| (&m.pillar_id, &m.sub_pillar_id)),
    )
    .await?;

    Ok(ApiResponse::ok(
        page.map(|m| DocumentationItem::build(m, &names, visibility)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Documentation",
    operation_id = "getDocumentation",
    summary = "Get a gallery with its images",
    params(
        ("id" = String, Path, description = "Documentation ID"),
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Gallery", body = ApiResponse<DocumentationDetail>),
        (status = 404, description = "Documentation not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_documentation(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DocumentationDetail>>, AppError> {
    let model = documentation::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .filter(|m| visibility == Visibility::Admin || m.is_active)
        .ok_or_else(|| AppError::NotFound("Documentation not found".into()))?;
    detail(&state.db, model, visibility).await.map(ApiResponse::ok)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Documentation",
    operation_id = "createDocumentation",
    summary = "Create a gallery",
    description = "Uploads the thumbnail and every gallery image concurrently. If any upload or \
        the database write fails, all files uploaded by this request are removed.",
    request_body(content = DocumentationForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Gallery created", body = ApiResponse<DocumentationDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form))]
pub async fn create_documentation(
    admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let DocumentationForm {
        title,
        pillar_id,
        sub_pillar_id,
        is_active,
        thumbnail,
        images,
    } = DocumentationForm::parse(form)?;

    let title = title.ok_or_else(|| AppError::Validation("Field 'title' is required".into()))?;
    validate_title(&title)?;
    let thumbnail = thumbnail
        .ok_or_else(|| AppError::Validation("File 'thumbnail' is required".into()))?;
    ensure_image(&thumbnail)?;
    images.iter().try_for_each(ensure_image)?;

    let pillar_id = pillar_id.flatten();
    let sub_pillar_id = sub_pillar_id.flatten();
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let uploads: Vec<Upload<'_>> = std::iter::once(Upload::new(folder::DOC_THUMBNAILS, &thumbnail))
        .chain(images.iter().map(|f| Upload::new(folder::DOC_IMAGES, f)))
        .collect();

    let db = state.db.clone();
    let now = Utc::now();
    let (model, gallery) = state
        .blobs
        .create(&uploads, |blobs| async move {
            let mut blobs = blobs.into_iter();
            let cover = blobs
                .next()
                .ok_or_else(|| AppError::Internal("thumbnail upload missing".into()))?;

            let txn = db.begin().await?;
            let model = documentation::ActiveModel {
                id: Set(ident::mint(IdKind::Documentation)),
                title: Set(title.trim().to_string()),
                thumbnail_key: Set(cover.key),
                thumbnail_url: Set(cover.url),
                pillar_id: Set(pillar_id),
                sub_pillar_id: Set(sub_pillar_id),
                is_active: Set(is_active.unwrap_or(true)),
                created_by: Set(admin.admin_id.clone()),
                updated_by: Set(admin.admin_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            let gallery = insert_images(&txn, &model.id, blobs).await?;
            txn.commit().await?;
            Ok::<_, AppError>((model, gallery))
        })
        .await?;

    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::created(DocumentationDetail::build(
        model,
        gallery,
        &names,
        Visibility::Admin,
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Documentation",
    operation_id = "updateDocumentation",
    summary = "Update a gallery",
    description = "Only the fields sent are changed. A new `thumbnail` replaces the old one. \
        Gallery images are managed through the images endpoints.",
    params(("id" = String, Path, description = "Documentation ID")),
    request_body(content = DocumentationForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Gallery updated", body = ApiResponse<DocumentationDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Documentation not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn update_documentation(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<ApiResponse<DocumentationDetail>>, AppError> {
    let existing = find_documentation(&state.db, &id).await?;
    let DocumentationForm {
        title,
        pillar_id,
        sub_pillar_id,
        is_active,
        thumbnail,
        images: _,
    } = DocumentationForm::parse(form)?;

    if let Some(title) = &title {
        validate_title(title)?;
    }
    if let Some(thumbnail) = &thumbnail {
        ensure_image(thumbnail)?;
    }

    let pillar_id = pillar_id.unwrap_or_else(|| existing.pillar_id.clone());
    let sub_pillar_id = sub_pillar_id.unwrap_or_else(|| existing.sub_pillar_id.clone());
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let db = state.db.clone();
    let current_key = existing.thumbnail_key.clone();
    let model = state
        .blobs
        .replace_one(
            thumbnail
                .as_ref()
                .map(|f| Upload::new(folder::DOC_THUMBNAILS, f)),
            &current_key,
            |cover| async move {
                let mut active: documentation::ActiveModel = existing.into();
                if let Some(title) = title {
                    active.title = Set(title.trim().to_string());
                }
                if let Some(is_active) = is_active {
                    active.is_active = Set(is_active);
                }
                if let Some(cover) = cover {
                    active.thumbnail_key = Set(cover.key);
                    active.thumbnail_url = Set(cover.url);
                }
                active.pillar_id = Set(pillar_id);
                active.sub_pillar_id = Set(sub_pillar_id);
                active.updated_by = Set(admin.admin_id);
                active.updated_at = Set(Utc::now());
                Ok::<_, AppError>(active.update(&db).await?)
            },
        )
        .await?;

    detail(&state.db, model, Visibility::Admin)
        .await
        .map(ApiResponse::ok)
}

#[utoipa::path(
    post,
    path = "/{id}/images",
    tag = "Documentation",
    operation_id = "addDocumentationImages",
    summary = "Add images to a gallery",
    params(("id" = String, Path, description = "Documentation ID")),
    request_body(content = GalleryForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Images added", body = ApiResponse<Vec<GalleryImage>>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Documentation not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn add_documentation_images(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_documentation(&state.db, &id).await?;
    let GalleryForm { images } = GalleryForm::parse(form)?;
    images.iter().try_for_each(ensure_image)?;

    let uploads: Vec<Upload<'_>> = images
        .iter()
        .map(|f| Upload::new(folder::DOC_IMAGES, f))
        .collect();

    let db = state.db.clone();
    let gallery = state
        .blobs
        .create(&uploads, |blobs| async move {
            let txn = db.begin().await?;
            let gallery = insert_images(&txn, &existing.id, blobs).await?;
            documentation::ActiveModel {
                id: Unchanged(existing.id.clone()),
                updated_by: Set(admin.admin_id),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .update(&txn)
            .await?;
            txn.commit().await?;
            Ok::<_, AppError>(gallery)
        })
        .await?;

    Ok(ApiResponse::created(
        gallery.into_iter().map(GalleryImage::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/images/{image_id}",
    tag = "Documentation",
    operation_id = "deleteDocumentationImage",
    summary = "Remove one image from a gallery",
    params(
        ("id" = String, Path, description = "Documentation ID"),
        ("image_id" = String, Path, description = "Gallery image ID"),
    ),
    responses(
        (status = 200, description = "Image removed", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id, image_id))]
pub async fn delete_documentation_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let image = documentation_image::Entity::find_by_id(image_id.clone())
        .filter(documentation_image::Column::DocumentationId.eq(id.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))?;

    let db = state.db.clone();
    state
        .blobs
        .delete(&[image.image_key], || async move {
            documentation_image::Entity::delete_by_id(image.id)
                .exec(&db)
                .await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(image_id)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Documentation",
    operation_id = "deleteDocumentation",
    summary = "Delete a gallery",
    description = "Removes the thumbnail and every gallery image, then the gallery.",
    params(("id" = String, Path, description = "Documentation ID")),
    responses(
        (status = 200, description = "Gallery deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Documentation not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "File removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_documentation(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_documentation(&state.db, &id).await?;
    let gallery = documentation_image::Entity::find()
        .filter(documentation_image::Column::DocumentationId.eq(id.as_str()))
        .all(&state.db)
        .await?;

    let owned: Vec<String> = std::iter::once(existing.thumbnail_key)
        .chain(gallery.into_iter().map(|image| image.image_key))
        .collect();

    let db = state.db.clone();
    state
        .blobs
        .delete(&owned, || async move {
            let txn = db.begin().await?;
            documentation_image::Entity::delete_many()
                .filter(documentation_image::Column::DocumentationId.eq(existing.id.as_str()))
                .exec(&txn)
                .await?;
            documentation::Entity::delete_by_id(existing.id).exec(&txn).await?;
            txn.commit().await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

async fn insert_images<C: ConnectionTrait>(
    db: &C,
    documentation_id: &str,
    blobs: impl IntoIterator<Item = StoredBlob>,
) -> Result<Vec<documentation_image::Model>, DbErr> {
    let now = Utc::now();
    let mut gallery = Vec::new();
    for blob in blobs {
        let image = documentation_image::ActiveModel {
            id: Set(ident::mint(IdKind::DocumentationImage)),
            documentation_id: Set(documentation_id.to_string()),
            image_key: Set(blob.key),
            image_url: Set(blob.url),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        gallery.push(image);
    }
    Ok(gallery)
}

async fn detail<C: ConnectionTrait>(
    db: &C,
    model: documentation::Model,
    visibility: Visibility,
) -> Result<DocumentationDetail, AppError> {
    let gallery = documentation_image::Entity::find()
        .filter(documentation_image::Column::DocumentationId.eq(model.id.as_str()))
        .order_by_asc(documentation_image::Column::CreatedAt)
        .order_by_asc(documentation_image::Column::Id)
        .all(db)
        .await?;
    let names = TaxonomyNames::load(db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(DocumentationDetail::build(model, gallery, &names, visibility))
}

async fn find_documentation<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<documentation::Model, AppError> {
    documentation::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Documentation not found".into()))
}
