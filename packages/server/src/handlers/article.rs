use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::article;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, Viewer};
use crate::extractors::multipart::{FormData, ensure_image};
use crate::models::article::*;
use crate::models::shared::{ApiResponse, IdResponse, ListQuery, Paged, validate_title};
use crate::services::lifecycle::{Upload, folder};
use crate::services::listing::{self, Visibility};
use crate::services::slug::unique_slug;
use crate::services::taxonomy::{self, TaxonomyNames};
use crate::state::AppState;
use crate::utils::ident::{self, IdKind};

#[utoipa::path(
    get,
    path = "/",
    tag = "Articles",
    operation_id = "listArticles",
    summary = "List articles",
    description = "Public readers get active articles narrowed by `filter`. Requests with \
        `x-role: admin` and an admin token get every article, searched by `q`.",
    params(
        ListQuery,
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "One page of articles", body = ApiResponse<Paged<ArticleItem>>),
        (status = 401, description = "Admin view without a valid token (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_articles(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Paged<ArticleItem>>>, AppError> {
    let page = listing::list::<article::Entity>(&state.db, visibility, &query).await?;
    let names = TaxonomyNames::load(
        &state.db,
        page.items.iter().map(|m| (&m.pillar_id, &m.sub_pillar_id)),
    )
    .await?;

    Ok(ApiResponse::ok(
        page.map(|m| ArticleItem::build(m, &names, visibility)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Articles",
    operation_id = "getArticle",
    summary = "Get an article by ID or slug",
    description = "Inactive articles are only visible to admin readers.",
    params(
        ("id" = String, Path, description = "Article ID or slug"),
        ("x-role" = Option<String>, Header, description = "`admin` for the console view"),
    ),
    responses(
        (status = 200, description = "Article", body = ApiResponse<ArticleDetail>),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_article(
    Viewer(visibility): Viewer,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<ArticleDetail>>, AppError> {
    let model = article::Entity::find()
        .filter(
            Condition::any()
                .add(article::Column::Id.eq(key.as_str()))
                .add(article::Column::Slug.eq(key.as_str())),
        )
        .one(&state.db)
        .await?
        .filter(|m| visibility == Visibility::Admin || m.is_active)
        .ok_or_else(|| AppError::NotFound("Article not found".into()))?;

    let names = TaxonomyNames::load(&state.db, [(&model.pillar_id, &model.sub_pillar_id)]).await?;
    Ok(ApiResponse::ok(ArticleDetail::build(model, &names, visibility)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Articles",
    operation_id = "createArticle",
    summary = "Create an article",
    description = "Uploads the cover image, then stores the article. If storing fails the \
        uploaded image is removed again.",
    request_body(content = ArticleForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Article created", body = ApiResponse<ArticleDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form))]
pub async fn create_article(
    admin: AdminUser,
    State(state): State<AppState>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let ArticleForm {
        title,
        content,
        description,
        pillar_id,
        sub_pillar_id,
        is_active,
        image,
    } = ArticleForm::parse(form)?;

    let title = title.ok_or_else(|| AppError::Validation("Field 'title' is required".into()))?;
    validate_title(&title)?;
    let content =
        content.ok_or_else(|| AppError::Validation("Field 'content' is required".into()))?;
    let image = image.ok_or_else(|| AppError::Validation("File 'image' is required".into()))?;
    ensure_image(&image)?;

    let pillar_id = pillar_id.flatten();
    let sub_pillar_id = sub_pillar_id.flatten();
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let slug = unique_slug::<article::Entity, _>(
        &state.db,
        article::Column::Slug,
        article::Column::Id,
        &title,
        None,
    )
    .await?;

    let db = state.db.clone();
    let now = Utc::now();
    let model = state
        .blobs
        .create_one(Upload::new(folder::ARTICLES, &image), |cover| async move {
            let model = article::ActiveModel {
                id: Set(ident::mint(IdKind::Article)),
                title: Set(title.trim().to_string()),
                slug: Set(slug),
                content: Set(content),
                description: Set(description),
                image_key: Set(cover.key),
                image_url: Set(cover.url),
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
    Ok(ApiResponse::created(ArticleDetail::build(
        model,
        &names,
        Visibility::Admin,
    )))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Articles",
    operation_id = "updateArticle",
    summary = "Update an article",
    description = "Only the fields sent are changed. A new `image` replaces the cover; the old \
        file is removed after the article is saved.",
    params(("id" = String, Path, description = "Article ID")),
    request_body(content = ArticleForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Article updated", body = ApiResponse<ArticleDetail>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upload failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin, form), fields(id))]
pub async fn update_article(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<ApiResponse<ArticleDetail>>, AppError> {
    let existing = find_article(&state.db, &id).await?;
    let ArticleForm {
        title,
        content,
        description,
        pillar_id,
        sub_pillar_id,
        is_active,
        image,
    } = ArticleForm::parse(form)?;

    if let Some(title) = &title {
        validate_title(title)?;
    }
    if let Some(image) = &image {
        ensure_image(image)?;
    }

    let pillar_id = pillar_id.unwrap_or_else(|| existing.pillar_id.clone());
    let sub_pillar_id = sub_pillar_id.unwrap_or_else(|| existing.sub_pillar_id.clone());
    taxonomy::ensure_refs(&state.db, pillar_id.as_deref(), sub_pillar_id.as_deref()).await?;

    let slug = match &title {
        Some(title) if title.trim() != existing.title => Some(
            unique_slug::<article::Entity, _>(
                &state.db,
                article::Column::Slug,
                article::Column::Id,
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
            image.as_ref().map(|f| Upload::new(folder::ARTICLES, f)),
            &current_key,
            |cover| async move {
                let mut active: article::ActiveModel = existing.into();
                if let Some(title) = title {
                    active.title = Set(title.trim().to_string());
                }
                if let Some(slug) = slug {
                    active.slug = Set(slug);
                }
                if let Some(content) = content {
                    active.content = Set(content);
                }
                if let Some(description) = description {
                    active.description = Set(Some(description));
                }
                if let Some(is_active) = is_active {
                    active.is_active = Set(is_active);
                }
                if let Some(cover) = cover {
                    active.image_key = Set(cover.key);
                    active.image_url = Set(cover.url);
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
    Ok(ApiResponse::ok(ArticleDetail::build(
        model,
        &names,
        Visibility::Admin,
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Articles",
    operation_id = "deleteArticle",
    summary = "Delete an article",
    description = "Removes the cover image, then the article.",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article deleted", body = ApiResponse<IdResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image removal failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_article(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdResponse>>, AppError> {
    let existing = find_article(&state.db, &id).await?;

    let db = state.db.clone();
    state
        .blobs
        .delete(&[existing.image_key], || async move {
            article::Entity::delete_by_id(existing.id).exec(&db).await?;
            Ok::<_, AppError>(())
        })
        .await?;

    Ok(ApiResponse::ok(IdResponse::new(id)))
}

async fn find_article<C: ConnectionTrait>(db: &C, id: &str) -> Result<article::Model, AppError> {
    article::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Article not found".into()))
}
