use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Success envelope every endpoint responds with.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true`.
    pub success: bool,
    #[schema(example = 200)]
    pub status_code: u16,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            status_code: StatusCode::OK.as_u16(),
            data,
        })
    }

    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self {
                success: true,
                status_code: StatusCode::CREATED.as_u16(),
                data,
            }),
        )
    }
}

/// Query parameters accepted by every paginated listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Admin title search (case-insensitive substring).
    pub q: Option<String>,
    /// Public filter: a search term, a pillar/subpillar slug fragment,
    /// `Lainnya`/`other` for uncategorized records, or `asc`/`desc`.
    pub filter: Option<String>,
    /// 1-based page. Invalid values fall back to 1.
    #[param(example = "1")]
    pub page: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Paged<T> {
    pub items: Vec<T>,
    /// Requested page, or 0 when it holds no items.
    #[schema(example = 1)]
    pub page: u64,
    /// Matching records across all pages.
    #[schema(example = 17)]
    pub total: u64,
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, requested_page: u64, total: u64, page_size: u64) -> Self {
        let page = if items.is_empty() { 0 } else { requested_page };
        Self {
            items,
            page,
            total,
            total_pages: total.div_ceil(page_size.max(1)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Identifier of the record a mutation touched.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IdResponse {
    #[schema(example = "JPSARC482913")]
    pub id: String,
}

impl IdResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Console-only fields of a listable record, present for admin readers.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminMeta {
    pub pillar_id: Option<String>,
    pub sub_pillar_id: Option<String>,
    pub is_active: bool,
    pub created_by: String,
    pub updated_by: String,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Require a non-blank field.
pub fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("Field '{field}' is required")));
    }
    Ok(())
}
