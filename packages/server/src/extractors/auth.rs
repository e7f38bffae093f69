use axum::{extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::services::listing::Visibility;
use crate::state::AppState;
use crate::utils::jwt;

/// Header a console request sets to ask for the admin view of a resource.
pub const ROLE_HEADER: &str = "x-role";

/// Authenticated admin extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require an admin or superadmin token.
pub struct AdminUser {
    pub admin_id: String,
    pub role: String,
}

impl AdminUser {
    pub fn is_superadmin(&self) -> bool {
        self.role == "superadmin"
    }

    /// Returns `Ok(())` for superadmins, `Err(PermissionDenied)` otherwise.
    pub fn require_superadmin(&self) -> Result<(), AppError> {
        if self.is_superadmin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

/// Check a caller-supplied copy of the shared access key.
///
/// Both sides are hashed first so the comparison runs over equal-length
/// digests in constant time and leaks neither content nor length.
pub fn confirm_access_key(expected: &str, provided: &str) -> Result<(), AppError> {
    let matches: bool = Sha256::digest(expected.as_bytes())
        .ct_eq(&Sha256::digest(provided.as_bytes()))
        .into();
    if !expected.is_empty() && matches {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn bearer_admin(parts: &Parts, secret: &str) -> Result<AdminUser, AppError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;

    let claims = jwt::verify(token, secret).map_err(|_| AppError::TokenInvalid)?;

    match claims.role.as_str() {
        "admin" | "superadmin" => Ok(AdminUser {
            admin_id: claims.sub,
            role: claims.role,
        }),
        _ => Err(AppError::PermissionDenied),
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_admin(parts, &state.config.auth.jwt_secret)
    }
}

/// Who is reading: the public site or the admin console.
///
/// A request is public unless it carries `x-role: admin`, in which case a
/// valid admin token is mandatory.
pub struct Viewer(pub Visibility);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let wants_admin = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"));

        if !wants_admin {
            return Ok(Viewer(Visibility::Public));
        }

        bearer_admin(parts, &state.config.auth.jwt_secret)?;
        Ok(Viewer(Visibility::Admin))
    }
}
