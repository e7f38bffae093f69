mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;

/// Every CMS endpoint under its version prefix. Mounted at `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}
