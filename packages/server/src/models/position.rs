use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::position;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PositionRequest {
    #[schema(example = "Program Director")]
    pub name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PositionResponse {
    #[schema(example = "JPSPOS2231")]
    pub id: String,
    pub name: String,
    /// `false` while any team member holds this position.
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PositionResponse {
    pub fn build(model: position::Model, member_count: u64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            can_delete: member_count == 0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
