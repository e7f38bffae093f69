use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::access_key;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateAccessKeyRequest {
    /// The shared access key, proving the caller may manage keys.
    pub access_key: String,
    /// Value of the key being stored.
    pub value: String,
}

/// Confirms a key deletion with the shared access key.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AccessKeyConfirmation {
    pub access_key: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AccessKeyResponse {
    #[schema(example = "JPSKEY8123")]
    pub id: String,
    pub value: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<access_key::Model> for AccessKeyResponse {
    fn from(model: access_key::Model) -> Self {
        Self {
            id: model.id,
            value: model.value,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}
