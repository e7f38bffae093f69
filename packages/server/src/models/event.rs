use chrono::{DateTime, Utc};
use serde::Serialize;

use super::shared::AdminMeta;
use crate::entity::enums::EventType;
use crate::entity::event;
use crate::error::AppError;
use crate::extractors::multipart::{FormData, UploadedFile};
use crate::services::listing::Visibility;
use crate::services::taxonomy::TaxonomyNames;
use crate::utils::text::{EventStatus, event_status};

/// Multipart body of event create and update.
#[derive(Debug, utoipa::ToSchema)]
pub struct EventForm {
    pub title: Option<String>,
    /// RFC 3339 timestamp.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Rich-text HTML.
    pub detail: Option<String>,
    pub r#type: Option<EventType>,
    pub location: Option<String>,
    pub map_url: Option<Option<String>>,
    pub payment_url: Option<Option<String>>,
    pub pillar_id: Option<Option<String>>,
    pub sub_pillar_id: Option<Option<String>>,
    pub is_active: Option<bool>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<UploadedFile>,
}

impl EventForm {
    pub fn parse(mut form: FormData) -> Result<Self, AppError> {
        Ok(Self {
            title: form.text("title"),
            start: form.parse("start")?,
            end: form.parse("end")?,
            detail: form.text("detail"),
            r#type: form.json("type")?,
            location: form.text("location"),
            map_url: form.nullable_text("map_url"),
            payment_url: form.nullable_text("payment_url"),
            pillar_id: form.nullable_text("pillar_id"),
            sub_pillar_id: form.nullable_text("sub_pillar_id"),
            is_active: form.flag("is_active")?,
            image: form.take_file("image"),
        })
    }
}

/// Reject schedules that end before they start.
pub fn validate_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation("Event end must not precede its start".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventItem {
    #[schema(example = "JPSEVT120934")]
    pub id: String,
    pub title: String,
    pub slug: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub location: String,
    pub image_url: String,
    /// Derived from the schedule at read time.
    pub status: EventStatus,
    pub pillar: String,
    pub subpillar: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub admin: Option<AdminMeta>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventDetail {
    #[serde(flatten)]
    pub item: EventItem,
    pub detail: String,
    pub map_url: Option<String>,
    pub payment_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl EventItem {
    pub fn build(
        model: event::Model,
        names: &TaxonomyNames,
        visibility: Visibility,
        now: DateTime<Utc>,
    ) -> Self {
        EventDetail::build(model, names, visibility, now).item
    }
}

impl EventDetail {
    pub fn build(
        model: event::Model,
        names: &TaxonomyNames,
        visibility: Visibility,
        now: DateTime<Utc>,
    ) -> Self {
        let pillar = names.pillar(&model.pillar_id);
        let subpillar = names.sub_pillar(&model.sub_pillar_id);
        let status = event_status(model.start, model.end, now);
        let admin = (visibility == Visibility::Admin).then(|| AdminMeta {
            pillar_id: model.pillar_id.clone(),
            sub_pillar_id: model.sub_pillar_id.clone(),
            is_active: model.is_active,
            created_by: model.created_by.clone(),
            updated_by: model.updated_by.clone(),
        });
        Self {
            item: EventItem {
                id: model.id,
                title: model.title,
                slug: model.slug,
                start: model.start,
                end: model.end,
                event_type: model.event_type,
                location: model.location,
                image_url: model.image_url,
                status,
                pillar,
                subpillar,
                created_at: model.created_at,
                admin,
            },
            detail: model.detail,
            map_url: model.map_url,
            payment_url: model.payment_url,
            updated_at: model.updated_at,
        }
    }
}
