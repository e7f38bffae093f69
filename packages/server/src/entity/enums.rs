use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether attending an event costs money.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// Where a career posting's work happens.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum WorkLocation {
    #[sea_orm(string_value = "onsite")]
    Onsite,
    #[sea_orm(string_value = "remote")]
    Remote,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum EmploymentType {
    #[sea_orm(string_value = "fulltime")]
    Fulltime,
    #[sea_orm(string_value = "parttime")]
    Parttime,
    #[sea_orm(string_value = "freelance")]
    Freelance,
    #[sea_orm(string_value = "contract")]
    Contract,
    #[sea_orm(string_value = "internship")]
    Internship,
}

/// Highest completed education level, from kindergarten to doctorate.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "UPPERCASE")]
pub enum EducationLevel {
    #[sea_orm(string_value = "TK")]
    Tk,
    #[sea_orm(string_value = "SD")]
    Sd,
    #[sea_orm(string_value = "SMP")]
    Smp,
    #[sea_orm(string_value = "SMA")]
    Sma,
    #[sea_orm(string_value = "SMK")]
    Smk,
    #[sea_orm(string_value = "D1")]
    D1,
    #[sea_orm(string_value = "D2")]
    D2,
    #[sea_orm(string_value = "D3")]
    D3,
    #[sea_orm(string_value = "D4")]
    D4,
    #[sea_orm(string_value = "S1")]
    S1,
    #[sea_orm(string_value = "S2")]
    S2,
    #[sea_orm(string_value = "S3")]
    S3,
}

impl EducationLevel {
    /// Display order on a team member's profile.
    pub fn rank(self) -> u8 {
        match self {
            Self::Tk => 1,
            Self::Sd => 2,
            Self::Smp => 3,
            Self::Sma => 4,
            Self::Smk => 5,
            Self::D1 => 6,
            Self::D2 => 7,
            Self::D3 => 8,
            Self::D4 => 9,
            Self::S1 => 10,
            Self::S2 => 11,
            Self::S3 => 12,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "UPPERCASE")]
pub enum SocialPlatform {
    #[sea_orm(string_value = "TIKTOK")]
    Tiktok,
    #[sea_orm(string_value = "YOUTUBE")]
    Youtube,
    #[sea_orm(string_value = "INSTAGRAM")]
    Instagram,
    #[sea_orm(string_value = "LINKEDIN")]
    Linkedin,
}

impl SocialPlatform {
    /// Display order on a team member's profile.
    pub fn rank(self) -> u8 {
        match self {
            Self::Tiktok => 1,
            Self::Youtube => 2,
            Self::Instagram => 3,
            Self::Linkedin => 4,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "superadmin")]
    Superadmin,
}

impl AdminRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }
}
