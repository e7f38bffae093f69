pub mod auth;
pub mod json;
pub mod multipart;
