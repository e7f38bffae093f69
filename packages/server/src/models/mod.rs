pub mod access_key;
pub mod admin;
pub mod article;
pub mod banner;
pub mod career;
pub mod documentation;
pub mod event;
pub mod general;
pub mod pillar;
pub mod position;
pub mod shared;
pub mod team;
pub mod volunteer;
