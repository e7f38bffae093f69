pub mod access_key;
pub mod admin;
pub mod article;
pub mod banner;
pub mod career;
pub mod career_applicant;
pub mod documentation;
pub mod documentation_image;
pub mod enums;
pub mod event;
pub mod partner;
pub mod pillar;
pub mod position;
pub mod sub_pillar;
pub mod team;
pub mod team_education;
pub mod team_social;
pub mod volunteer;
pub mod volunteer_applicant;
