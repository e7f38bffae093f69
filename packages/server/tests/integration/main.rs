mod common;

mod access;
mod article;
mod banner;
mod documentation;
mod event;
mod general;
mod pillar;
mod team;
mod volunteer;
