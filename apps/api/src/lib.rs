//! Compass: the backend of a student career-coaching app.
//!
//! Sessions and role guarding live in [`auth`], the Ikigai questionnaire and
//! diagram in [`ikigai`], persistence behind [`store::Store`].

pub mod admin;
pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod ikigai;
pub mod mentor;
pub mod models;
pub mod profile;
pub mod projects;
pub mod routes;
pub mod state;
pub mod store;
