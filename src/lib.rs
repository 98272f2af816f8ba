//! Book catalog & community backend: authors, books with cover images,
//! public profiles, and comments, served over HTTP with bearer-token
//! callers. Documents live in SQLite; cover images live on disk behind
//! long-lived signed URLs.

pub mod auth;
pub mod collections;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
