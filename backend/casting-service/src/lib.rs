/// Casting Service Library
///
/// CRUD API for actors and movies. Every resource route is guarded by a
/// bearer token issued by the identity provider and a per-route permission.
///
/// # Modules
///
/// - `handlers`: actor, movie and health HTTP handlers
/// - `models`: records and request bodies
/// - `db`: repository traits with PostgreSQL and in-memory backends
/// - `routes`: route table, CORS and extractor configuration
/// - `error`: `ApiError` and its JSON rendering
/// - `config`: configuration management
/// - `telemetry`: tracing subscriber setup
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod telemetry;

pub use config::Config;
pub use db::Repositories;
pub use error::{ApiError, Result};
