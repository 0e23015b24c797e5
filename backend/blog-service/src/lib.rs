/// Blog Service Library
///
/// Serves the community blog: paginated feeds of posts (site-wide, per group,
/// per author and per followed authors), post create/edit, comments and
/// follows. The first page of the site-wide feed is cached for a short TTL.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Users, groups, posts, comments, forms
/// - `pagination`: Page number parsing and fixed-size page windows
/// - `services`: Business logic layer
/// - `db`: Repository trait, PostgreSQL and in-memory implementations
/// - `cache`: Index page cache over Redis or process memory
/// - `middleware`: Request identity extractors
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
