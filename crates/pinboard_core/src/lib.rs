//! Data-access core for the pinboard post store.
//! This crate is the single source of truth for post invariants: ownership,
//! partial-update merging, and pagination/sync windows.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{DbLocation, StoreConfig};
pub use db::{startup, ConnectionPool, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::patch::{FieldAssignment, PostField, PostPatch};
pub use model::post::{
    NewPost, Post, PostId, PostReplacement, PostValidationError, MAX_PAGE_LIMIT,
};
pub use repo::guard::{authorize_mutation, guarded_mutation};
pub use repo::page::{total_pages, PageRequest, PageResult};
pub use repo::post_repo::{
    count_posts, PostRepository, RepoError, RepoResult, SqlitePostRepository,
};
pub use service::post_service::PostService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
