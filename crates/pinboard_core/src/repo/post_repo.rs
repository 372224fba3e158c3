//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `posts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Each call borrows one pooled connection and returns it on every path.

use crate::db::{ConnectionPool, DbError, SQL_NOW};
use crate::model::patch::PostPatch;
use crate::model::post::{NewPost, Post, PostId, PostReplacement, PostValidationError};
use crate::repo::guard::guarded_mutation;
use crate::repo::merge::apply_patch;
use crate::repo::page::{fetch_page, PageRequest, PageResult};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const POST_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    image_url,
    description,
    tags,
    created_at,
    updated_at
FROM posts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for post persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PostValidationError),
    /// No post has this id.
    NotFound(PostId),
    /// The post exists but belongs to another identity.
    Forbidden { post_id: PostId },
    /// The store could not be reached or a write failed.
    StorageUnavailable(DbError),
    InvalidData(String),
}

impl RepoError {
    /// Stable short code for logs and caller-side mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    /// True for expected outcomes the caller maps to a user-facing answer,
    /// as opposed to storage or data faults.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Forbidden { .. }
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::Forbidden { post_id } => {
                write!(f, "post {post_id} belongs to another owner")
            }
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted post data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            Self::NotFound(_) | Self::Forbidden { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<PostValidationError> for RepoError {
    fn from(value: PostValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(DbError::Sqlite(value))
    }
}

/// Repository interface for post CRUD operations.
pub trait PostRepository {
    /// Persists a new post and returns it as stored.
    fn insert(&self, post: &NewPost) -> RepoResult<Post>;
    /// Returns `None` when no row has `id`.
    fn get_by_id(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Lists one window, newest first.
    fn list_page(&self, request: &PageRequest) -> RepoResult<PageResult<Post>>;
    /// Applies the non-null fields of `patch`; owner only.
    fn update_partial(&self, id: PostId, owner_id: &str, patch: &PostPatch) -> RepoResult<Post>;
    /// Overwrites every mutable field; owner only.
    fn replace(
        &self,
        id: PostId,
        owner_id: &str,
        replacement: &PostReplacement,
    ) -> RepoResult<Post>;
    /// Removes the post; owner only. `Ok(false)` when `id` does not exist.
    fn delete(&self, id: PostId, owner_id: &str) -> RepoResult<bool>;
}

/// SQLite-backed post repository drawing connections from a pool.
pub struct SqlitePostRepository<'pool> {
    pool: &'pool ConnectionPool,
}

impl<'pool> SqlitePostRepository<'pool> {
    pub fn new(pool: &'pool ConnectionPool) -> Self {
        Self { pool }
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn insert(&self, post: &NewPost) -> RepoResult<Post> {
        post.validate()?;

        let mut conn = self.pool.acquire()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO posts (owner_id, image_url, description, tags, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, {SQL_NOW}, {SQL_NOW});"
            ),
            params![
                post.owner_id.as_str(),
                post.image_url.as_str(),
                post.description.as_deref(),
                post.tags.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let stored = load_post(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted post {id} could not be read back"))
        })?;
        tx.commit()?;

        Ok(stored)
    }

    fn get_by_id(&self, id: PostId) -> RepoResult<Option<Post>> {
        let conn = self.pool.acquire()?;
        load_post(&conn, id)
    }

    fn list_page(&self, request: &PageRequest) -> RepoResult<PageResult<Post>> {
        let mut conn = self.pool.acquire()?;
        fetch_page(&mut conn, request)
    }

    fn update_partial(&self, id: PostId, owner_id: &str, patch: &PostPatch) -> RepoResult<Post> {
        patch.validate()?;
        guarded_mutation(self.pool, id, owner_id, |tx, post| {
            apply_patch(tx, post, patch)
        })
    }

    fn replace(
        &self,
        id: PostId,
        owner_id: &str,
        replacement: &PostReplacement,
    ) -> RepoResult<Post> {
        replacement.validate()?;
        guarded_mutation(self.pool, id, owner_id, |tx, post| {
            tx.execute(
                &format!(
                    "UPDATE posts
                     SET
                        image_url = ?1,
                        description = ?2,
                        tags = ?3,
                        updated_at = MAX(created_at, {SQL_NOW})
                     WHERE id = ?4;"
                ),
                params![
                    replacement.image_url.as_str(),
                    replacement.description.as_deref(),
                    replacement.tags.as_deref(),
                    post.id,
                ],
            )?;
            load_post(tx, post.id)?.ok_or(RepoError::NotFound(post.id))
        })
    }

    fn delete(&self, id: PostId, owner_id: &str) -> RepoResult<bool> {
        let deleted = guarded_mutation(self.pool, id, owner_id, |tx, post| {
            let changed = tx.execute("DELETE FROM posts WHERE id = ?1;", [post.id])?;
            Ok(changed == 1)
        });

        match deleted {
            Err(RepoError::NotFound(_)) => Ok(false),
            other => other,
        }
    }
}

/// Reads one post by id on an existing connection or transaction.
pub(crate) fn load_post(conn: &Connection, id: PostId) -> RepoResult<Option<Post>> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_post_row(row)?));
    }

    Ok(None)
}

/// Counts all stored posts.
pub fn count_posts(conn: &Connection) -> RepoResult<u64> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or(0))
}

pub(crate) fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let post = Post {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        image_url: row.get("image_url")?,
        description: row.get("description")?,
        tags: row.get("tags")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    post.validate()
        .map_err(|err| RepoError::InvalidData(format!("post {}: {err}", post.id)))?;
    Ok(post)
}
