//! Partial-update merge.
//!
//! Applies the surviving assignments of a `PostPatch` to one row. A no-op
//! patch returns the record untouched, including `updated_at`, without
//! touching SQL.

use crate::db::SQL_NOW;
use crate::model::patch::PostPatch;
use crate::model::post::Post;
use crate::repo::post_repo::{load_post, RepoError, RepoResult};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::Connection;

/// Writes exactly the non-null allow-listed fields of `patch` and bumps
/// `updated_at`; returns the re-read record.
pub(crate) fn apply_patch(conn: &Connection, post: Post, patch: &PostPatch) -> RepoResult<Post> {
    if patch.is_noop() {
        return Ok(post);
    }

    let assignments = patch.assignments();

    let mut sql = String::from("UPDATE posts SET ");
    let mut bind_values: Vec<Value> = Vec::with_capacity(assignments.len() + 1);
    for assignment in &assignments {
        sql.push_str(assignment.field.column());
        sql.push_str(" = ?, ");
        bind_values.push(Value::Text(assignment.value.to_string()));
    }
    sql.push_str(&format!(
        "updated_at = MAX(created_at, {SQL_NOW}) WHERE id = ?;"
    ));
    bind_values.push(Value::Integer(post.id));

    conn.execute(&sql, params_from_iter(bind_values))?;
    load_post(conn, post.id)?.ok_or(RepoError::NotFound(post.id))
}
