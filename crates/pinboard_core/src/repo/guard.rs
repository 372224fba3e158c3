//! Ownership guard for post mutations.
//!
//! # Responsibility
//! - Decide whether an acting identity may mutate a post.
//! - Wrap every mutation in one read-check-write transaction.
//!
//! # Invariants
//! - Ownership is checked against the row as read inside the write
//!   transaction, never against a cached copy.
//! - A missing row yields `NotFound` before ownership is considered.
//! - Nothing is written unless the closure succeeds and the transaction
//!   commits; any early return rolls back.

use crate::db::ConnectionPool;
use crate::model::post::{Post, PostId};
use crate::repo::post_repo::{load_post, RepoError, RepoResult};
use rusqlite::{Transaction, TransactionBehavior};

/// Returns `Forbidden` unless `acting_owner_id` created `post`.
pub fn authorize_mutation(post: &Post, acting_owner_id: &str) -> RepoResult<()> {
    if post.is_owned_by(acting_owner_id) {
        Ok(())
    } else {
        Err(RepoError::Forbidden { post_id: post.id })
    }
}

/// Runs `mutation` against post `id` on behalf of `acting_owner_id`.
///
/// The connection is scoped to this call. The write lock is taken before the
/// ownership read (`BEGIN IMMEDIATE`), so no other writer can change the row
/// between the check and the mutation.
pub fn guarded_mutation<T>(
    pool: &ConnectionPool,
    id: PostId,
    acting_owner_id: &str,
    mutation: impl FnOnce(&Transaction<'_>, Post) -> RepoResult<T>,
) -> RepoResult<T> {
    let mut conn = pool.acquire()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let post = load_post(&tx, id)?.ok_or(RepoError::NotFound(id))?;
    authorize_mutation(&post, acting_owner_id)?;

    let outcome = mutation(&tx, post)?;
    tx.commit()?;
    Ok(outcome)
}
