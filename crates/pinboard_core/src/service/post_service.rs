//! Post use-case service.
//!
//! # Responsibility
//! - Provide the caller-facing post API with already-parsed primitives.
//! - Emit one metadata-only log event per call.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or ownership checks.
//! - Logs never carry user content (urls, descriptions, tags, owner ids).

use crate::model::patch::PostPatch;
use crate::model::post::{NewPost, Post, PostId, PostReplacement};
use crate::repo::page::{PageRequest, PageResult};
use crate::repo::post_repo::{PostRepository, RepoError, RepoResult};
use log::{debug, info, log, Level};
use std::time::Instant;

/// Use-case service wrapper for post operations.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a post owned by `owner_id`.
    pub fn create_post(
        &self,
        owner_id: &str,
        image_url: &str,
        description: Option<&str>,
        tags: Option<&str>,
    ) -> RepoResult<Post> {
        let started_at = Instant::now();
        let input = NewPost {
            owner_id: owner_id.to_string(),
            image_url: image_url.to_string(),
            description: description.map(str::to_string),
            tags: tags.map(str::to_string),
        };
        let result = self.repo.insert(&input);
        log_outcome(
            "post_create",
            result.as_ref().ok().map(|post| post.id),
            started_at,
            result.as_ref().map(|_| ()),
        );
        result
    }

    /// Gets one post; `Ok(None)` when absent.
    pub fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let started_at = Instant::now();
        let result = self.repo.get_by_id(id);
        log_outcome("post_get", Some(id), started_at, result.as_ref().map(|_| ()));
        result
    }

    /// Lists posts newest first, optionally only those created after `since`.
    ///
    /// # Contract
    /// - `page >= 1`, `limit` within `1..=50`, else `RepoError::Validation`.
    /// - Pages past the end return no items with unchanged totals.
    pub fn list_posts(
        &self,
        page: u32,
        limit: u32,
        since: Option<&str>,
    ) -> RepoResult<PageResult<Post>> {
        let started_at = Instant::now();
        let result = PageRequest::new(page, limit)
            .map_err(RepoError::from)
            .and_then(|request| {
                let request = match since {
                    Some(since) => request.since(since),
                    None => request,
                };
                self.repo.list_page(&request)
            });

        match &result {
            Ok(listing) => debug!(
                "event=post_list module=service status=ok page={} limit={} sync={} items={} total={} duration_ms={}",
                listing.page,
                listing.limit,
                since.is_some(),
                listing.items.len(),
                listing.total,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_outcome("post_list", None, started_at, Err(err)),
        }
        result
    }

    /// Applies the supplied, non-null fields; owner only.
    ///
    /// An empty patch returns the stored post unchanged.
    pub fn update_post(&self, id: PostId, owner_id: &str, patch: &PostPatch) -> RepoResult<Post> {
        let started_at = Instant::now();
        let result = self.repo.update_partial(id, owner_id, patch);
        log_outcome("post_update", Some(id), started_at, result.as_ref().map(|_| ()));
        result
    }

    /// Overwrites `image_url`, `description` and `tags`; owner only.
    pub fn replace_post(
        &self,
        id: PostId,
        owner_id: &str,
        image_url: &str,
        description: Option<&str>,
        tags: Option<&str>,
    ) -> RepoResult<Post> {
        let started_at = Instant::now();
        let replacement = PostReplacement {
            image_url: image_url.to_string(),
            description: description.map(str::to_string),
            tags: tags.map(str::to_string),
        };
        let result = self.repo.replace(id, owner_id, &replacement);
        log_outcome("post_replace", Some(id), started_at, result.as_ref().map(|_| ()));
        result
    }

    /// Deletes a post; owner only. `Ok(false)` when it never existed.
    pub fn delete_post(&self, id: PostId, owner_id: &str) -> RepoResult<bool> {
        let started_at = Instant::now();
        let result = self.repo.delete(id, owner_id);
        match &result {
            Ok(false) => info!(
                "event=post_delete module=service status=not_found post_id={} duration_ms={}",
                id,
                started_at.elapsed().as_millis()
            ),
            _ => log_outcome("post_delete", Some(id), started_at, result.as_ref().map(|_| ())),
        }
        result
    }
}

fn log_outcome(
    event: &'static str,
    post_id: Option<PostId>,
    started_at: Instant,
    outcome: Result<(), &RepoError>,
) {
    let (level, line) = outcome_line(event, post_id, started_at.elapsed().as_millis(), outcome);
    log!(level, "{line}");
}

/// Rejections log their error code as the status, so `status=forbidden` and
/// `status=not_found` read the same across every operation.
fn outcome_line(
    event: &str,
    post_id: Option<PostId>,
    duration_ms: u128,
    outcome: Result<(), &RepoError>,
) -> (Level, String) {
    let post_id = post_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match outcome {
        Ok(()) => (
            Level::Debug,
            format!("event={event} module=service status=ok post_id={post_id} duration_ms={duration_ms}"),
        ),
        Err(err) if err.is_rejection() => (
            Level::Warn,
            format!(
                "event={event} module=service status={} post_id={post_id} duration_ms={duration_ms}",
                err.code()
            ),
        ),
        Err(err) => (
            Level::Error,
            format!(
                "event={event} module=service status=error post_id={post_id} duration_ms={duration_ms} error_code={} error={err}",
                err.code()
            ),
        ),
    }
}
