//! Post domain model.
//!
//! # Responsibility
//! - Define the persisted post record returned by every repository read.
//! - Validate write inputs before they reach SQL.
//!
//! # Invariants
//! - `owner_id` and `image_url` are never blank.
//! - `updated_at >= created_at` (both compare lexically).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key.
pub type PostId = i64;

/// Upper bound for `PageRequest::limit`.
pub const MAX_PAGE_LIMIT: u32 = 50;

/// One user-submitted image entry as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Creator identity; the only identity allowed to mutate this post.
    pub owner_id: String,
    pub image_url: String,
    pub description: Option<String>,
    /// Unstructured comma-delimited label list.
    pub tags: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SS.fff` UTC, set once on insert.
    pub created_at: String,
    /// Same format; refreshed on every applied mutation.
    pub updated_at: String,
}

impl Post {
    /// Whether `acting_owner_id` created this post.
    pub fn is_owned_by(&self, acting_owner_id: &str) -> bool {
        self.owner_id == acting_owner_id
    }

    /// Checks invariants of a record read back from storage.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        require_non_blank(&self.owner_id, PostValidationError::EmptyOwner)?;
        require_non_blank(&self.image_url, PostValidationError::EmptyImageUrl)?;
        if self.updated_at < self.created_at {
            return Err(PostValidationError::UpdatedBeforeCreated);
        }
        Ok(())
    }
}

/// Input for `PostRepository::insert`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    pub owner_id: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl NewPost {
    pub fn new(owner_id: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            image_url: image_url.into(),
            description: None,
            tags: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn validate(&self) -> Result<(), PostValidationError> {
        require_non_blank(&self.owner_id, PostValidationError::EmptyOwner)?;
        require_non_blank(&self.image_url, PostValidationError::EmptyImageUrl)
    }
}

/// Full-replace payload: every mutable field is overwritten, `None` clears.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostReplacement {
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl PostReplacement {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            description: None,
            tags: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn validate(&self) -> Result<(), PostValidationError> {
        require_non_blank(&self.image_url, PostValidationError::EmptyImageUrl)
    }
}

/// Input validation failures for post writes and page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyOwner,
    EmptyImageUrl,
    UpdatedBeforeCreated,
    /// Pages are 1-indexed.
    InvalidPage(u32),
    /// Limit must be in `1..=MAX_PAGE_LIMIT`.
    InvalidLimit(u32),
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwner => write!(f, "owner_id must not be blank"),
            Self::EmptyImageUrl => write!(f, "image_url must not be blank"),
            Self::UpdatedBeforeCreated => write!(f, "updated_at is earlier than created_at"),
            Self::InvalidPage(page) => write!(f, "page must be >= 1, got {page}"),
            Self::InvalidLimit(limit) => {
                write!(f, "limit must be within 1..={MAX_PAGE_LIMIT}, got {limit}")
            }
        }
    }
}

impl Error for PostValidationError {}

fn require_non_blank(value: &str, err: PostValidationError) -> Result<(), PostValidationError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}
