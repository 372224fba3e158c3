//! Partial-update shape over an allow-listed field set.
//!
//! # Responsibility
//! - Describe which mutable post fields a partial update may touch.
//! - Reduce a sparse caller payload to the assignments that actually apply.
//!
//! # Invariants
//! - Only `image_url`, `description` and `tags` are patchable.
//! - `None` means "leave unchanged"; a patch cannot clear a field.
//! - Unknown field names are dropped, never reported.

use crate::model::post::PostValidationError;
use serde::Deserialize;

/// Mutable post column reachable through a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    ImageUrl,
    Description,
    Tags,
}

impl PostField {
    /// Allow-list in column order.
    pub const ALL: [PostField; 3] = [Self::ImageUrl, Self::Description, Self::Tags];

    /// Column name; also the external field name.
    pub fn column(self) -> &'static str {
        match self {
            Self::ImageUrl => "image_url",
            Self::Description => "description",
            Self::Tags => "tags",
        }
    }

    /// Resolves an external field name against the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == name)
    }
}

/// One surviving `column = value` pair of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAssignment<'a> {
    pub field: PostField,
    pub value: &'a str,
}

/// Sparse partial update. Deserializing ignores unknown keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostPatch {
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

impl PostPatch {
    /// Builds a patch from loosely typed `(name, value)` pairs.
    ///
    /// Names outside the allow-list are ignored. When a name repeats, the
    /// last non-null value wins.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut patch = Self::default();
        for (name, value) in fields {
            let (Some(field), Some(value)) = (PostField::from_name(name.as_ref()), value) else {
                continue;
            };
            *patch.slot_mut(field) = Some(value.into());
        }
        patch
    }

    pub fn with(mut self, field: PostField, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Supplied value for `field`, if any.
    pub fn get(&self, field: PostField) -> Option<&str> {
        match field {
            PostField::ImageUrl => self.image_url.as_deref(),
            PostField::Description => self.description.as_deref(),
            PostField::Tags => self.tags.as_deref(),
        }
    }

    /// Non-null assignments in allow-list order.
    pub fn assignments(&self) -> Vec<FieldAssignment<'_>> {
        PostField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| FieldAssignment { field, value }))
            .collect()
    }

    /// True when applying this patch would change nothing.
    pub fn is_noop(&self) -> bool {
        PostField::ALL
            .into_iter()
            .all(|field| self.get(field).is_none())
    }

    /// A patch may not blank out the required `image_url`.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        match self.image_url.as_deref() {
            Some(url) if url.trim().is_empty() => Err(PostValidationError::EmptyImageUrl),
            _ => Ok(()),
        }
    }

    fn slot_mut(&mut self, field: PostField) -> &mut Option<String> {
        match field {
            PostField::ImageUrl => &mut self.image_url,
            PostField::Description => &mut self.description,
            PostField::Tags => &mut self.tags,
        }
    }
}
