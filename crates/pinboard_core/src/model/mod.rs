//! Post domain model.
//!
//! # Responsibility
//! - Define the canonical post record and its write inputs.
//! - Define the allow-listed partial-update shape.
//!
//! # Invariants
//! - Every post is identified by a store-assigned `PostId` never reused.
//! - `owner_id` and `created_at` never change after insert.

pub mod patch;
pub mod post;
