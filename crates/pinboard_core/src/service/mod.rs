//! Core use-case services.
//!
//! # Responsibility
//! - Expose the post store to callers through primitive-argument calls.
//! - Keep transport layers decoupled from storage details.

pub mod post_service;
