//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for posts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutation re-reads the post and checks ownership inside the same
//!   write transaction that applies it (`guard`).
//! - Repository APIs return semantic errors (`NotFound`, `Forbidden`) in
//!   addition to storage errors.

pub mod guard;
pub mod merge;
pub mod page;
pub mod post_repo;
