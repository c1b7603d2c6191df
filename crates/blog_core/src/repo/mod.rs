//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Expose typed fetch operations (`list_blogs`, `get_blog`) to callers.
//! - Keep SQL details away from the renderer and handlers.
//!
//! # Invariants
//! - Read results are fully resolved; callers never issue follow-up queries.
//! - Missing records surface as `RepoError::NotFound`, not as panics.

pub mod blog_repo;
