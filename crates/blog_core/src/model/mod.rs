//! Blog domain model.
//!
//! # Responsibility
//! - Define the records read by repository, renderer and handlers.
//! - Define write-side inputs with field validation.
//!
//! # Invariants
//! - Every `Comment` belongs to exactly one `Blog`.
//! - A `Blog` never carries the same `Tag` twice.

pub mod blog;
