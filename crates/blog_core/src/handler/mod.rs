//! Request handlers for the blog list and detail views.
//!
//! # Responsibility
//! - Combine one repository read with one render call per request.
//! - Map `RepoError::NotFound` to a 404 response.
//!
//! # Invariants
//! - Handlers only produce status 200 or 404.
//! - Store failures other than `NotFound` propagate to the caller.

pub mod blog_views;

pub use blog_views::{handle_detail, handle_list, HtmlResponse, BLOG_NOT_FOUND_BODY};
