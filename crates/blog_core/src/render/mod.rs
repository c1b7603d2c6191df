//! HTML fragment rendering for blog views.
//!
//! # Responsibility
//! - Format fully-resolved blog records into HTML text.
//!
//! # Invariants
//! - Rendering is pure: no I/O, no mutation of inputs.
//! - Field values are written verbatim; tag and comment order is kept as
//!   given by the repository.

pub mod html;

pub use html::{blog_detail_url, format_timestamp, render_blog_detail, render_blog_summary};
