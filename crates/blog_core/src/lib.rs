//! Blog data store, repository, renderer and request handlers.
//! Handlers are the entry points; everything below them is synchronous and
//! read-only per request.

pub mod config;
pub mod db;
pub mod handler;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;

pub use config::{AppConfig, ConfigError};
pub use handler::{handle_detail, handle_list, HtmlResponse, BLOG_NOT_FOUND_BODY};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::blog::{
    Blog, BlogDetail, BlogId, Comment, CommentId, ModelValidationError, NewBlog, NewComment, Tag,
    TagId,
};
pub use render::{blog_detail_url, render_blog_detail, render_blog_summary};
pub use repo::blog_repo::{
    BlogRepository, BlogStore, RepoError, RepoResult, SqliteBlogRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
