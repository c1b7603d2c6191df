use crate::model::blog::BlogId;
use crate::render::{render_blog_detail, render_blog_summary};
use crate::repo::blog_repo::{BlogRepository, RepoError, RepoResult};
use log::info;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
/// Body returned by the detail view for unknown ids.
pub const BLOG_NOT_FOUND_BODY: &str = "Blog not found";

/// Rendered HTML body with its HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlResponse {
    pub status: u16,
    pub body: String,
}

impl HtmlResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND,
            body: BLOG_NOT_FOUND_BODY.to_string(),
        }
    }
}

/// Renders every blog as a summary, concatenated in list order.
pub fn handle_list<R>(repo: &R) -> RepoResult<HtmlResponse>
where
    R: BlogRepository + ?Sized,
{
    let blogs = repo.list_blogs()?;
    let body: String = blogs.iter().map(render_blog_summary).collect();
    info!(
        "event=http_request module=handler view=list status={STATUS_OK} blogs={}",
        blogs.len()
    );
    Ok(HtmlResponse::ok(body))
}

/// Renders one blog with tags and comments, or a 404 when it is absent.
pub fn handle_detail<R>(repo: &R, blog_id: BlogId) -> RepoResult<HtmlResponse>
where
    R: BlogRepository + ?Sized,
{
    match repo.get_blog(blog_id) {
        Ok(detail) => {
            info!(
                "event=http_request module=handler view=detail status={STATUS_OK} blog_id={blog_id}"
            );
            Ok(HtmlResponse::ok(render_blog_detail(&detail)))
        }
        Err(RepoError::NotFound(_)) => {
            info!(
                "event=http_request module=handler view=detail status={STATUS_NOT_FOUND} blog_id={blog_id}"
            );
            Ok(HtmlResponse::not_found())
        }
        Err(err) => Err(err),
    }
}
