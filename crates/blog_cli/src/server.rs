//! HTTP surface for the list and detail views.
//!
//! # Invariants
//! - One request performs one synchronous store read under the connection lock.
//! - Handler responses keep their status; store failures become 500.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use blog_core::{
    handle_detail, handle_list, BlogId, HtmlResponse, RepoResult, SqliteBlogRepository,
};
use log::{error, info};
use rusqlite::Connection;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Shared state: a single migrated SQLite connection.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

/// Builds the router with `/blogs/` and `/blogs/:blog_id/`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/blogs/", get(list_view))
        .route("/blogs/:blog_id/", get(detail_view))
        .with_state(state)
}

/// Binds `bind_addr` and serves until the process is stopped.
pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let addr: SocketAddr = bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=server_start module=cli status=ok addr={addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn list_view(State(state): State<AppState>) -> Response {
    respond(&state, |repo| handle_list(repo))
}

async fn detail_view(State(state): State<AppState>, Path(blog_id): Path<BlogId>) -> Response {
    respond(&state, |repo| handle_detail(repo, blog_id))
}

fn respond(
    state: &AppState,
    view: impl FnOnce(&SqliteBlogRepository<'_>) -> RepoResult<HtmlResponse>,
) -> Response {
    // A poisoned lock still guards a usable connection; reads do not mutate it.
    let mut conn = match state.conn.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    match SqliteBlogRepository::try_new(&mut conn).and_then(|repo| view(&repo)) {
        Ok(response) => into_http(response),
        Err(err) => {
            error!("event=http_request module=cli status=500 error={err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn into_http(response: HtmlResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Html(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::{router, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use blog_core::db::open_db_in_memory;
    use blog_core::{BlogStore, NewBlog, NewComment, SqliteBlogRepository};
    use chrono::Utc;
    use rusqlite::Connection;
    use tower::ServiceExt;

    fn seeded_state() -> AppState {
        let mut conn = open_db_in_memory().unwrap();
        {
            let mut repo = SqliteBlogRepository::try_new(&mut conn).unwrap();
            let blog_id = repo
                .create_blog(&NewBlog::new("Hello", "A", Utc::now(), "body"))
                .unwrap();
            repo.set_blog_tags(blog_id, &["x".to_string(), "y".to_string()])
                .unwrap();
            repo.add_comment(&NewComment::new(blog_id, "reader", "nice"))
                .unwrap();
        }
        AppState::new(conn)
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn list_route_renders_summaries() {
        let (status, body) = get(seeded_state(), "/blogs/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h3>Hello</h3>"));
        assert!(body.contains("href=\"/blogs/1/\""));
    }

    #[tokio::test]
    async fn detail_route_renders_blog_and_comments() {
        let (status, body) = get(seeded_state(), "/blogs/1/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Tags: x, y"));
        assert!(body.contains("reader: nice"));
    }

    #[tokio::test]
    async fn detail_route_unknown_id_is_404() {
        let (status, body) = get(seeded_state(), "/blogs/99/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Blog not found");
    }

    #[tokio::test]
    async fn detail_route_rejects_non_integer_id() {
        let (status, _) = get(seeded_state(), "/blogs/abc/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let state = AppState::new(Connection::open_in_memory().unwrap());
        let (status, body) = get(state.clone(), "/blogs/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");

        let (status, _) = get(state, "/blogs/1/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
