use blog_core::db::open_db_in_memory;
use blog_core::{
    handle_detail, handle_list, render_blog_summary, BlogRepository, BlogStore, NewBlog,
    NewComment, SqliteBlogRepository,
};
use chrono::{TimeZone, Utc};

fn seed_blog(repo: &mut SqliteBlogRepository<'_>, title: &str, author: &str, tags: &[&str]) -> i64 {
    let blog_id = repo
        .create_blog(&NewBlog::new(
            title,
            author,
            Utc.with_ymd_and_hms(2024, 4, 10, 18, 30, 0).unwrap(),
            "content",
        ))
        .unwrap();
    let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
    repo.set_blog_tags(blog_id, &tags).unwrap();
    blog_id
}

#[test]
fn list_on_empty_store_returns_200_with_empty_body() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBlogRepository::try_new(&mut conn).unwrap();

    let response = handle_list(&repo).unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.is_empty());
}

#[test]
fn list_body_is_concatenation_of_summaries() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBlogRepository::try_new(&mut conn).unwrap();
    seed_blog(&mut repo, "One", "A", &["x"]);
    seed_blog(&mut repo, "Two", "B", &[]);

    let expected: String = repo.list_blogs().unwrap().iter().map(render_blog_summary).collect();
    let response = handle_list(&repo).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, expected);
    assert!(response.body.contains("href=\"/blogs/1/\""));
    assert!(response.body.contains("href=\"/blogs/2/\""));
}

#[test]
fn every_summary_contains_title_author_and_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBlogRepository::try_new(&mut conn).unwrap();
    seed_blog(&mut repo, "Traits", "Levan", &["generics", "rust"]);
    seed_blog(&mut repo, "Lifetimes", "Mariam", &["borrowck"]);

    for blog in repo.list_blogs().unwrap() {
        let html = render_blog_summary(&blog);
        assert!(html.contains(&blog.title));
        assert!(html.contains(&blog.author));
        for name in blog.tag_names() {
            assert!(html.contains(name), "missing tag {name}");
        }
    }
}

#[test]
fn detail_for_missing_blog_returns_404() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBlogRepository::try_new(&mut conn).unwrap();

    let response = handle_detail(&repo, 1).unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "Blog not found");
}

#[test]
fn detail_without_comments_shows_byline_and_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBlogRepository::try_new(&mut conn).unwrap();
    let blog_id = seed_blog(&mut repo, "Hello", "A", &["y", "x"]);
    assert_eq!(blog_id, 1);

    let response = handle_detail(&repo, 1).unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.contains("Hello"));
    assert!(response.body.contains("By A"));
    assert!(response.body.contains("Tags: x, y"));
}

#[test]
fn detail_lists_every_comment_in_store_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBlogRepository::try_new(&mut conn).unwrap();
    seed_blog(&mut repo, "First", "A", &[]);
    let blog_id = seed_blog(&mut repo, "Second", "B", &["rust"]);
    assert_eq!(blog_id, 2);
    repo.add_comment(&NewComment::new(blog_id, "Nika", "Great post"))
        .unwrap();
    repo.add_comment(&NewComment::new(blog_id, "Tamar", "Thanks!"))
        .unwrap();

    let response = handle_detail(&repo, blog_id).unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.contains("Second"));
    let first = response.body.find("Nika: Great post").unwrap();
    let second = response.body.find("Tamar: Thanks!").unwrap();
    assert!(first < second);
}

#[test]
fn detail_after_delete_returns_404() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteBlogRepository::try_new(&mut conn).unwrap();
    let blog_id = seed_blog(&mut repo, "Temporary", "A", &["x"]);
    repo.add_comment(&NewComment::new(blog_id, "r", "c")).unwrap();
    repo.delete_blog(blog_id).unwrap();

    assert_eq!(handle_detail(&repo, blog_id).unwrap().status, 404);
    assert!(handle_list(&repo).unwrap().body.is_empty());
}
