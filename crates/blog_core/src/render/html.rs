use crate::model::blog::{Blog, BlogDetail, BlogId};
use chrono::{DateTime, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Path of the detail view for one blog.
pub fn blog_detail_url(blog_id: BlogId) -> String {
    format!("/blogs/{blog_id}/")
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS+00:00`.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Renders one list entry: title, byline, content, tags and a detail link.
pub fn render_blog_summary(blog: &Blog) -> String {
    format!(
        "\n<h3>{title}</h3>\n<p>By {author} on {date}</p>\n<p>{content}</p>\n<p>Tags: {tags}</p>\n<a href=\"{url}\">View Details</a>\n",
        title = blog.title,
        author = blog.author,
        date = format_timestamp(&blog.date_published),
        content = blog.content,
        tags = join_tag_names(blog),
        url = blog_detail_url(blog.id),
    )
}

/// Renders the detail page: blog fields followed by every comment.
pub fn render_blog_detail(detail: &BlogDetail) -> String {
    let blog = &detail.blog;
    let comments: String = detail
        .comments
        .iter()
        .map(|comment| {
            format!(
                "<p>{}: {} <small>{}</small></p>",
                comment.author,
                comment.content,
                format_timestamp(&comment.date)
            )
        })
        .collect();

    format!(
        "\n<h3>Blog Details</h3>\n<h2>{title}</h2>\n<p>By {author} on {date}</p>\n<p>{content}</p>\n<p>Tags: {tags}</p>\n<hr>\n<p>{comments}</p>\n",
        title = blog.title,
        author = blog.author,
        date = format_timestamp(&blog.date_published),
        content = blog.content,
        tags = join_tag_names(blog),
    )
}

fn join_tag_names(blog: &Blog) -> String {
    blog.tag_names().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::{blog_detail_url, format_timestamp, render_blog_detail, render_blog_summary};
    use crate::model::blog::{Blog, BlogDetail, Comment, Tag};
    use chrono::{TimeZone, Utc};

    fn sample_blog() -> Blog {
        Blog {
            id: 7,
            title: "Ownership".to_string(),
            author: "Nino".to_string(),
            date_published: Utc.with_ymd_and_hms(2024, 5, 2, 14, 0, 0).unwrap(),
            content: "Borrowing rules.".to_string(),
            tags: vec![
                Tag {
                    id: 1,
                    name: "memory".to_string(),
                },
                Tag {
                    id: 2,
                    name: "rust".to_string(),
                },
            ],
        }
    }

    #[test]
    fn timestamp_uses_utc_offset_suffix() {
        let value = Utc.with_ymd_and_hms(2024, 5, 2, 14, 0, 0).unwrap();
        assert_eq!(format_timestamp(&value), "2024-05-02 14:00:00+00:00");
    }

    #[test]
    fn summary_contains_fields_tags_and_detail_link() {
        let html = render_blog_summary(&sample_blog());
        assert!(html.contains("<h3>Ownership</h3>"));
        assert!(html.contains("<p>By Nino on 2024-05-02 14:00:00+00:00</p>"));
        assert!(html.contains("<p>Borrowing rules.</p>"));
        assert!(html.contains("<p>Tags: memory, rust</p>"));
        assert!(html.contains(&format!("<a href=\"{}\">View Details</a>", blog_detail_url(7))));
    }

    #[test]
    fn summary_without_tags_renders_empty_tag_line() {
        let mut blog = sample_blog();
        blog.tags.clear();
        assert!(render_blog_summary(&blog).contains("<p>Tags: </p>"));
    }

    #[test]
    fn detail_lists_comments_in_given_order() {
        let date = Utc.with_ymd_and_hms(2024, 5, 3, 8, 15, 0).unwrap();
        let detail = BlogDetail {
            blog: sample_blog(),
            comments: vec![
                Comment {
                    id: 1,
                    blog_id: 7,
                    author: "Ana".to_string(),
                    content: "first".to_string(),
                    date,
                },
                Comment {
                    id: 2,
                    blog_id: 7,
                    author: "Gio".to_string(),
                    content: "second".to_string(),
                    date,
                },
            ],
        };

        let html = render_blog_detail(&detail);
        assert!(html.contains("<h3>Blog Details</h3>"));
        assert!(html.contains("<h2>Ownership</h2>"));
        assert!(html.contains("<p>Tags: memory, rust</p>"));
        let first = html
            .find("<p>Ana: first <small>2024-05-03 08:15:00+00:00</small></p>")
            .expect("first comment rendered");
        let second = html.find("<p>Gio: second").expect("second comment rendered");
        assert!(first < second);
    }
}
