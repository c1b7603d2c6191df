//! Blog, tag and comment records.
//!
//! # Responsibility
//! - Define fully-resolved read models (`Blog`, `BlogDetail`).
//! - Define validated write inputs (`NewBlog`, `NewComment`).
//!
//! # Invariants
//! - Identifiers are generated by the store and never reused.
//! - Short text fields are limited to `MAX_SHORT_TEXT_CHARS` characters.
//! - `Comment::date` defaults to creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-generated blog identifier.
pub type BlogId = i64;
/// Store-generated tag identifier.
pub type TagId = i64;
/// Store-generated comment identifier.
pub type CommentId = i64;

/// Upper bound for title, author and tag name lengths.
pub const MAX_SHORT_TEXT_CHARS: usize = 100;

/// Label shared across many blogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Published article with its tags resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub author: String,
    pub date_published: DateTime<Utc>,
    pub content: String,
    /// Sorted by name, case-insensitive. No duplicates.
    pub tags: Vec<Tag>,
}

impl Blog {
    /// Returns tag names in stored order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }
}

/// Displays as the title.
impl Display for Blog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Reader remark attached to one blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub blog_id: BlogId,
    pub author: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

/// Displays as the comment body.
impl Display for Comment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

/// Result of a detail lookup: one blog with tags and comments resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDetail {
    pub blog: Blog,
    /// Store insertion order.
    pub comments: Vec<Comment>,
}

/// Write input for a new blog. Tags are assigned separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub date_published: DateTime<Utc>,
    pub content: String,
}

impl NewBlog {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        date_published: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            date_published,
            content: content.into(),
        }
    }

    /// Validates field lengths before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_short_text("title", &self.title)?;
        check_short_text("author", &self.author)?;
        Ok(())
    }
}

/// Write input for a new comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub blog_id: BlogId,
    pub author: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

impl NewComment {
    /// Creates a comment input stamped with the current time.
    pub fn new(blog_id: BlogId, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_date(blog_id, author, content, Utc::now())
    }

    /// Creates a comment input with a caller-provided timestamp.
    ///
    /// Used by import paths and tests that need deterministic dates.
    pub fn with_date(
        blog_id: BlogId,
        author: impl Into<String>,
        content: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            blog_id,
            author: author.into(),
            content: content.into(),
            date,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_short_text("author", &self.author)
    }
}

/// Validates one tag name against the shared length limit.
pub fn validate_tag_name(name: &str) -> Result<(), ModelValidationError> {
    check_short_text("tag.name", name)
}

/// Field-level validation failure for write inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldTooLong { field, max, actual } => {
                write!(f, "field `{field}` has {actual} chars; max is {max}")
            }
        }
    }
}

impl Error for ModelValidationError {}

fn check_short_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    let actual = value.chars().count();
    if actual > MAX_SHORT_TEXT_CHARS {
        return Err(ModelValidationError::FieldTooLong {
            field,
            max: MAX_SHORT_TEXT_CHARS,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        Blog, Comment, ModelValidationError, NewBlog, NewComment, Tag, MAX_SHORT_TEXT_CHARS,
    };
    use chrono::{TimeZone, Utc};

    #[test]
    fn new_blog_rejects_overlong_title() {
        let title = "t".repeat(MAX_SHORT_TEXT_CHARS + 1);
        let blog = NewBlog::new(title, "A", Utc::now(), "body");
        let err = blog.validate().unwrap_err();
        assert_eq!(
            err,
            ModelValidationError::FieldTooLong {
                field: "title",
                max: MAX_SHORT_TEXT_CHARS,
                actual: MAX_SHORT_TEXT_CHARS + 1,
            }
        );
    }

    #[test]
    fn limit_counts_chars_not_bytes() {
        let title = "ბ".repeat(MAX_SHORT_TEXT_CHARS);
        let blog = NewBlog::new(title, "A", Utc::now(), "body");
        assert!(blog.validate().is_ok());
    }

    #[test]
    fn new_comment_defaults_date_to_now() {
        let before = Utc::now();
        let comment = NewComment::new(1, "reader", "nice");
        assert!(comment.date >= before);
        assert!(comment.date <= Utc::now());
    }

    #[test]
    fn with_date_keeps_given_timestamp() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let comment = NewComment::with_date(1, "reader", "nice", date);
        assert_eq!(comment.date, date);
    }

    #[test]
    fn records_display_as_their_label_field() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let tag = Tag {
            id: 1,
            name: "rust".to_string(),
        };
        let blog = Blog {
            id: 1,
            title: "Hello".to_string(),
            author: "A".to_string(),
            date_published: date,
            content: "body".to_string(),
            tags: vec![tag.clone()],
        };
        let comment = Comment {
            id: 1,
            blog_id: 1,
            author: "reader".to_string(),
            content: "nice post".to_string(),
            date,
        };

        assert_eq!(blog.to_string(), "Hello");
        assert_eq!(tag.to_string(), "rust");
        assert_eq!(comment.to_string(), "nice post");
    }
}
