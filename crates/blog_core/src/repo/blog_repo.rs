//! Blog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide read-only blog queries with tags and comments resolved.
//! - Provide the write side of the store used for seeding and maintenance.
//!
//! # Invariants
//! - `list_blogs` resolves tags for all blogs in one batch query.
//! - Tag identity is `tag_key(name)`; the `tags.name_key` column carries
//!   the same key under a UNIQUE constraint.
//! - Tags on a blog are sorted by key, so case-insensitive by name.
//! - Comments on a blog are returned in insertion order.
//! - `set_blog_tags` replaces the whole tag set in a single transaction.

use crate::db::DbError;
use crate::model::blog::{
    validate_tag_name, Blog, BlogDetail, BlogId, Comment, CommentId, ModelValidationError,
    NewBlog, NewComment, Tag,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const BLOG_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    date_published,
    content
FROM blogs";

const REQUIRED_TABLES: [&str; 4] = ["blogs", "tags", "blog_tags", "comments"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for blog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    NotFound(BlogId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "blog not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted blog data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is not migrated: missing table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read-only query interface used by request handlers.
pub trait BlogRepository {
    /// Lists all blogs with tags pre-loaded. Order is `id ASC`.
    fn list_blogs(&self) -> RepoResult<Vec<Blog>>;
    /// Gets one blog with tags and comments, or `RepoError::NotFound`.
    fn get_blog(&self, blog_id: BlogId) -> RepoResult<BlogDetail>;
}

/// Write interface of the data store.
pub trait BlogStore {
    /// Inserts one blog without tags and returns its generated id.
    fn create_blog(&self, blog: &NewBlog) -> RepoResult<BlogId>;
    /// Inserts one blog and its tags in one transaction.
    ///
    /// Nothing is written when the blog or any tag name fails validation.
    fn create_blog_with_tags(&mut self, blog: &NewBlog, tags: &[String]) -> RepoResult<BlogId>;
    /// Replaces all tags for the given blog in one transaction.
    fn set_blog_tags(&mut self, blog_id: BlogId, tags: &[String]) -> RepoResult<()>;
    /// Attaches a comment to an existing blog.
    fn add_comment(&self, comment: &NewComment) -> RepoResult<CommentId>;
    /// Deletes a blog together with its comments and tag links.
    fn delete_blog(&self, blog_id: BlogId) -> RepoResult<()>;
    /// Returns all known tags sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed blog repository.
pub struct SqliteBlogRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBlogRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the schema has not been applied.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl BlogRepository for SqliteBlogRepository<'_> {
    fn list_blogs(&self) -> RepoResult<Vec<Blog>> {
        let started_at = Instant::now();
        let mut stmt = self
            .conn
            .prepare(&format!("{BLOG_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut blogs = Vec::new();
        while let Some(row) = rows.next()? {
            blogs.push(parse_blog_row(row)?);
        }

        let mut tags_by_blog = load_all_blog_tags(self.conn)?;
        for blog in &mut blogs {
            blog.tags = tags_by_blog.remove(&blog.id).unwrap_or_default();
        }

        debug!(
            "event=blog_list module=repo status=ok count={} duration_ms={}",
            blogs.len(),
            started_at.elapsed().as_millis()
        );
        Ok(blogs)
    }

    fn get_blog(&self, blog_id: BlogId) -> RepoResult<BlogDetail> {
        let started_at = Instant::now();
        let mut stmt = self
            .conn
            .prepare(&format!("{BLOG_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([blog_id])?;
        let Some(row) = rows.next()? else {
            debug!("event=blog_get module=repo status=not_found blog_id={blog_id}");
            return Err(RepoError::NotFound(blog_id));
        };

        let mut blog = parse_blog_row(row)?;
        blog.tags = load_tags_for_blog(self.conn, blog_id)?;
        let comments = load_comments_for_blog(self.conn, blog_id)?;

        debug!(
            "event=blog_get module=repo status=ok blog_id={blog_id} tags={} comments={} duration_ms={}",
            blog.tags.len(),
            comments.len(),
            started_at.elapsed().as_millis()
        );
        Ok(BlogDetail { blog, comments })
    }
}

impl BlogStore for SqliteBlogRepository<'_> {
    fn create_blog(&self, blog: &NewBlog) -> RepoResult<BlogId> {
        blog.validate()?;
        let blog_id = insert_blog(self.conn, blog)?;
        info!("event=blog_write module=repo status=ok op=create_blog blog_id={blog_id}");
        Ok(blog_id)
    }

    fn create_blog_with_tags(&mut self, blog: &NewBlog, tags: &[String]) -> RepoResult<BlogId> {
        blog.validate()?;
        let normalized = prepare_tag_names(tags)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let blog_id = insert_blog(&tx, blog)?;
        replace_tags(&tx, blog_id, &normalized)?;
        tx.commit()?;

        info!(
            "event=blog_write module=repo status=ok op=create_blog_with_tags blog_id={blog_id} tags={}",
            normalized.len()
        );
        Ok(blog_id)
    }

    fn set_blog_tags(&mut self, blog_id: BlogId, tags: &[String]) -> RepoResult<()> {
        let normalized = prepare_tag_names(tags)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !blog_exists(&tx, blog_id)? {
            return Err(RepoError::NotFound(blog_id));
        }
        replace_tags(&tx, blog_id, &normalized)?;
        tx.commit()?;

        info!(
            "event=blog_write module=repo status=ok op=set_blog_tags blog_id={blog_id} tags={}",
            normalized.len()
        );
        Ok(())
    }

    fn add_comment(&self, comment: &NewComment) -> RepoResult<CommentId> {
        comment.validate()?;
        if !blog_exists(self.conn, comment.blog_id)? {
            return Err(RepoError::NotFound(comment.blog_id));
        }

        self.conn.execute(
            "INSERT INTO comments (blog_id, author, content, date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                comment.blog_id,
                comment.author.as_str(),
                comment.content.as_str(),
                comment.date.timestamp_millis(),
            ],
        )?;

        let comment_id = self.conn.last_insert_rowid();
        info!(
            "event=blog_write module=repo status=ok op=add_comment blog_id={} comment_id={comment_id}",
            comment.blog_id
        );
        Ok(comment_id)
    }

    fn delete_blog(&self, blog_id: BlogId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM blogs WHERE id = ?1;", [blog_id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(blog_id));
        }

        info!("event=blog_write module=repo status=ok op=delete_blog blog_id={blog_id}");
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
.prepare("SELECT id, name FROM tags ORDER BY name_key ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }
}

/// Identity key of a tag name: trimmed and Unicode-lowercased.
///
/// Stored in `tags.name_key`; two names with the same key are the same tag.
pub fn tag_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trims tag names, drops blanks and collapses duplicates by `tag_key`.
///
/// The first spelling of each name wins.
pub fn normalize_tag_names(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(tag_key(trimmed)) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

fn prepare_tag_names(tags: &[String]) -> RepoResult<Vec<String>> {
    let normalized = normalize_tag_names(tags);
    for name in &normalized {
        validate_tag_name(name)?;
    }
    Ok(normalized)
}

fn insert_blog(conn: &Connection, blog: &NewBlog) -> RepoResult<BlogId> {
    conn.execute(
        "INSERT INTO blogs (title, author, date_published, content)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            blog.title.as_str(),
            blog.author.as_str(),
            blog.date_published.timestamp_millis(),
            blog.content.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Expects names already passed through `prepare_tag_names`.
fn replace_tags(conn: &Connection, blog_id: BlogId, names: &[String]) -> RepoResult<()> {
    conn.execute("DELETE FROM blog_tags WHERE blog_id = ?1;", [blog_id])?;
    for name in names {
        let key = tag_key(name);
        conn.execute(
            "INSERT OR IGNORE INTO tags (name, name_key) VALUES (?1, ?2);",
            params![name.as_str(), key.as_str()],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO blog_tags (blog_id, tag_id)
             SELECT ?1, id
             FROM tags
             WHERE name_key = ?2;",
            params![blog_id, key.as_str()],
        )?;
    }
    Ok(())
}

fn parse_blog_row(row: &Row<'_>) -> RepoResult<Blog> {
    Ok(Blog {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        date_published: parse_epoch_ms(row.get("date_published")?, "blogs.date_published")?,
        content: row.get("content")?,
        tags: Vec::new(),
    })
}

fn parse_epoch_ms(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

fn load_all_blog_tags(conn: &Connection) -> RepoResult<HashMap<BlogId, Vec<Tag>>> {
    let mut stmt = conn.prepare(
        "SELECT bt.blog_id, t.id, t.name
         FROM blog_tags bt
         INNER JOIN tags t ON t.id = bt.tag_id
         ORDER BY bt.blog_id ASC, t.name_key ASC, t.id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut tags_by_blog: HashMap<BlogId, Vec<Tag>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let blog_id: BlogId = row.get(0)?;
        tags_by_blog.entry(blog_id).or_default().push(Tag {
            id: row.get(1)?,
            name: row.get(2)?,
        });
    }
    Ok(tags_by_blog)
}

fn load_tags_for_blog(conn: &Connection, blog_id: BlogId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name
         FROM blog_tags bt
         INNER JOIN tags t ON t.id = bt.tag_id
         WHERE bt.blog_id = ?1
         ORDER BY t.name_key ASC, t.id ASC;",
    )?;
    let mut rows = stmt.query([blog_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(tags)
}

fn load_comments_for_blog(conn: &Connection, blog_id: BlogId) -> RepoResult<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, blog_id, author, content, date
         FROM comments
         WHERE blog_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([blog_id])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        comments.push(Comment {
            id: row.get("id")?,
            blog_id: row.get("blog_id")?,
            author: row.get("author")?,
            content: row.get("content")?,
            date: parse_epoch_ms(row.get("date")?, "comments.date")?,
        });
    }
    Ok(comments)
}

fn blog_exists(conn: &Connection, blog_id: BlogId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM blogs WHERE id = ?1);",
        [blog_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag_names, tag_key};

    #[test]
    fn normalize_drops_blanks_and_case_duplicates() {
        let tags = vec![
            " Rust ".to_string(),
            "   ".to_string(),
            "rust".to_string(),
            "web".to_string(),
        ];
        assert_eq!(normalize_tag_names(&tags), vec!["Rust", "web"]);
    }

    #[test]
    fn normalize_folds_non_ascii_case() {
        let tags = vec!["Éte".to_string(), "éte".to_string(), "ÉTE ".to_string()];
        assert_eq!(normalize_tag_names(&tags), vec!["Éte"]);
        assert_eq!(tag_key(" Éte "), tag_key("éTE"));
    }
}
