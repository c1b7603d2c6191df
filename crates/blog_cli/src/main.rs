//! `blog` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the blog store.
//! - Serve the list/detail views over HTTP or print them to stdout.
//! - Provide small maintenance commands over the store's write side.

mod server;

use anyhow::{anyhow, Context, Result};
use blog_core::db::open_db;
use blog_core::{
    handle_detail, handle_list, init_logging, init_stderr_logging, AppConfig, BlogId,
    BlogStore, HtmlResponse, NewBlog, NewComment, SqliteBlogRepository,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "blog", version, about = "Serve and inspect a blog store")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve `/blogs/` and `/blogs/<id>/` over HTTP.
    Serve {
        /// Overrides `bind_addr` from the config.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the list view.
    List,
    /// Print the detail view of one blog.
    Show { blog_id: BlogId },
    /// Create a blog published now.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Repeatable.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Attach a comment to a blog.
    Comment {
        blog_id: BlogId,
        #[arg(long)]
        author: String,
        #[arg(long)]
        content: String,
    },
    /// Delete a blog and its comments.
    Delete { blog_id: BlogId },
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// The requested view answered with a non-200 status.
    NotFound,
}

impl From<Outcome> for ExitCode {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::NotFound => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("Error: {err}");
            for cause in err.chain().skip(1) {
                eprintln!("Caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = AppConfig::load(cli.config.as_deref())?;
    start_logging(&config)?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        blog_core::core_version()
    );

    let mut conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;

    match cli.command {
        Command::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            server::serve(server::AppState::new(conn), &bind_addr).await?;
            Ok(Outcome::Success)
        }
        Command::List => {
            let repo = SqliteBlogRepository::try_new(&mut conn)?;
            Ok(print_response(handle_list(&repo)?))
        }
        Command::Show { blog_id } => {
            let repo = SqliteBlogRepository::try_new(&mut conn)?;
            Ok(print_response(handle_detail(&repo, blog_id)?))
        }
        Command::Add {
            title,
            author,
            content,
            tags,
        } => {
            let mut repo = SqliteBlogRepository::try_new(&mut conn)?;
            let blog = NewBlog::new(title, author, Utc::now(), content);
            let blog_id = repo.create_blog_with_tags(&blog, &tags)?;
            println!("created blog {blog_id}");
            Ok(Outcome::Success)
        }
        Command::Comment {
            blog_id,
            author,
            content,
        } => {
            let repo = SqliteBlogRepository::try_new(&mut conn)?;
            let comment_id = repo.add_comment(&NewComment::new(blog_id, author, content))?;
            println!("created comment {comment_id}");
            Ok(Outcome::Success)
        }
        Command::Delete { blog_id } => {
            let repo = SqliteBlogRepository::try_new(&mut conn)?;
            repo.delete_blog(blog_id)?;
            println!("deleted blog {blog_id}");
            Ok(Outcome::Success)
        }
    }
}

fn start_logging(config: &AppConfig) -> Result<()> {
    match &config.log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| anyhow!("log_dir `{}` is not valid UTF-8", dir.display()))?;
            init_logging(&config.log_level, dir).map_err(|err| anyhow!(err))
        }
        None => init_stderr_logging(&config.log_level).map_err(|err| anyhow!(err)),
    }
}

fn print_response(response: HtmlResponse) -> Outcome {
    println!("{}", response.body);
    if response.status == 200 {
        Outcome::Success
    } else {
        Outcome::NotFound
    }
}
