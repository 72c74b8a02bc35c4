use std::path::PathBuf;

use anyhow::Context;
use folio_client::{
    api::{AuthToken, CommentId, NewSession, NewUser, NotificationId, PostId},
    markdown, BlogApi, CommentTree, HttpApi, COMMENT_PAGE_SIZE, NOTIFICATION_PAGE_SIZE,
};

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "FOLIO_HOST")]
    host: String,

    /// Token returned by `login`
    #[structopt(long, env = "FOLIO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Log in and print the session token
    Login {
        username: String,

        #[structopt(env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        username: String,

        password: String,

        #[structopt(long, default_value = "")]
        email: String,
    },

    /// Check the token and print who it belongs to
    Whoami,

    /// List posts
    Posts {
        #[structopt(long, default_value = "1")]
        page: i64,

        #[structopt(long, default_value = "10")]
        size: i64,
    },

    /// Publish a post
    Publish { post: i64 },

    /// Delete a post and its comments
    DeletePost { post: i64 },

    /// Upload an image and print its reference
    Upload { file: PathBuf },

    /// Print the comments of a post, as threads
    Comments { post: i64 },

    /// Delete a comment
    DeleteComment { comment: i64 },

    /// Print the number of unread notifications, then one page of them
    Notifications {
        #[structopt(long, default_value = "1")]
        page: i64,
    },

    /// Mark a notification as read
    ReadNotification { notification: i64 },

    /// Mark every notification as read
    ReadAll,

    /// Print the table of contents of a local markdown file
    Headings { file: PathBuf },

    /// Render a local markdown file to HTML
    Preview { file: PathBuf },
}

fn client(opt: &Opt) -> HttpApi {
    HttpApi::new(opt.host.trim_end_matches('/')).with_token(opt.token.clone().map(AuthToken))
}

fn read(file: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let api = client(&opt);

    match opt.cmd {
        Command::Login { username, password } => {
            let session = NewSession::new(username, password);
            session.validate()?;
            let session = api.login(&session).await.context("logging in")?;
            println!("{}", session.token.0);
        }
        Command::Register {
            username,
            password,
            email,
        } => {
            let user = NewUser {
                username,
                password,
                email,
            };
            user.validate()?;
            let session = api.register(&user).await.context("registering")?;
            println!("{}", session.token.0);
        }
        Command::Whoami => {
            let user = api.profile().await.context("checking session")?;
            println!("{}\t{}\t{:?}", user.id.0, user.name(), user.role);
        }
        Command::Posts { page, size } => {
            let posts = api.list_posts(page, size).await.context("listing posts")?;
            for p in &posts.records {
                let state = match p.published {
                    true => "published",
                    false => "draft",
                };
                println!("{}\t{}\t{}", p.id, state, p.title);
            }
            println!("page {} of {} ({} posts)", posts.page, posts.pages, posts.total);
        }
        Command::Publish { post } => {
            api.publish_post(PostId(post))
                .await
                .with_context(|| format!("publishing post {post}"))?;
            tracing::info!(post, "published");
        }
        Command::DeletePost { post } => {
            api.delete_post(PostId(post))
                .await
                .with_context(|| format!("deleting post {post}"))?;
            tracing::info!(post, "deleted");
        }
        Command::Upload { file } => {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("upload path has no file name")?
                .to_string();
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let url = api.upload_cover(&name, bytes).await.context("uploading")?;
            println!("{url}");
        }
        Command::Comments { post } => {
            let comments = api
                .list_comments(PostId(post), 1, COMMENT_PAGE_SIZE)
                .await
                .with_context(|| format!("listing comments of post {post}"))?;
            let tree = CommentTree::build(&comments.records);
            for thread in tree.threads() {
                println!(
                    "#{} {} ({} likes): {}",
                    thread.root.id.0,
                    thread.root.author_display(),
                    thread.root.like_count,
                    thread.root.content
                );
                for r in thread.replies {
                    println!(
                        "    #{} {} -> @{}: {}",
                        r.comment.id.0,
                        r.comment.author_display(),
                        r.reply_to_user.unwrap_or("?"),
                        r.comment.content
                    );
                }
            }
        }
        Command::DeleteComment { comment } => {
            api.delete_comment(CommentId(comment))
                .await
                .with_context(|| format!("deleting comment {comment}"))?;
        }
        Command::Notifications { page } => {
            let unread = api
                .unread_notifications()
                .await
                .context("counting unread notifications")?;
            println!("{unread} unread");
            let list = api
                .list_notifications(page, NOTIFICATION_PAGE_SIZE)
                .await
                .context("listing notifications")?;
            for n in &list.records {
                let mark = match n.is_read {
                    true => ' ',
                    false => '*',
                };
                println!(
                    "{mark} #{} {} {}: {}",
                    n.id.0,
                    n.sender_display(),
                    n.action(),
                    n.content
                );
            }
        }
        Command::ReadNotification { notification } => {
            api.mark_notification_read(NotificationId(notification))
                .await
                .with_context(|| format!("marking notification {notification} read"))?;
        }
        Command::ReadAll => {
            api.mark_all_notifications_read()
                .await
                .context("marking notifications read")?;
        }
        Command::Headings { file } => {
            let headings = markdown::extract_headings(&read(&file)?);
            println!("{}", serde_json::to_string_pretty(&headings)?);
        }
        Command::Preview { file } => {
            println!("{}", markdown::render_preview(&read(&file)?));
        }
    }

    Ok(())
}
