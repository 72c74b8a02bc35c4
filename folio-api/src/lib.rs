mod auth;
pub use auth::{
    AuthToken, NewSession, NewUser, Session, GITHUB_LOGIN_PATH, MAX_USERNAME_LEN, MIN_PASSWORD_LEN,
};

mod comment;
pub use comment::{Comment, CommentId, NewComment, MAX_COMMENT_LEN};

mod envelope;
pub use envelope::{decode_body, Envelope, STATUS_OK};

mod error;
pub use error::Error;

mod notification;
pub use notification::{
    quote_comment, Notification, NotificationId, NotificationType, NOTIFICATION_SUMMARY_LEN,
};

mod page;
pub use page::{Listing, Page};

mod post;
pub use post::{
    join_tags, slugify, split_tags, summarize, NewPost, Post, PostId, CATEGORIES,
    DEFAULT_CATEGORY, SUMMARY_LEN,
};

pub mod time;
pub use time::Time;

mod user;
pub use user::{Role, User, UserId};
