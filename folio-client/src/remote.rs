use crate::api::{
    Comment, CommentId, Error, NewComment, NewPost, NewSession, NewUser, Notification,
    NotificationId, Page, Post, PostId, Session, User,
};

/// The REST backend, as seen by the client
#[async_trait::async_trait(?Send)]
pub trait BlogApi {
    async fn login(&self, session: &NewSession) -> Result<Session, Error>;
    async fn register(&self, user: &NewUser) -> Result<Session, Error>;
    async fn profile(&self) -> Result<User, Error>;
    async fn logout(&self) -> Result<(), Error>;

    async fn list_posts(&self, page: i64, size: i64) -> Result<Page<Post>, Error>;
    async fn get_post(&self, id: PostId) -> Result<Post, Error>;
    async fn create_post(&self, post: &NewPost) -> Result<Post, Error>;
    async fn update_post(&self, id: PostId, post: &NewPost) -> Result<Post, Error>;
    async fn publish_post(&self, id: PostId) -> Result<(), Error>;
    async fn delete_post(&self, id: PostId) -> Result<(), Error>;

    /// Stores a cover image and returns the reference to put in the post
    async fn upload_cover(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, Error>;

    async fn list_comments(&self, post: PostId, page: i64, size: i64)
        -> Result<Page<Comment>, Error>;
    async fn create_comment(&self, post: PostId, comment: &NewComment) -> Result<Comment, Error>;
    async fn delete_comment(&self, id: CommentId) -> Result<(), Error>;

    /// Toggles the current user's like on the comment
    async fn like_comment(&self, id: CommentId) -> Result<(), Error>;

    async fn unread_notifications(&self) -> Result<i64, Error>;
    async fn list_notifications(&self, page: i64, size: i64) -> Result<Page<Notification>, Error>;
    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), Error>;
    async fn mark_all_notifications_read(&self) -> Result<(), Error>;
}
