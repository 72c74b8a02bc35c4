use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use folio_client::{
    api::{
        quote_comment, slugify, AuthToken, Comment, CommentId, Error, NewComment, NewPost,
        NewSession, NewUser, Notification, NotificationId, NotificationType, Page, Post, PostId,
        Role, Session, User, UserId,
    },
    BlogApi,
};
use parking_lot::Mutex;

/// In-memory backend behaving like the REST API
#[derive(Debug, Default)]
pub struct MockServer {
    users: BTreeMap<UserId, DbUser>,
    sessions: HashMap<AuthToken, UserId>,
    posts: BTreeMap<PostId, Post>,
    post_authors: HashMap<PostId, UserId>,
    comments: BTreeMap<CommentId, Comment>,
    likes: HashSet<(CommentId, UserId)>,
    uploads: Vec<(String, Vec<u8>)>,
    notifications: BTreeMap<NotificationId, Notification>,
    next_id: i64,
    failures: usize,
}

#[derive(Debug)]
struct DbUser {
    user: User,
    pass: String,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    fn fresh_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Makes the next `n` calls fail with a server error
    pub fn fail_next(&mut self, n: usize) {
        self.failures = n;
    }

    fn check_failure(&mut self) -> Result<(), Error> {
        if self.failures == 0 {
            return Ok(());
        }
        self.failures -= 1;
        Err(Error::Server {
            status: 500,
            message: String::new(),
        })
    }

    pub fn admin_create_user(&mut self, u: NewUser, role: Role) -> Result<User, Error> {
        u.validate()?;
        if self.users.values().any(|db| db.user.username == u.username) {
            return Err(Error::Server {
                status: 101,
                message: format!("user name {} is already taken", u.username),
            });
        }
        let user = User {
            id: UserId(self.fresh_id()),
            username: u.username,
            display_name: None,
            email: Some(u.email).filter(|e| !e.is_empty()),
            avatar_url: None,
            role,
        };
        self.users.insert(
            user.id,
            DbUser {
                user: user.clone(),
                pass: u.password,
            },
        );
        Ok(user)
    }

    pub fn auth(&mut self, s: &NewSession) -> Result<Session, Error> {
        s.validate()?;
        let user = self
            .users
            .values()
            .find(|u| u.user.username == s.username && u.pass == s.password)
            .map(|u| u.user.clone())
            .ok_or(Error::Server {
                status: 101,
                message: String::from("Wrong user name or password"),
            })?;
        let token = AuthToken(format!("mock-token-{}", self.fresh_id()));
        self.sessions.insert(token.clone(), user.id);
        Ok(Session {
            token,
            user: Some(user),
        })
    }

    pub fn unauth(&mut self, tok: &AuthToken) -> Result<(), Error> {
        self.sessions
            .remove(tok)
            .map(|_| ())
            .ok_or(Error::Unauthenticated)
    }

    fn resolve(&self, tok: Option<&AuthToken>) -> Result<&User, Error> {
        tok.and_then(|t| self.sessions.get(t))
            .and_then(|uid| self.users.get(uid))
            .map(|u| &u.user)
            .ok_or(Error::Unauthenticated)
    }

    pub fn whoami(&self, tok: Option<&AuthToken>) -> Result<User, Error> {
        self.resolve(tok).cloned()
    }

    /// Stores a post directly, bypassing authentication
    pub fn test_insert_post(&mut self, p: NewPost) -> Post {
        let id = PostId(self.fresh_id());
        let post = stored_post(id, p, None);
        self.posts.insert(id, post.clone());
        post
    }

    /// Stores a comment directly, keeping its id
    pub fn test_insert_comment(&mut self, c: Comment) {
        self.next_id = self.next_id.max(c.id.0);
        self.comments.insert(c.id, c);
    }

    pub fn test_post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn test_num_posts(&self) -> usize {
        self.posts.len()
    }

    pub fn test_comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id)
    }

    pub fn test_uploads(&self) -> &[(String, Vec<u8>)] {
        &self.uploads
    }

    pub fn test_notifications_for(&self, user: UserId) -> Vec<Notification> {
        self.notifications
            .values()
            .filter(|n| n.recipient_id == Some(user))
            .cloned()
            .collect()
    }

    pub fn list_posts(&self, page: i64, size: i64) -> Page<Post> {
        let all = self.posts.values().rev().collect::<Vec<_>>();
        let size = size.max(1);
        let records = all
            .iter()
            .skip(usize::try_from((page.max(1) - 1) * size).unwrap_or(0))
            .take(usize::try_from(size).unwrap_or(0))
            .map(|p| (*p).clone())
            .collect();
        Page::new(records, all.len() as i64, page.max(1), size)
    }

    pub fn get_post(&self, id: PostId) -> Result<Post, Error> {
        self.posts.get(&id).cloned().ok_or(Error::NotFound)
    }

    pub fn create_post(&mut self, tok: Option<&AuthToken>, p: NewPost) -> Result<Post, Error> {
        let user = self.resolve(tok)?;
        if !user.is_admin() {
            return Err(Error::PermissionDenied);
        }
        let author = user.id;
        p.validate()?;
        self.check_failure()?;
        let id = PostId(self.fresh_id());
        let post = stored_post(id, p, None);
        self.posts.insert(id, post.clone());
        self.post_authors.insert(id, author);
        Ok(post)
    }

    pub fn update_post(
        &mut self,
        tok: Option<&AuthToken>,
        id: PostId,
        p: NewPost,
    ) -> Result<Post, Error> {
        let user = self.resolve(tok)?;
        if !user.is_admin() {
            return Err(Error::PermissionDenied);
        }
        p.validate()?;
        self.check_failure()?;
        let previous = self.posts.get(&id).ok_or(Error::NotFound)?;
        let post = stored_post(id, p, Some(previous));
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    pub fn publish_post(&mut self, tok: Option<&AuthToken>, id: PostId) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        if !user.is_admin() {
            return Err(Error::PermissionDenied);
        }
        self.check_failure()?;
        let post = self.posts.get_mut(&id).ok_or(Error::NotFound)?;
        post.published = true;
        post.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn delete_post(&mut self, tok: Option<&AuthToken>, id: PostId) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        if !user.is_admin() {
            return Err(Error::PermissionDenied);
        }
        self.check_failure()?;
        self.posts.remove(&id).ok_or(Error::NotFound)?;
        self.post_authors.remove(&id);
        self.comments.retain(|_, c| c.post_id != Some(id));
        Ok(())
    }

    pub fn upload(
        &mut self,
        tok: Option<&AuthToken>,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, Error> {
        self.resolve(tok)?;
        self.check_failure()?;
        let reference = format!("/uploads/{}-{}", self.fresh_id(), file_name);
        self.uploads.push((reference.clone(), bytes));
        Ok(reference)
    }

    pub fn list_comments(
        &self,
        tok: Option<&AuthToken>,
        post: PostId,
        page: i64,
        size: i64,
    ) -> Result<Page<Comment>, Error> {
        let viewer = self.resolve(tok).ok().map(|u| u.id);
        let all = self
            .comments
            .values()
            .filter(|c| c.post_id == Some(post))
            .collect::<Vec<_>>();
        let size = size.max(1);
        let records = all
            .iter()
            .skip(usize::try_from((page.max(1) - 1) * size).unwrap_or(0))
            .take(usize::try_from(size).unwrap_or(0))
            .map(|c| {
                let mut c = (*c).clone();
                c.is_liked = viewer.map_or(false, |v| self.likes.contains(&(c.id, v)));
                c
            })
            .collect();
        Ok(Page::new(records, all.len() as i64, page.max(1), size))
    }

    pub fn create_comment(
        &mut self,
        tok: Option<&AuthToken>,
        post: PostId,
        c: NewComment,
    ) -> Result<Comment, Error> {
        let user = self.resolve(tok)?.clone();
        c.validate()?;
        if !self.posts.contains_key(&post) {
            return Err(Error::NotFound);
        }
        if let Some(parent) = c.parent_id {
            match self.comments.get(&parent) {
                Some(p) if p.post_id == Some(post) => (),
                _ => return Err(Error::NotFound),
            }
        }
        self.check_failure()?;
        let comment = Comment {
            id: CommentId(self.fresh_id()),
            post_id: Some(post),
            user_id: Some(user.id),
            author_name: user.name().to_string(),
            content: c.content,
            parent_id: c.parent_id,
            created_at: Some(Utc::now()),
            like_count: 0,
            is_liked: false,
        };
        self.comments.insert(comment.id, comment.clone());
        self.notify_comment(&user, &comment);
        Ok(comment)
    }

    /// A reply notifies the parent's author, a top-level comment the post's
    /// author; nobody is notified of their own comments
    fn notify_comment(&mut self, sender: &User, comment: &Comment) {
        let quote = quote_comment(&comment.content);
        let (recipient, kind, content) = match comment.parent_id {
            Some(parent) => {
                let recipient = self.comments.get(&parent).and_then(|p| p.user_id);
                let content = format!("Someone replied to your comment: \"{quote}\"");
                (recipient, NotificationType::ReplyToComment, content)
            }
            None => {
                let post = comment.post_id.and_then(|p| self.posts.get(&p));
                let recipient = comment.post_id.and_then(|p| self.post_authors.get(&p).copied());
                let title = post.map_or("", |p| &p.title);
                let content = format!("Someone commented on your post \"{title}\": \"{quote}\"");
                (recipient, NotificationType::CommentOnPost, content)
            }
        };
        let recipient = match recipient {
            Some(r) if r != sender.id => r,
            _ => return,
        };
        let id = NotificationId(self.fresh_id());
        let notification = Notification {
            id,
            recipient_id: Some(recipient),
            kind,
            content,
            related_post_id: comment.post_id,
            related_comment_id: Some(comment.id),
            sender_id: Some(sender.id),
            sender_name: Some(sender.name().to_string()),
            sender_avatar: sender.avatar_url.clone(),
            is_read: false,
            created_at: Some(Utc::now()),
        };
        self.notifications.insert(id, notification);
    }

    pub fn unread_notifications(&self, tok: Option<&AuthToken>) -> Result<i64, Error> {
        let user = self.resolve(tok)?.id;
        Ok(self
            .notifications
            .values()
            .filter(|n| n.recipient_id == Some(user) && !n.is_read)
            .count() as i64)
    }

    /// Newest first
    pub fn list_notifications(
        &self,
        tok: Option<&AuthToken>,
        page: i64,
        size: i64,
    ) -> Result<Page<Notification>, Error> {
        let user = self.resolve(tok)?.id;
        let all = self
            .notifications
            .values()
            .rev()
            .filter(|n| n.recipient_id == Some(user))
            .collect::<Vec<_>>();
        let size = size.max(1);
        let records = all
            .iter()
            .skip(usize::try_from((page.max(1) - 1) * size).unwrap_or(0))
            .take(usize::try_from(size).unwrap_or(0))
            .map(|n| (*n).clone())
            .collect();
        Ok(Page::new(records, all.len() as i64, page.max(1), size))
    }

    pub fn mark_notification_read(
        &mut self,
        tok: Option<&AuthToken>,
        id: NotificationId,
    ) -> Result<(), Error> {
        let user = self.resolve(tok)?.id;
        self.check_failure()?;
        match self.notifications.get_mut(&id) {
            Some(n) if n.recipient_id == Some(user) => {
                n.is_read = true;
                Ok(())
            }
            Some(_) => Err(Error::PermissionDenied),
            None => Err(Error::NotFound),
        }
    }

    pub fn mark_all_notifications_read(&mut self, tok: Option<&AuthToken>) -> Result<(), Error> {
        let user = self.resolve(tok)?.id;
        self.check_failure()?;
        self.notifications
            .values_mut()
            .filter(|n| n.recipient_id == Some(user))
            .for_each(|n| n.is_read = true);
        Ok(())
    }

    /// Only removes the comment itself: its replies stay, orphaned
    pub fn delete_comment(&mut self, tok: Option<&AuthToken>, id: CommentId) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        let comment = self.comments.get(&id).ok_or(Error::NotFound)?;
        if !user.is_admin() && comment.user_id != Some(user.id) {
            return Err(Error::PermissionDenied);
        }
        self.check_failure()?;
        self.comments.remove(&id);
        self.likes.retain(|(c, _)| *c != id);
        Ok(())
    }

    pub fn like_comment(&mut self, tok: Option<&AuthToken>, id: CommentId) -> Result<(), Error> {
        let user = self.resolve(tok)?.id;
        if !self.comments.contains_key(&id) {
            return Err(Error::NotFound);
        }
        self.check_failure()?;
        let liked = match self.likes.remove(&(id, user)) {
            true => false,
            false => self.likes.insert((id, user)),
        };
        if let Some(c) = self.comments.get_mut(&id) {
            c.like_count = match liked {
                true => c.like_count + 1,
                false => (c.like_count - 1).max(0),
            };
        }
        Ok(())
    }
}

fn stored_post(id: PostId, p: NewPost, previous: Option<&Post>) -> Post {
    let now = Utc::now();
    Post {
        id,
        slug: match p.slug.is_empty() {
            true => slugify(&p.title),
            false => p.slug,
        },
        title: p.title,
        content: p.content,
        summary: Some(p.summary),
        category: Some(p.category),
        tags: p.tags,
        cover_file_path: p.cover_file_path,
        published: previous.map_or(false, |p| p.published),
        view_count: previous.map_or(0, |p| p.view_count),
        created_at: Some(previous.and_then(|p| p.created_at).unwrap_or(now)),
        updated_at: Some(now),
    }
}

/// `BlogApi` backed by a shared `MockServer`, as one logged-in (or anonymous)
/// browser would see it
#[derive(Clone, Debug)]
pub struct MockClient {
    server: Arc<Mutex<MockServer>>,
    token: Option<AuthToken>,
}

impl MockClient {
    pub fn new(server: Arc<Mutex<MockServer>>) -> MockClient {
        MockClient {
            server,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<AuthToken>) -> MockClient {
        self.token = token;
        self
    }

    /// Creates user `name` with password `password` and logs it in
    ///
    /// Panics if the user already exists
    pub fn test_logged_in(server: &Arc<Mutex<MockServer>>, name: &str, role: Role) -> MockClient {
        let mut s = server.lock();
        let new_user = NewUser {
            username: name.to_string(),
            password: String::from("password"),
            email: String::new(),
        };
        s.admin_create_user(new_user, role)
            .unwrap_or_else(|e| panic!("creating test user {name}: {e}"));
        let session = s
            .auth(&NewSession::new(name.to_string(), String::from("password")))
            .unwrap_or_else(|e| panic!("logging in test user {name}: {e}"));
        MockClient::new(server.clone()).with_token(Some(session.token))
    }

    /// Panics if this client is not logged in
    pub fn test_user(&self) -> User {
        self.server
            .lock()
            .whoami(self.token.as_ref())
            .expect("test client is not logged in")
    }

    pub fn server(&self) -> &Arc<Mutex<MockServer>> {
        &self.server
    }

    fn log<T>(call: &str, res: Result<T, Error>) -> Result<T, Error> {
        if let Err(e) = &res {
            tracing::debug!(call, error = ?e, "mock server rejected call");
        }
        res
    }
}

#[async_trait::async_trait(?Send)]
impl BlogApi for MockClient {
    async fn login(&self, session: &NewSession) -> Result<Session, Error> {
        MockClient::log("login", self.server.lock().auth(session))
    }

    async fn register(&self, user: &NewUser) -> Result<Session, Error> {
        let mut server = self.server.lock();
        server.admin_create_user(user.clone(), Role::User)?;
        server.auth(&NewSession::new(user.username.clone(), user.password.clone()))
    }

    async fn profile(&self) -> Result<User, Error> {
        self.server.lock().whoami(self.token.as_ref())
    }

    async fn logout(&self) -> Result<(), Error> {
        match &self.token {
            Some(t) => self.server.lock().unauth(t),
            None => Ok(()),
        }
    }

    async fn list_posts(&self, page: i64, size: i64) -> Result<Page<Post>, Error> {
        Ok(self.server.lock().list_posts(page, size))
    }

    async fn get_post(&self, id: PostId) -> Result<Post, Error> {
        self.server.lock().get_post(id)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, Error> {
        let res = self.server.lock().create_post(self.token.as_ref(), post.clone());
        MockClient::log("create_post", res)
    }

    async fn update_post(&self, id: PostId, post: &NewPost) -> Result<Post, Error> {
        let res = self
            .server
            .lock()
            .update_post(self.token.as_ref(), id, post.clone());
        MockClient::log("update_post", res)
    }

    async fn publish_post(&self, id: PostId) -> Result<(), Error> {
        let res = self.server.lock().publish_post(self.token.as_ref(), id);
        MockClient::log("publish_post", res)
    }

    async fn delete_post(&self, id: PostId) -> Result<(), Error> {
        let res = self.server.lock().delete_post(self.token.as_ref(), id);
        MockClient::log("delete_post", res)
    }

    async fn upload_cover(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, Error> {
        let res = self
            .server
            .lock()
            .upload(self.token.as_ref(), file_name, bytes);
        MockClient::log("upload_cover", res)
    }

    async fn list_comments(
        &self,
        post: PostId,
        page: i64,
        size: i64,
    ) -> Result<Page<Comment>, Error> {
        self.server
            .lock()
            .list_comments(self.token.as_ref(), post, page, size)
    }

    async fn create_comment(&self, post: PostId, comment: &NewComment) -> Result<Comment, Error> {
        let res = self
            .server
            .lock()
            .create_comment(self.token.as_ref(), post, comment.clone());
        MockClient::log("create_comment", res)
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        let res = self.server.lock().delete_comment(self.token.as_ref(), id);
        MockClient::log("delete_comment", res)
    }

    async fn like_comment(&self, id: CommentId) -> Result<(), Error> {
        let res = self.server.lock().like_comment(self.token.as_ref(), id);
        MockClient::log("like_comment", res)
    }

    async fn unread_notifications(&self) -> Result<i64, Error> {
        self.server.lock().unread_notifications(self.token.as_ref())
    }

    async fn list_notifications(&self, page: i64, size: i64) -> Result<Page<Notification>, Error> {
        self.server
            .lock()
            .list_notifications(self.token.as_ref(), page, size)
    }

    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), Error> {
        let res = self
            .server
            .lock()
            .mark_notification_read(self.token.as_ref(), id);
        MockClient::log("mark_notification_read", res)
    }

    async fn mark_all_notifications_read(&self) -> Result<(), Error> {
        let res = self
            .server
            .lock()
            .mark_all_notifications_read(self.token.as_ref());
        MockClient::log("mark_all_notifications_read", res)
    }
}
