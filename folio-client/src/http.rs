use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::{
    api::{
        decode_body, AuthToken, Comment, CommentId, Error, Listing, NewComment, NewPost,
        NewSession, NewUser, Notification, NotificationId, Page, Post, PostId, Session, User,
        GITHUB_LOGIN_PATH,
    },
    BlogApi,
};

/// `BlogApi` talking to the REST backend at `host`
#[derive(Clone, Debug)]
pub struct HttpApi {
    host: String,
    token: Option<AuthToken>,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(host: impl Into<String>) -> HttpApi {
        HttpApi {
            host: host.into().trim_end_matches('/').to_string(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: Option<AuthToken>) -> HttpApi {
        self.token = token;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}/api{}", self.host, path));
        match &self.token {
            Some(t) => req.bearer_auth(&t.0),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, Error> {
        let resp = req.send().await.map_err(|e| {
            tracing::error!(error = ?e, "request failed");
            Error::Network(e.to_string())
        })?;
        let status = resp.status();
        let url = resp.url().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        if !status.is_success() {
            let err = Error::from_response(status.as_u16(), &body);
            tracing::error!(%url, %status, error = ?err, "server rejected request");
            return Err(err);
        }
        decode_body(&body).map_err(|e| {
            if !matches!(e, Error::Server { .. }) {
                tracing::error!(%url, error = ?e, "failed to decode response");
            }
            e
        })
    }
}

/// URL the browser is sent to for logging in with GitHub
pub fn github_login_url(host: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), GITHUB_LOGIN_PATH)
}

/// Extracts the session from the URL the OAuth2 flow redirects back to,
/// which carries `token` and a JSON-encoded `user` in its query string
pub fn parse_oauth_callback(url: &str) -> Result<Session, Error> {
    let url = Url::parse(url).map_err(|e| Error::MalformedResponse(e.to_string()))?;
    let mut token = None;
    let mut user = None;
    for (k, v) in url.query_pairs() {
        match &*k {
            "token" if !v.is_empty() => token = Some(AuthToken(v.into_owned())),
            "user" => {
                user = Some(
                    serde_json::from_str::<User>(&v)
                        .map_err(|e| Error::MalformedResponse(format!("bad user: {e}")))?,
                )
            }
            "error" => {
                return Err(Error::Server {
                    status: 401,
                    message: v.into_owned(),
                })
            }
            _ => (),
        }
    }
    match token {
        Some(token) => Ok(Session { token, user }),
        None => Err(Error::Unauthenticated),
    }
}

fn cover_reference(v: serde_json::Value) -> Result<String, Error> {
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Object(o) => ["url", "filePath", "path"]
            .into_iter()
            .find_map(|k| o.get(k)?.as_str().map(String::from))
            .ok_or_else(|| Error::MalformedResponse(String::from("upload answer has no url"))),
        _ => Err(Error::MalformedResponse(String::from(
            "upload answer is neither a string nor an object",
        ))),
    }
}

#[async_trait::async_trait(?Send)]
impl BlogApi for HttpApi {
    async fn login(&self, session: &NewSession) -> Result<Session, Error> {
        self.send(self.request(Method::POST, "/login").json(session))
            .await
    }

    async fn register(&self, user: &NewUser) -> Result<Session, Error> {
        self.send(self.request(Method::POST, "/register").json(user))
            .await
    }

    async fn profile(&self) -> Result<User, Error> {
        self.send(self.request(Method::GET, "/user/profile")).await
    }

    async fn logout(&self) -> Result<(), Error> {
        self.send::<serde_json::Value>(self.request(Method::POST, "/logout"))
            .await
            .map(|_| ())
    }

    async fn list_posts(&self, page: i64, size: i64) -> Result<Page<Post>, Error> {
        let req = self
            .request(Method::GET, "/blog/posts")
            .query(&[("page", page), ("size", size)]);
        Ok(self.send::<Listing<Post>>(req).await?.into_page(page, size))
    }

    async fn get_post(&self, id: PostId) -> Result<Post, Error> {
        self.send(self.request(Method::GET, &format!("/blog/posts/{id}")))
            .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, Error> {
        self.send(self.request(Method::POST, "/blog/posts").json(post))
            .await
    }

    async fn update_post(&self, id: PostId, post: &NewPost) -> Result<Post, Error> {
        self.send(
            self.request(Method::PUT, &format!("/blog/posts/{id}"))
                .json(post),
        )
        .await
    }

    async fn publish_post(&self, id: PostId) -> Result<(), Error> {
        self.send::<serde_json::Value>(
            self.request(Method::PUT, &format!("/blog/posts/{id}/publish")),
        )
        .await
        .map(|_| ())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), Error> {
        self.send::<serde_json::Value>(self.request(Method::DELETE, &format!("/blog/posts/{id}")))
            .await
            .map(|_| ())
    }

    async fn upload_cover(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, Error> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let res = self
            .send(self.request(Method::POST, "/files/upload").multipart(form))
            .await?;
        cover_reference(res)
    }

    async fn list_comments(
        &self,
        post: PostId,
        page: i64,
        size: i64,
    ) -> Result<Page<Comment>, Error> {
        let req = self
            .request(Method::GET, &format!("/blog/posts/{post}/comments"))
            .query(&[("page", page), ("size", size)]);
        Ok(self
            .send::<Listing<Comment>>(req)
            .await?
            .into_page(page, size))
    }

    async fn create_comment(&self, post: PostId, comment: &NewComment) -> Result<Comment, Error> {
        self.send(
            self.request(Method::POST, &format!("/blog/posts/{post}/comments"))
                .json(comment),
        )
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        self.send::<serde_json::Value>(self.request(Method::DELETE, &format!("/comments/{}", id.0)))
            .await
            .map(|_| ())
    }

    async fn like_comment(&self, id: CommentId) -> Result<(), Error> {
        self.send::<serde_json::Value>(
            self.request(Method::POST, &format!("/comments/{}/like", id.0)),
        )
        .await
        .map(|_| ())
    }

    async fn unread_notifications(&self) -> Result<i64, Error> {
        self.send(self.request(Method::GET, "/notifications/unread-count"))
            .await
    }

    async fn list_notifications(&self, page: i64, size: i64) -> Result<Page<Notification>, Error> {
        let req = self
            .request(Method::GET, "/notifications")
            .query(&[("page", page), ("size", size)]);
        Ok(self
            .send::<Listing<Notification>>(req)
            .await?
            .into_page(page, size))
    }

    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), Error> {
        self.send::<serde_json::Value>(
            self.request(Method::PUT, &format!("/notifications/{}/read", id.0)),
        )
        .await
        .map(|_| ())
    }

    async fn mark_all_notifications_read(&self) -> Result<(), Error> {
        self.send::<serde_json::Value>(self.request(Method::PUT, "/notifications/read-all"))
            .await
            .map(|_| ())
    }
}
