use folio_client::{
    api::{self, AuthToken, NewSession, NewUser, Post, PostId, User},
    checked_session,
    http::parse_oauth_callback,
    schedule::{cancellable, run_every, Canceller},
    BlogApi, ConfirmDialog, EditorConfig, KeyValueStore, SESSION_KEY, SETTINGS_KEY,
    UNREAD_POLL_INTERVAL,
};
use yew::prelude::*;

use crate::{storage::BrowserStore, ui, util, Backend};

const POSTS_PER_PAGE: i64 = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Page {
    Posts,
    Post(PostId),
    NewArticle,
    EditArticle(PostId),
    Login,
    Register,
    Notifications,
}

pub enum AppMsg {
    Navigate(Page),
    LoginSubmitted(String, NewSession),
    RegisterSubmitted(String, NewUser),
    LoggedIn(String, Result<api::Session, api::Error>),
    SessionChecked(AuthToken, Result<User, api::Error>),
    Logout,
    PollUnread,
    UnreadLoaded(Result<i64, api::Error>),
    UnreadChanged(i64),
    LoadPosts(i64),
    PostsLoaded(Result<api::Page<Post>, api::Error>),
    PostLoaded(Result<Post, api::Error>),
    ConfigChanged(EditorConfig),
    DeletePostClicked(PostId),
    DeletePostConfirmed,
    DeletePostCancelled,
    PostDeleted(PostId, Result<(), api::Error>),
}

pub struct App {
    backend: Backend,
    page: Page,
    posts: Option<api::Page<Post>>,
    current: Option<Post>,
    config: EditorConfig,
    login_error: Option<String>,
    notice: Option<String>,
    unread: i64,
    unread_poll: Option<Canceller>,
    pending_delete: Option<ConfirmDialog<PostId>>,
}

impl App {
    fn load_posts(&self, ctx: &Context<Self>, page: i64) {
        let api = self.backend.api();
        ctx.link().send_future(async move {
            AppMsg::PostsLoaded(api.list_posts(page, POSTS_PER_PAGE).await)
        });
    }

    /// Keeps the unread badge fresh while someone is logged in
    fn start_unread_poll(&mut self, ctx: &Context<Self>) {
        if self.backend.session.is_none() {
            self.unread_poll = None;
            return;
        }
        let (canceller, cancellation) = cancellable();
        let link = ctx.link().clone();
        wasm_bindgen_futures::spawn_local(run_every(
            UNREAD_POLL_INTERVAL,
            util::sleep,
            cancellation,
            move || link.send_message(AppMsg::PollUnread),
        ));
        self.unread_poll = Some(canceller);
        ctx.link().send_message(AppMsg::PollUnread);
    }

    /// The stored session is used right away, and dropped later if the
    /// server no longer accepts its token
    fn check_session(&self, ctx: &Context<Self>) {
        let Some(session) = &self.backend.session else {
            return;
        };
        let token = session.token.clone();
        let api = self.backend.api();
        ctx.link().send_future(async move {
            let res = api.profile().await;
            AppMsg::SessionChecked(token, res)
        });
    }

    fn save_backend(&self) {
        if let Err(e) = BrowserStore.set_json(SESSION_KEY, &self.backend) {
            tracing::warn!(error = %e, "failed saving session to local storage");
        }
    }
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut backend = BrowserStore
            .get_json::<Backend>(SESSION_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable saved session");
                None
            })
            .unwrap_or_else(|| Backend {
                host: util::origin(),
                session: None,
            });

        // coming back from the GitHub login
        if let Some(url) = util::current_url().filter(|u| u.contains("token=")) {
            match parse_oauth_callback(&url) {
                Ok(session) => {
                    tracing::info!("logged in through OAuth2");
                    backend.session = Some(session);
                }
                Err(e) => tracing::error!(error = ?e, "failed to parse OAuth2 callback"),
            }
            util::reset_url();
        }

        let config = BrowserStore
            .get_json::<EditorConfig>(SETTINGS_KEY)
            .ok()
            .flatten()
            .unwrap_or_default();

        let mut this = App {
            backend,
            page: Page::Posts,
            posts: None,
            current: None,
            config,
            login_error: None,
            notice: None,
            unread: 0,
            unread_poll: None,
            pending_delete: None,
        };
        this.save_backend();
        this.check_session(ctx);
        this.start_unread_poll(ctx);
        this.load_posts(ctx, 1);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Navigate(page) => {
                match page {
                    Page::Posts => {
                        self.load_posts(ctx, self.posts.as_ref().map_or(1, |p| p.page))
                    }
                    Page::Post(id) => {
                        self.current = None;
                        let api = self.backend.api();
                        ctx.link()
                            .send_future(async move { AppMsg::PostLoaded(api.get_post(id).await) });
                    }
                    Page::Login | Page::Register => self.login_error = None,
                    _ => (),
                }
                self.page = page;
            }
            AppMsg::LoginSubmitted(host, session) => {
                if let Err(e) = session.validate() {
                    self.login_error = Some(e.to_string());
                    return true;
                }
                let api = folio_client::HttpApi::new(host.clone());
                ctx.link().send_future(async move {
                    let res = api.login(&session).await;
                    AppMsg::LoggedIn(host, res)
                });
                return false;
            }
            AppMsg::RegisterSubmitted(host, user) => {
                let api = folio_client::HttpApi::new(host.clone());
                ctx.link().send_future(async move {
                    let res = api.register(&user).await;
                    AppMsg::LoggedIn(host, res)
                });
                return false;
            }
            AppMsg::LoggedIn(host, Ok(session)) => {
                self.backend = Backend {
                    host,
                    session: Some(session),
                };
                self.save_backend();
                self.login_error = None;
                self.page = Page::Posts;
                self.start_unread_poll(ctx);
                self.load_posts(ctx, 1);
            }
            AppMsg::LoggedIn(_, Err(e)) => {
                tracing::error!(error = ?e, "login failed");
                self.login_error = Some(e.user_message("Login failed"));
            }
            AppMsg::SessionChecked(token, res) => {
                let Some(session) = self.backend.session.take() else {
                    return false;
                };
                if session.token != token {
                    // logged in again since the check started
                    self.backend.session = Some(session);
                    return false;
                }
                self.backend.session = checked_session(session, res);
                self.save_backend();
                if self.backend.session.is_none() {
                    self.unread_poll = None;
                    self.unread = 0;
                    if matches!(self.page, Page::NewArticle | Page::EditArticle(_) | Page::Notifications) {
                        self.page = Page::Posts;
                    }
                }
            }
            AppMsg::Logout => {
                let api = self.backend.api();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = api.logout().await {
                        tracing::warn!(error = ?e, "server-side logout failed");
                    }
                });
                self.backend.session = None;
                self.save_backend();
                self.unread_poll = None;
                self.unread = 0;
                if matches!(self.page, Page::NewArticle | Page::EditArticle(_) | Page::Notifications) {
                    self.page = Page::Posts;
                }
            }
            AppMsg::PollUnread => {
                let api = self.backend.api();
                ctx.link().send_future(async move {
                    AppMsg::UnreadLoaded(api.unread_notifications().await)
                });
                return false;
            }
            AppMsg::UnreadLoaded(Ok(n)) | AppMsg::UnreadChanged(n) => {
                if self.unread == n {
                    return false;
                }
                self.unread = n;
            }
            AppMsg::UnreadLoaded(Err(e)) => {
                tracing::debug!(error = ?e, "failed to poll unread notifications");
                return false;
            }
            AppMsg::LoadPosts(page) => {
                self.load_posts(ctx, page);
                return false;
            }
            AppMsg::PostsLoaded(Ok(posts)) => {
                self.posts = Some(posts);
                self.notice = None;
            }
            AppMsg::PostsLoaded(Err(e)) => {
                tracing::error!(error = ?e, "failed to load posts");
                self.notice = Some(e.user_message("Failed to load posts"));
            }
            AppMsg::PostLoaded(Ok(post)) => {
                self.current = Some(post);
                self.notice = None;
            }
            AppMsg::PostLoaded(Err(e)) => {
                tracing::error!(error = ?e, "failed to load post");
                self.notice = Some(e.user_message("Failed to load post"));
            }
            AppMsg::ConfigChanged(config) => {
                if let Err(e) = BrowserStore.set_json(SETTINGS_KEY, &config) {
                    tracing::warn!(error = %e, "failed saving settings");
                }
                self.config = config;
            }
            AppMsg::DeletePostClicked(id) => {
                self.pending_delete = Some(ConfirmDialog::delete_post(id));
            }
            AppMsg::DeletePostCancelled => self.pending_delete = None,
            AppMsg::DeletePostConfirmed => {
                let Some(dialog) = self.pending_delete.take() else {
                    return false;
                };
                let id = dialog.target;
                let api = self.backend.api();
                ctx.link().send_future(async move {
                    AppMsg::PostDeleted(id, api.delete_post(id).await)
                });
            }
            AppMsg::PostDeleted(id, Ok(())) => {
                tracing::info!(post = %id, "deleted post");
                if self.current.as_ref().map_or(false, |p| p.id == id) {
                    self.current = None;
                }
                self.notice = None;
                self.page = Page::Posts;
                self.load_posts(ctx, self.posts.as_ref().map_or(1, |p| p.page));
            }
            AppMsg::PostDeleted(id, Err(e)) => {
                tracing::error!(post = %id, error = ?e, "failed to delete post");
                self.notice = Some(e.user_message("Failed to delete article"));
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let viewer = self.backend.viewer();
        let is_admin = viewer.as_ref().map_or(false, |u| u.is_admin());
        let body = match self.page {
            Page::Login => html! {
                <ui::Login
                    host={ self.backend.host.clone() }
                    error={ self.login_error.clone() }
                    on_submit={ link.callback(|(host, s): (String, NewSession)| AppMsg::LoginSubmitted(host, s)) }
                />
            },
            Page::Register => html! {
                <ui::Register
                    host={ self.backend.host.clone() }
                    error={ self.login_error.clone() }
                    on_submit={ link.callback(|(host, u): (String, NewUser)| AppMsg::RegisterSubmitted(host, u)) }
                />
            },
            Page::Notifications if viewer.is_none() => html! {
                <div class="alert alert-warning">{ "Log in to see your notifications" }</div>
            },
            Page::Notifications => html! {
                <ui::NotificationsView
                    backend={ self.backend.clone() }
                    on_open={ link.callback(|id| AppMsg::Navigate(Page::Post(id))) }
                    on_unread={ link.callback(AppMsg::UnreadChanged) }
                />
            },
            Page::Posts => html! {
                <ui::PostList
                    posts={ self.posts.clone() }
                    on_open={ link.callback(|id| AppMsg::Navigate(Page::Post(id))) }
                    on_page={ link.callback(AppMsg::LoadPosts) }
                />
            },
            Page::Post(id) => {
                html! {<>
                    { for self.current.as_ref().filter(|p| p.id == id).map(|p| html! {
                        <article class="post">
                            <h1>{ &p.title }</h1>
                            <div class="post-meta">{ util::format_time(p.created_at) }</div>
                            <div class="markdown-body">
                                { Html::from_html_unchecked(
                                    folio_client::markdown::render_preview(&p.content).into()
                                ) }
                            </div>
                        </article>
                    }) }
                    { for is_admin.then(|| html! {<>
                        <button
                            class="btn btn-outline-secondary"
                            onclick={ link.callback(move |_| AppMsg::Navigate(Page::EditArticle(id))) }
                        >
                            { "Edit" }
                        </button>
                        <button
                            class="btn btn-outline-danger ms-2"
                            onclick={ link.callback(move |_| AppMsg::DeletePostClicked(id)) }
                        >
                            { "Delete" }
                        </button>
                    </>}) }
                    <ui::CommentSectionView
                        key={ id.to_string() }
                        post={ id }
                        backend={ self.backend.clone() }
                    />
                </>}
            }
            Page::NewArticle | Page::EditArticle(_) if !is_admin => html! {
                <div class="alert alert-warning">{ "Only administrators can write articles" }</div>
            },
            Page::NewArticle => html! {
                <ui::ArticleEditorView
                    key="new"
                    post={ None::<PostId> }
                    backend={ self.backend.clone() }
                    config={ self.config.clone() }
                    on_config={ link.callback(AppMsg::ConfigChanged) }
                    on_saved={ link.callback(|id| AppMsg::Navigate(Page::Post(id))) }
                />
            },
            Page::EditArticle(id) => html! {
                <ui::ArticleEditorView
                    key={ id.to_string() }
                    post={ Some(id) }
                    backend={ self.backend.clone() }
                    config={ self.config.clone() }
                    on_config={ link.callback(AppMsg::ConfigChanged) }
                    on_saved={ link.callback(|id| AppMsg::Navigate(Page::Post(id))) }
                />
            },
        };
        html! {
            <div class="container">
                <nav class="navbar">
                    <a class="navbar-brand" href="#" onclick={ link.callback(|_| AppMsg::Navigate(Page::Posts)) }>
                        { "Folio" }
                    </a>
                    { for is_admin.then(|| html! {
                        <button class="btn btn-primary" onclick={ link.callback(|_| AppMsg::Navigate(Page::NewArticle)) }>
                            { "New article" }
                        </button>
                    }) }
                    { match &viewer {
                        Some(u) => html! {<>
                            <button class="btn btn-link position-relative" onclick={ link.callback(|_| AppMsg::Navigate(Page::Notifications)) }>
                                { "Notifications" }
                                { for (self.unread > 0).then(|| html! {
                                    <span class="badge rounded-pill bg-danger ms-1">{ unread_badge(self.unread) }</span>
                                }) }
                            </button>
                            <span class="navbar-text">{ u.name() }</span>
                            <button class="btn btn-link" onclick={ link.callback(|_| AppMsg::Logout) }>
                                { "Logout" }
                            </button>
                        </>},
                        None => html! {<>
                            <button class="btn btn-link" onclick={ link.callback(|_| AppMsg::Navigate(Page::Login)) }>
                                { "Login" }
                            </button>
                            <button class="btn btn-link" onclick={ link.callback(|_| AppMsg::Navigate(Page::Register)) }>
                                { "Sign up" }
                            </button>
                        </>},
                    } }
                </nav>
                { for self.notice.as_ref().map(|n| html! {
                    <div class="alert alert-danger">{ n }</div>
                }) }
                { body }
                { for self.pending_delete.as_ref().map(|d| html! {
                    <ui::ConfirmDialogView<PostId>
                        dialog={ d.clone() }
                        on_confirm={ link.callback(|_| AppMsg::DeletePostConfirmed) }
                        on_cancel={ link.callback(|_| AppMsg::DeletePostCancelled) }
                    />
                }) }
            </div>
        }
    }
}

/// Badge text, capped so it stays small
fn unread_badge(n: i64) -> String {
    match n > 99 {
        true => String::from("99+"),
        false => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_caps_large_counts() {
        assert_eq!(unread_badge(3), "3");
        assert_eq!(unread_badge(120), "99+");
    }
}
