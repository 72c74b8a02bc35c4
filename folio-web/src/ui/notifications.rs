use folio_client::{
    api::{Error, Notification, NotificationId, Page, PostId},
    BlogApi, NotificationCenter, NOTIFICATION_PAGE_SIZE,
};
use yew::prelude::*;

use crate::{util, Backend};

#[derive(Clone, PartialEq, Properties)]
pub struct NotificationsProps {
    pub backend: Backend,
    pub on_open: Callback<PostId>,
    /// Called whenever the unread count changes here
    pub on_unread: Callback<i64>,
}

pub enum NotificationsMsg {
    Load(i64),
    Loaded(Result<Page<Notification>, Error>),
    UnreadLoaded(Result<i64, Error>),
    Open(NotificationId),
    MarkedRead(NotificationId, Result<(), Error>),
    MarkAllClicked,
    MarkedAllRead(Result<(), Error>),
}

pub struct NotificationsView {
    center: NotificationCenter,
}

impl NotificationsView {
    fn load(&mut self, ctx: &Context<Self>, page: i64) {
        if !self.center.begin_load(page) {
            return;
        }
        let api = ctx.props().backend.api();
        ctx.link().send_future(async move {
            NotificationsMsg::Loaded(api.list_notifications(page, NOTIFICATION_PAGE_SIZE).await)
        });
    }
}

impl Component for NotificationsView {
    type Message = NotificationsMsg;
    type Properties = NotificationsProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut this = Self {
            center: NotificationCenter::new(),
        };
        this.load(ctx, 1);
        let api = ctx.props().backend.api();
        ctx.link().send_future(async move {
            NotificationsMsg::UnreadLoaded(api.unread_notifications().await)
        });
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let api = ctx.props().backend.api();
        let unread = self.center.unread();
        match msg {
            NotificationsMsg::Load(page) => self.load(ctx, page),
            NotificationsMsg::Loaded(res) => self.center.finish_load(res),
            NotificationsMsg::UnreadLoaded(res) => self.center.finish_unread(res),
            NotificationsMsg::Open(id) => {
                let post = self
                    .center
                    .notifications()
                    .iter()
                    .find(|n| n.id == id)
                    .and_then(|n| n.related_post_id);
                if let Some(id) = self.center.begin_mark_read(id) {
                    ctx.link().send_future(async move {
                        NotificationsMsg::MarkedRead(id, api.mark_notification_read(id).await)
                    });
                }
                if let Some(post) = post {
                    ctx.props().on_open.emit(post);
                }
            }
            NotificationsMsg::MarkedRead(id, res) => self.center.finish_mark_read(id, res),
            NotificationsMsg::MarkAllClicked => {
                ctx.link().send_future(async move {
                    NotificationsMsg::MarkedAllRead(api.mark_all_notifications_read().await)
                });
                return false;
            }
            NotificationsMsg::MarkedAllRead(res) => self.center.finish_mark_all_read(res),
        }
        if self.center.unread() != unread {
            ctx.props().on_unread.emit(self.center.unread());
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let next = self.center.next_page();
        html! {
            <section class="notifications my-4">
                <div class="d-flex align-items-center mb-3">
                    <h2>{ "Notifications" }</h2>
                    <button
                        type="button"
                        class="btn btn-sm btn-outline-secondary ms-auto"
                        disabled={ self.center.unread() == 0 }
                        onclick={ link.callback(|_| NotificationsMsg::MarkAllClicked) }
                    >
                        { "Mark all as read" }
                    </button>
                </div>
                { for self.center.notice().map(|n| html! {
                    <div class="alert alert-danger" role="alert">{ n }</div>
                }) }
                { match self.center.notifications().is_empty() && !self.center.is_loading() {
                    true => html! { <p class="text-muted">{ "No notifications" }</p> },
                    false => html! {
                        <ul class="list-group">
                            { for self.center.notifications().iter().map(|n| {
                                let id = n.id;
                                html! {
                                    <li
                                        key={ id.0.to_string() }
                                        class={ classes!("list-group-item", (!n.is_read).then(|| "unread")) }
                                        onclick={ link.callback(move |_| NotificationsMsg::Open(id)) }
                                    >
                                        <strong>{ n.sender_display() }</strong>
                                        { format!(" {}", n.action()) }
                                        <p class="mb-1">{ &n.content }</p>
                                        <small class="text-muted">{ util::format_time(n.created_at) }</small>
                                    </li>
                                }
                            }) }
                        </ul>
                    },
                } }
                { for self.center.has_more().then(|| html! {
                    <button
                        type="button"
                        class="btn btn-link"
                        disabled={ self.center.is_loading() }
                        onclick={ link.callback(move |_| NotificationsMsg::Load(next)) }
                    >
                        { "Load more" }
                    </button>
                }) }
            </section>
        }
    }
}
