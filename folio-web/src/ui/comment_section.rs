use folio_client::{
    api::{Comment, CommentId, Error, Page, PostId},
    BlogApi, CommentSection, LikeRequest, COMMENT_PAGE_SIZE,
};
use yew::prelude::*;

use crate::{ui, Backend};

#[derive(Clone, PartialEq, Properties)]
pub struct CommentSectionProps {
    pub post: PostId,
    pub backend: Backend,
}

pub enum CommentSectionMsg {
    Load,
    Loaded(PostId, Result<Page<Comment>, Error>),
    InputChanged(String),
    SubmitClicked,
    Submitted(PostId, Result<Comment, Error>),
    ReplyClicked(CommentId),
    CancelReply,
    LikeClicked(CommentId),
    Liked(PostId, LikeRequest, Result<(), Error>),
    DeleteClicked(CommentId),
    DeleteConfirmed,
    DeleteCancelled,
    Deleted(PostId, CommentId, Result<(), Error>),
    DismissNotice,
}

impl CommentSectionMsg {
    /// Post a server response belongs to
    fn response_post(&self) -> Option<PostId> {
        match self {
            CommentSectionMsg::Loaded(post, _)
            | CommentSectionMsg::Submitted(post, _)
            | CommentSectionMsg::Liked(post, _, _)
            | CommentSectionMsg::Deleted(post, _, _) => Some(*post),
            _ => None,
        }
    }
}

/// Whether `msg` answers a request made for another post than the one shown
fn is_stale(section: &CommentSection, msg: &CommentSectionMsg) -> bool {
    msg.response_post()
        .map_or(false, |post| post != section.post())
}

pub struct CommentSectionView {
    section: CommentSection,
    input: String,
    input_error: Option<String>,
}

impl CommentSectionView {
    fn load(&mut self, ctx: &Context<Self>) {
        self.section.begin_load();
        let api = ctx.props().backend.api();
        let post = self.section.post();
        ctx.link().send_future(async move {
            CommentSectionMsg::Loaded(post, api.list_comments(post, 1, COMMENT_PAGE_SIZE).await)
        });
    }

    fn item(&self, ctx: &Context<Self>, comment: &Comment, reply_to_user: Option<&str>) -> Html {
        let link = ctx.link();
        html! {
            <ui::CommentItem
                key={ comment.id.0.to_string() }
                comment={ comment.clone() }
                reply_to_user={ reply_to_user.map(String::from) }
                can_like={ self.section.can_like() }
                can_delete={ self.section.can_delete(comment) }
                deleting={ self.section.deleting() == Some(comment.id) }
                on_reply={ link.callback(CommentSectionMsg::ReplyClicked) }
                on_like={ link.callback(CommentSectionMsg::LikeClicked) }
                on_delete={ link.callback(CommentSectionMsg::DeleteClicked) }
            />
        }
    }
}

impl Component for CommentSectionView {
    type Message = CommentSectionMsg;
    type Properties = CommentSectionProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut this = Self {
            section: CommentSection::new(ctx.props().post, ctx.props().backend.viewer()),
            input: String::new(),
            input_error: None,
        };
        this.load(ctx);
        this
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().post != old_props.post {
            self.section = CommentSection::new(ctx.props().post, ctx.props().backend.viewer());
            self.input.clear();
            self.input_error = None;
            self.load(ctx);
        } else if ctx.props().backend != old_props.backend {
            // like state depends on who asks
            self.section.set_viewer(ctx.props().backend.viewer());
            self.load(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        if is_stale(&self.section, &msg) {
            tracing::debug!(post = ?msg.response_post(), "dropping response for another post");
            return false;
        }
        let api = ctx.props().backend.api();
        let post = self.section.post();
        match msg {
            CommentSectionMsg::Load => self.load(ctx),
            CommentSectionMsg::Loaded(_, res) => self.section.finish_load(res),
            CommentSectionMsg::InputChanged(text) => {
                self.input = text;
                self.input_error = None;
            }
            CommentSectionMsg::SubmitClicked => match self.section.begin_submit(&self.input) {
                Ok(new) => ctx.link().send_future(async move {
                    CommentSectionMsg::Submitted(post, api.create_comment(post, &new).await)
                }),
                Err(Error::Busy) => return false,
                Err(e) => self.input_error = Some(e.to_string()),
            },
            CommentSectionMsg::Submitted(_, res) => {
                if self.section.finish_submit(res) {
                    self.input.clear();
                }
            }
            CommentSectionMsg::ReplyClicked(id) => {
                if let Err(e) = self.section.start_reply(id) {
                    self.input_error = Some(e.to_string());
                }
            }
            CommentSectionMsg::CancelReply => self.section.cancel_reply(),
            CommentSectionMsg::LikeClicked(id) => match self.section.begin_like(id) {
                Ok(req) => ctx.link().send_future(async move {
                    let res = api.like_comment(id).await;
                    CommentSectionMsg::Liked(post, req, res)
                }),
                Err(e) => {
                    tracing::debug!(comment = ?id, error = ?e, "like rejected locally");
                    return false;
                }
            },
            CommentSectionMsg::Liked(_, req, res) => self.section.finish_like(req, res),
            CommentSectionMsg::DeleteClicked(id) => {
                if let Err(e) = self.section.request_delete(id) {
                    self.input_error = Some(e.to_string());
                }
            }
            CommentSectionMsg::DeleteCancelled => self.section.cancel_delete(),
            CommentSectionMsg::DeleteConfirmed => {
                if let Some(id) = self.section.confirm_delete() {
                    ctx.link().send_future(async move {
                        CommentSectionMsg::Deleted(post, id, api.delete_comment(id).await)
                    });
                }
            }
            CommentSectionMsg::Deleted(_, id, res) => self.section.finish_delete(id, res),
            CommentSectionMsg::DismissNotice => self.section.dismiss_notice(),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let tree = self.section.tree();
        let count = self.section.comments().len();
        html! {
            <section class="comment-section mt-4">
                <div class="d-flex align-items-center mb-2">
                    <h4>{ format!("Comments ({count})") }</h4>
                    <button
                        type="button"
                        class="btn btn-sm btn-link ms-auto"
                        disabled={ self.section.is_loading() }
                        onclick={ link.callback(|_| CommentSectionMsg::Load) }
                    >
                        { "Refresh" }
                    </button>
                </div>
                { for self.section.notice().map(|n| html! {
                    <div class="alert alert-danger alert-dismissible" role="alert">
                        { n }
                        <button
                            type="button"
                            class="btn-close"
                            aria-label="Close"
                            onclick={ link.callback(|_| CommentSectionMsg::DismissNotice) }
                        ></button>
                    </div>
                }) }
                { self.comment_form(ctx) }
                { match self.section.is_loading() && count == 0 {
                    true => html! { <div class="spinner-border spinner-border-sm" role="status"></div> },
                    false => html! {
                        <div class="comment-list">
                            { for tree.threads().into_iter().map(|thread| html! {
                                <div class="comment-thread" key={ thread.root.id.0.to_string() }>
                                    { self.item(ctx, thread.root, None) }
                                    <div class="comment-replies ms-4">
                                        { for thread.replies.iter().map(|r| {
                                            self.item(ctx, r.comment, r.reply_to_user)
                                        }) }
                                    </div>
                                </div>
                            }) }
                        </div>
                    },
                } }
                { for self.section.confirm_dialog().map(|d| html! {
                    <ui::ConfirmDialogView<CommentId>
                        dialog={ d.clone() }
                        on_confirm={ link.callback(|_| CommentSectionMsg::DeleteConfirmed) }
                        on_cancel={ link.callback(|_| CommentSectionMsg::DeleteCancelled) }
                    />
                }) }
            </section>
        }
    }
}

impl CommentSectionView {
    fn comment_form(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        if !self.section.can_comment() {
            return html! { <p class="text-muted">{ "Log in to leave a comment" }</p> };
        }
        html! {
            <form class="comment-form mb-3" onsubmit={ link.callback(|e: SubmitEvent| {
                e.prevent_default();
                CommentSectionMsg::SubmitClicked
            }) }>
                { for self.section.reply_target().map(|c| html! {
                    <div class="reply-banner d-flex align-items-center mb-1">
                        <span>{ format!("Replying to @{}", c.author_display()) }</span>
                        <button
                            type="button"
                            class="btn btn-sm btn-link ms-auto"
                            onclick={ link.callback(|_| CommentSectionMsg::CancelReply) }
                        >
                            { "Cancel" }
                        </button>
                    </div>
                }) }
                <textarea
                    class={ classes!("form-control", self.input_error.is_some().then(|| "is-invalid")) }
                    rows="3"
                    placeholder="Write a comment..."
                    value={ self.input.clone() }
                    oninput={ link.callback(|e: InputEvent| {
                        let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                        CommentSectionMsg::InputChanged(input.value())
                    }) }
                />
                { for self.input_error.as_ref().map(|e| html! {
                    <div class="invalid-feedback">{ e }</div>
                }) }
                <button
                    type="submit"
                    class="btn btn-primary mt-2"
                    disabled={ self.section.is_submitting() }
                >
                    { if self.section.is_submitting() { "Posting..." } else { "Post comment" } }
                </button>
            </form>
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_client::api::CommentId;

    use super::*;

    #[test]
    fn responses_for_a_previous_post_are_stale() {
        let section = CommentSection::new(PostId(2), None);
        let old = CommentSectionMsg::Loaded(PostId(1), Ok(Page::new(Vec::new(), 0, 1, 100)));
        assert!(is_stale(&section, &old));
        let current = CommentSectionMsg::Loaded(PostId(2), Ok(Page::new(Vec::new(), 0, 1, 100)));
        assert!(!is_stale(&section, &current));
        let deleted = CommentSectionMsg::Deleted(PostId(1), CommentId(4), Ok(()));
        assert!(is_stale(&section, &deleted));
        assert!(!is_stale(&section, &CommentSectionMsg::Load));
    }
}
