use folio_client::api::{Comment, CommentId};
use yew::prelude::*;

use crate::util;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentItemProps {
    pub comment: Comment,
    #[prop_or_default]
    pub reply_to_user: Option<String>,
    pub can_like: bool,
    pub can_delete: bool,
    pub deleting: bool,
    pub on_reply: Callback<CommentId>,
    pub on_like: Callback<CommentId>,
    pub on_delete: Callback<CommentId>,
}

#[function_component(CommentItem)]
pub fn comment_item(p: &CommentItemProps) -> Html {
    let id = p.comment.id;
    let like_icon = match p.comment.is_liked {
        true => "bi-heart-fill",
        false => "bi-heart",
    };
    html! {
        <div class={ classes!("comment", p.reply_to_user.is_some().then(|| "comment-reply")) }>
            <div class="comment-header d-flex align-items-center">
                <strong>{ p.comment.author_display() }</strong>
                { for p.reply_to_user.as_ref().map(|u| html! {
                    <span class="text-muted ms-1">{ format!("replying to @{u}") }</span>
                }) }
                <small class="text-muted ms-auto">{ util::format_time(p.comment.created_at) }</small>
            </div>
            <div class="comment-content">{ &p.comment.content }</div>
            <div class="comment-actions">
                <button
                    type="button"
                    class={ classes!("btn", "btn-sm", "bi-btn", like_icon) }
                    aria-label="Like"
                    disabled={ !p.can_like }
                    onclick={ p.on_like.reform(move |_| id) }
                >
                    { format!(" {}", p.comment.like_count) }
                </button>
                <button
                    type="button"
                    class="btn btn-sm btn-link"
                    onclick={ p.on_reply.reform(move |_| id) }
                >
                    { "Reply" }
                </button>
                { for p.can_delete.then(|| html! {
                    <button
                        type="button"
                        class="btn btn-sm btn-link text-danger"
                        disabled={ p.deleting }
                        onclick={ p.on_delete.reform(move |_| id) }
                    >
                        { if p.deleting { "Deleting..." } else { "Delete" } }
                    </button>
                }) }
            </div>
        </div>
    }
}
