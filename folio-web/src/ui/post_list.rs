use folio_client::api::{self, Post, PostId};
use yew::prelude::*;

use crate::util;

#[derive(Clone, PartialEq, Properties)]
pub struct PostListProps {
    pub posts: Option<api::Page<Post>>,
    pub on_open: Callback<PostId>,
    pub on_page: Callback<i64>,
}

#[function_component(PostList)]
pub fn post_list(p: &PostListProps) -> Html {
    let posts = match &p.posts {
        None => {
            return html! {
                <div class="d-flex justify-content-center my-4">
                    <div class="spinner-border" role="status"></div>
                </div>
            }
        }
        Some(posts) => posts,
    };
    if posts.records.is_empty() {
        return html! { <p class="text-muted my-4">{ "No posts yet" }</p> };
    }
    let page = posts.page;
    html! {<>
        <ul class="list-group post-list">
            { for posts.records.iter().map(|post| {
                let id = post.id;
                html! {
                    <li
                        class="list-group-item"
                        key={ id.to_string() }
                        onclick={ p.on_open.reform(move |_| id) }
                    >
                        <h5 class={ classes!("mb-1", (!post.published).then(|| "text-muted")) }>
                            { &post.title }
                            { for (!post.published).then(|| html! {
                                <span class="badge bg-secondary ms-2">{ "Draft" }</span>
                            }) }
                        </h5>
                        <small>{ util::format_time(post.created_at) }</small>
                        { for post.summary.as_ref().map(|s| html! { <p class="mb-1">{ s }</p> }) }
                    </li>
                }
            }) }
        </ul>
        <nav class="d-flex justify-content-between my-3">
            <button
                class="btn btn-outline-secondary"
                disabled={ !posts.has_previous() }
                onclick={ p.on_page.reform(move |_| page - 1) }
            >
                { "Previous" }
            </button>
            <span>{ format!("{} / {}", page, posts.pages.max(1)) }</span>
            <button
                class="btn btn-outline-secondary"
                disabled={ !posts.has_next() }
                onclick={ p.on_page.reform(move |_| page + 1) }
            >
                { "Next" }
            </button>
        </nav>
    </>}
}
