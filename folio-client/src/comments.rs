use std::collections::HashMap;

use crate::{
    api::{Comment, CommentId, Error, NewComment, Page, PostId, User},
    BlogApi, CommentTree,
};

/// Comments are all fetched at once, as a single large page
pub const COMMENT_PAGE_SIZE: i64 = 100;

/// Question put to the user before destroying `target`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfirmDialog<T = CommentId> {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub target: T,
}

impl ConfirmDialog<PostId> {
    pub fn delete_post(target: PostId) -> ConfirmDialog<PostId> {
        ConfirmDialog {
            title: String::from("Delete article"),
            message: String::from(
                "Are you sure you want to delete this article? This cannot be undone.",
            ),
            confirm_label: String::from("Delete"),
            cancel_label: String::from("Cancel"),
            target,
        }
    }
}

impl ConfirmDialog {
    fn delete_comment(target: CommentId) -> ConfirmDialog {
        ConfirmDialog {
            title: String::from("Delete comment"),
            message: String::from(
                "Are you sure you want to delete this comment? This cannot be undone.",
            ),
            confirm_label: String::from("Delete"),
            cancel_label: String::from("Cancel"),
            target,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LikeState {
    pub like_count: i64,
    pub is_liked: bool,
}

impl LikeState {
    fn of(c: &Comment) -> LikeState {
        LikeState {
            like_count: c.like_count,
            is_liked: c.is_liked,
        }
    }

    fn toggled(self) -> LikeState {
        match self.is_liked {
            true => LikeState {
                like_count: (self.like_count - 1).max(0),
                is_liked: false,
            },
            false => LikeState {
                like_count: self.like_count + 1,
                is_liked: true,
            },
        }
    }
}

/// A like toggle that was already applied locally and awaits the server
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LikeRequest {
    pub comment: CommentId,
    generation: u64,
    prior: LikeState,
}

/// State of the comment section of one post
#[derive(Clone, Debug)]
pub struct CommentSection {
    post: PostId,
    viewer: Option<User>,
    comments: Vec<Comment>,
    loading: bool,
    reply_target: Option<CommentId>,
    submitting: bool,
    pending_delete: Option<ConfirmDialog>,
    deleting: Option<CommentId>,
    like_generations: HashMap<CommentId, u64>,
    next_generation: u64,
    notice: Option<String>,
}

impl CommentSection {
    pub fn new(post: PostId, viewer: Option<User>) -> CommentSection {
        CommentSection {
            post,
            viewer,
            comments: Vec::new(),
            loading: false,
            reply_target: None,
            submitting: false,
            pending_delete: None,
            deleting: None,
            like_generations: HashMap::new(),
            next_generation: 0,
            notice: None,
        }
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    pub fn set_viewer(&mut self, viewer: Option<User>) {
        if viewer.is_none() {
            self.reply_target = None;
        }
        self.viewer = viewer;
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn tree(&self) -> CommentTree {
        CommentTree::build(&self.comments)
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn deleting(&self) -> Option<CommentId> {
        self.deleting
    }

    /// Error to show the user after a failed action
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn can_comment(&self) -> bool {
        self.viewer.is_some()
    }

    pub fn can_like(&self) -> bool {
        self.viewer.is_some()
    }

    /// Only the author and administrators may delete a comment
    pub fn can_delete(&self, comment: &Comment) -> bool {
        match &self.viewer {
            None => false,
            Some(u) => u.is_admin() || comment.user_id == Some(u.id),
        }
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, result: Result<Page<Comment>, Error>) {
        self.loading = false;
        match result {
            Ok(page) => {
                tracing::debug!(post = %self.post, count = page.records.len(), "loaded comments");
                self.comments = page.records;
                self.like_generations.clear();
                if let Some(t) = self.reply_target {
                    if self.comment(t).is_none() {
                        self.reply_target = None;
                    }
                }
            }
            Err(e) => {
                tracing::error!(post = %self.post, error = ?e, "failed to load comments");
                self.notice = Some(e.user_message("Failed to load comments"));
            }
        }
    }

    pub fn reply_target(&self) -> Option<&Comment> {
        self.reply_target.and_then(|id| self.comment(id))
    }

    /// Makes `id` the comment the next submission replies to, replacing any
    /// previous target
    pub fn start_reply(&mut self, id: CommentId) -> Result<(), Error> {
        if !self.can_comment() {
            return Err(Error::Unauthenticated);
        }
        if self.comment(id).is_none() {
            return Err(Error::NotFound);
        }
        self.reply_target = Some(id);
        Ok(())
    }

    pub fn cancel_reply(&mut self) {
        self.reply_target = None;
    }

    /// Validates `content` and marks a submission as in flight
    pub fn begin_submit(&mut self, content: &str) -> Result<NewComment, Error> {
        if !self.can_comment() {
            return Err(Error::Unauthenticated);
        }
        if self.submitting {
            return Err(Error::Busy);
        }
        let res = NewComment::new(content, self.reply_target)?;
        self.submitting = true;
        Ok(res)
    }

    /// Returns whether the comment was posted, in which case the input should
    /// be cleared
    pub fn finish_submit(&mut self, result: Result<Comment, Error>) -> bool {
        self.submitting = false;
        match result {
            Ok(c) => {
                tracing::debug!(post = %self.post, comment = ?c.id, "posted comment");
                self.reply_target = None;
                self.notice = None;
                self.comments.push(c);
                true
            }
            Err(e) => {
                tracing::error!(post = %self.post, error = ?e, "failed to post comment");
                self.notice = Some(e.user_message("Failed to post comment"));
                false
            }
        }
    }

    /// Flips the like locally, before the server is told about it
    pub fn begin_like(&mut self, id: CommentId) -> Result<LikeRequest, Error> {
        if !self.can_like() {
            return Err(Error::Unauthenticated);
        }
        let generation = self.next_generation;
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::NotFound)?;
        let prior = LikeState::of(comment);
        let next = prior.toggled();
        comment.like_count = next.like_count;
        comment.is_liked = next.is_liked;
        self.next_generation += 1;
        self.like_generations.insert(id, generation);
        Ok(LikeRequest {
            comment: id,
            generation,
            prior,
        })
    }

    /// On failure, puts back the state from before the toggle, unless another
    /// toggle of the same comment happened since
    pub fn finish_like(&mut self, req: LikeRequest, result: Result<(), Error>) {
        let latest = self.like_generations.get(&req.comment) == Some(&req.generation);
        if latest {
            self.like_generations.remove(&req.comment);
        }
        let Err(e) = result else {
            return;
        };
        tracing::error!(comment = ?req.comment, error = ?e, "failed to toggle like");
        self.notice = Some(e.user_message("Failed to update like"));
        if !latest {
            return;
        }
        if let Some(c) = self.comments.iter_mut().find(|c| c.id == req.comment) {
            c.like_count = req.prior.like_count;
            c.is_liked = req.prior.is_liked;
        }
    }

    /// Asks for confirmation before deleting
    pub fn request_delete(&mut self, id: CommentId) -> Result<&ConfirmDialog, Error> {
        let comment = self.comment(id).ok_or(Error::NotFound)?;
        if !self.can_delete(comment) {
            return Err(match self.viewer {
                None => Error::Unauthenticated,
                Some(_) => Error::PermissionDenied,
            });
        }
        Ok(self
            .pending_delete
            .insert(ConfirmDialog::delete_comment(id)))
    }

    pub fn confirm_dialog(&self) -> Option<&ConfirmDialog> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Closes the dialog and returns the comment to delete
    pub fn confirm_delete(&mut self) -> Option<CommentId> {
        let id = self.pending_delete.take()?.target;
        self.deleting = Some(id);
        Some(id)
    }

    pub fn finish_delete(&mut self, id: CommentId, result: Result<(), Error>) {
        if self.deleting == Some(id) {
            self.deleting = None;
        }
        match result {
            Ok(()) => {
                tracing::debug!(comment = ?id, "deleted comment");
                self.comments.retain(|c| c.id != id);
                self.like_generations.remove(&id);
                if self.reply_target == Some(id) {
                    self.reply_target = None;
                }
            }
            Err(e) => {
                tracing::error!(comment = ?id, error = ?e, "failed to delete comment");
                self.notice = Some(e.user_message("Failed to delete comment"));
            }
        }
    }

    pub async fn refresh<A: BlogApi + ?Sized>(&mut self, api: &A) {
        self.begin_load();
        let res = api.list_comments(self.post, 1, COMMENT_PAGE_SIZE).await;
        self.finish_load(res);
    }

    pub async fn submit<A: BlogApi + ?Sized>(
        &mut self,
        api: &A,
        content: &str,
    ) -> Result<(), Error> {
        let new = self.begin_submit(content)?;
        match api.create_comment(self.post, &new).await {
            Ok(c) => {
                self.finish_submit(Ok(c));
                Ok(())
            }
            Err(e) => {
                self.finish_submit(Err(e.clone()));
                Err(e)
            }
        }
    }

    pub async fn toggle_like<A: BlogApi + ?Sized>(
        &mut self,
        api: &A,
        id: CommentId,
    ) -> Result<(), Error> {
        let req = self.begin_like(id)?;
        let res = api.like_comment(id).await;
        self.finish_like(req, res.clone());
        res
    }

    pub async fn delete_confirmed<A: BlogApi + ?Sized>(&mut self, api: &A) -> Result<(), Error> {
        let Some(id) = self.confirm_delete() else {
            return Ok(());
        };
        let res = api.delete_comment(id).await;
        self.finish_delete(id, res.clone());
        res
    }
}
