use std::ops::Range;

use crate::{
    api::{join_tags, Error, NewPost, Post, PostId, Time, DEFAULT_CATEGORY},
    markdown, AutosaveInterval, Autosaver, BlogApi, DraftHistory, DraftKey, EditorConfig, Format,
    Heading, KeyValueStore, Reconciled, TypingHistory,
};

/// Everything the author can edit
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
    pub category: String,
    /// Comma-separated
    pub tags: String,
    pub cover: Option<String>,
}

impl Default for ArticleForm {
    fn default() -> ArticleForm {
        ArticleForm::new()
    }
}

impl ArticleForm {
    pub fn new() -> ArticleForm {
        ArticleForm {
            title: String::new(),
            content: String::new(),
            category: String::from(DEFAULT_CATEGORY),
            tags: String::new(),
            cover: None,
        }
    }

    pub fn from_post(post: &Post) -> ArticleForm {
        ArticleForm {
            title: post.title.clone(),
            content: post.content.clone(),
            category: post
                .category
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| String::from(DEFAULT_CATEGORY)),
            tags: join_tags(&post.tags),
            cover: post.cover_file_path.clone(),
        }
    }

    /// Whether the author has not written anything yet. The category always
    /// has a value, so it does not count.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
            && self.content.trim().is_empty()
            && self.tags.trim().is_empty()
            && self.cover.is_none()
    }

    pub fn to_new_post(&self) -> Result<NewPost, Error> {
        NewPost::from_form(
            &self.title,
            &self.content,
            &self.category,
            &self.tags,
            self.cover.clone(),
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// `Ctrl+Z` (or `Cmd+Z`) undoes, adding `Shift` redoes
    pub fn from_key(key: &str, ctrl_or_meta: bool, shift: bool) -> Option<Shortcut> {
        if !ctrl_or_meta || !key.eq_ignore_ascii_case("z") {
            return None;
        }
        Some(match shift {
            true => Shortcut::Redo,
            false => Shortcut::Undo,
        })
    }
}

/// A save that passed validation and is ready to be sent
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
    pub post: NewPost,
    /// Post to update, or `None` to create one
    pub target: Option<PostId>,
    pub publish: bool,
    /// Form the payload was built from
    pub form: ArticleForm,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveOutcome {
    /// The post as the server stored it, if creating or updating it worked
    pub stored: Option<Post>,
    pub result: Result<(), Error>,
}

/// Creates or updates the post, then publishes it if requested
pub async fn perform_save<A: BlogApi + ?Sized>(api: &A, req: &SaveRequest) -> SaveOutcome {
    let stored = match req.target {
        Some(id) => api.update_post(id, &req.post).await,
        None => api.create_post(&req.post).await,
    };
    let mut stored = match stored {
        Ok(p) => p,
        Err(e) => {
            return SaveOutcome {
                stored: None,
                result: Err(e),
            }
        }
    };
    let result = match req.publish {
        true => api.publish_post(stored.id).await,
        false => Ok(()),
    };
    if req.publish && result.is_ok() {
        stored.published = true;
    }
    SaveOutcome {
        stored: Some(stored),
        result,
    }
}

/// State of the article editor page
#[derive(Debug)]
pub struct ArticleEditor<S> {
    form: ArticleForm,
    editing: Option<PostId>,
    history: TypingHistory,
    autosave: Autosaver<S>,
    reconciled: Reconciled,
    saving: bool,
    uploading: bool,
    previewing: bool,
    notice: Option<String>,
}

impl<S: KeyValueStore> ArticleEditor<S> {
    /// Opens the editor on `initial`, or on a new article, restoring the local
    /// draft if there is a relevant one
    pub fn mount(store: S, initial: Option<&Post>, config: &EditorConfig, now: Time) -> Self {
        let key = DraftKey::for_post(initial.map(|p| p.id));
        let mut autosave = Autosaver::new(store, key, config.autosave_interval.duration());
        let mut form = ArticleForm::new();
        let reconciled = autosave.reconcile(&mut form, initial);
        autosave.set_interval(config.autosave_interval.duration(), now);
        let mut history = TypingHistory::new(config.history_capacity, config.debounce());
        // an empty editor has nothing to go back to
        if !form.content.is_empty() {
            history.commit(&form.content, &form.content);
        }
        tracing::debug!(%key, ?reconciled, "opened article editor");
        ArticleEditor {
            form,
            editing: initial.map(|p| p.id),
            history,
            autosave,
            reconciled,
            saving: false,
            uploading: false,
            previewing: false,
            notice: None,
        }
    }

    pub fn form(&self) -> &ArticleForm {
        &self.form
    }

    pub fn editing(&self) -> Option<PostId> {
        self.editing
    }

    pub fn reconciled(&self) -> Reconciled {
        self.reconciled
    }

    pub fn history(&self) -> &DraftHistory {
        self.history.history()
    }

    pub fn draft_key(&self) -> DraftKey {
        self.autosave.key()
    }

    pub fn store(&self) -> &S {
        self.autosave.store()
    }

    pub fn last_autosaved_at(&self) -> Option<Time> {
        self.autosave.last_saved_at()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    pub fn toggle_preview(&mut self) {
        self.previewing = !self.previewing;
    }

    pub fn preview_html(&self) -> String {
        markdown::render_preview(&self.form.content)
    }

    pub fn headings(&self) -> Vec<Heading> {
        markdown::extract_headings(&self.form.content)
    }

    pub fn char_count(&self) -> usize {
        self.form.content.chars().count()
    }

    pub fn set_title(&mut self, title: String) {
        self.form.title = title;
    }

    pub fn set_category(&mut self, category: String) {
        self.form.category = category;
    }

    pub fn set_tags(&mut self, tags: String) {
        self.form.tags = tags;
    }

    pub fn set_cover(&mut self, cover: Option<String>) {
        self.form.cover = cover.filter(|c| !c.trim().is_empty());
    }

    /// Content typed by the author; recorded in the history once typing pauses
    pub fn input_content(&mut self, content: String, now: Time) {
        self.history.input(&content, now);
        self.form.content = content;
    }

    /// Applies a toolbar action as a single undo step and returns the new
    /// selection, in characters
    pub fn apply_format(&mut self, format: Format, selection: Range<usize>) -> Range<usize> {
        let (content, selection) = format.apply(&self.form.content, selection);
        self.history.commit(&self.form.content, &content);
        self.form.content = content;
        selection
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(content) => {
                self.form.content = content;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(content) => {
                self.form.content = content;
                true
            }
            None => false,
        }
    }

    pub fn shortcut(&mut self, shortcut: Shortcut) -> bool {
        match shortcut {
            Shortcut::Undo => self.undo(),
            Shortcut::Redo => self.redo(),
        }
    }

    /// Records paused typing and autosaves when due
    pub fn tick(&mut self, now: Time) {
        self.history.tick(now);
        self.autosave.tick(&self.form, now);
    }

    pub fn set_autosave_interval(&mut self, interval: AutosaveInterval, now: Time) {
        self.autosave.set_interval(interval.duration(), now);
    }

    pub fn begin_save(&mut self, publish: bool) -> Result<SaveRequest, Error> {
        if self.saving {
            return Err(Error::Busy);
        }
        let post = self.form.to_new_post()?;
        self.saving = true;
        Ok(SaveRequest {
            post,
            target: self.editing,
            publish,
            form: self.form.clone(),
        })
    }

    /// Once the server holds the post, the local draft is dropped and later
    /// edits are kept under the post's own key
    pub fn finish_save(&mut self, req: &SaveRequest, outcome: SaveOutcome) -> Result<Post, Error> {
        self.saving = false;
        if let Some(post) = &outcome.stored {
            self.editing = Some(post.id);
            self.autosave.clear(&req.form);
            self.autosave.rekey(DraftKey::Existing(post.id));
        }
        match (outcome.stored, outcome.result) {
            (Some(post), Ok(())) => {
                tracing::info!(post = %post.id, published = req.publish, "saved article");
                self.notice = None;
                Ok(post)
            }
            (_, Err(e)) => {
                tracing::error!(publish = req.publish, error = ?e, "failed to save article");
                let fallback = match req.publish {
                    true => "Failed to publish",
                    false => "Failed to save draft",
                };
                self.notice = Some(e.user_message(fallback));
                Err(e)
            }
            (None, Ok(())) => Err(Error::Unknown(String::from(
                "save finished without a stored post",
            ))),
        }
    }

    pub async fn save<A: BlogApi + ?Sized>(&mut self, api: &A, publish: bool) -> Result<Post, Error> {
        let req = self.begin_save(publish)?;
        let outcome = perform_save(api, &req).await;
        self.finish_save(&req, outcome)
    }

    pub fn begin_upload(&mut self) -> Result<(), Error> {
        if self.uploading {
            return Err(Error::Busy);
        }
        self.uploading = true;
        Ok(())
    }

    pub fn finish_upload(&mut self, result: Result<String, Error>) {
        self.uploading = false;
        match result {
            Ok(cover) => self.set_cover(Some(cover)),
            Err(e) => {
                tracing::error!(error = ?e, "failed to upload cover");
                self.notice = Some(e.user_message("Failed to upload cover"));
            }
        }
    }

    pub async fn upload_cover<A: BlogApi + ?Sized>(
        &mut self,
        api: &A,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), Error> {
        self.begin_upload()?;
        let res = api.upload_cover(file_name, bytes).await;
        let err = res.as_ref().err().cloned();
        self.finish_upload(res);
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{api::Time, MemoryStore};

    fn at(ms: i64) -> Time {
        chrono::Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn editor() -> ArticleEditor<MemoryStore> {
        ArticleEditor::mount(MemoryStore::new(), None, &EditorConfig::default(), at(0))
    }

    #[test]
    fn shortcuts() {
        assert_eq!(Shortcut::from_key("z", true, false), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key("Z", true, true), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key("z", false, false), None);
        assert_eq!(Shortcut::from_key("y", true, false), None);
    }

    #[test]
    fn typing_then_undo() {
        let mut e = editor();
        e.input_content(String::from("a"), at(0));
        e.tick(at(1000));
        e.input_content(String::from("ab"), at(1100));
        e.tick(at(2100));
        assert_eq!(e.history().entries().collect::<Vec<_>>(), vec!["a", "ab"]);
        assert!(e.shortcut(Shortcut::Undo));
        assert_eq!(e.form().content, "a");
        assert!(!e.undo());
        assert!(e.shortcut(Shortcut::Redo));
        assert_eq!(e.form().content, "ab");
        assert!(!e.redo());
    }

    #[test]
    fn toolbar_actions_are_single_steps() {
        let mut e = editor();
        e.input_content(String::from("make this bold"), at(0));
        let sel = e.apply_format(Format::Bold, 10..14);
        assert_eq!(e.form().content, "make this **bold**");
        assert_eq!(sel, 12..16);
        assert!(e.undo());
        assert_eq!(e.form().content, "make this bold");
        assert!(!e.undo());
        assert_eq!(e.form().content, "make this bold");
    }

    #[test]
    fn save_requires_title_and_content() {
        let mut e = editor();
        assert_eq!(e.begin_save(false), Err(Error::EmptyTitle));
        e.set_title(String::from("Hello"));
        assert_eq!(e.begin_save(true), Err(Error::EmptyContent));
        e.input_content(String::from("body"), at(0));
        let req = e.begin_save(true).unwrap();
        assert_eq!(req.target, None);
        assert_eq!(req.post.slug, "hello");
        assert_eq!(e.begin_save(true), Err(Error::Busy));
    }

    #[test]
    fn autosave_follows_configured_interval() {
        let mut e = editor();
        e.set_autosave_interval(AutosaveInterval::TenSeconds, at(0));
        e.input_content(String::from("draft"), at(0));
        e.tick(at(9_000));
        assert_eq!(e.last_autosaved_at(), None);
        e.tick(at(10_000));
        assert_eq!(e.last_autosaved_at(), Some(at(10_000)));
        assert!(e.store().contains("draft-new"));
        assert_eq!(
            e.history().current(),
            Some("draft"),
            "paused typing is recorded too"
        );
    }

    #[test]
    fn preview_and_toc() {
        let mut e = editor();
        e.input_content(String::from("# Intro\n\ntext\n\n## Usage"), at(0));
        let ids = e.headings().into_iter().map(|h| h.id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["intro", "usage"]);
        assert!(e.preview_html().contains("id=\"usage\""));
        assert_eq!(e.char_count(), 23);
        e.toggle_preview();
        assert!(e.is_previewing());
    }

    #[test]
    fn failed_upload_keeps_cover() {
        let mut e = editor();
        e.set_cover(Some(String::from("/uploads/old.png")));
        e.begin_upload().unwrap();
        assert_eq!(e.begin_upload(), Err(Error::Busy));
        e.finish_upload(Err(Error::Network(String::from("offline"))));
        assert_eq!(e.form().cover.as_deref(), Some("/uploads/old.png"));
        assert_eq!(e.notice(), Some("Failed to upload cover"));
        e.begin_upload().unwrap();
        e.finish_upload(Ok(String::from("/uploads/new.png")));
        assert_eq!(e.form().cover.as_deref(), Some("/uploads/new.png"));
    }
}
