use std::fmt;

use chrono::Duration;

use crate::{
    api::{Post, PostId, Time},
    ArticleForm, KeyValueStore,
};

/// Where the local draft of an article is kept
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DraftKey {
    New,
    Existing(PostId),
}

impl DraftKey {
    pub fn for_post(id: Option<PostId>) -> DraftKey {
        match id {
            None => DraftKey::New,
            Some(id) => DraftKey::Existing(id),
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftKey::New => write!(f, "draft-new"),
            DraftKey::Existing(id) => write!(f, "draft-{id}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub last_modified: Time,
}

impl LocalDraft {
    pub fn new(form: &ArticleForm, last_modified: Time) -> LocalDraft {
        LocalDraft {
            title: form.title.clone(),
            content: form.content.clone(),
            category: form.category.clone(),
            tags: form.tags.clone(),
            cover: form.cover.clone(),
            last_modified,
        }
    }

    pub fn into_form(self) -> ArticleForm {
        let mut form = ArticleForm::new();
        form.title = self.title;
        form.content = self.content;
        if !self.category.is_empty() {
            form.category = self.category;
        }
        form.tags = self.tags;
        form.cover = self.cover;
        form
    }
}

/// What the form was filled from when the editor opened
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reconciled {
    /// The local draft, last written at `saved_at`
    Restored { saved_at: Time },
    FromServer,
    /// Nothing to restore
    Fresh,
}

/// Periodically copies the form to local storage when it changed
#[derive(Debug)]
pub struct Autosaver<S> {
    store: S,
    key: DraftKey,
    interval: Duration,
    next_due: Option<Time>,

    /// Form as last persisted, locally or on the server
    synced: Option<ArticleForm>,
    last_saved_at: Option<Time>,
}

impl<S: KeyValueStore> Autosaver<S> {
    pub fn new(store: S, key: DraftKey, interval: Duration) -> Autosaver<S> {
        Autosaver {
            store,
            key,
            interval,
            next_due: None,
            synced: None,
            last_saved_at: None,
        }
    }

    pub fn key(&self) -> DraftKey {
        self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn last_saved_at(&self) -> Option<Time> {
        self.last_saved_at
    }

    /// Starts the next period at `now`
    pub fn set_interval(&mut self, interval: Duration, now: Time) {
        self.interval = interval;
        self.next_due = Some(now + interval);
    }

    /// Reads the local draft. Unreadable drafts count as missing.
    pub fn load(&self) -> Option<LocalDraft> {
        let key = self.key.to_string();
        match self.store.get_json(&key) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(%key, error = %e, "ignoring unreadable local draft");
                None
            }
        }
    }

    /// Fills `form` from the local draft or from `server`, whichever is the
    /// most relevant
    pub fn reconcile(&mut self, form: &mut ArticleForm, server: Option<&Post>) -> Reconciled {
        if let Some(post) = server {
            *form = ArticleForm::from_post(post);
        }
        let restore = match (server, self.load()) {
            (None, Some(d)) if form.is_empty() => Some(d),
            (Some(post), Some(d)) if d.content != post.content => Some(d),
            _ => None,
        };
        match restore {
            Some(d) => {
                let saved_at = d.last_modified;
                *form = d.into_form();
                self.synced = Some(form.clone());
                self.last_saved_at = Some(saved_at);
                tracing::debug!(key = %self.key, %saved_at, "restored local draft");
                Reconciled::Restored { saved_at }
            }
            None => {
                self.synced = Some(form.clone());
                match server {
                    Some(_) => Reconciled::FromServer,
                    None => Reconciled::Fresh,
                }
            }
        }
    }

    /// Saves if the interval elapsed since the last tick that did
    pub fn tick(&mut self, form: &ArticleForm, now: Time) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(now + self.interval);
                self.save_if_changed(form, now)
            }
            Some(_) => false,
            None => {
                self.next_due = Some(now + self.interval);
                false
            }
        }
    }

    /// Returns whether something was written. Failures are only logged, and
    /// the write is attempted again next time.
    pub fn save_if_changed(&mut self, form: &ArticleForm, now: Time) -> bool {
        if self.synced.as_ref() == Some(form) {
            return false;
        }
        let key = self.key.to_string();
        match self.store.set_json(&key, &LocalDraft::new(form, now)) {
            Ok(()) => {
                tracing::debug!(%key, "autosaved draft");
                self.synced = Some(form.clone());
                self.last_saved_at = Some(now);
                true
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to autosave draft");
                false
            }
        }
    }

    /// Forgets the local draft once `form` is safely stored on the server
    pub fn clear(&mut self, form: &ArticleForm) {
        self.store.delete(&self.key.to_string());
        self.synced = Some(form.clone());
        self.last_saved_at = None;
    }

    pub fn rekey(&mut self, key: DraftKey) {
        self.key = key;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::MemoryStore;

    fn at(secs: i64) -> Time {
        chrono::Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn form(content: &str) -> ArticleForm {
        let mut f = ArticleForm::new();
        f.title = String::from("Title");
        f.content = content.to_string();
        f
    }

    fn post(id: i64, content: &str) -> Post {
        serde_json::from_value(serde_json::json!({
            "id": id, "title": "Server title", "content": content, "tags": ["a", "b"],
        }))
        .unwrap()
    }

    #[test]
    fn keys() {
        assert_eq!(DraftKey::New.to_string(), "draft-new");
        assert_eq!(DraftKey::for_post(Some(PostId(42))).to_string(), "draft-42");
    }

    #[test]
    fn saves_only_changes_on_schedule() {
        let store = MemoryStore::new();
        let mut a = Autosaver::new(store.clone(), DraftKey::New, Duration::seconds(30));
        let mut f = ArticleForm::new();
        assert_eq!(a.reconcile(&mut f, None), Reconciled::Fresh);
        assert!(!a.tick(&f, at(0)));
        f.content = String::from("hello");
        assert!(!a.tick(&f, at(29)));
        assert!(a.tick(&f, at(30)));
        assert_eq!(a.last_saved_at(), Some(at(30)));
        assert!(!a.tick(&f, at(60)));
        let d = a.load().unwrap();
        assert_eq!((d.content.as_str(), d.last_modified), ("hello", at(30)));
        assert!(store.contains("draft-new"));
    }

    #[test]
    fn new_article_restores_draft_into_empty_form() {
        let mut store = MemoryStore::new();
        store
            .set_json("draft-new", &LocalDraft::new(&form("local"), at(5)))
            .unwrap();
        let mut a = Autosaver::new(store.clone(), DraftKey::New, Duration::seconds(30));
        let mut f = ArticleForm::new();
        assert_eq!(
            a.reconcile(&mut f, None),
            Reconciled::Restored { saved_at: at(5) }
        );
        assert_eq!(f.content, "local");
        assert_eq!(a.last_saved_at(), Some(at(5)));
        // restored content is already stored
        assert!(!a.save_if_changed(&f, at(10)));

        let mut a = Autosaver::new(store, DraftKey::New, Duration::seconds(30));
        let mut f = form("typed already");
        assert_eq!(a.reconcile(&mut f, None), Reconciled::Fresh);
        assert_eq!(f.content, "typed already");
    }

    #[test]
    fn differing_local_draft_beats_server() {
        let mut store = MemoryStore::new();
        store
            .set_json("draft-7", &LocalDraft::new(&form("local edit"), at(1)))
            .unwrap();
        let mut a = Autosaver::new(store.clone(), DraftKey::Existing(PostId(7)), Duration::seconds(30));
        let mut f = ArticleForm::new();
        assert!(matches!(
            a.reconcile(&mut f, Some(&post(7, "server"))),
            Reconciled::Restored { .. }
        ));
        assert_eq!(f.content, "local edit");

        let mut a = Autosaver::new(store, DraftKey::Existing(PostId(7)), Duration::seconds(30));
        let mut f = ArticleForm::new();
        assert_eq!(
            a.reconcile(&mut f, Some(&post(7, "local edit"))),
            Reconciled::FromServer
        );
        assert_eq!(f.title, "Server title");
        assert_eq!(f.tags, "a, b");
        assert_eq!(a.last_saved_at(), None);
    }

    #[test]
    fn unreadable_draft_is_a_miss() {
        let mut store = MemoryStore::new();
        store.set("draft-new", "{not json").unwrap();
        let mut a = Autosaver::new(store, DraftKey::New, Duration::seconds(30));
        let mut f = ArticleForm::new();
        assert_eq!(a.reconcile(&mut f, None), Reconciled::Fresh);
    }

    #[test]
    fn failed_writes_are_retried() {
        let store = MemoryStore::with_quota(200);
        let mut a = Autosaver::new(store.clone(), DraftKey::New, Duration::seconds(10));
        let mut f = ArticleForm::new();
        a.reconcile(&mut f, None);
        f.content = "x".repeat(200);
        assert!(!a.save_if_changed(&f, at(0)));
        assert!(!store.contains("draft-new"));
        assert_eq!(a.last_saved_at(), None);
        f.content = String::from("y");
        assert!(a.save_if_changed(&f, at(10)));
        assert_eq!(a.load().unwrap().content, "y");
    }

    #[test]
    fn clear_removes_record() {
        let store = MemoryStore::new();
        let mut a = Autosaver::new(store.clone(), DraftKey::New, Duration::seconds(30));
        let mut f = ArticleForm::new();
        a.reconcile(&mut f, None);
        f.content = String::from("x");
        assert!(a.save_if_changed(&f, at(0)));
        a.clear(&f);
        assert!(!store.contains("draft-new"));
        assert_eq!(a.last_saved_at(), None);
        assert!(!a.save_if_changed(&f, at(1)));
        a.rekey(DraftKey::Existing(PostId(3)));
        f.content = String::from("xy");
        assert!(a.save_if_changed(&f, at(2)));
        assert!(store.contains("draft-3"));
    }
}
