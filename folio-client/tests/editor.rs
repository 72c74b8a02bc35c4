use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use folio_client::{
    api::{Error, NewPost, Role, Time},
    ArticleEditor, BlogApi, DraftKey, EditorConfig, KeyValueStore, LocalDraft, MemoryStore,
    Reconciled, SaveOutcome,
};
use folio_mock_server::{MockClient, MockServer};
use parking_lot::Mutex;

fn at(secs: i64) -> Time {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn admin() -> (Arc<Mutex<MockServer>>, MockClient) {
    let server = Arc::new(Mutex::new(MockServer::new()));
    let api = MockClient::test_logged_in(&server, "admin", Role::Admin);
    (server, api)
}

#[tokio::test]
async fn publishing_new_article_clears_local_draft() {
    let (server, api) = admin();
    let store = MemoryStore::new();
    let mut editor = ArticleEditor::mount(store.clone(), None, &EditorConfig::default(), at(0));
    assert_eq!(editor.reconciled(), Reconciled::Fresh);

    editor.set_title(String::from("Hello Rust"));
    editor.input_content(String::from("# Intro\n\nSome words."), at(1));
    editor.tick(at(30));
    assert!(store.contains("draft-new"));
    assert_eq!(editor.last_autosaved_at(), Some(at(30)));

    let post = editor.save(&api, true).await.unwrap();
    assert!(post.published);
    assert_eq!(post.slug, "hello-rust");
    assert!(store.keys().is_empty());
    assert_eq!(editor.last_autosaved_at(), None);
    assert_eq!(editor.editing(), Some(post.id));
    assert_eq!(editor.draft_key(), DraftKey::Existing(post.id));
    assert!(server.lock().test_post(post.id).unwrap().published);

    // saved content is not written back locally
    editor.tick(at(60));
    assert!(store.keys().is_empty());

    editor.input_content(String::from("# Intro\n\nMore words."), at(61));
    editor.tick(at(90));
    assert!(store.contains(&format!("draft-{}", post.id)));
}

#[tokio::test]
async fn updating_existing_article() {
    let (server, api) = admin();
    let post = server.lock().test_insert_post(
        NewPost::from_form("Old", "old body", "Life", "a, b", None).expect("valid post"),
    );
    let mut store = MemoryStore::new();
    store
        .set_json(
            &DraftKey::Existing(post.id).to_string(),
            &LocalDraft {
                title: String::from("Old"),
                content: String::from("newer local body"),
                category: String::from("Life"),
                tags: String::from("a, b"),
                cover: None,
                last_modified: at(-100),
            },
        )
        .unwrap();

    let mut editor = ArticleEditor::mount(store.clone(), Some(&post), &EditorConfig::default(), at(0));
    assert_eq!(
        editor.reconciled(),
        Reconciled::Restored { saved_at: at(-100) }
    );
    assert_eq!(editor.form().content, "newer local body");
    assert_eq!(
        editor.history().entries().collect::<Vec<_>>(),
        vec!["newer local body"]
    );

    let saved = editor.save(&api, false).await.unwrap();
    assert_eq!(saved.id, post.id);
    assert_eq!(saved.content, "newer local body");
    assert!(!saved.published);
    assert_eq!(server.lock().test_num_posts(), 1);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn failed_save_keeps_local_draft() {
    let (server, api) = admin();
    let store = MemoryStore::new();
    let mut editor = ArticleEditor::mount(store.clone(), None, &EditorConfig::default(), at(0));
    editor.set_title(String::from("T"));
    editor.input_content(String::from("body"), at(0));
    editor.tick(at(30));

    server.lock().fail_next(1);
    assert!(editor.save(&api, false).await.is_err());
    assert!(store.contains("draft-new"));
    assert_eq!(editor.notice(), Some("Failed to save draft"));
    assert!(!editor.is_saving());
    assert_eq!(editor.editing(), None);
    assert_eq!(server.lock().test_num_posts(), 0);
}

#[tokio::test]
async fn failed_publish_keeps_created_post() {
    let (server, api) = admin();
    let store = MemoryStore::new();
    let mut editor = ArticleEditor::mount(store.clone(), None, &EditorConfig::default(), at(0));
    editor.set_title(String::from("T"));
    editor.input_content(String::from("body"), at(0));

    // creation goes through, publishing does not
    let req = editor.begin_save(true).unwrap();
    let created = api.create_post(&req.post).await.unwrap();
    server.lock().fail_next(1);
    let outcome = SaveOutcome {
        stored: Some(created.clone()),
        result: api.publish_post(created.id).await,
    };
    assert!(editor.finish_save(&req, outcome).is_err());
    let id = created.id;
    assert_eq!(editor.editing(), Some(id));
    assert_eq!(editor.notice(), Some("Failed to publish"));

    // retrying updates instead of creating a duplicate
    let post = editor.save(&api, true).await.unwrap();
    assert_eq!(post.id, id);
    assert_eq!(server.lock().test_num_posts(), 1);
}

#[tokio::test]
async fn non_admins_cannot_save() {
    let server = Arc::new(Mutex::new(MockServer::new()));
    let api = MockClient::test_logged_in(&server, "reader", Role::User);
    let mut editor =
        ArticleEditor::mount(MemoryStore::new(), None, &EditorConfig::default(), at(0));
    editor.set_title(String::from("T"));
    editor.input_content(String::from("body"), at(0));
    assert_eq!(editor.save(&api, false).await, Err(Error::PermissionDenied));
    assert_eq!(editor.notice(), Some("Permission denied"));
}

#[tokio::test]
async fn cover_upload() {
    let (server, api) = admin();
    let mut editor =
        ArticleEditor::mount(MemoryStore::new(), None, &EditorConfig::default(), at(0));
    editor
        .upload_cover(&api, "cover.png", vec![1, 2, 3])
        .await
        .unwrap();
    let cover = editor.form().cover.clone().unwrap();
    assert!(cover.ends_with("cover.png"));
    assert_eq!(server.lock().test_uploads()[0].1, vec![1, 2, 3]);
}

#[test]
fn debounced_typing_example() {
    let mut config = EditorConfig::default();
    config.debounce_ms = 1000;
    let mut editor = ArticleEditor::mount(MemoryStore::new(), None, &config, at(0));
    editor.input_content(String::from("a"), at(1));
    editor.tick(at(1) + Duration::milliseconds(999));
    editor.tick(at(2));
    editor.input_content(String::from("ab"), at(3));
    editor.tick(at(4));
    let entries = editor.history().entries().collect::<Vec<_>>();
    assert_eq!(entries, vec!["a", "ab"]);
    assert!(editor.undo());
    assert_eq!(editor.form().content, "a");
}
