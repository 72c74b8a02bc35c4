use std::sync::Arc;

use folio_client::{
    api::{Comment, CommentId, Error, NewPost, PostId, Role},
    BlogApi, CommentSection,
};
use folio_mock_server::{MockClient, MockServer};
use parking_lot::Mutex;

fn setup() -> (Arc<Mutex<MockServer>>, PostId) {
    let server = Arc::new(Mutex::new(MockServer::new()));
    let post = server.lock().test_insert_post(
        NewPost::from_form("Hello", "First post", "", "", None).expect("valid post"),
    );
    (server, post.id)
}

fn seeded(server: &Arc<Mutex<MockServer>>, post: PostId, id: i64, parent: Option<i64>, author: &str) {
    server.lock().test_insert_comment(Comment {
        id: CommentId(id),
        post_id: Some(post),
        user_id: None,
        author_name: author.to_string(),
        content: format!("comment {id}"),
        parent_id: parent.map(CommentId),
        created_at: None,
        like_count: 0,
        is_liked: false,
    });
}

#[tokio::test]
async fn threads_from_server() {
    let (server, post) = setup();
    seeded(&server, post, 101, None, "alice");
    seeded(&server, post, 102, Some(101), "bob");
    seeded(&server, post, 103, Some(102), "carol");
    seeded(&server, post, 104, Some(999), "dave");

    let api = MockClient::new(server.clone());
    let mut section = CommentSection::new(post, None);
    section.refresh(&api).await;
    assert!(!section.is_loading());
    let tree = section.tree();
    let threads = tree.threads();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].root.id, CommentId(101));
    let replies = threads[0]
        .replies
        .iter()
        .map(|r| (r.comment.id.0, r.reply_to_user))
        .collect::<Vec<_>>();
    assert_eq!(replies, vec![(102, Some("alice")), (103, Some("bob"))]);
    assert_eq!(threads[1].root.id, CommentId(104));
}

#[tokio::test]
async fn posting_a_reply() {
    let (server, post) = setup();
    seeded(&server, post, 101, None, "alice");
    let api = MockClient::test_logged_in(&server, "bob", Role::User);
    let mut section = CommentSection::new(post, Some(api.test_user()));
    section.refresh(&api).await;

    section.start_reply(CommentId(101)).unwrap();
    assert_eq!(section.submit(&api, "   ").await, Err(Error::EmptyComment));
    assert_eq!(section.reply_target().map(|c| c.id), Some(CommentId(101)));

    section.submit(&api, "Nice one").await.unwrap();
    assert!(section.reply_target().is_none());
    let threads = section.tree();
    let threads = threads.threads();
    assert_eq!(threads[0].replies.len(), 1);
    assert_eq!(threads[0].replies[0].comment.author_name, "bob");

    server.lock().fail_next(1);
    section.start_reply(CommentId(101)).unwrap();
    assert!(section.submit(&api, "again").await.is_err());
    assert_eq!(section.notice(), Some("Failed to post comment"));
    assert_eq!(section.reply_target().map(|c| c.id), Some(CommentId(101)));
    assert_eq!(section.comments().len(), 2);
}

#[tokio::test]
async fn likes_are_optimistic_and_rolled_back() {
    let (server, post) = setup();
    seeded(&server, post, 101, None, "alice");
    let api = MockClient::test_logged_in(&server, "bob", Role::User);
    let mut section = CommentSection::new(post, Some(api.test_user()));
    section.refresh(&api).await;

    section.toggle_like(&api, CommentId(101)).await.unwrap();
    let c = section.comment(CommentId(101)).unwrap();
    assert_eq!((c.like_count, c.is_liked), (1, true));
    assert_eq!(server.lock().test_comment(CommentId(101)).unwrap().like_count, 1);

    server.lock().fail_next(1);
    assert!(section.toggle_like(&api, CommentId(101)).await.is_err());
    let c = section.comment(CommentId(101)).unwrap();
    assert_eq!((c.like_count, c.is_liked), (1, true));
    assert_eq!(section.notice(), Some("Failed to update like"));

    section.refresh(&api).await;
    let c = section.comment(CommentId(101)).unwrap();
    assert_eq!((c.like_count, c.is_liked), (1, true));
}

#[tokio::test]
async fn deleting_needs_confirmation_and_rights() {
    let (server, post) = setup();
    let alice = MockClient::test_logged_in(&server, "alice", Role::User);
    let mut section = CommentSection::new(post, Some(alice.test_user()));
    section.submit(&alice, "mine").await.unwrap();
    let mine = section.comments()[0].id;
    seeded(&server, post, 500, Some(mine.0), "someone");
    section.refresh(&alice).await;
    assert_eq!(section.comments().len(), 2);

    assert_eq!(
        section.request_delete(CommentId(500)).map(|d| d.target),
        Err(Error::PermissionDenied)
    );

    section.request_delete(mine).unwrap();
    section.cancel_delete();
    section.delete_confirmed(&alice).await.unwrap();
    assert_eq!(section.comments().len(), 2);

    section.request_delete(mine).unwrap();
    section.delete_confirmed(&alice).await.unwrap();
    assert!(section.comment(mine).is_none());
    assert!(server.lock().test_comment(mine).is_none());

    // the reply is left behind and now shows as a root
    section.refresh(&alice).await;
    let tree = section.tree();
    assert_eq!(tree.roots.len(), 1);
    assert_eq!(tree.roots[0].comment.id, CommentId(500));
}

#[tokio::test]
async fn admins_delete_other_comments() {
    let (server, post) = setup();
    seeded(&server, post, 101, None, "alice");
    let admin = MockClient::test_logged_in(&server, "root", Role::Admin);
    let mut section = CommentSection::new(post, Some(admin.test_user()));
    section.refresh(&admin).await;

    server.lock().fail_next(1);
    section.request_delete(CommentId(101)).unwrap();
    assert!(section.delete_confirmed(&admin).await.is_err());
    assert_eq!(section.comments().len(), 1);
    assert_eq!(section.notice(), Some("Failed to delete comment"));

    section.request_delete(CommentId(101)).unwrap();
    section.delete_confirmed(&admin).await.unwrap();
    assert!(section.comments().is_empty());
}

#[tokio::test]
async fn deleting_an_article_takes_its_comments() {
    let (server, post) = setup();
    seeded(&server, post, 101, None, "alice");
    let reader = MockClient::test_logged_in(&server, "reader", Role::User);
    assert_eq!(reader.delete_post(post).await, Err(Error::PermissionDenied));

    let admin = MockClient::test_logged_in(&server, "root", Role::Admin);
    admin.delete_post(post).await.unwrap();
    assert_eq!(admin.get_post(post).await, Err(Error::NotFound));
    assert!(server.lock().test_comment(CommentId(101)).is_none());
    assert_eq!(admin.delete_post(post).await, Err(Error::NotFound));
}
