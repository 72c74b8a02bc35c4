mod autosave;
pub use autosave::{Autosaver, DraftKey, LocalDraft, Reconciled};

mod comments;
pub use comments::{CommentSection, ConfirmDialog, LikeRequest, LikeState, COMMENT_PAGE_SIZE};

mod config;
pub use config::{AutosaveInterval, EditorConfig};

mod editor;
pub use editor::{perform_save, ArticleEditor, ArticleForm, SaveOutcome, SaveRequest, Shortcut};

mod format;
pub use format::{char_to_utf16_offset, utf16_to_char_offset, Format};

mod history;
pub use history::{DraftHistory, TypingHistory};

pub mod http;
pub use http::HttpApi;

pub mod markdown;
pub use markdown::Heading;

mod notifications;
pub use notifications::{NotificationCenter, NOTIFICATION_PAGE_SIZE, UNREAD_POLL_INTERVAL};

mod remote;
pub use remote::BlogApi;

pub mod schedule;

mod session;
pub use session::{checked_session, verify_session};

mod store;
pub use store::{KeyValueStore, MemoryStore, StorageError, SESSION_KEY, SETTINGS_KEY};

mod thread;
pub use thread::{CommentNode, CommentTree, Reply, Thread};

pub mod api {
    pub use folio_api::*;
}
