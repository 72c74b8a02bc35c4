mod app;
pub use app::{App, AppMsg, Page};

mod article_editor;
pub use article_editor::ArticleEditorView;

mod comment_item;
pub use comment_item::CommentItem;

mod comment_section;
pub use comment_section::CommentSectionView;

mod confirm_dialog;
pub use confirm_dialog::ConfirmDialogView;

mod login;
pub use login::Login;

mod notifications;
pub use notifications::NotificationsView;

mod post_list;
pub use post_list::PostList;

mod register;
pub use register::Register;

mod toolbar;
pub use toolbar::Toolbar;
