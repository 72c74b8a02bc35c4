use crate::{time::opt_time, CommentId, PostId, Time, UserId};

/// Number of characters of a comment quoted in a notification
pub const NOTIFICATION_SUMMARY_LEN: usize = 50;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    CommentOnPost,
    ReplyToComment,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub recipient_id: Option<UserId>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub related_post_id: Option<PostId>,
    #[serde(default)]
    pub related_comment_id: Option<CommentId>,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_avatar: Option<String>,
    #[serde(default, alias = "read")]
    pub is_read: bool,
    #[serde(default, with = "opt_time")]
    pub created_at: Option<Time>,
}

impl Notification {
    /// Notifications without a sender come from the system
    pub fn sender_display(&self) -> &str {
        self.sender_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("System")
    }

    pub fn action(&self) -> &'static str {
        match self.kind {
            NotificationType::ReplyToComment => "replied to your comment",
            NotificationType::CommentOnPost => "commented on your post",
            NotificationType::Other => "sent you a notification",
        }
    }
}

/// Quote of a comment for a notification, cut after
/// `NOTIFICATION_SUMMARY_LEN` characters
pub fn quote_comment(content: &str) -> String {
    match content.chars().count() > NOTIFICATION_SUMMARY_LEN {
        false => content.to_string(),
        true => {
            let mut res = content
                .chars()
                .take(NOTIFICATION_SUMMARY_LEN)
                .collect::<String>();
            res.push_str("...");
            res
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_from_backend_json() {
        let n: Notification = serde_json::from_str(
            r#"{
                "id": 3, "recipientId": 1, "type": "REPLY_TO_COMMENT",
                "content": "Someone replied", "relatedPostId": 7, "relatedCommentId": 9,
                "senderId": 2, "senderName": "bob", "read": true,
                "createdAt": "2024-05-01 10:00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(n.kind, NotificationType::ReplyToComment);
        assert_eq!(n.related_post_id, Some(PostId(7)));
        assert!(n.is_read);
        assert_eq!(n.sender_display(), "bob");
        assert_eq!(n.action(), "replied to your comment");
    }

    #[test]
    fn unknown_kinds_and_missing_sender() {
        let n: Notification =
            serde_json::from_str(r#"{"id": 1, "type": "NEW_FOLLOWER", "isRead": false}"#).unwrap();
        assert_eq!(n.kind, NotificationType::Other);
        assert_eq!(n.sender_display(), "System");
    }

    #[test]
    fn quotes_are_cut() {
        assert_eq!(quote_comment("short"), "short");
        let long = "é".repeat(60);
        assert_eq!(quote_comment(&long).chars().count(), NOTIFICATION_SUMMARY_LEN + 3);
    }
}
