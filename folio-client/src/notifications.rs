use std::time::Duration;

use crate::{
    api::{Error, Notification, NotificationId, Page},
    BlogApi,
};

pub const NOTIFICATION_PAGE_SIZE: i64 = 20;

/// How often the unread badge is refreshed while logged in
pub const UNREAD_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Notification inbox of the logged-in user
///
/// Pages are appended as they load, so the list only ever grows until
/// `begin_load(1)` starts over.
#[derive(Clone, Debug, Default)]
pub struct NotificationCenter {
    unread: i64,
    records: Vec<Notification>,
    page: i64,
    total: i64,
    loading: bool,
    notice: Option<String>,
}

impl NotificationCenter {
    pub fn new() -> NotificationCenter {
        NotificationCenter::default()
    }

    pub fn unread(&self) -> i64 {
        self.unread
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.page * NOTIFICATION_PAGE_SIZE < self.total
    }

    pub fn next_page(&self) -> i64 {
        self.page + 1
    }

    pub fn finish_unread(&mut self, result: Result<i64, Error>) {
        match result {
            Ok(n) => self.unread = n.max(0),
            // the badge keeps its last value
            Err(e) => tracing::debug!(error = ?e, "failed to refresh unread count"),
        }
    }

    /// Returns false if a load is already in flight
    pub fn begin_load(&mut self, page: i64) -> bool {
        if self.loading {
            return false;
        }
        if page <= 1 {
            self.records.clear();
            self.page = 0;
            self.total = 0;
        }
        self.loading = true;
        true
    }

    pub fn finish_load(&mut self, result: Result<Page<Notification>, Error>) {
        self.loading = false;
        match result {
            Ok(page) => {
                tracing::debug!(page = page.page, count = page.records.len(), "loaded notifications");
                for n in page.records {
                    if !self.records.iter().any(|r| r.id == n.id) {
                        self.records.push(n);
                    }
                }
                self.page = page.page;
                self.total = page.total;
                self.notice = None;
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to load notifications");
                self.notice = Some(e.user_message("Failed to load notifications"));
            }
        }
    }

    /// Returns the notification to report as read, or `None` if it already is
    pub fn begin_mark_read(&mut self, id: NotificationId) -> Option<NotificationId> {
        let n = self.records.iter_mut().find(|n| n.id == id)?;
        if n.is_read {
            return None;
        }
        n.is_read = true;
        self.unread = (self.unread - 1).max(0);
        Some(id)
    }

    pub fn finish_mark_read(&mut self, id: NotificationId, result: Result<(), Error>) {
        if let Err(e) = result {
            tracing::error!(notification = ?id, error = ?e, "failed to mark notification read");
            if let Some(n) = self.records.iter_mut().find(|n| n.id == id) {
                n.is_read = false;
                self.unread += 1;
            }
            self.notice = Some(e.user_message("Failed to mark notification as read"));
        }
    }

    pub fn finish_mark_all_read(&mut self, result: Result<(), Error>) {
        match result {
            Ok(()) => {
                self.records.iter_mut().for_each(|n| n.is_read = true);
                self.unread = 0;
                self.notice = None;
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to mark all notifications read");
                self.notice = Some(e.user_message("Failed to mark notifications as read"));
            }
        }
    }

    pub async fn refresh_unread<A: BlogApi + ?Sized>(&mut self, api: &A) {
        let res = api.unread_notifications().await;
        self.finish_unread(res);
    }

    pub async fn load<A: BlogApi + ?Sized>(&mut self, api: &A, page: i64) {
        if !self.begin_load(page) {
            return;
        }
        let res = api.list_notifications(page, NOTIFICATION_PAGE_SIZE).await;
        self.finish_load(res);
    }

    pub async fn mark_read<A: BlogApi + ?Sized>(
        &mut self,
        api: &A,
        id: NotificationId,
    ) -> Result<(), Error> {
        let Some(id) = self.begin_mark_read(id) else {
            return Ok(());
        };
        let res = api.mark_notification_read(id).await;
        self.finish_mark_read(id, res.clone());
        res
    }

    pub async fn mark_all_read<A: BlogApi + ?Sized>(&mut self, api: &A) -> Result<(), Error> {
        let res = api.mark_all_notifications_read().await;
        self.finish_mark_all_read(res.clone());
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NotificationType;

    fn notification(id: i64, read: bool) -> Notification {
        Notification {
            id: NotificationId(id),
            recipient_id: None,
            kind: NotificationType::CommentOnPost,
            content: format!("notification {id}"),
            related_post_id: None,
            related_comment_id: None,
            sender_id: None,
            sender_name: None,
            sender_avatar: None,
            is_read: read,
            created_at: None,
        }
    }

    fn page(ids: std::ops::Range<i64>, total: i64, page: i64) -> Page<Notification> {
        Page::new(
            ids.map(|i| notification(i, false)).collect(),
            total,
            page,
            NOTIFICATION_PAGE_SIZE,
        )
    }

    #[test]
    fn pages_are_appended() {
        let mut c = NotificationCenter::new();
        assert!(c.begin_load(1));
        assert!(!c.begin_load(2));
        c.finish_load(Ok(page(0..20, 25, 1)));
        assert!(c.has_more());
        assert_eq!(c.next_page(), 2);
        assert!(c.begin_load(2));
        c.finish_load(Ok(page(20..25, 25, 2)));
        assert_eq!(c.notifications().len(), 25);
        assert!(!c.has_more());

        assert!(c.begin_load(1));
        assert!(c.notifications().is_empty());
    }

    #[test]
    fn mark_read_is_local_first() {
        let mut c = NotificationCenter::new();
        c.finish_unread(Ok(2));
        c.begin_load(1);
        c.finish_load(Ok(page(1..3, 2, 1)));

        let id = c.begin_mark_read(NotificationId(1)).unwrap();
        assert_eq!(c.unread(), 1);
        assert_eq!(c.begin_mark_read(NotificationId(1)), None);
        c.finish_mark_read(id, Err(Error::Network(String::from("offline"))));
        assert!(!c.notifications()[0].is_read);
        assert_eq!(c.unread(), 2);
        assert_eq!(c.notice(), Some("Failed to mark notification as read"));

        c.finish_mark_all_read(Ok(()));
        assert_eq!(c.unread(), 0);
        assert!(c.notifications().iter().all(|n| n.is_read));
    }

    #[test]
    fn failed_unread_refresh_keeps_badge() {
        let mut c = NotificationCenter::new();
        c.finish_unread(Ok(4));
        c.finish_unread(Err(Error::Unauthenticated));
        assert_eq!(c.unread(), 4);
    }
}
