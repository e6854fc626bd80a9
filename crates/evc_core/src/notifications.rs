use serde::Serialize;

use crate::models::Notification;

/// Notifications, newest first, with a cached unread count.
///
/// `unread_count` is recomputed after every mutation and is never adjusted
/// on its own.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    unread_count: usize,
}

impl NotificationCenter {
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub(crate) fn add(&mut self, notification: Notification) {
        tracing::info!("New notification {}: {}", notification.id, notification.title);
        self.notifications.insert(0, notification);
        self.recount();
    }

    /// Returns whether the notification went from unread to read.
    pub(crate) fn mark_read(&mut self, id: &str) -> bool {
        let changed = match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.is_read => {
                notification.is_read = true;
                true
            }
            _ => false,
        };
        self.recount();
        changed
    }

    pub(crate) fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.is_read = true;
        }
        self.recount();
    }

    pub(crate) fn load(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications;
        self.recount();
    }

    fn recount(&mut self) {
        self.unread_count = self.notifications.iter().filter(|n| !n.is_read).count();
    }
}
