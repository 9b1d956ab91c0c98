use std::cmp::Reverse;

use log::debug;

use crate::app_response::AppResponse;
use crate::local_db_model::Notification;
use crate::repository::Collection;
use crate::seed_data;
use crate::services::{ServiceContext, NOTIFICATIONS_KEY};

/// The recipient's view of the notifications collection.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Collection<Notification>,
}

impl NotificationService {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            notifications: ctx.collection(NOTIFICATIONS_KEY, seed_data::default_notifications),
        }
    }

    /// Notifications addressed to `user_id`, newest first.
    pub fn get_user_notifications(&self, user_id: &str) -> Result<Vec<Notification>, AppResponse> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .load()?
            .into_iter()
            .filter(|notification| notification.user_id == user_id)
            .collect();
        notifications.sort_by_key(|notification| Reverse(notification.timestamp));
        Ok(notifications)
    }

    pub fn get_unread_count(&self, user_id: &str) -> Result<usize, AppResponse> {
        Ok(self
            .notifications
            .load()?
            .iter()
            .filter(|notification| notification.user_id == user_id && !notification.read)
            .count())
    }

    /// Returns `false` when no notification has this id.
    pub fn mark_notification_as_read(&self, id: &str) -> Result<bool, AppResponse> {
        let updated = self.notifications.update(id, |notification| {
            notification.read = true;
            Ok(())
        })?;
        Ok(updated.is_some())
    }

    /// Marks every unread notification of `user_id` as read and returns how
    /// many changed.
    pub fn mark_all_as_read(&self, user_id: &str) -> Result<usize, AppResponse> {
        let mut notifications = self.notifications.load()?;
        let mut changed = 0;
        for notification in notifications
            .iter_mut()
            .filter(|notification| notification.user_id == user_id && !notification.read)
        {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.notifications.save(&notifications)?;
        }
        debug!("Marked {} notifications read for {}", changed, user_id);
        Ok(changed)
    }

    pub fn delete_notification(&self, id: &str) -> Result<bool, AppResponse> {
        self.notifications.remove(id)
    }
}
