use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_response::{require_non_empty, AppResponse};
use crate::environment::{Clock, IdGenerator};
use crate::local_db_model::{
    Adopter, Notification, NotificationData, NotificationTemplate, NotificationType, UserStatistics,
};
use crate::repository::{Collection, Document};
use crate::seed_data;
use crate::services::{ServiceContext, ADOPTERS_KEY, NOTIFICATIONS_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub read: usize,
    pub by_type: BTreeMap<NotificationType, usize>,
}

/// Admin dashboard side: compose once, fan out to many users.
#[derive(Clone)]
pub struct AdminNotificationService {
    notifications: Collection<Notification>,
    adopters: Collection<Adopter>,
    statistics: Document<UserStatistics>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AdminNotificationService {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            notifications: ctx.collection(NOTIFICATIONS_KEY, seed_data::default_notifications),
            adopters: ctx.collection(ADOPTERS_KEY, seed_data::default_adopters),
            statistics: ctx.statistics(),
            clock: Arc::clone(&ctx.clock),
            ids: Arc::clone(&ctx.ids),
        }
    }

    /// Creates one unread notification per recipient and persists them with a
    /// single write. The timestamp is the template's scheduled date when set.
    pub fn send_notification_to_users(
        &self,
        user_ids: &[String],
        template: &NotificationTemplate,
    ) -> Result<Vec<Notification>, AppResponse> {
        template.validate()?;
        for user_id in user_ids {
            require_non_empty("userId", user_id)?;
        }
        if user_ids.is_empty() {
            warn!("send_notification_to_users called without recipients");
            return Ok(Vec::new());
        }

        let mut notifications = self.notifications.load()?;
        let mut taken: HashSet<String> = notifications.iter().map(|n| n.id.clone()).collect();
        let timestamp = template.scheduled_date.unwrap_or_else(|| self.clock.now());

        let mut created = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let id = self.ids.next_id("notif");
            if !taken.insert(id.clone()) {
                return Err(AppResponse::validation(format!("Duplicate notification id '{id}'")));
            }
            created.push(Notification {
                id,
                user_id: user_id.clone(),
                user_type: template.user_type,
                notification_type: template.notification_type,
                title: template.title.clone(),
                message: template.message.clone(),
                timestamp,
                read: false,
                data: NotificationData {
                    priority: template.priority,
                    sender_name: template.sender_name.clone(),
                },
            });
        }
        notifications.extend(created.iter().cloned());
        self.notifications.save(&notifications)?;

        let sent = created.len() as u64;
        let now = self.clock.now();
        self.statistics.modify(|stats| {
            stats.notifications_sent += sent;
            stats.last_updated = now;
        })?;

        info!("Sent '{}' to {} users", template.title, created.len());
        Ok(created)
    }

    pub fn send_notification_to_all_adopters(
        &self,
        template: &NotificationTemplate,
    ) -> Result<Vec<Notification>, AppResponse> {
        let user_ids: Vec<String> = self.adopters.load()?.into_iter().map(|a| a.id).collect();
        self.send_notification_to_users(&user_ids, template)
    }

    /// Every notification in the store, newest first.
    pub fn get_notification_history(&self) -> Result<Vec<Notification>, AppResponse> {
        let mut notifications = self.notifications.load()?;
        notifications.sort_by_key(|notification| Reverse(notification.timestamp));
        Ok(notifications)
    }

    pub fn get_notification_stats(&self) -> Result<NotificationStats, AppResponse> {
        let notifications = self.notifications.load()?;
        let mut stats = NotificationStats {
            total: notifications.len(),
            ..NotificationStats::default()
        };
        for notification in &notifications {
            if notification.read {
                stats.read += 1;
            } else {
                stats.unread += 1;
            }
            *stats.by_type.entry(notification.notification_type).or_insert(0) += 1;
        }
        Ok(stats)
    }
}
