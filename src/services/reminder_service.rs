use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::environment::{Clock, IdGenerator};
use crate::local_db_model::{NewReminder, Reminder, ReminderPatch, ReminderStatus, UserStatistics};
use crate::repository::{Collection, Document};
use crate::seed_data;
use crate::services::{ServiceContext, REMINDERS_KEY};

/// Days ahead (inclusive) that still count as `upcoming`.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Classifies a reminder against `today`.
///
/// Completion wins over any date; otherwise the distance to the due date picks
/// `overdue` (past), `upcoming` (0..=7 days) or `future`.
pub fn reminder_status(reminder: &Reminder, today: NaiveDate) -> ReminderStatus {
    if reminder.completed {
        return ReminderStatus::Completed;
    }
    let days_until_due = (reminder.due_date - today).num_days();
    if days_until_due < 0 {
        ReminderStatus::Overdue
    } else if days_until_due <= UPCOMING_WINDOW_DAYS {
        ReminderStatus::Upcoming
    } else {
        ReminderStatus::Future
    }
}

/// Result of [`ReminderService::complete_reminder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedReminder {
    pub completed: Reminder,
    /// The following occurrence, for recurring reminders.
    pub next: Option<Reminder>,
}

#[derive(Clone)]
pub struct ReminderService {
    reminders: Collection<Reminder>,
    statistics: Document<UserStatistics>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl ReminderService {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            reminders: ctx.collection(REMINDERS_KEY, seed_data::default_reminders),
            statistics: ctx.statistics(),
            clock: Arc::clone(&ctx.clock),
            ids: Arc::clone(&ctx.ids),
        }
    }

    /// Reminders of `user_id`, earliest due date first.
    pub fn get_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, AppResponse> {
        let mut reminders: Vec<Reminder> = self
            .reminders
            .load()?
            .into_iter()
            .filter(|reminder| reminder.user_id == user_id)
            .collect();
        reminders.sort_by_key(|reminder| reminder.due_date);
        debug!("Loaded {} reminders for {}", reminders.len(), user_id);
        Ok(reminders)
    }

    pub fn get_reminders_by_pet(&self, pet_id: &str) -> Result<Vec<Reminder>, AppResponse> {
        let mut reminders: Vec<Reminder> = self
            .reminders
            .load()?
            .into_iter()
            .filter(|reminder| reminder.pet_id == pet_id)
            .collect();
        reminders.sort_by_key(|reminder| reminder.due_date);
        Ok(reminders)
    }

    /// Open reminders of `user_id` that are overdue or due within the week.
    pub fn get_upcoming_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, AppResponse> {
        let today = self.clock.today();
        Ok(self
            .get_reminders(user_id)?
            .into_iter()
            .filter(|reminder| {
                matches!(
                    reminder_status(reminder, today),
                    ReminderStatus::Overdue | ReminderStatus::Upcoming
                )
            })
            .collect())
    }

    pub fn add_reminder(&self, new: NewReminder) -> Result<Reminder, AppResponse> {
        new.validate()?;
        let reminder = Reminder {
            id: self.ids.next_id("rem"),
            pet_id: new.pet_id,
            user_id: new.user_id,
            reminder_type: new.reminder_type,
            title: new.title,
            notes: new.notes,
            due_date: new.due_date,
            recurring: new.recurring,
            recurring_interval: if new.recurring { new.recurring_interval } else { None },
            completed: false,
            completed_date: None,
            created_date: self.clock.today(),
        };
        let created = self.reminders.append(reminder)?;
        info!("Added reminder {} for {}", created.id, created.user_id);
        Ok(created)
    }

    /// Merges `patch` into the reminder with `id`; `None` when it does not exist.
    pub fn update_reminder(&self, id: &str, patch: &ReminderPatch) -> Result<Option<Reminder>, AppResponse> {
        let today = self.clock.today();
        let updated = self.reminders.update(id, |reminder| patch.apply(reminder, today))?;
        if updated.is_none() {
            debug!("update_reminder: no reminder with id {}", id);
        }
        Ok(updated)
    }

    pub fn delete_reminder(&self, id: &str) -> Result<bool, AppResponse> {
        let removed = self.reminders.remove(id)?;
        if removed {
            info!("Deleted reminder {}", id);
        }
        Ok(removed)
    }

    pub fn get_reminder_status(&self, reminder: &Reminder) -> ReminderStatus {
        reminder_status(reminder, self.clock.today())
    }

    /// Marks the reminder done and, when it recurs, schedules the next one.
    ///
    /// Touches the reminders key and then the statistics key; the two writes
    /// are independent.
    pub fn complete_reminder(&self, id: &str) -> Result<Option<CompletedReminder>, AppResponse> {
        let Some(existing) = self.reminders.find(id)? else {
            return Ok(None);
        };
        if existing.completed {
            return Ok(Some(CompletedReminder {
                completed: existing,
                next: None,
            }));
        }

        let Some(completed) = self.update_reminder(id, &ReminderPatch::completed(true))? else {
            return Ok(None);
        };

        let next = match (completed.recurring, completed.recurring_interval) {
            (true, Some(interval)) => {
                let due_date = interval.advance(completed.due_date).ok_or_else(|| {
                    AppResponse::validation(format!("Cannot schedule after {}", completed.due_date))
                })?;
                let next = Reminder {
                    id: self.ids.next_id("rem"),
                    due_date,
                    completed: false,
                    completed_date: None,
                    created_date: self.clock.today(),
                    ..completed.clone()
                };
                Some(self.reminders.append(next)?)
            }
            _ => None,
        };

        let now = self.clock.now();
        self.statistics.modify(|stats| {
            stats.completed_reminders += 1;
            stats.last_updated = now;
        })?;

        info!(
            "Completed reminder {}{}",
            completed.id,
            next.as_ref()
                .map(|n| format!(", next due {}", n.due_date))
                .unwrap_or_default()
        );
        Ok(Some(CompletedReminder { completed, next }))
    }
}
