//! Record types stored in the PetPal collections.
//!
//! Every collection is a JSON array under one storage key; field names are
//! camelCase on the wire so the mobile shell reads them unchanged. Partial
//! updates go through the `*Patch` structs, which enumerate exactly the fields
//! a caller may change.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::app_response::{require_non_empty, AppResponse};

/// Records that live in a keyed collection.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.$field
            }
        })*
    };
}

identified! {
    Reminder => id,
    AdoptedPet => id,
    Adopter => id,
    Notification => id,
    EmergencyContact => id,
    UserActivity => user_id,
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Vaccine,
    Grooming,
    Medication,
    Checkup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInterval {
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringInterval {
    /// The due date one interval after `date`. Month arithmetic clamps to the
    /// last day of the target month (Jan 31 + 1 month = Feb 28/29).
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            RecurringInterval::Weekly => date.checked_add_days(chrono::Days::new(7)),
            RecurringInterval::Monthly => date.checked_add_months(chrono::Months::new(1)),
            RecurringInterval::Yearly => date.checked_add_months(chrono::Months::new(12)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Completed,
    Overdue,
    Upcoming,
    Future,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub pet_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_interval: Option<RecurringInterval>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    pub created_date: NaiveDate,
}

/// Input for creating a reminder; id, completion and creation date are
/// assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub pet_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,
}

impl NewReminder {
    pub fn validate(&self) -> Result<(), AppResponse> {
        require_non_empty("petId", &self.pet_id)?;
        require_non_empty("userId", &self.user_id)?;
        require_non_empty("title", &self.title)?;
        check_recurrence(self.recurring, self.recurring_interval)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    #[serde(default)]
    pub pet_id: Option<String>,
    #[serde(default, rename = "type")]
    pub reminder_type: Option<ReminderType>,
    #[serde(default)]
    pub title: Option<String>,
    /// `null` clears the notes; an absent field leaves them alone.
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl ReminderPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Applies the patch to `reminder`, keeping `completedDate` in step with
    /// `completed`. The reminder is left untouched when validation fails.
    pub fn apply(&self, reminder: &mut Reminder, today: NaiveDate) -> Result<(), AppResponse> {
        let mut next = reminder.clone();
        if let Some(pet_id) = &self.pet_id {
            require_non_empty("petId", pet_id)?;
            next.pet_id = pet_id.clone();
        }
        if let Some(reminder_type) = self.reminder_type {
            next.reminder_type = reminder_type;
        }
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
            next.title = title.clone();
        }
        if let Some(notes) = &self.notes {
            next.notes = notes.clone();
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(recurring) = self.recurring {
            next.recurring = recurring;
        }
        if let Some(interval) = self.recurring_interval {
            next.recurring_interval = Some(interval);
        }
        if !next.recurring {
            next.recurring_interval = None;
        }
        check_recurrence(next.recurring, next.recurring_interval)?;

        match self.completed {
            Some(true) => {
                next.completed = true;
                if next.completed_date.is_none() {
                    next.completed_date = Some(today);
                }
            }
            Some(false) => {
                next.completed = false;
                next.completed_date = None;
            }
            None => {}
        }

        *reminder = next;
        Ok(())
    }
}

/// Keeps an explicit `null` apart from a missing field: missing stays `None`
/// (via `#[serde(default)]`), `null` becomes `Some(None)`.
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn check_recurrence(recurring: bool, interval: Option<RecurringInterval>) -> Result<(), AppResponse> {
    if recurring && interval.is_none() {
        return Err(AppResponse::validation(
            "recurringInterval is required for recurring reminders",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Adopters and adopted pets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adopter {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub adopted_pets: Vec<String>,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptedPet {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u8,
    pub adopter_id: String,
    pub adoption_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelter_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdoptedPet {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: u8,
    pub adopter_id: String,
    #[serde(default)]
    pub adoption_date: Option<NaiveDate>,
    #[serde(default)]
    pub shelter_name: Option<String>,
}

impl NewAdoptedPet {
    pub fn validate(&self) -> Result<(), AppResponse> {
        require_non_empty("name", &self.name)?;
        require_non_empty("species", &self.species)?;
        require_non_empty("adopterId", &self.adopter_id)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Adopter,
    Shelter,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Announcement,
    Reminder,
    Adoption,
    Message,
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(default)]
    pub priority: Priority,
    pub sender_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub user_type: UserType,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    pub data: NotificationData,
}

/// What an admin composes once and fans out to many users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub user_type: UserType,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    pub sender_name: String,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
}

impl NotificationTemplate {
    pub fn validate(&self) -> Result<(), AppResponse> {
        require_non_empty("title", &self.title)?;
        require_non_empty("message", &self.message)?;
        require_non_empty("senderName", &self.sender_name)
    }
}

// ---------------------------------------------------------------------------
// Emergency contacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_veterinarian: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub added_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl EmergencyContact {
    /// Case-insensitive substring match over the searchable text fields.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        let optional = [&self.email, &self.notes];
        [&self.name, &self.relationship, &self.phone_number]
            .into_iter()
            .chain(optional.into_iter().flatten())
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_veterinarian: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewEmergencyContact {
    pub fn validate(&self) -> Result<(), AppResponse> {
        require_non_empty("name", &self.name)?;
        require_non_empty("relationship", &self.relationship)?;
        require_non_empty("phoneNumber", &self.phone_number)
    }
}

/// Mutable contact fields. `id` and `addedDate` are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContactPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub is_veterinarian: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl EmergencyContactPatch {
    pub fn apply(&self, contact: &mut EmergencyContact, now: DateTime<Utc>) -> Result<(), AppResponse> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(relationship) = &self.relationship {
            require_non_empty("relationship", relationship)?;
        }
        if let Some(phone) = &self.phone_number {
            require_non_empty("phoneNumber", phone)?;
        }

        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if let Some(relationship) = &self.relationship {
            contact.relationship = relationship.clone();
        }
        if let Some(phone) = &self.phone_number {
            contact.phone_number = phone.clone();
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(address) = &self.address {
            contact.address = address.clone();
        }
        if let Some(notes) = &self.notes {
            contact.notes = notes.clone();
        }
        if let Some(is_veterinarian) = self.is_veterinarian {
            contact.is_veterinarian = is_veterinarian;
        }
        if let Some(is_active) = self.is_active {
            contact.is_active = is_active;
        }
        contact.last_updated = now.max(contact.added_date);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContactStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub veterinarians: usize,
    pub personal: usize,
}

// ---------------------------------------------------------------------------
// Statistics and activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_users: u64,
    pub total_adopters: u64,
    pub total_shelters: u64,
    pub total_pets: u64,
    pub adopted_pets: u64,
    pub pending_applications: u64,
    pub total_reminders: u64,
    pub completed_reminders: u64,
    pub notifications_sent: u64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatisticsPatch {
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default)]
    pub total_adopters: Option<u64>,
    #[serde(default)]
    pub total_shelters: Option<u64>,
    #[serde(default)]
    pub total_pets: Option<u64>,
    #[serde(default)]
    pub adopted_pets: Option<u64>,
    #[serde(default)]
    pub pending_applications: Option<u64>,
    #[serde(default)]
    pub total_reminders: Option<u64>,
    #[serde(default)]
    pub completed_reminders: Option<u64>,
    #[serde(default)]
    pub notifications_sent: Option<u64>,
}

impl UserStatisticsPatch {
    pub fn apply(&self, stats: &mut UserStatistics, now: DateTime<Utc>) {
        let fields = [
            (self.total_users, &mut stats.total_users),
            (self.total_adopters, &mut stats.total_adopters),
            (self.total_shelters, &mut stats.total_shelters),
            (self.total_pets, &mut stats.total_pets),
            (self.adopted_pets, &mut stats.adopted_pets),
            (self.pending_applications, &mut stats.pending_applications),
            (self.total_reminders, &mut stats.total_reminders),
            (self.completed_reminders, &mut stats.completed_reminders),
            (self.notifications_sent, &mut stats.notifications_sent),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        stats.last_updated = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: String,
    pub last_active: DateTime<Utc>,
    pub session_count: u64,
    /// Seconds.
    pub total_time_spent: u64,
    #[serde(default)]
    pub favorite_features: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub daily_active_users: usize,
    pub weekly_active_users: usize,
    pub monthly_active_users: usize,
    pub average_session_count: f64,
    pub total_tracked_users: usize,
}
