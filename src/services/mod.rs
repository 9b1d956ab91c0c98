//! Domain mock services.
//!
//! Each service owns one or two collections and performs single-step
//! read-modify-write cycles against them: load the whole key, filter/sort/mutate
//! in memory, write the whole key back. Nothing here spans keys atomically; two
//! overlapping writers to the same key resolve as last-write-wins.

pub mod admin_notification_service;
pub mod adopter_service;
pub mod emergency_contact_service;
pub mod notification_service;
pub mod reminder_service;
pub mod user_statistics_service;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::environment::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use crate::key_value_store::KeyValueStore;
use crate::local_db_model::{Identified, UserStatistics};
use crate::repository::{Collection, Document};
use crate::seed_data;

pub use admin_notification_service::{AdminNotificationService, NotificationStats};
pub use adopter_service::AdopterService;
pub use emergency_contact_service::EmergencyContactService;
pub use notification_service::NotificationService;
pub use reminder_service::{reminder_status, CompletedReminder, ReminderService};
pub use user_statistics_service::UserStatisticsService;

pub const REMINDERS_KEY: &str = "petpal_reminders";
pub const NOTIFICATIONS_KEY: &str = "petpal_notifications";
pub const EMERGENCY_CONTACTS_KEY: &str = "petpal_emergency_contacts";
pub const USER_STATISTICS_KEY: &str = "petpal_user_statistics";
pub const USER_ACTIVITY_KEY: &str = "petpal_user_activity";
pub const ADOPTERS_KEY: &str = "petpal_adopters";
pub const ADOPTED_PETS_KEY: &str = "petpal_adopted_pets";

pub const STORAGE_KEYS: [&str; 7] = [
    REMINDERS_KEY,
    NOTIFICATIONS_KEY,
    EMERGENCY_CONTACTS_KEY,
    USER_STATISTICS_KEY,
    USER_ACTIVITY_KEY,
    ADOPTERS_KEY,
    ADOPTED_PETS_KEY,
];

/// Everything a service needs from its surroundings.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub seed_defaults: bool,
}

impl ServiceContext {
    /// Wall clock, UUID ids, seeding enabled.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGenerator),
            seed_defaults: true,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_seed_defaults(mut self, seed_defaults: bool) -> Self {
        self.seed_defaults = seed_defaults;
        self
    }

    pub(crate) fn collection<T>(&self, key: &'static str, seed: fn() -> Vec<T>) -> Collection<T>
    where
        T: Serialize + DeserializeOwned + Identified,
    {
        Collection::new(Arc::clone(&self.store), key, seed, self.seed_defaults)
    }

    pub(crate) fn statistics(&self) -> Document<UserStatistics> {
        let seed = if self.seed_defaults {
            seed_data::default_statistics
        } else {
            seed_data::empty_statistics
        };
        Document::new(Arc::clone(&self.store), USER_STATISTICS_KEY, seed)
    }
}

/// All PetPal services wired to one store.
#[derive(Clone)]
pub struct PetPal {
    pub reminders: ReminderService,
    pub notifications: NotificationService,
    pub admin_notifications: AdminNotificationService,
    pub emergency_contacts: EmergencyContactService,
    pub statistics: UserStatisticsService,
    pub adopters: AdopterService,
}

impl PetPal {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            reminders: ReminderService::new(ctx),
            notifications: NotificationService::new(ctx),
            admin_notifications: AdminNotificationService::new(ctx),
            emergency_contacts: EmergencyContactService::new(ctx),
            statistics: UserStatisticsService::new(ctx),
            adopters: AdopterService::new(ctx),
        }
    }
}
