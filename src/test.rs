//! # Test Suite
//!
//! ## Test Categories
//!
//! 1. **Storage**: LMDB-backed `AppDbState` and the in-memory store
//!    (get/set/remove, clear, reset, close, reopen).
//! 2. **Repository**: seeding on first read, corrupted payload fallback,
//!    duplicate ids, stores opened without seed data.
//! 3. **Services**: reminders, notifications, admin notifications, emergency
//!    contacts, statistics/activity and adopters, driven by a fixed clock and
//!    sequential ids over `MemoryStore`.
//! 4. **FFI**: the C-compatible functions, including null pointers, invalid
//!    JSON and calls after the database is closed.
//!
//! LMDB tests run inside `tempfile` directories, so nothing is left behind in
//! the working directory.

#[cfg(test)]
pub mod tests {
    use std::collections::BTreeSet;
    use std::ffi::{CStr, CString};
    use std::sync::Arc;

    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    use crate::app_response::AppResponse;
    use crate::environment::{Clock, FixedClock, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
    use crate::key_value_store::{KeyValueStore, MemoryStore};
    use crate::local_db_model::{
        AdoptedPet, Adopter, EmergencyContactPatch, NewAdoptedPet, NewEmergencyContact, NewReminder,
        Notification, NotificationTemplate, NotificationType, Priority, RecurringInterval, Reminder,
        ReminderPatch, ReminderStatus, ReminderType, UserActivity, UserStatisticsPatch, UserType,
    };
    use crate::local_db_state::AppDbState;
    use crate::services::{
        reminder_status, NotificationStats, PetPal, ServiceContext, NOTIFICATIONS_KEY, REMINDERS_KEY,
        USER_ACTIVITY_KEY, USER_STATISTICS_KEY,
    };
    use crate::store_config::StoreConfig;
    use crate::{
        add_reminder, close_database, create_db, create_db_with_config, delete_notification,
        destroy_db, free_response, get_adopter, get_notification_stats, get_reminder_status,
        get_reminders, get_reminders_by_pet, get_unread_count, get_user_activity, record_adoption,
        reset_database, send_notification_to_all_adopters, send_notification_to_users,
        track_user_activity, update_reminder, PetPalHandle,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    /// Christmas Eve 2024, noon: the seeded demo reminders are all due soon.
    fn test_now() -> DateTime<Utc> {
        at(2024, 12, 24, 12)
    }

    struct Fixture {
        petpal: PetPal,
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
        ctx: ServiceContext,
    }

    fn fixture() -> Fixture {
        fixture_with_seed(true)
    }

    fn fixture_with_seed(seed_defaults: bool) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(test_now()));
        let ctx = ServiceContext::new(store.clone())
            .with_clock(clock.clone())
            .with_id_generator(Arc::new(SequentialIdGenerator::new()))
            .with_seed_defaults(seed_defaults);
        Fixture {
            petpal: PetPal::new(&ctx),
            store,
            clock,
            ctx,
        }
    }

    fn temp_db_name(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().to_string()
    }

    fn reminder_due(due_date: NaiveDate, completed: bool) -> Reminder {
        Reminder {
            id: "rem-test".to_string(),
            pet_id: "pet-1".to_string(),
            user_id: "demo-user".to_string(),
            reminder_type: ReminderType::Checkup,
            title: "Checkup".to_string(),
            notes: None,
            due_date,
            recurring: false,
            recurring_interval: None,
            completed,
            completed_date: if completed { Some(due_date) } else { None },
            created_date: date(2024, 12, 1),
        }
    }

    fn new_reminder(user_id: &str, due_date: NaiveDate) -> NewReminder {
        NewReminder {
            pet_id: "pet-1".to_string(),
            user_id: user_id.to_string(),
            reminder_type: ReminderType::Grooming,
            title: "Brush coat".to_string(),
            notes: None,
            due_date,
            recurring: false,
            recurring_interval: None,
        }
    }

    fn template(title: &str) -> NotificationTemplate {
        NotificationTemplate {
            user_type: UserType::Adopter,
            notification_type: NotificationType::Announcement,
            title: title.to_string(),
            message: "Shelter open house this weekend".to_string(),
            priority: Priority::High,
            sender_name: "PetPal Admin".to_string(),
            scheduled_date: None,
        }
    }

    fn new_contact(name: &str, is_veterinarian: bool) -> NewEmergencyContact {
        NewEmergencyContact {
            name: name.to_string(),
            relationship: "Neighbour".to_string(),
            phone_number: "+1-555-0123".to_string(),
            email: None,
            address: None,
            notes: Some("Has a spare key".to_string()),
            is_veterinarian,
            is_active: true,
        }
    }

    fn features(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    // ===============================
    // STORAGE
    // ===============================

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
        assert_eq!(store.len(), 1);

        assert!(store.remove("key").unwrap());
        assert!(!store.remove("key").unwrap());
    }

    #[test]
    fn test_lmdb_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let db = AppDbState::init(temp_db_name(&dir, "crud")).unwrap();

        assert_eq!(db.get(REMINDERS_KEY).unwrap(), None);
        db.set(REMINDERS_KEY, "[]").unwrap();
        assert_eq!(db.get(REMINDERS_KEY).unwrap().as_deref(), Some("[]"));

        db.set(REMINDERS_KEY, r#"[{"id":"x"}]"#).unwrap();
        assert_eq!(db.get(REMINDERS_KEY).unwrap().as_deref(), Some(r#"[{"id":"x"}]"#));

        assert!(db.remove(REMINDERS_KEY).unwrap());
        assert!(!db.remove(REMINDERS_KEY).unwrap());
        assert_eq!(db.get(REMINDERS_KEY).unwrap(), None);
    }

    #[test]
    fn test_lmdb_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let name = temp_db_name(&dir, "hot_restart");

        {
            let db = AppDbState::init(name.clone()).unwrap();
            db.set("petpal_adopters", r#"[]"#).unwrap();
            db.close_database().unwrap();
        }

        let reopened = AppDbState::init(name).unwrap();
        assert_eq!(reopened.get("petpal_adopters").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_lmdb_clear_all_records() {
        let dir = tempfile::tempdir().unwrap();
        let db = AppDbState::init(temp_db_name(&dir, "clear")).unwrap();
        db.set("a", "1").unwrap();
        db.set("b", "2").unwrap();

        db.clear_all_records().unwrap();

        assert_eq!(db.get("a").unwrap(), None);
        assert_eq!(db.get("b").unwrap(), None);
        assert!(db.is_open());
    }

    #[test]
    fn test_lmdb_close_then_reset() {
        let dir = tempfile::tempdir().unwrap();
        let first = temp_db_name(&dir, "before_reset");
        let db = AppDbState::init(first.clone()).unwrap();
        db.set("a", "1").unwrap();

        db.close_database().unwrap();
        assert!(!db.is_open());
        assert!(matches!(db.get("a"), Err(AppResponse::DatabaseError(_))));
        assert!(matches!(db.set("a", "2"), Err(AppResponse::DatabaseError(_))));
        // closing twice is harmless
        db.close_database().unwrap();

        let second = temp_db_name(&dir, "after_reset");
        db.reset_database(&second).unwrap();
        assert!(db.is_open());
        assert_eq!(db.config().unwrap().name, second);
        assert_eq!(db.get("a").unwrap(), None);
        assert!(!std::path::Path::new(&format!("{first}.lmdb")).exists());
    }

    #[test]
    fn test_reset_with_invalid_name_keeps_store() {
        let dir = tempfile::tempdir().unwrap();
        let name = temp_db_name(&dir, "kept");
        let db = AppDbState::init(name.clone()).unwrap();
        db.set("k", "v").unwrap();

        assert!(matches!(db.reset_database(""), Err(AppResponse::ValidationError(_))));
        assert!(matches!(db.reset_database("   "), Err(AppResponse::ValidationError(_))));

        assert!(db.is_open());
        assert_eq!(db.config().unwrap().name, name);
        assert_eq!(db.get("k").unwrap(), Some("v".to_string()));
        assert!(std::path::Path::new(&format!("{name}.lmdb")).exists());
    }

    #[test]
    fn test_store_config_validation() {
        assert!(StoreConfig::new("").validate().is_err());

        let mut config = StoreConfig::new("petpal");
        config.map_size = 0;
        assert!(matches!(config.validate(), Err(AppResponse::ValidationError(_))));

        let parsed: StoreConfig =
            serde_json::from_str(r#"{"name":"petpal","seedDefaults":false}"#).unwrap();
        assert!(!parsed.seed_defaults);
        assert_eq!(parsed.map_size, crate::store_config::DEFAULT_MAP_SIZE);
    }

    #[test]
    fn test_services_over_lmdb() {
        let dir = tempfile::tempdir().unwrap();
        let name = temp_db_name(&dir, "services");

        {
            let db = Arc::new(AppDbState::init(name.clone()).unwrap());
            let petpal = PetPal::new(&ServiceContext::new(db.clone()));
            assert_eq!(petpal.reminders.get_reminders("demo-user").unwrap().len(), 3);
            assert!(petpal.reminders.delete_reminder("rem-2").unwrap());
            db.close_database().unwrap();
        }

        let db = Arc::new(AppDbState::init(name).unwrap());
        let petpal = PetPal::new(&ServiceContext::new(db));
        let ids: Vec<String> = petpal
            .reminders
            .get_reminders("demo-user")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["rem-3", "rem-1"]);
    }

    // ===============================
    // ENVIRONMENT
    // ===============================

    #[test]
    fn test_id_generators() {
        let sequential = SequentialIdGenerator::new();
        assert_eq!(sequential.next_id("rem"), "rem-000001");
        assert_eq!(sequential.next_id("rem"), "rem-000002");

        let random = UuidIdGenerator;
        let a = random.next_id("notif");
        let b = random.next_id("notif");
        assert_ne!(a, b);
        assert!(a.starts_with("notif-"));
        assert!(a["notif-".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(test_now());
        assert_eq!(clock.today(), date(2024, 12, 24));
        clock.advance(Duration::hours(12));
        assert_eq!(clock.today(), date(2024, 12, 25));
    }

    // ===============================
    // REPOSITORY
    // ===============================

    #[test]
    fn test_first_read_seeds_store() {
        let fx = fixture();
        assert!(fx.store.get(REMINDERS_KEY).unwrap().is_none());

        fx.petpal.reminders.get_reminders("demo-user").unwrap();

        let raw = fx.store.get(REMINDERS_KEY).unwrap().unwrap();
        let stored: Vec<Reminder> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[test]
    fn test_corrupted_payload_falls_back_to_defaults() {
        let fx = fixture();
        fx.store.set(REMINDERS_KEY, "{not json").unwrap();

        let reminders = fx.petpal.reminders.get_reminders("demo-user").unwrap();

        assert_eq!(reminders.len(), 3);
        assert_eq!(fx.store.get(REMINDERS_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let fx = fixture();
        let reminders = fx
            .ctx
            .collection(REMINDERS_KEY, crate::seed_data::default_reminders);

        let mut duplicate = reminder_due(date(2025, 1, 1), false);
        duplicate.id = "rem-1".to_string();
        assert!(matches!(
            reminders.append(duplicate.clone()),
            Err(AppResponse::ValidationError(_))
        ));

        duplicate.id = "rem-unique".to_string();
        assert_eq!(reminders.append(duplicate).unwrap().id, "rem-unique");
    }

    #[test]
    fn test_unseeded_store_starts_empty() {
        let fx = fixture_with_seed(false);

        assert!(fx.petpal.reminders.get_reminders("demo-user").unwrap().is_empty());
        assert!(fx.petpal.emergency_contacts.get_emergency_contacts().unwrap().is_empty());
        let stats = fx.petpal.statistics.get_user_statistics().unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.notifications_sent, 0);
        // nothing written for empty defaults
        assert!(fx.store.get(REMINDERS_KEY).unwrap().is_none());
    }

    // ===============================
    // REMINDERS
    // ===============================

    #[test]
    fn test_default_reminders_sorted_by_due_date() {
        let fx = fixture();
        let ids: Vec<String> = fx
            .petpal
            .reminders
            .get_reminders("demo-user")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["rem-3", "rem-2", "rem-1"]);
    }

    #[test]
    fn test_reminder_status_completed_wins() {
        let today = date(2024, 12, 24);
        for offset in [-30, -1, 0, 7, 8, 365] {
            let reminder = reminder_due(today + Duration::days(offset), true);
            assert_eq!(reminder_status(&reminder, today), ReminderStatus::Completed);
        }
    }

    #[test]
    fn test_reminder_status_windows() {
        let today = date(2024, 12, 24);
        let status = |offset: i64| reminder_status(&reminder_due(today + Duration::days(offset), false), today);

        assert_eq!(status(-1), ReminderStatus::Overdue);
        assert_eq!(status(0), ReminderStatus::Upcoming);
        assert_eq!(status(7), ReminderStatus::Upcoming);
        assert_eq!(status(8), ReminderStatus::Future);
    }

    #[test]
    fn test_get_reminder_status_uses_clock() {
        let fx = fixture();
        let reminder = reminder_due(date(2024, 12, 31), false);
        assert_eq!(fx.petpal.reminders.get_reminder_status(&reminder), ReminderStatus::Upcoming);

        fx.clock.advance(Duration::days(8));
        assert_eq!(fx.petpal.reminders.get_reminder_status(&reminder), ReminderStatus::Overdue);
    }

    #[test]
    fn test_add_reminder_appears_once() {
        let fx = fixture();
        let created = fx
            .petpal
            .reminders
            .add_reminder(new_reminder("demo-user", date(2025, 2, 1)))
            .unwrap();

        assert_eq!(created.id, "rem-000001");
        assert!(!created.completed);
        assert_eq!(created.completed_date, None);
        assert_eq!(created.created_date, date(2024, 12, 24));

        let reminders = fx.petpal.reminders.get_reminders("demo-user").unwrap();
        assert_eq!(reminders.iter().filter(|r| r.id == created.id).count(), 1);
        assert_eq!(reminders.last().unwrap().id, created.id);

        let second = fx
            .petpal
            .reminders
            .add_reminder(new_reminder("demo-user", date(2025, 2, 2)))
            .unwrap();
        assert_ne!(second.id, created.id);
    }

    #[test]
    fn test_add_reminder_validation() {
        let fx = fixture();

        let mut missing_interval = new_reminder("demo-user", date(2025, 1, 1));
        missing_interval.recurring = true;
        assert!(matches!(
            fx.petpal.reminders.add_reminder(missing_interval),
            Err(AppResponse::ValidationError(_))
        ));

        let blank_title = NewReminder {
            title: "   ".to_string(),
            ..new_reminder("demo-user", date(2025, 1, 1))
        };
        assert!(fx.petpal.reminders.add_reminder(blank_title).is_err());

        let mut stray_interval = new_reminder("demo-user", date(2025, 1, 1));
        stray_interval.recurring_interval = Some(RecurringInterval::Weekly);
        let created = fx.petpal.reminders.add_reminder(stray_interval).unwrap();
        assert_eq!(created.recurring_interval, None);
    }

    #[test]
    fn test_update_reminder_completion_toggles_date() {
        let fx = fixture();

        let done = fx
            .petpal
            .reminders
            .update_reminder("rem-1", &ReminderPatch::completed(true))
            .unwrap()
            .unwrap();
        assert!(done.completed);
        assert_eq!(done.completed_date, Some(date(2024, 12, 24)));

        // completing again keeps the original completion date
        fx.clock.advance(Duration::days(2));
        let again = fx
            .petpal
            .reminders
            .update_reminder("rem-1", &ReminderPatch::completed(true))
            .unwrap()
            .unwrap();
        assert_eq!(again.completed_date, Some(date(2024, 12, 24)));

        let reopened = fx
            .petpal
            .reminders
            .update_reminder("rem-1", &ReminderPatch::completed(false))
            .unwrap()
            .unwrap();
        assert!(!reopened.completed);
        assert_eq!(reopened.completed_date, None);

        let raw = fx.store.get(REMINDERS_KEY).unwrap().unwrap();
        assert!(!raw.contains("completedDate"));
    }

    #[test]
    fn test_update_reminder_fields_and_missing_id() {
        let fx = fixture();
        let patch = ReminderPatch {
            title: Some("Rabies booster (3-year)".to_string()),
            due_date: Some(date(2025, 1, 10)),
            recurring: Some(false),
            ..ReminderPatch::default()
        };

        let updated = fx.petpal.reminders.update_reminder("rem-1", &patch).unwrap().unwrap();
        assert_eq!(updated.title, "Rabies booster (3-year)");
        assert_eq!(updated.due_date, date(2025, 1, 10));
        assert!(!updated.recurring);
        assert_eq!(updated.recurring_interval, None);
        assert_eq!(updated.id, "rem-1");

        assert_eq!(fx.petpal.reminders.update_reminder("rem-404", &patch).unwrap(), None);

        let invalid = ReminderPatch {
            recurring: Some(true),
            ..ReminderPatch::default()
        };
        assert!(matches!(
            fx.petpal.reminders.update_reminder("rem-4", &invalid),
            Err(AppResponse::ValidationError(_))
        ));
        let untouched = fx.petpal.reminders.get_reminders("user-2").unwrap();
        assert!(!untouched[0].recurring);
    }

    #[test]
    fn test_non_recurring_reminder_drops_interval() {
        let fx = fixture();
        let switch_off = ReminderPatch {
            recurring: Some(false),
            recurring_interval: Some(RecurringInterval::Weekly),
            ..ReminderPatch::default()
        };
        let rem1 = fx.petpal.reminders.update_reminder("rem-1", &switch_off).unwrap().unwrap();
        assert!(!rem1.recurring);
        assert_eq!(rem1.recurring_interval, None);

        // rem-4 is a one-off checkup
        let interval_only = ReminderPatch {
            recurring_interval: Some(RecurringInterval::Monthly),
            ..ReminderPatch::default()
        };
        let rem4 = fx.petpal.reminders.update_reminder("rem-4", &interval_only).unwrap().unwrap();
        assert!(!rem4.recurring);
        assert_eq!(rem4.recurring_interval, None);

        let raw = fx.store.get(REMINDERS_KEY).unwrap().unwrap();
        let stored: Vec<Reminder> = serde_json::from_str(&raw).unwrap();
        assert!(stored
            .iter()
            .filter(|r| !r.recurring)
            .all(|r| r.recurring_interval.is_none()));

        let switch_on = ReminderPatch {
            recurring: Some(true),
            recurring_interval: Some(RecurringInterval::Yearly),
            ..ReminderPatch::default()
        };
        let rem4 = fx.petpal.reminders.update_reminder("rem-4", &switch_on).unwrap().unwrap();
        assert!(rem4.recurring);
        assert_eq!(rem4.recurring_interval, Some(RecurringInterval::Yearly));
    }

    #[test]
    fn test_patch_null_clears_optional_text() {
        let fx = fixture();
        let keep: ReminderPatch = serde_json::from_str(r#"{"title":"Rabies shot"}"#).unwrap();
        assert_eq!(keep.notes, None);
        let clear: ReminderPatch = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        assert_eq!(clear.notes, Some(None));

        let set = ReminderPatch {
            notes: Some(Some("Bring vaccination card".to_string())),
            ..ReminderPatch::default()
        };
        let noted = fx.petpal.reminders.update_reminder("rem-1", &set).unwrap().unwrap();
        assert_eq!(noted.notes.as_deref(), Some("Bring vaccination card"));

        let retitled = fx.petpal.reminders.update_reminder("rem-1", &keep).unwrap().unwrap();
        assert_eq!(retitled.notes.as_deref(), Some("Bring vaccination card"));

        let cleared = fx.petpal.reminders.update_reminder("rem-1", &clear).unwrap().unwrap();
        assert_eq!(cleared.notes, None);
        assert_eq!(cleared.title, "Rabies shot");

        let patch: EmergencyContactPatch = serde_json::from_str(r#"{"email":null,"notes":null}"#).unwrap();
        let contact = fx
            .petpal
            .emergency_contacts
            .update_emergency_contact("contact-1", &patch)
            .unwrap()
            .unwrap();
        assert_eq!(contact.email, None);
        assert_eq!(contact.notes, None);
        assert_eq!(contact.address.as_deref(), Some("12 Green Valley Rd"));
        assert_eq!(contact.name, "Dr. Emily Carter");
    }

    #[test]
    fn test_delete_missing_reminder_leaves_collection() {
        let fx = fixture();
        fx.petpal.reminders.get_reminders("demo-user").unwrap();
        let before = fx.store.get(REMINDERS_KEY).unwrap();

        assert!(!fx.petpal.reminders.delete_reminder("rem-404").unwrap());
        assert_eq!(fx.store.get(REMINDERS_KEY).unwrap(), before);

        assert!(fx.petpal.reminders.delete_reminder("rem-2").unwrap());
        assert_eq!(fx.petpal.reminders.get_reminders("demo-user").unwrap().len(), 2);
    }

    #[test]
    fn test_reminders_by_pet_and_upcoming() {
        let fx = fixture();
        let for_buddy = fx.petpal.reminders.get_reminders_by_pet("pet-1").unwrap();
        assert_eq!(
            for_buddy.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["rem-2", "rem-1"]
        );

        fx.petpal
            .reminders
            .add_reminder(new_reminder("demo-user", date(2025, 3, 1)))
            .unwrap();
        fx.petpal
            .reminders
            .update_reminder("rem-2", &ReminderPatch::completed(true))
            .unwrap();

        let upcoming: Vec<String> = fx
            .petpal
            .reminders
            .get_upcoming_reminders("demo-user")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(upcoming, vec!["rem-3", "rem-1"]);
    }

    #[test]
    fn test_complete_recurring_reminder_schedules_next() {
        let fx = fixture();
        let result = fx.petpal.reminders.complete_reminder("rem-3").unwrap().unwrap();

        assert!(result.completed.completed);
        assert_eq!(result.completed.completed_date, Some(date(2024, 12, 24)));
        let next = result.next.unwrap();
        assert_eq!(next.id, "rem-000001");
        assert_eq!(next.due_date, date(2025, 1, 25));
        assert_eq!(next.pet_id, "pet-2");
        assert!(!next.completed);
        assert_eq!(next.recurring_interval, Some(RecurringInterval::Monthly));

        let stats = fx.petpal.statistics.get_user_statistics().unwrap();
        assert_eq!(stats.completed_reminders, 1);
        assert_eq!(stats.last_updated, test_now());

        // a second completion is a no-op
        let repeat = fx.petpal.reminders.complete_reminder("rem-3").unwrap().unwrap();
        assert!(repeat.next.is_none());
        assert_eq!(fx.petpal.statistics.get_user_statistics().unwrap().completed_reminders, 1);
        assert_eq!(fx.petpal.reminders.get_reminders("demo-user").unwrap().len(), 4);
    }

    #[test]
    fn test_complete_one_off_and_missing_reminder() {
        let fx = fixture();
        let result = fx.petpal.reminders.complete_reminder("rem-4").unwrap().unwrap();
        assert!(result.next.is_none());
        assert!(fx.petpal.reminders.complete_reminder("rem-404").unwrap().is_none());
    }

    #[test]
    fn test_recurring_interval_advance() {
        assert_eq!(RecurringInterval::Weekly.advance(date(2024, 12, 28)), Some(date(2025, 1, 4)));
        assert_eq!(RecurringInterval::Monthly.advance(date(2025, 1, 31)), Some(date(2025, 2, 28)));
        assert_eq!(RecurringInterval::Yearly.advance(date(2024, 2, 29)), Some(date(2025, 2, 28)));
    }

    // ===============================
    // NOTIFICATIONS
    // ===============================

    #[test]
    fn test_send_notification_to_users() {
        let fx = fixture();
        let recipients = vec!["demo-user".to_string(), "user-3".to_string()];

        let sent = fx
            .petpal
            .admin_notifications
            .send_notification_to_users(&recipients, &template("Open house"))
            .unwrap();

        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|n| !n.read && n.timestamp == test_now()));
        assert_ne!(sent[0].id, sent[1].id);
        assert_eq!(sent[1].data.sender_name, "PetPal Admin");

        let for_sam = fx.petpal.notifications.get_user_notifications("user-3").unwrap();
        assert_eq!(for_sam.len(), 1);
        assert_eq!(for_sam[0].title, "Open house");

        let for_demo = fx.petpal.notifications.get_user_notifications("demo-user").unwrap();
        assert_eq!(
            for_demo.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            vec![sent[0].id.as_str(), "notif-1", "notif-2"]
        );

        let stats = fx.petpal.statistics.get_user_statistics().unwrap();
        assert_eq!(stats.notifications_sent, 5);
    }

    #[test]
    fn test_scheduled_notification_keeps_date() {
        let fx = fixture();
        let scheduled = at(2025, 1, 2, 9);
        let mut scheduled_template = template("New year checkups");
        scheduled_template.scheduled_date = Some(scheduled);

        let sent = fx
            .petpal
            .admin_notifications
            .send_notification_to_users(&["user-2".to_string()], &scheduled_template)
            .unwrap();
        assert_eq!(sent[0].timestamp, scheduled);
    }

    #[test]
    fn test_send_notification_edge_cases() {
        let fx = fixture();
        let none = fx
            .petpal
            .admin_notifications
            .send_notification_to_users(&[], &template("Nobody"))
            .unwrap();
        assert!(none.is_empty());
        assert!(fx.store.get(NOTIFICATIONS_KEY).unwrap().is_none());
        assert!(fx.store.get(USER_STATISTICS_KEY).unwrap().is_none());

        let blank = template("  ");
        assert!(matches!(
            fx.petpal
                .admin_notifications
                .send_notification_to_users(&["user-2".to_string()], &blank),
            Err(AppResponse::ValidationError(_))
        ));

        assert!(fx
            .petpal
            .admin_notifications
            .send_notification_to_users(&["".to_string()], &template("Empty id"))
            .is_err());
    }

    #[test]
    fn test_mark_notifications_read() {
        let fx = fixture();
        assert_eq!(fx.petpal.notifications.get_unread_count("demo-user").unwrap(), 1);

        assert!(fx.petpal.notifications.mark_notification_as_read("notif-1").unwrap());
        assert_eq!(fx.petpal.notifications.get_unread_count("demo-user").unwrap(), 0);
        assert!(!fx.petpal.notifications.mark_notification_as_read("notif-404").unwrap());

        assert_eq!(fx.petpal.notifications.mark_all_as_read("user-2").unwrap(), 1);
        assert_eq!(fx.petpal.notifications.mark_all_as_read("user-2").unwrap(), 0);

        assert!(fx.petpal.notifications.delete_notification("notif-2").unwrap());
        assert_eq!(fx.petpal.notifications.get_user_notifications("demo-user").unwrap().len(), 1);
    }

    #[test]
    fn test_notification_history_and_stats() {
        let fx = fixture();
        let stats = fx.petpal.admin_notifications.get_notification_stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.read, 1);
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.by_type.get(&NotificationType::Reminder), Some(&1));
        assert_eq!(stats.by_type.get(&NotificationType::Announcement), Some(&1));

        let sent = fx
            .petpal
            .admin_notifications
            .send_notification_to_all_adopters(&template("Holiday hours"))
            .unwrap();
        assert_eq!(sent.len(), 3);

        let history = fx.petpal.admin_notifications.get_notification_history().unwrap();
        assert_eq!(history.len(), 6);
        assert!(history.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[test]
    fn test_notification_read_defaults_false() {
        let json = r#"{
            "id": "n-1", "userId": "u", "userType": "shelter", "type": "message",
            "title": "t", "message": "m", "timestamp": "2024-12-24T12:00:00Z",
            "data": {"senderName": "Shelter"}
        }"#;
        let notification: Notification = serde_json::from_str(json).unwrap();
        assert!(!notification.read);
        assert_eq!(notification.data.priority, Priority::Normal);
    }

    // ===============================
    // EMERGENCY CONTACTS
    // ===============================

    #[test]
    fn test_add_and_update_emergency_contact_dates() {
        let fx = fixture();
        let created = fx
            .petpal
            .emergency_contacts
            .add_emergency_contact(new_contact("Pat Quinn", false))
            .unwrap();
        assert_eq!(created.id, "contact-000001");
        assert_eq!(created.added_date, test_now());
        assert_eq!(created.last_updated, test_now());

        fx.clock.advance(Duration::hours(1));
        let patch = EmergencyContactPatch {
            name: Some("Pat Quinn-Lee".to_string()),
            ..EmergencyContactPatch::default()
        };
        let updated = fx
            .petpal
            .emergency_contacts
            .update_emergency_contact(&created.id, &patch)
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Pat Quinn-Lee");
        assert_eq!(updated.added_date, test_now());
        assert_eq!(updated.last_updated, test_now() + Duration::hours(1));

        // a clock behind addedDate never produces lastUpdated < addedDate
        fx.clock.set(test_now() - Duration::days(1));
        let rewound = fx
            .petpal
            .emergency_contacts
            .update_emergency_contact(&created.id, &EmergencyContactPatch::default())
            .unwrap()
            .unwrap();
        assert_eq!(rewound.last_updated, rewound.added_date);

        let fetched = fx
            .petpal
            .emergency_contacts
            .get_emergency_contact_by_id(&created.id)
            .unwrap()
            .unwrap();
        assert_eq!(fetched, rewound);
    }

    #[test]
    fn test_emergency_contact_validation_and_missing() {
        let fx = fixture();
        assert!(matches!(
            fx.petpal.emergency_contacts.add_emergency_contact(new_contact("", false)),
            Err(AppResponse::ValidationError(_))
        ));

        let blank_phone = EmergencyContactPatch {
            phone_number: Some(String::new()),
            ..EmergencyContactPatch::default()
        };
        assert!(fx
            .petpal
            .emergency_contacts
            .update_emergency_contact("contact-1", &blank_phone)
            .is_err());
        assert!(fx
            .petpal
            .emergency_contacts
            .update_emergency_contact("contact-404", &EmergencyContactPatch::default())
            .unwrap()
            .is_none());

        assert!(fx.petpal.emergency_contacts.delete_emergency_contact("contact-3").unwrap());
        assert!(!fx.petpal.emergency_contacts.delete_emergency_contact("contact-3").unwrap());
        assert!(fx
            .petpal
            .emergency_contacts
            .get_emergency_contact_by_id("contact-3")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_search_emergency_contacts() {
        let fx = fixture();
        let search = |q: &str| -> Vec<String> {
            fx.petpal
                .emergency_contacts
                .search_emergency_contacts(q)
                .unwrap()
                .into_iter()
                .map(|c| c.id)
                .collect()
        };

        assert_eq!(search("EMILY"), vec!["contact-1"]);
        assert_eq!(search("24/7"), vec!["contact-2"]);
        assert_eq!(search("sitter"), vec!["contact-3"]);
        assert_eq!(search("555").len(), 3);
        assert_eq!(search("  ").len(), 3);
        assert!(search("zebra").is_empty());
    }

    #[test]
    fn test_veterinarians_and_stats() {
        let fx = fixture();
        assert_eq!(fx.petpal.emergency_contacts.get_veterinarian_contacts().unwrap().len(), 2);

        let deactivate = EmergencyContactPatch {
            is_active: Some(false),
            ..EmergencyContactPatch::default()
        };
        fx.petpal
            .emergency_contacts
            .update_emergency_contact("contact-2", &deactivate)
            .unwrap();

        let vets = fx.petpal.emergency_contacts.get_veterinarian_contacts().unwrap();
        assert_eq!(vets.len(), 1);
        assert_eq!(vets[0].id, "contact-1");

        let stats = fx.petpal.emergency_contacts.get_emergency_contacts_stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.veterinarians, 1);
        assert_eq!(stats.personal, 1);
    }

    // ===============================
    // STATISTICS & ACTIVITY
    // ===============================

    #[test]
    fn test_track_user_activity_accumulates() {
        let fx = fixture();
        let first = fx
            .petpal
            .statistics
            .track_user_activity("user-9", 120, &features(&["pets", "reminders"]))
            .unwrap();
        assert_eq!(first.session_count, 1);
        assert_eq!(first.total_time_spent, 120);

        fx.clock.advance(Duration::minutes(30));
        let second = fx
            .petpal
            .statistics
            .track_user_activity("user-9", 300, &features(&["reminders", "messages", "messages"]))
            .unwrap();
        assert_eq!(second.session_count, 2);
        assert_eq!(second.total_time_spent, 420);
        assert_eq!(second.last_active, test_now() + Duration::minutes(30));

        let expected: BTreeSet<String> = features(&["messages", "pets", "reminders"]).into_iter().collect();
        assert_eq!(second.favorite_features, expected);

        let stored = fx.petpal.statistics.get_user_activity("user-9").unwrap().unwrap();
        assert_eq!(stored, second);
        assert!(fx.petpal.statistics.track_user_activity(" ", 1, &[]).is_err());
    }

    #[test]
    fn test_track_user_activity_rejects_overflow() {
        let fx = fixture();
        let first = fx
            .petpal
            .statistics
            .track_user_activity("user-9", u64::MAX, &[])
            .unwrap();
        assert_eq!(first.total_time_spent, u64::MAX);

        assert!(matches!(
            fx.petpal.statistics.track_user_activity("user-9", u64::MAX, &[]),
            Err(AppResponse::ValidationError(_))
        ));
        assert!(matches!(
            fx.petpal.statistics.track_user_activity("user-9", 5, &features(&["pets"])),
            Err(AppResponse::ValidationError(_))
        ));
        assert_eq!(fx.petpal.statistics.get_user_activity("user-9").unwrap().unwrap(), first);

        let maxed = UserActivity {
            user_id: "user-10".to_string(),
            last_active: test_now(),
            session_count: u64::MAX,
            total_time_spent: 0,
            favorite_features: BTreeSet::new(),
        };
        fx.store
            .set(USER_ACTIVITY_KEY, &serde_json::to_string(&vec![maxed.clone()]).unwrap())
            .unwrap();
        assert!(matches!(
            fx.petpal.statistics.track_user_activity("user-10", 1, &[]),
            Err(AppResponse::ValidationError(_))
        ));
        assert_eq!(fx.petpal.statistics.get_user_activity("user-10").unwrap().unwrap(), maxed);
    }

    #[test]
    fn test_engagement_metrics_windows() {
        let fx = fixture();
        // seeded demo-user was last active 2024-12-20 18:45
        fx.petpal.statistics.track_user_activity("user-9", 60, &[]).unwrap();

        let metrics = fx.petpal.statistics.calculate_engagement_metrics().unwrap();
        assert_eq!(metrics.daily_active_users, 1);
        assert_eq!(metrics.weekly_active_users, 2);
        assert_eq!(metrics.monthly_active_users, 2);
        assert_eq!(metrics.total_tracked_users, 2);
        assert_eq!(metrics.average_session_count, 6.5);

        fx.clock.advance(Duration::days(7));
        let week_later = fx.petpal.statistics.calculate_engagement_metrics().unwrap();
        assert_eq!(week_later.daily_active_users, 0);
        assert_eq!(week_later.weekly_active_users, 1);

        fx.clock.advance(Duration::days(23) + Duration::seconds(1));
        let month_later = fx.petpal.statistics.calculate_engagement_metrics().unwrap();
        assert_eq!(month_later.monthly_active_users, 0);
    }

    #[test]
    fn test_engagement_average_rounding() {
        let fx = fixture_with_seed(false);
        let empty = fx.petpal.statistics.calculate_engagement_metrics().unwrap();
        assert_eq!(empty.average_session_count, 0.0);

        for user in ["a", "b", "c", "c"] {
            fx.petpal.statistics.track_user_activity(user, 10, &[]).unwrap();
        }
        let metrics = fx.petpal.statistics.calculate_engagement_metrics().unwrap();
        assert_eq!(metrics.average_session_count, 1.33);
    }

    #[test]
    fn test_update_user_statistics_is_partial() {
        let fx = fixture();
        fx.clock.advance(Duration::hours(2));
        let patch = UserStatisticsPatch {
            total_pets: Some(20),
            pending_applications: Some(0),
            ..UserStatisticsPatch::default()
        };

        let updated = fx.petpal.statistics.update_user_statistics(&patch).unwrap();
        assert_eq!(updated.total_pets, 20);
        assert_eq!(updated.pending_applications, 0);
        assert_eq!(updated.total_users, 3);
        assert_eq!(updated.last_updated, test_now() + Duration::hours(2));
        assert_eq!(fx.petpal.statistics.get_user_statistics().unwrap(), updated);
    }

    // ===============================
    // ADOPTERS
    // ===============================

    #[test]
    fn test_adopted_pets_partitioned_by_adopter() {
        let fx = fixture();
        assert_eq!(fx.petpal.adopters.get_adopters().unwrap().len(), 3);
        assert_eq!(fx.petpal.adopters.get_adopted_pets("demo-user").unwrap().len(), 2);
        assert_eq!(fx.petpal.adopters.get_adopted_pets("user-2").unwrap().len(), 1);
        assert!(fx.petpal.adopters.get_adopted_pets("user-3").unwrap().is_empty());
    }

    #[test]
    fn test_record_adoption_links_adopter() {
        let fx = fixture();
        let pet: AdoptedPet = fx
            .petpal
            .adopters
            .record_adoption(NewAdoptedPet {
                name: "Pepper".to_string(),
                species: "Rabbit".to_string(),
                breed: "Holland Lop".to_string(),
                age: 1,
                adopter_id: "user-3".to_string(),
                adoption_date: None,
                shelter_name: Some("Happy Tails Shelter".to_string()),
            })
            .unwrap();

        assert_eq!(pet.id, "pet-000001");
        assert_eq!(pet.adoption_date, date(2024, 12, 24));
        let adopter = fx.petpal.adopters.get_adopter("user-3").unwrap().unwrap();
        assert_eq!(adopter.adopted_pets, vec![pet.id.clone()]);
        assert_eq!(fx.petpal.adopters.get_adopted_pets("user-3").unwrap(), vec![pet]);

        let orphan = NewAdoptedPet {
            name: "Ghost".to_string(),
            species: "Cat".to_string(),
            breed: "Unknown".to_string(),
            age: 4,
            adopter_id: "user-404".to_string(),
            adoption_date: None,
            shelter_name: None,
        };
        assert!(matches!(
            fx.petpal.adopters.record_adoption(orphan),
            Err(AppResponse::NotFound(_))
        ));
    }

    // ===============================
    // FFI
    // ===============================

    fn take_response(ptr: *const std::os::raw::c_char) -> AppResponse {
        assert!(!ptr.is_null(), "FFI returned a null response");
        let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        free_response(ptr);
        serde_json::from_str(&json).unwrap()
    }

    fn ok_payload<T: serde::de::DeserializeOwned>(response: AppResponse) -> T {
        match response {
            AppResponse::Ok(payload) => serde_json::from_str(&payload).unwrap(),
            other => panic!("expected Ok response, got {other:?}"),
        }
    }

    fn release(handle: *mut PetPalHandle) {
        assert!(take_response(destroy_db(handle)).is_ok());
    }

    #[test]
    fn test_ffi_create_db_null_and_invalid() {
        assert!(create_db(std::ptr::null()).is_null());
        assert!(create_db_with_config(std::ptr::null()).is_null());

        let bad_config = CString::new(r#"{"mapSize":1}"#).unwrap();
        assert!(create_db_with_config(bad_config.as_ptr()).is_null());
    }

    #[test]
    fn test_ffi_reminder_flow() {
        let dir = tempfile::tempdir().unwrap();
        let name = CString::new(temp_db_name(&dir, "ffi_reminders")).unwrap();
        let handle = create_db(name.as_ptr());
        assert!(!handle.is_null());

        let user = CString::new("demo-user").unwrap();
        let reminders: Vec<Reminder> = ok_payload(take_response(get_reminders(handle, user.as_ptr())));
        assert_eq!(reminders.len(), 3);
        assert_eq!(reminders[0].id, "rem-3");

        let body = CString::new(
            r#"{"petId":"pet-2","userId":"demo-user","type":"vaccine","title":"FVRCP","dueDate":"2025-01-15"}"#,
        )
        .unwrap();
        let created: Reminder = ok_payload(take_response(add_reminder(handle, body.as_ptr())));
        assert!(created.id.starts_with("rem-"));

        let id = CString::new(created.id.clone()).unwrap();
        let patch = CString::new(r#"{"completed":true}"#).unwrap();
        let updated: Reminder = ok_payload(take_response(update_reminder(handle, id.as_ptr(), patch.as_ptr())));
        assert!(updated.completed);
        assert!(updated.completed_date.is_some());

        let missing = CString::new("rem-404").unwrap();
        assert!(matches!(
            take_response(update_reminder(handle, missing.as_ptr(), patch.as_ptr())),
            AppResponse::NotFound(_)
        ));

        let reminder_json = CString::new(serde_json::to_string(&updated).unwrap()).unwrap();
        let status: ReminderStatus =
            ok_payload(take_response(get_reminder_status(handle, reminder_json.as_ptr())));
        assert_eq!(status, ReminderStatus::Completed);

        release(handle);
    }

    #[test]
    fn test_ffi_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let name = CString::new(temp_db_name(&dir, "ffi_errors")).unwrap();
        let handle = create_db(name.as_ptr());

        let user = CString::new("demo-user").unwrap();
        assert!(matches!(
            take_response(get_reminders(std::ptr::null_mut(), user.as_ptr())),
            AppResponse::BadRequest(_)
        ));
        assert!(matches!(
            take_response(get_reminders(handle, std::ptr::null())),
            AppResponse::BadRequest(_)
        ));

        let malformed = CString::new("{\"petId\":").unwrap();
        assert!(matches!(
            take_response(add_reminder(handle, malformed.as_ptr())),
            AppResponse::SerializationError(_)
        ));

        let invalid = CString::new(
            r#"{"petId":"pet-1","userId":"demo-user","type":"vaccine","title":"x","dueDate":"2025-01-15","recurring":true}"#,
        )
        .unwrap();
        assert!(matches!(
            take_response(add_reminder(handle, invalid.as_ptr())),
            AppResponse::ValidationError(_)
        ));

        release(handle);
    }

    #[test]
    fn test_ffi_notifications_and_activity() {
        let dir = tempfile::tempdir().unwrap();
        let config = CString::new(format!(
            r#"{{"name":{},"seedDefaults":false}}"#,
            serde_json::to_string(&temp_db_name(&dir, "ffi_admin")).unwrap()
        ))
        .unwrap();
        let handle = create_db_with_config(config.as_ptr());
        assert!(!handle.is_null());

        let body = CString::new(
            r#"{"userIds":["a","b"],"template":{"userType":"adopter","type":"system","title":"Maintenance","message":"Back soon","senderName":"Ops"}}"#,
        )
        .unwrap();
        let sent: Vec<Notification> = ok_payload(take_response(send_notification_to_users(handle, body.as_ptr())));
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|n| n.notification_type == NotificationType::System));

        let activity = CString::new(r#"{"userId":"a","sessionTime":90,"features":["adopt","adopt"]}"#).unwrap();
        let tracked: crate::local_db_model::UserActivity =
            ok_payload(take_response(track_user_activity(handle, activity.as_ptr())));
        assert_eq!(tracked.session_count, 1);
        assert_eq!(tracked.favorite_features.len(), 1);

        let huge = CString::new(r#"{"userId":"a","sessionTime":18446744073709551615}"#).unwrap();
        assert!(matches!(
            take_response(track_user_activity(handle, huge.as_ptr())),
            AppResponse::ValidationError(_)
        ));

        release(handle);
    }

    #[test]
    fn test_ffi_close_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let name = CString::new(temp_db_name(&dir, "ffi_lifecycle")).unwrap();
        let handle = create_db(name.as_ptr());
        let user = CString::new("demo-user").unwrap();

        assert!(take_response(close_database(handle)).is_ok());
        assert!(matches!(
            take_response(get_reminders(handle, user.as_ptr())),
            AppResponse::DatabaseError(_)
        ));

        let fresh = CString::new(temp_db_name(&dir, "ffi_lifecycle_fresh")).unwrap();
        assert!(take_response(reset_database(handle, fresh.as_ptr())).is_ok());
        let reminders: Vec<Reminder> = ok_payload(take_response(get_reminders(handle, user.as_ptr())));
        assert_eq!(reminders.len(), 3);

        release(handle);
    }

    #[test]
    fn test_ffi_service_entry_points() {
        let dir = tempfile::tempdir().unwrap();
        let name = CString::new(temp_db_name(&dir, "ffi_entry_points")).unwrap();
        let handle = create_db(name.as_ptr());
        assert!(!handle.is_null());

        let demo = CString::new("demo-user").unwrap();
        let unread: usize = ok_payload(take_response(get_unread_count(handle, demo.as_ptr())));
        assert_eq!(unread, 1);

        let pet = CString::new("pet-1").unwrap();
        let by_pet: Vec<Reminder> = ok_payload(take_response(get_reminders_by_pet(handle, pet.as_ptr())));
        let ids: Vec<&str> = by_pet.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rem-2", "rem-1"]);

        let notif = CString::new("notif-2").unwrap();
        assert!(take_response(delete_notification(handle, notif.as_ptr())).is_ok());
        assert!(matches!(
            take_response(delete_notification(handle, notif.as_ptr())),
            AppResponse::NotFound(_)
        ));

        let body = CString::new(
            r#"{"userType":"adopter","type":"announcement","title":"Holiday hours","message":"Closed on the 25th","senderName":"PetPal Admin"}"#,
        )
        .unwrap();
        let sent: Vec<Notification> =
            ok_payload(take_response(send_notification_to_all_adopters(handle, body.as_ptr())));
        assert_eq!(sent.len(), 3);

        let stats: NotificationStats = ok_payload(take_response(get_notification_stats(handle)));
        assert_eq!(stats.total, 5);
        assert_eq!(stats.unread, 5);
        assert_eq!(stats.read, 0);

        let activity: UserActivity = ok_payload(take_response(get_user_activity(handle, demo.as_ptr())));
        assert_eq!(activity.session_count, 12);
        let stranger = CString::new("user-404").unwrap();
        assert!(matches!(
            take_response(get_user_activity(handle, stranger.as_ptr())),
            AppResponse::NotFound(_)
        ));
        assert!(matches!(
            take_response(get_adopter(handle, stranger.as_ptr())),
            AppResponse::NotFound(_)
        ));

        let adoption = CString::new(
            r#"{"name":"Pepper","species":"Rabbit","breed":"Holland Lop","age":1,"adopterId":"user-3"}"#,
        )
        .unwrap();
        let adopted: AdoptedPet = ok_payload(take_response(record_adoption(handle, adoption.as_ptr())));
        assert_eq!(adopted.adopter_id, "user-3");

        let sam = CString::new("user-3").unwrap();
        let adopter: Adopter = ok_payload(take_response(get_adopter(handle, sam.as_ptr())));
        assert_eq!(adopter.adopted_pets, vec![adopted.id]);

        release(handle);
    }

    #[test]
    fn test_ffi_destroy_db_releases_handle() {
        assert!(matches!(
            take_response(destroy_db(std::ptr::null_mut())),
            AppResponse::BadRequest(_)
        ));

        let dir = tempfile::tempdir().unwrap();
        let name = CString::new(temp_db_name(&dir, "ffi_destroy")).unwrap();
        let handle = create_db(name.as_ptr());
        let demo = CString::new("demo-user").unwrap();
        let unread: usize = ok_payload(take_response(get_unread_count(handle, demo.as_ptr())));
        assert_eq!(unread, 1);
        let notif = CString::new("notif-1").unwrap();
        assert!(take_response(delete_notification(handle, notif.as_ptr())).is_ok());
        release(handle);

        // the same store opens again once the old handle is gone
        let reopened = create_db(name.as_ptr());
        assert!(!reopened.is_null());
        let unread: usize = ok_payload(take_response(get_unread_count(reopened, demo.as_ptr())));
        assert_eq!(unread, 0);
        release(reopened);
    }
}
