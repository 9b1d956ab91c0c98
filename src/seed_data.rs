//! Default records written to a key the first time it is read.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::local_db_model::{
    AdoptedPet, Adopter, EmergencyContact, Notification, NotificationData, NotificationType,
    Priority, RecurringInterval, Reminder, ReminderType, UserActivity, UserStatistics, UserType,
};

pub const DEMO_USER_ID: &str = "demo-user";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn default_reminders() -> Vec<Reminder> {
    vec![
        Reminder {
            id: "rem-1".to_string(),
            pet_id: "pet-1".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            reminder_type: ReminderType::Vaccine,
            title: "Annual rabies booster".to_string(),
            notes: Some("Bring vaccination card".to_string()),
            due_date: date(2024, 12, 30),
            recurring: true,
            recurring_interval: Some(RecurringInterval::Yearly),
            completed: false,
            completed_date: None,
            created_date: date(2024, 12, 1),
        },
        Reminder {
            id: "rem-2".to_string(),
            pet_id: "pet-1".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            reminder_type: ReminderType::Grooming,
            title: "Bath and nail trim".to_string(),
            notes: None,
            due_date: date(2024, 12, 28),
            recurring: true,
            recurring_interval: Some(RecurringInterval::Monthly),
            completed: false,
            completed_date: None,
            created_date: date(2024, 12, 1),
        },
        Reminder {
            id: "rem-3".to_string(),
            pet_id: "pet-2".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            reminder_type: ReminderType::Medication,
            title: "Heartworm tablet".to_string(),
            notes: Some("Give with food".to_string()),
            due_date: date(2024, 12, 25),
            recurring: true,
            recurring_interval: Some(RecurringInterval::Monthly),
            completed: false,
            completed_date: None,
            created_date: date(2024, 12, 1),
        },
        Reminder {
            id: "rem-4".to_string(),
            pet_id: "pet-3".to_string(),
            user_id: "user-2".to_string(),
            reminder_type: ReminderType::Checkup,
            title: "Six-month wellness exam".to_string(),
            notes: None,
            due_date: date(2025, 1, 5),
            recurring: false,
            recurring_interval: None,
            completed: false,
            completed_date: None,
            created_date: date(2024, 12, 3),
        },
    ]
}

pub fn default_adopters() -> Vec<Adopter> {
    vec![
        Adopter {
            id: DEMO_USER_ID.to_string(),
            name: "Alex Morgan".to_string(),
            email: "alex.morgan@example.com".to_string(),
            phone: Some("+1-555-0142".to_string()),
            adopted_pets: vec!["pet-1".to_string(), "pet-2".to_string()],
            join_date: date(2024, 3, 15),
        },
        Adopter {
            id: "user-2".to_string(),
            name: "Jordan Lee".to_string(),
            email: "jordan.lee@example.com".to_string(),
            phone: None,
            adopted_pets: vec!["pet-3".to_string()],
            join_date: date(2024, 6, 2),
        },
        Adopter {
            id: "user-3".to_string(),
            name: "Sam Rivera".to_string(),
            email: "sam.rivera@example.com".to_string(),
            phone: None,
            adopted_pets: Vec::new(),
            join_date: date(2024, 11, 20),
        },
    ]
}

pub fn default_adopted_pets() -> Vec<AdoptedPet> {
    vec![
        AdoptedPet {
            id: "pet-1".to_string(),
            name: "Buddy".to_string(),
            species: "Dog".to_string(),
            breed: "Golden Retriever".to_string(),
            age: 3,
            adopter_id: DEMO_USER_ID.to_string(),
            adoption_date: date(2024, 4, 2),
            shelter_name: Some("Happy Tails Shelter".to_string()),
        },
        AdoptedPet {
            id: "pet-2".to_string(),
            name: "Whiskers".to_string(),
            species: "Cat".to_string(),
            breed: "Siamese".to_string(),
            age: 2,
            adopter_id: DEMO_USER_ID.to_string(),
            adoption_date: date(2024, 8, 19),
            shelter_name: Some("City Cat Rescue".to_string()),
        },
        AdoptedPet {
            id: "pet-3".to_string(),
            name: "Max".to_string(),
            species: "Dog".to_string(),
            breed: "Beagle".to_string(),
            age: 5,
            adopter_id: "user-2".to_string(),
            adoption_date: date(2024, 7, 11),
            shelter_name: None,
        },
    ]
}

pub fn default_notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "notif-1".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            user_type: UserType::Adopter,
            notification_type: NotificationType::Reminder,
            title: "Vaccine due soon".to_string(),
            message: "Buddy's rabies booster is due on Dec 30.".to_string(),
            timestamp: instant(2024, 12, 20, 9, 0),
            read: false,
            data: NotificationData {
                priority: Priority::High,
                sender_name: "PetPal".to_string(),
            },
        },
        Notification {
            id: "notif-2".to_string(),
            user_id: DEMO_USER_ID.to_string(),
            user_type: UserType::Adopter,
            notification_type: NotificationType::Adoption,
            title: "Adoption complete".to_string(),
            message: "Welcome home, Whiskers!".to_string(),
            timestamp: instant(2024, 8, 19, 15, 30),
            read: true,
            data: NotificationData {
                priority: Priority::Normal,
                sender_name: "City Cat Rescue".to_string(),
            },
        },
        Notification {
            id: "notif-3".to_string(),
            user_id: "user-2".to_string(),
            user_type: UserType::Adopter,
            notification_type: NotificationType::Announcement,
            title: "Holiday adoption event".to_string(),
            message: "Join us on Dec 21 for our holiday adoption fair.".to_string(),
            timestamp: instant(2024, 12, 10, 12, 0),
            read: false,
            data: NotificationData {
                priority: Priority::Low,
                sender_name: "PetPal Admin".to_string(),
            },
        },
    ]
}

pub fn default_emergency_contacts() -> Vec<EmergencyContact> {
    let added = instant(2024, 4, 5, 10, 0);
    vec![
        EmergencyContact {
            id: "contact-1".to_string(),
            name: "Dr. Emily Carter".to_string(),
            relationship: "Primary Veterinarian".to_string(),
            phone_number: "+1-555-0100".to_string(),
            email: Some("emily.carter@greenvalleyvet.com".to_string()),
            address: Some("12 Green Valley Rd".to_string()),
            notes: Some("Open weekdays 8am-6pm".to_string()),
            is_veterinarian: true,
            is_active: true,
            added_date: added,
            last_updated: added,
        },
        EmergencyContact {
            id: "contact-2".to_string(),
            name: "Riverside Animal ER".to_string(),
            relationship: "Emergency Clinic".to_string(),
            phone_number: "+1-555-0199".to_string(),
            email: None,
            address: Some("400 Riverside Ave".to_string()),
            notes: Some("Open 24/7".to_string()),
            is_veterinarian: true,
            is_active: true,
            added_date: added,
            last_updated: added,
        },
        EmergencyContact {
            id: "contact-3".to_string(),
            name: "Chris Morgan".to_string(),
            relationship: "Pet sitter".to_string(),
            phone_number: "+1-555-0175".to_string(),
            email: Some("chris.morgan@example.com".to_string()),
            address: None,
            notes: None,
            is_veterinarian: false,
            is_active: true,
            added_date: added,
            last_updated: added,
        },
    ]
}

pub fn default_statistics() -> UserStatistics {
    UserStatistics {
        total_users: 3,
        total_adopters: 3,
        total_shelters: 2,
        total_pets: 12,
        adopted_pets: 3,
        pending_applications: 4,
        total_reminders: 4,
        completed_reminders: 0,
        notifications_sent: 3,
        last_updated: instant(2024, 12, 1, 0, 0),
    }
}

/// Statistics for a store opened without seed data.
pub fn empty_statistics() -> UserStatistics {
    UserStatistics {
        total_users: 0,
        total_adopters: 0,
        total_shelters: 0,
        total_pets: 0,
        adopted_pets: 0,
        pending_applications: 0,
        total_reminders: 0,
        completed_reminders: 0,
        notifications_sent: 0,
        last_updated: DateTime::<Utc>::default(),
    }
}

pub fn default_user_activity() -> Vec<UserActivity> {
    vec![UserActivity {
        user_id: DEMO_USER_ID.to_string(),
        last_active: instant(2024, 12, 20, 18, 45),
        session_count: 12,
        total_time_spent: 5_400,
        favorite_features: BTreeSet::from(["pets".to_string(), "reminders".to_string()]),
    }]
}
