//! # PetPal Local Store
//!
//! Local persistence and mock domain services for the PetPal pet-adoption app.
//! Collections are JSON documents kept in an LMDB key-value store; services
//! load a collection, filter/sort/mutate it in memory and write it back. A
//! C-compatible surface lets the Flutter / React Native shell call every
//! service with JSON in and JSON out.
//!
//! ## Features
//!
//! - **LMDB-backed storage** with an in-memory [`MemoryStore`](key_value_store::MemoryStore) for tests
//! - **Seeded collections**: absent keys are filled with demo data on first read
//! - **Typed patches** for partial updates instead of free-form object merging
//! - **Injectable clock and id generator** for deterministic behaviour
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use petpal_local_store::key_value_store::MemoryStore;
//! use petpal_local_store::services::{PetPal, ServiceContext};
//!
//! let ctx = ServiceContext::new(Arc::new(MemoryStore::new()));
//! let petpal = PetPal::new(&ctx);
//!
//! let reminders = petpal.reminders.get_reminders("demo-user")?;
//! assert_eq!(reminders[0].id, "rem-3");
//! # Ok::<(), petpal_local_store::app_response::AppResponse>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a heap-allocated JSON [`AppResponse`](app_response::AppResponse)
//! (`{"Ok":"<payload json>"}` on success) that must be released with
//! [`free_response`]:
//!
//! - [`create_db`], [`create_db_with_config`] - open a store and return its handle
//! - reminders: [`get_reminders`], [`get_reminders_by_pet`], [`get_upcoming_reminders`],
//!   [`add_reminder`], [`update_reminder`], [`delete_reminder`], [`complete_reminder`],
//!   [`get_reminder_status`]
//! - notifications: [`get_user_notifications`], [`get_unread_count`], [`mark_notification_as_read`],
//!   [`mark_all_notifications_as_read`], [`delete_notification`], [`send_notification_to_users`],
//!   [`send_notification_to_all_adopters`], [`get_notification_history`], [`get_notification_stats`]
//! - emergency contacts: [`get_emergency_contacts`], [`get_emergency_contact_by_id`],
//!   [`add_emergency_contact`], [`update_emergency_contact`], [`delete_emergency_contact`],
//!   [`get_veterinarian_contacts`], [`search_emergency_contacts`], [`get_emergency_contacts_stats`]
//! - statistics: [`get_user_statistics`], [`update_user_statistics`], [`get_user_activity`],
//!   [`track_user_activity`], [`calculate_engagement_metrics`]
//! - adopters: [`get_adopters`], [`get_adopter`], [`get_adopted_pets`], [`record_adoption`]
//! - lifecycle: [`clear_all_records`], [`reset_database`], [`close_database`], [`destroy_db`]

pub mod app_response;
pub mod environment;
pub mod key_value_store;
pub mod local_db_model;
pub mod local_db_state;
pub mod repository;
pub mod seed_data;
pub mod services;
pub mod store_config;
mod test;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::local_db_model::{
    EmergencyContactPatch, NewAdoptedPet, NewEmergencyContact, NewReminder, NotificationTemplate,
    Reminder, ReminderPatch, UserStatisticsPatch,
};
use crate::local_db_state::AppDbState;
use crate::services::{PetPal, ServiceContext};
use crate::store_config::StoreConfig;

/// Opaque handle returned to the host app: the open store plus the services
/// wired to it.
pub struct PetPalHandle {
    db: Arc<AppDbState>,
    services: PetPal,
}

impl PetPalHandle {
    pub fn open(config: StoreConfig) -> Result<Self, AppResponse> {
        let seed_defaults = config.seed_defaults;
        let db = Arc::new(AppDbState::with_config(config)?);
        let ctx = ServiceContext::new(db.clone()).with_seed_defaults(seed_defaults);
        Ok(Self {
            services: PetPal::new(&ctx),
            db,
        })
    }

    pub fn services(&self) -> &PetPal {
        &self.services
    }

    pub fn db(&self) -> &AppDbState {
        &self.db
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendNotificationRequest {
    user_ids: Vec<String>,
    template: NotificationTemplate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackActivityRequest {
    user_id: String,
    #[serde(default)]
    session_time: u64,
    #[serde(default)]
    features: Vec<String>,
}

/// Opens (or creates) the store `<name>.lmdb` with default settings.
///
/// # Parameters
///
/// * `name` - Null-terminated C string with the database name
///
/// # Returns
///
/// A handle for every other call, or a null pointer when the name is null,
/// not UTF-8, or the environment cannot be opened. Release the handle with
/// [`destroy_db`].
///
/// # Safety
///
/// `name` must be null or a valid C string for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::create_db;
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
/// assert!(!handle.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db(name: *const c_char) -> *mut PetPalHandle {
    if name.is_null() {
        warn!("Null name pointer passed to create_db");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_handle(StoreConfig::new(name_str))
}

/// Opens a store from a JSON [`StoreConfig`].
///
/// # Parameters
///
/// * `config_json` - Null-terminated C string, e.g.
///   `{"name":"petpal","mapSize":20971520,"seedDefaults":false}`
///
/// # Returns
///
/// A handle, or a null pointer for a null pointer, malformed JSON, an invalid
/// config or an environment that cannot be opened. Release it with
/// [`destroy_db`].
///
/// # Safety
///
/// `config_json` must be null or a valid C string for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db_with_config(config_json: *const c_char) -> *mut PetPalHandle {
    let Some(json) = c_ptr_to_str(config_json) else {
        warn!("Null or invalid config pointer passed to create_db_with_config");
        return std::ptr::null_mut();
    };

    match serde_json::from_str::<StoreConfig>(json) {
        Ok(config) => open_handle(config),
        Err(e) => {
            warn!("Invalid store config: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_handle(config: StoreConfig) -> *mut PetPalHandle {
    let lmdb_dir = config.lmdb_dir();
    info!("Attempting to create/open database at: {}", lmdb_dir);

    match PetPalHandle::open(config) {
        Ok(handle) => {
            info!("Database initialized successfully");
            Box::into_raw(Box::new(handle))
        }
        Err(e) => {
            warn!("Failed to initialize database at {}: {}", lmdb_dir, e);
            std::ptr::null_mut()
        }
    }
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

/// Lists the reminders of a user, earliest due date first.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `user_id` - Null-terminated C string with the owner's id
///
/// # Returns
///
/// A JSON [`AppResponse`] whose `Ok` payload is an array of reminders. The
/// returned string must be released with [`free_response`].
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::{create_db, free_response, get_reminders};
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
///
/// let user = CString::new("demo-user").unwrap();
/// let response = get_reminders(handle, user.as_ptr());
/// free_response(response);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_reminders(state: *mut PetPalHandle, user_id: *const c_char) -> *const c_char {
    with_handle(state, "get_reminders", |handle| {
        let user_id = string_arg(user_id, "userId")?;
        to_json(&handle.services.reminders.get_reminders(&user_id)?)
    })
}

/// Lists every reminder attached to a pet, earliest due date first.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `pet_id` - Null-terminated C string with the pet id
///
/// # Returns
///
/// A JSON [`AppResponse`] with an array of reminders (possibly empty).
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_reminders_by_pet(state: *mut PetPalHandle, pet_id: *const c_char) -> *const c_char {
    with_handle(state, "get_reminders_by_pet", |handle| {
        let pet_id = string_arg(pet_id, "petId")?;
        to_json(&handle.services.reminders.get_reminders_by_pet(&pet_id)?)
    })
}

/// Lists the open reminders of a user that are overdue or due within the
/// next seven days.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `user_id` - Null-terminated C string with the owner's id
///
/// # Returns
///
/// A JSON [`AppResponse`] with an array of reminders.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_upcoming_reminders(state: *mut PetPalHandle, user_id: *const c_char) -> *const c_char {
    with_handle(state, "get_upcoming_reminders", |handle| {
        let user_id = string_arg(user_id, "userId")?;
        to_json(&handle.services.reminders.get_upcoming_reminders(&user_id)?)
    })
}

/// Creates a reminder.
///
/// The id, `completed: false` and `createdDate` are assigned here.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string with a [`NewReminder`] body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the stored reminder, `ValidationError` for a
/// blank field or a recurring reminder without an interval, and
/// `SerializationError` for malformed JSON.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::{add_reminder, create_db, free_response};
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
///
/// let body = CString::new(
///     r#"{"petId":"pet-1","userId":"demo-user","type":"grooming","title":"Nail trim","dueDate":"2025-02-01"}"#,
/// ).unwrap();
/// free_response(add_reminder(handle, body.as_ptr()));
/// ```
///
/// # JSON Format
///
/// ```json
/// {
///   "petId": "pet-1",
///   "userId": "demo-user",
///   "type": "vaccine | grooming | medication | checkup",
///   "title": "Rabies booster",
///   "notes": "optional",
///   "dueDate": "2025-01-15",
///   "recurring": true,
///   "recurringInterval": "weekly | monthly | yearly"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_reminder(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "add_reminder", |handle| {
        let new: NewReminder = json_arg(json_ptr)?;
        to_json(&handle.services.reminders.add_reminder(new)?)
    })
}

/// Applies a partial update to a reminder.
///
/// Only the fields present in the body change; `"notes": null` clears the
/// notes. Setting `completed` keeps `completedDate` in step.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the reminder id
/// * `json_ptr` - Null-terminated C string with a [`ReminderPatch`] body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the updated reminder, or `NotFound` when the
/// id is unknown.
///
/// # Safety
///
/// All pointers must be null or valid for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::{create_db, free_response, update_reminder};
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
///
/// let id = CString::new("rem-2").unwrap();
/// let patch = CString::new(r#"{"completed":true}"#).unwrap();
/// free_response(update_reminder(handle, id.as_ptr(), patch.as_ptr()));
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_reminder(
    state: *mut PetPalHandle,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    with_handle(state, "update_reminder", |handle| {
        let id = string_arg(id, "id")?;
        let patch: ReminderPatch = json_arg(json_ptr)?;
        match handle.services.reminders.update_reminder(&id, &patch)? {
            Some(updated) => to_json(&updated),
            None => Err(AppResponse::NotFound(format!("No reminder found with id: {id}"))),
        }
    })
}

/// Deletes a reminder by id.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the reminder id
///
/// # Returns
///
/// `Ok` with a confirmation message, or `NotFound` when nothing was removed.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_reminder(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "delete_reminder", |handle| {
        let id = string_arg(id, "id")?;
        if handle.services.reminders.delete_reminder(&id)? {
            Ok("Reminder deleted successfully".to_string())
        } else {
            Err(AppResponse::NotFound(format!("No reminder found with id: {id}")))
        }
    })
}

/// Marks a reminder completed and schedules its next occurrence when it
/// recurs.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the reminder id
///
/// # Returns
///
/// A JSON [`AppResponse`] with `{"completed":{...},"next":{...}|null}`, or
/// `NotFound` when the id is unknown.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn complete_reminder(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "complete_reminder", |handle| {
        let id = string_arg(id, "id")?;
        match handle.services.reminders.complete_reminder(&id)? {
            Some(result) => to_json(&result),
            None => Err(AppResponse::NotFound(format!("No reminder found with id: {id}"))),
        }
    })
}

/// Classifies a reminder JSON body as `completed`, `overdue`, `upcoming` or
/// `future` against the store's clock. Does not touch storage.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_reminder_status(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "get_reminder_status", |handle| {
        let reminder: Reminder = json_arg(json_ptr)?;
        to_json(&handle.services.reminders.get_reminder_status(&reminder))
    })
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Lists the notifications of a user, newest first.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `user_id` - Null-terminated C string with the recipient's id
///
/// # Returns
///
/// A JSON [`AppResponse`] with an array of notifications.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_user_notifications(state: *mut PetPalHandle, user_id: *const c_char) -> *const c_char {
    with_handle(state, "get_user_notifications", |handle| {
        let user_id = string_arg(user_id, "userId")?;
        to_json(&handle.services.notifications.get_user_notifications(&user_id)?)
    })
}

/// Counts the unread notifications of a user.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `user_id` - Null-terminated C string with the recipient's id
///
/// # Returns
///
/// A JSON [`AppResponse`] whose `Ok` payload is a number.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_unread_count(state: *mut PetPalHandle, user_id: *const c_char) -> *const c_char {
    with_handle(state, "get_unread_count", |handle| {
        let user_id = string_arg(user_id, "userId")?;
        to_json(&handle.services.notifications.get_unread_count(&user_id)?)
    })
}

/// Marks one notification as read.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the notification id
///
/// # Returns
///
/// `Ok` with a confirmation message, or `NotFound` when the id is unknown.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn mark_notification_as_read(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "mark_notification_as_read", |handle| {
        let id = string_arg(id, "id")?;
        if handle.services.notifications.mark_notification_as_read(&id)? {
            Ok("Notification marked as read".to_string())
        } else {
            Err(AppResponse::NotFound(format!("No notification found with id: {id}")))
        }
    })
}

/// Returns the number of notifications that changed.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn mark_all_notifications_as_read(
    state: *mut PetPalHandle,
    user_id: *const c_char,
) -> *const c_char {
    with_handle(state, "mark_all_notifications_as_read", |handle| {
        let user_id = string_arg(user_id, "userId")?;
        to_json(&handle.services.notifications.mark_all_as_read(&user_id)?)
    })
}

/// Deletes a notification by id.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the notification id
///
/// # Returns
///
/// `Ok` with a confirmation message, or `NotFound` when nothing was removed.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_notification(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "delete_notification", |handle| {
        let id = string_arg(id, "id")?;
        if handle.services.notifications.delete_notification(&id)? {
            Ok("Notification deleted successfully".to_string())
        } else {
            Err(AppResponse::NotFound(format!("No notification found with id: {id}")))
        }
    })
}

/// Fans a notification template out to a list of users in a single write.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string with the request body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the created notifications. An empty
/// `userIds` list succeeds with an empty array and writes nothing.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # JSON Format
///
/// ```json
/// {
///   "userIds": ["demo-user", "user-2"],
///   "template": {
///     "userType": "adopter",
///     "type": "announcement",
///     "title": "Adoption day",
///     "message": "Join us on Saturday",
///     "priority": "normal",
///     "senderName": "Happy Tails Shelter",
///     "scheduledDate": null
///   }
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn send_notification_to_users(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "send_notification_to_users", |handle| {
        let request: SendNotificationRequest = json_arg(json_ptr)?;
        let sent = handle
            .services
            .admin_notifications
            .send_notification_to_users(&request.user_ids, &request.template)?;
        to_json(&sent)
    })
}

/// Sends a notification template to every stored adopter.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string with a [`NotificationTemplate`] body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the created notifications.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn send_notification_to_all_adopters(
    state: *mut PetPalHandle,
    json_ptr: *const c_char,
) -> *const c_char {
    with_handle(state, "send_notification_to_all_adopters", |handle| {
        let template: NotificationTemplate = json_arg(json_ptr)?;
        to_json(
            &handle
                .services
                .admin_notifications
                .send_notification_to_all_adopters(&template)?,
        )
    })
}

/// Every stored notification, newest first.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_notification_history(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_notification_history", |handle| {
        to_json(&handle.services.admin_notifications.get_notification_history()?)
    })
}

/// Totals over all notifications: `total`, `read`, `unread` and a `byType`
/// breakdown.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
///
/// # Returns
///
/// A JSON [`AppResponse`] with the statistics object.
///
/// # Safety
///
/// `state` must be null or a live handle.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_notification_stats(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_notification_stats", |handle| {
        to_json(&handle.services.admin_notifications.get_notification_stats()?)
    })
}

// ---------------------------------------------------------------------------
// Emergency contacts
// ---------------------------------------------------------------------------

/// Lists every emergency contact, active or not.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
///
/// # Returns
///
/// A JSON [`AppResponse`] with an array of contacts.
///
/// # Safety
///
/// `state` must be null or a live handle.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_emergency_contacts(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_emergency_contacts", |handle| {
        to_json(&handle.services.emergency_contacts.get_emergency_contacts()?)
    })
}

/// Looks up one emergency contact.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the contact id
///
/// # Returns
///
/// A JSON [`AppResponse`] with the contact, or `NotFound`.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_emergency_contact_by_id(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "get_emergency_contact_by_id", |handle| {
        let id = string_arg(id, "id")?;
        match handle.services.emergency_contacts.get_emergency_contact_by_id(&id)? {
            Some(contact) => to_json(&contact),
            None => Err(AppResponse::NotFound(format!("No emergency contact found with id: {id}"))),
        }
    })
}

/// Creates an emergency contact; `addedDate` and `lastUpdated` are both set
/// to now.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string with a [`NewEmergencyContact`] body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the stored contact, or `ValidationError` when
/// `name`, `relationship` or `phoneNumber` is blank.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::{add_emergency_contact, create_db, free_response};
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
///
/// let body = CString::new(
///     r#"{"name":"Dr. Lee","relationship":"Veterinarian","phoneNumber":"+1-555-0100","isVeterinarian":true}"#,
/// ).unwrap();
/// free_response(add_emergency_contact(handle, body.as_ptr()));
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_emergency_contact(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "add_emergency_contact", |handle| {
        let new: NewEmergencyContact = json_arg(json_ptr)?;
        to_json(&handle.services.emergency_contacts.add_emergency_contact(new)?)
    })
}

/// Applies a partial update to an emergency contact and refreshes
/// `lastUpdated`. `null` for `email`, `address` or `notes` clears the field.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the contact id
/// * `json_ptr` - Null-terminated C string with an [`EmergencyContactPatch`] body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the updated contact, or `NotFound`.
///
/// # Safety
///
/// All pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_emergency_contact(
    state: *mut PetPalHandle,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    with_handle(state, "update_emergency_contact", |handle| {
        let id = string_arg(id, "id")?;
        let patch: EmergencyContactPatch = json_arg(json_ptr)?;
        match handle.services.emergency_contacts.update_emergency_contact(&id, &patch)? {
            Some(contact) => to_json(&contact),
            None => Err(AppResponse::NotFound(format!("No emergency contact found with id: {id}"))),
        }
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_emergency_contact(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "delete_emergency_contact", |handle| {
        let id = string_arg(id, "id")?;
        if handle.services.emergency_contacts.delete_emergency_contact(&id)? {
            Ok("Emergency contact deleted successfully".to_string())
        } else {
            Err(AppResponse::NotFound(format!("No emergency contact found with id: {id}")))
        }
    })
}

/// Active contacts flagged as veterinarians.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_veterinarian_contacts(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_veterinarian_contacts", |handle| {
        to_json(&handle.services.emergency_contacts.get_veterinarian_contacts()?)
    })
}

/// Case-insensitive substring search over name, relationship, phone number,
/// email and notes. A blank query returns every contact.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `query` - Null-terminated C string with the search text
///
/// # Returns
///
/// A JSON [`AppResponse`] with the matching contacts.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn search_emergency_contacts(state: *mut PetPalHandle, query: *const c_char) -> *const c_char {
    with_handle(state, "search_emergency_contacts", |handle| {
        let query = string_arg(query, "query")?;
        to_json(&handle.services.emergency_contacts.search_emergency_contacts(&query)?)
    })
}

/// Counts of `total`, `active`, `inactive`, `veterinarians` and `personal`
/// contacts; the last two count active contacts only.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_emergency_contacts_stats(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_emergency_contacts_stats", |handle| {
        to_json(&handle.services.emergency_contacts.get_emergency_contacts_stats()?)
    })
}

// ---------------------------------------------------------------------------
// Statistics and activity
// ---------------------------------------------------------------------------

/// Returns the platform-wide counters.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
///
/// # Returns
///
/// A JSON [`AppResponse`] with the statistics document.
///
/// # Safety
///
/// `state` must be null or a live handle.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_user_statistics(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_user_statistics", |handle| {
        to_json(&handle.services.statistics.get_user_statistics()?)
    })
}

/// Overwrites the counters present in a [`UserStatisticsPatch`] body and
/// stamps `lastUpdated`.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string, e.g. `{"totalPets":15}`
///
/// # Returns
///
/// A JSON [`AppResponse`] with the updated statistics.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_user_statistics(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "update_user_statistics", |handle| {
        let patch: UserStatisticsPatch = json_arg(json_ptr)?;
        to_json(&handle.services.statistics.update_user_statistics(&patch)?)
    })
}

/// Looks up the activity record of a user.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `user_id` - Null-terminated C string with the user id
///
/// # Returns
///
/// A JSON [`AppResponse`] with the activity record, or `NotFound` when the
/// user has never been tracked.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_user_activity(state: *mut PetPalHandle, user_id: *const c_char) -> *const c_char {
    with_handle(state, "get_user_activity", |handle| {
        let user_id = string_arg(user_id, "userId")?;
        match handle.services.statistics.get_user_activity(&user_id)? {
            Some(activity) => to_json(&activity),
            None => Err(AppResponse::NotFound(format!("No activity found for user: {user_id}"))),
        }
    })
}

/// Records one session for a user, creating the activity record on first use.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string with the request body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the updated activity record, or
/// `ValidationError` when the user id is blank or a counter would overflow.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # JSON Format
///
/// ```json
/// {"userId":"demo-user","sessionTime":300,"features":["reminders"]}
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn track_user_activity(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "track_user_activity", |handle| {
        let request: TrackActivityRequest = json_arg(json_ptr)?;
        let activity = handle.services.statistics.track_user_activity(
            &request.user_id,
            request.session_time,
            &request.features,
        )?;
        to_json(&activity)
    })
}

/// Daily, weekly and monthly active users plus the mean session count.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn calculate_engagement_metrics(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "calculate_engagement_metrics", |handle| {
        to_json(&handle.services.statistics.calculate_engagement_metrics()?)
    })
}

// ---------------------------------------------------------------------------
// Adopters
// ---------------------------------------------------------------------------

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_adopters(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "get_adopters", |handle| to_json(&handle.services.adopters.get_adopters()?))
}

/// Looks up one adopter.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `id` - Null-terminated C string with the adopter id
///
/// # Returns
///
/// A JSON [`AppResponse`] with the adopter, or `NotFound`.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_adopter(state: *mut PetPalHandle, id: *const c_char) -> *const c_char {
    with_handle(state, "get_adopter", |handle| {
        let id = string_arg(id, "id")?;
        match handle.services.adopters.get_adopter(&id)? {
            Some(adopter) => to_json(&adopter),
            None => Err(AppResponse::NotFound(format!("No adopter found with id: {id}"))),
        }
    })
}

/// Pets adopted by one adopter.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_adopted_pets(state: *mut PetPalHandle, adopter_id: *const c_char) -> *const c_char {
    with_handle(state, "get_adopted_pets", |handle| {
        let adopter_id = string_arg(adopter_id, "adopterId")?;
        to_json(&handle.services.adopters.get_adopted_pets(&adopter_id)?)
    })
}

/// Stores an adopted pet and links it from its adopter.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `json_ptr` - Null-terminated C string with a [`NewAdoptedPet`] body
///
/// # Returns
///
/// A JSON [`AppResponse`] with the stored pet, `NotFound` when the adopter
/// does not exist, or `ValidationError` for blank fields.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Pepper",
///   "species": "Rabbit",
///   "breed": "Holland Lop",
///   "age": 1,
///   "adopterId": "user-3",
///   "adoptionDate": "2024-12-24",
///   "shelterName": "Happy Tails Shelter"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn record_adoption(state: *mut PetPalHandle, json_ptr: *const c_char) -> *const c_char {
    with_handle(state, "record_adoption", |handle| {
        let new: NewAdoptedPet = json_arg(json_ptr)?;
        to_json(&handle.services.adopters.record_adoption(new)?)
    })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Removes every stored key. The next read of each collection reseeds it.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
///
/// # Returns
///
/// `Ok` with a confirmation message, or `DatabaseError` when the store is
/// closed.
///
/// # Safety
///
/// `state` must be null or a live handle.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_records(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "clear_all_records", |handle| {
        handle.db.clear_all_records()?;
        Ok("All records cleared successfully".to_string())
    })
}

/// Deletes the current environment and opens a fresh one named `name_ptr`.
///
/// An empty name is rejected before anything is closed or deleted.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
/// * `name_ptr` - Null-terminated C string with the new database name
///
/// # Returns
///
/// `Ok` with a confirmation message, `ValidationError` for an invalid name,
/// or `DatabaseError` when the new environment cannot be opened.
///
/// # Safety
///
/// Both pointers must be null or valid for the duration of the call.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::{create_db, free_response, reset_database};
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
///
/// let fresh = CString::new("petpal_fresh").unwrap();
/// free_response(reset_database(handle, fresh.as_ptr()));
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_database(state: *mut PetPalHandle, name_ptr: *const c_char) -> *const c_char {
    with_handle(state, "reset_database", |handle| {
        let name = string_arg(name_ptr, "name")?;
        handle.db.reset_database(&name).map_err(|e| match e {
            AppResponse::ValidationError(msg) => AppResponse::ValidationError(msg),
            other => AppResponse::DatabaseError(format!("Error resetting database: {other}")),
        })?;
        Ok(format!("Database '{name}' was reset successfully"))
    })
}

/// Closes the LMDB environment, e.g. before a Flutter hot restart.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_db`]
///
/// # Returns
///
/// `Ok` with a confirmation message. Closing twice is not an error.
///
/// # Safety
///
/// `state` must be null or a live handle.
///
/// # Notes
///
/// The handle stays allocated; later calls answer with `DatabaseError` until
/// [`reset_database`] reopens it. Use [`destroy_db`] to release it.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_database(state: *mut PetPalHandle) -> *const c_char {
    with_handle(state, "close_database", |handle| {
        handle.db.close_database()?;
        Ok("Database connection closed successfully".to_string())
    })
}

/// Closes the store and frees a handle returned by [`create_db`] or
/// [`create_db_with_config`].
///
/// # Parameters
///
/// * `state` - Handle to release
///
/// # Returns
///
/// `Ok` with a confirmation message, or `BadRequest` for a null pointer.
///
/// # Safety
///
/// `state` must come from [`create_db`] or [`create_db_with_config`] and must
/// not be used again after this call, not even passed to `destroy_db` twice.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use petpal_local_store::{create_db, destroy_db, free_response};
///
/// let name = CString::new("petpal").unwrap();
/// let handle = create_db(name.as_ptr());
/// free_response(destroy_db(handle));
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn destroy_db(state: *mut PetPalHandle) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to destroy_db".to_string());
        return response_to_c_string(&error);
    }

    let handle = unsafe { Box::from_raw(state) };
    if let Err(e) = handle.db.close_database() {
        warn!("destroy_db could not close the store cleanly: {e}");
    }
    drop(handle);
    info!("Database handle released");
    response_to_c_string(&AppResponse::Ok("Database handle released".to_string()))
}

/// Releases a string returned by any function in this library.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library that has not been
/// freed yet.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolves the handle, runs `op` and wraps its outcome in an [`AppResponse`].
fn with_handle<F>(state: *mut PetPalHandle, fn_name: &str, op: F) -> *const c_char
where
    F: FnOnce(&PetPalHandle) -> Result<String, AppResponse>,
{
    let handle = match unsafe { state.as_ref() } {
        Some(handle) => handle,
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            return response_to_c_string(&error);
        }
    };

    match op(handle) {
        Ok(payload) => response_to_c_string(&AppResponse::Ok(payload)),
        Err(error) => {
            warn!("{fn_name} failed: {error}");
            response_to_c_string(&error)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppResponse> {
    serde_json::to_string(value)
        .map_err(|e| AppResponse::SerializationError(format!("Failed to serialize result: {e}")))
}

fn string_arg(ptr: *const c_char, field_name: &str) -> Result<String, AppResponse> {
    if ptr.is_null() {
        return Err(AppResponse::BadRequest(format!("Null {field_name} pointer")));
    }
    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => Err(AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"))),
    }
}

fn json_arg<T: DeserializeOwned>(ptr: *const c_char) -> Result<T, AppResponse> {
    let json = string_arg(ptr, "JSON")?;
    serde_json::from_str(&json).map_err(|e| AppResponse::SerializationError(format!("Invalid JSON: {e}")))
}

fn c_ptr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok() }
}

/// Serializes `response` into a C string owned by the caller, or null when
/// that is impossible.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}
