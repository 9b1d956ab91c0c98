use std::sync::Arc;

use log::info;

use crate::app_response::AppResponse;
use crate::environment::{Clock, IdGenerator};
use crate::local_db_model::{
    EmergencyContact, EmergencyContactPatch, EmergencyContactStats, NewEmergencyContact,
};
use crate::repository::Collection;
use crate::seed_data;
use crate::services::{ServiceContext, EMERGENCY_CONTACTS_KEY};

#[derive(Clone)]
pub struct EmergencyContactService {
    contacts: Collection<EmergencyContact>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl EmergencyContactService {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            contacts: ctx.collection(EMERGENCY_CONTACTS_KEY, seed_data::default_emergency_contacts),
            clock: Arc::clone(&ctx.clock),
            ids: Arc::clone(&ctx.ids),
        }
    }

    pub fn get_emergency_contacts(&self) -> Result<Vec<EmergencyContact>, AppResponse> {
        self.contacts.load()
    }

    pub fn get_emergency_contact_by_id(&self, id: &str) -> Result<Option<EmergencyContact>, AppResponse> {
        self.contacts.find(id)
    }

    pub fn add_emergency_contact(&self, new: NewEmergencyContact) -> Result<EmergencyContact, AppResponse> {
        new.validate()?;
        let now = self.clock.now();
        let contact = EmergencyContact {
            id: self.ids.next_id("contact"),
            name: new.name,
            relationship: new.relationship,
            phone_number: new.phone_number,
            email: new.email,
            address: new.address,
            notes: new.notes,
            is_veterinarian: new.is_veterinarian,
            is_active: new.is_active,
            added_date: now,
            last_updated: now,
        };
        let created = self.contacts.append(contact)?;
        info!("Added emergency contact {}", created.id);
        Ok(created)
    }

    pub fn update_emergency_contact(
        &self,
        id: &str,
        patch: &EmergencyContactPatch,
    ) -> Result<Option<EmergencyContact>, AppResponse> {
        let now = self.clock.now();
        self.contacts.update(id, |contact| patch.apply(contact, now))
    }

    pub fn delete_emergency_contact(&self, id: &str) -> Result<bool, AppResponse> {
        self.contacts.remove(id)
    }

    /// Active contacts flagged as veterinarians.
    pub fn get_veterinarian_contacts(&self) -> Result<Vec<EmergencyContact>, AppResponse> {
        Ok(self
            .contacts
            .load()?
            .into_iter()
            .filter(|contact| contact.is_veterinarian && contact.is_active)
            .collect())
    }

    /// Case-insensitive substring search; a blank query returns everything.
    pub fn search_emergency_contacts(&self, query: &str) -> Result<Vec<EmergencyContact>, AppResponse> {
        let needle = query.trim().to_lowercase();
        let contacts = self.contacts.load()?;
        if needle.is_empty() {
            return Ok(contacts);
        }
        Ok(contacts
            .into_iter()
            .filter(|contact| contact.matches(&needle))
            .collect())
    }

    /// Veterinarian and personal counts only include active contacts.
    pub fn get_emergency_contacts_stats(&self) -> Result<EmergencyContactStats, AppResponse> {
        let contacts = self.contacts.load()?;
        let mut stats = EmergencyContactStats {
            total: contacts.len(),
            ..EmergencyContactStats::default()
        };
        for contact in contacts.iter().filter(|contact| contact.is_active) {
            stats.active += 1;
            if contact.is_veterinarian {
                stats.veterinarians += 1;
            } else {
                stats.personal += 1;
            }
        }
        stats.inactive = stats.total - stats.active;
        Ok(stats)
    }
}
