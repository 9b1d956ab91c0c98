//! Typed views over a single storage key.
//!
//! A [`Collection`] is a JSON array of records; a [`Document`] is one JSON
//! object. Both seed themselves from defaults the first time their key is read
//! and always rewrite the whole value on save.

use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::key_value_store::KeyValueStore;
use crate::local_db_model::Identified;

pub struct Collection<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    seed: fn() -> Vec<T>,
    seed_defaults: bool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            seed: self.seed,
            seed_defaults: self.seed_defaults,
            _record: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Identified,
{
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: &'static str,
        seed: fn() -> Vec<T>,
        seed_defaults: bool,
    ) -> Self {
        Self {
            store,
            key,
            seed,
            seed_defaults,
            _record: PhantomData,
        }
    }

    /// Reads every record. An absent key is seeded (and the seed persisted);
    /// an unreadable payload falls back to the seed without overwriting it.
    pub fn load(&self) -> Result<Vec<T>, AppResponse> {
        match self.store.get(self.key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(records) => Ok(records),
                Err(e) => {
                    warn!("Corrupted value under '{}', using defaults: {e}", self.key);
                    Ok(self.defaults())
                }
            },
            None => {
                let records = self.defaults();
                if self.seed_defaults {
                    debug!("Seeding '{}' with {} default records", self.key, records.len());
                    self.save(&records)?;
                }
                Ok(records)
            }
        }
    }

    pub fn save(&self, records: &[T]) -> Result<(), AppResponse> {
        let json = serde_json::to_string(records)?;
        self.store.set(self.key, &json)
    }

    /// Appends `record`, rejecting an id that is already taken.
    pub fn append(&self, record: T) -> Result<T, AppResponse> {
        let mut records = self.load()?;
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(AppResponse::validation(format!(
                "Duplicate id '{}' in '{}'",
                record.id(),
                self.key
            )));
        }
        records.push(record);
        self.save(&records)?;
        records
            .pop()
            .ok_or_else(|| AppResponse::DatabaseError("Append lost its record".to_string()))
    }

    pub fn find(&self, id: &str) -> Result<Option<T>, AppResponse> {
        Ok(self.load()?.into_iter().find(|record| record.id() == id))
    }

    /// Runs `mutate` on the record with `id` and persists the collection.
    /// Returns `None` (and writes nothing) when the id is unknown.
    pub fn update<F>(&self, id: &str, mutate: F) -> Result<Option<T>, AppResponse>
    where
        F: FnOnce(&mut T) -> Result<(), AppResponse>,
        T: Clone,
    {
        let mut records = self.load()?;
        let Some(record) = records.iter_mut().find(|record| record.id() == id) else {
            return Ok(None);
        };
        mutate(record)?;
        let updated = record.clone();
        self.save(&records)?;
        Ok(Some(updated))
    }

    /// Removes the record with `id`. Nothing is written when it is absent.
    pub fn remove(&self, id: &str) -> Result<bool, AppResponse> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }

    fn defaults(&self) -> Vec<T> {
        if self.seed_defaults {
            (self.seed)()
        } else {
            Vec::new()
        }
    }
}

pub struct Document<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    seed: fn() -> T,
}

impl<T> Clone for Document<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            seed: self.seed,
        }
    }
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str, seed: fn() -> T) -> Self {
        Self { store, key, seed }
    }

    pub fn load(&self) -> Result<T, AppResponse> {
        match self.store.get(self.key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    warn!("Corrupted value under '{}', using defaults: {e}", self.key);
                    Ok((self.seed)())
                }
            },
            None => {
                let value = (self.seed)();
                self.save(&value)?;
                Ok(value)
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<(), AppResponse> {
        let json = serde_json::to_string(value)?;
        self.store.set(self.key, &json)
    }

    pub fn modify<F>(&self, mutate: F) -> Result<T, AppResponse>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.load()?;
        mutate(&mut value);
        self.save(&value)?;
        Ok(value)
    }
}
