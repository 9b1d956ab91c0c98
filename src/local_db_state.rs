//! LMDB-backed [`KeyValueStore`].
//!
//! One environment per store, living in `<name>.lmdb/`, with a single unnamed
//! database. Every `set`/`remove` commits its own write transaction; there are
//! no transactions spanning several keys.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::key_value_store::KeyValueStore;
use crate::store_config::StoreConfig;

struct LmdbHandle {
    env: Environment,
    db: Database,
}

struct Inner {
    config: StoreConfig,
    handle: Option<LmdbHandle>,
}

/// Open LMDB environment plus the configuration it was opened with.
///
/// The handle sits behind an `RwLock` so the state can be shared as
/// `Arc<dyn KeyValueStore>`; once closed, every operation fails with
/// [`AppResponse::DatabaseError`] until [`AppDbState::reset_database`] reopens it.
pub struct AppDbState {
    inner: RwLock<Inner>,
}

impl AppDbState {
    /// Opens (or creates) `<name>.lmdb` with default settings.
    pub fn init(name: String) -> Result<Self, AppResponse> {
        Self::with_config(StoreConfig::new(name))
    }

    pub fn with_config(config: StoreConfig) -> Result<Self, AppResponse> {
        config.validate()?;
        let handle = open_handle(&config)?;
        info!("Opened LMDB environment at {}", config.lmdb_dir());
        Ok(Self {
            inner: RwLock::new(Inner {
                config,
                handle: Some(handle),
            }),
        })
    }

    pub fn config(&self) -> Result<StoreConfig, AppResponse> {
        Ok(self.read()?.config.clone())
    }

    pub fn is_open(&self) -> bool {
        self.read().map(|inner| inner.handle.is_some()).unwrap_or(false)
    }

    /// Removes every key while keeping the environment open.
    pub fn clear_all_records(&self) -> Result<(), AppResponse> {
        let inner = self.read()?;
        let handle = open_or_err(&inner)?;
        let mut txn = handle.env.begin_rw_txn()?;
        txn.clear_db(handle.db)?;
        txn.commit()?;
        info!("Cleared all records in {}", inner.config.lmdb_dir());
        Ok(())
    }

    /// Closes the current environment, deletes its directory and opens a fresh
    /// one under `name`. An invalid `name` is rejected before anything is
    /// closed or deleted.
    pub fn reset_database(&self, name: &str) -> Result<(), AppResponse> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let mut config = inner.config.clone();
        config.name = name.to_string();
        config.validate()?;

        let old_dir = inner.config.lmdb_dir();
        inner.handle = None;

        if Path::new(&old_dir).exists() {
            std::fs::remove_dir_all(&old_dir)?;
            info!("Removed LMDB directory {}", old_dir);
        }

        let handle = open_handle(&config)?;
        inner.config = config;
        inner.handle = Some(handle);
        info!("Database reset to {}", inner.config.lmdb_dir());
        Ok(())
    }

    /// Drops the environment. Later calls fail until the store is reset.
    pub fn close_database(&self) -> Result<(), AppResponse> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        match inner.handle.take() {
            Some(handle) => {
                if let Err(e) = handle.env.sync(true) {
                    warn!("Failed to sync LMDB environment before close: {e}");
                }
                info!("Closed LMDB environment at {}", inner.config.lmdb_dir());
            }
            None => debug!("close_database called on an already closed store"),
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, AppResponse> {
        self.inner.read().map_err(|_| poisoned())
    }
}

impl KeyValueStore for AppDbState {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let inner = self.read()?;
        let handle = open_or_err(&inner)?;
        let txn = handle.env.begin_ro_txn()?;

        let value = match txn.get(handle.db, &key) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    AppResponse::SerializationError(format!("Value under '{key}' is not UTF-8: {e}"))
                })?;
                Some(text)
            }
            Err(LmdbError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let inner = self.read()?;
        let handle = open_or_err(&inner)?;
        let mut txn = handle.env.begin_rw_txn()?;
        txn.put(handle.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, AppResponse> {
        let inner = self.read()?;
        let handle = open_or_err(&inner)?;
        let mut txn = handle.env.begin_rw_txn()?;

        let removed = match txn.del(handle.db, &key, None) {
            Ok(()) => true,
            Err(LmdbError::NotFound) => false,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        Ok(removed)
    }
}

fn open_handle(config: &StoreConfig) -> Result<LmdbHandle, AppResponse> {
    let dir = config.lmdb_dir();
    std::fs::create_dir_all(&dir)?;

    let env = Environment::new()
        .set_map_size(config.map_size)
        .open(Path::new(&dir))
        .map_err(|e| {
            warn!("Failed to open LMDB environment at {dir}: {e}");
            AppResponse::from(e)
        })?;
    let db = env.create_db(None, DatabaseFlags::empty())?;
    Ok(LmdbHandle { env, db })
}

fn open_or_err(inner: &Inner) -> Result<&LmdbHandle, AppResponse> {
    inner
        .handle
        .as_ref()
        .ok_or_else(|| AppResponse::DatabaseError("Database is closed".to_string()))
}

fn poisoned() -> AppResponse {
    AppResponse::DatabaseError("Database lock poisoned".to_string())
}
