//! Store configuration.
//!
//! [`StoreConfig`] is accepted as JSON over FFI (`create_db_with_config`) and
//! directly by [`AppDbState::with_config`](crate::local_db_state::AppDbState::with_config).

use serde::{Deserialize, Serialize};

use crate::app_response::{require_non_empty, AppResponse};

/// Default LMDB map size: 10 MiB is plenty for the mock collections.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// Runtime options for opening a PetPal store.
///
/// ```rust
/// use petpal_local_store::store_config::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(r#"{"name":"petpal"}"#)?;
/// assert!(config.seed_defaults);
/// assert_eq!(config.lmdb_dir(), "petpal.lmdb");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Database path prefix; the environment lives in `<name>.lmdb/`.
    pub name: String,

    /// Maximum size of the memory map in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Populate absent keys with the default dataset on first read.
    #[serde(default = "default_seed")]
    pub seed_defaults: bool,
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_seed() -> bool {
    true
}

impl StoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map_size: DEFAULT_MAP_SIZE,
            seed_defaults: true,
        }
    }

    pub fn lmdb_dir(&self) -> String {
        format!("{}.lmdb", self.name)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        require_non_empty("name", &self.name)?;
        if self.map_size == 0 {
            return Err(AppResponse::validation("mapSize must be greater than zero"));
        }
        Ok(())
    }
}
