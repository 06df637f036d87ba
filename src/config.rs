use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ChatQueueError, Result};

pub const DEFAULT_CAPACITY: usize = 20;
pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = 16 * 1024 * 1024;
pub const DEFAULT_BOX_DIR: &str = "./data/boxes";

/// Bounds applied when building queues and decoding persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub capacity: usize,
    pub max_payload_len: u64,
}

/// Clamps a requested capacity into `1..=u32::MAX`, the range the persisted
/// length field can describe.
pub fn effective_capacity(capacity: usize) -> usize {
    capacity.clamp(1, u32::MAX as usize)
}

impl Limits {
    pub fn effective_capacity(&self) -> usize {
        effective_capacity(self.capacity)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    pub box_dir: Option<String>,
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueueConfig {
    pub capacity: Option<usize>,
    pub max_payload_len: Option<u64>,
    pub store: Option<StoreConfig>,
}

impl QueueConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ChatQueueError::Config(e.to_string()))?;
        let config: QueueConfig =
            serde_json::from_str(&content).map_err(|e| ChatQueueError::Config(e.to_string()))?;
        config.limits()?;
        Ok(config)
    }

    pub fn limits(&self) -> Result<Limits> {
        let defaults = Limits::default();
        let capacity = self.capacity.unwrap_or(defaults.capacity);
        if capacity == 0 {
            return Err(ChatQueueError::Config(
                "capacity must be at least 1".to_string(),
            ));
        }
        // The persisted length field is a u32.
        if u32::try_from(capacity).is_err() {
            return Err(ChatQueueError::Config(format!(
                "capacity {capacity} does not fit the persisted length field"
            )));
        }
        Ok(Limits {
            capacity,
            max_payload_len: self.max_payload_len.unwrap_or(defaults.max_payload_len),
        })
    }

    pub fn box_dir(&self) -> Option<&str> {
        self.store.as_ref().and_then(|s| s.box_dir.as_deref())
    }

    pub fn sqlite_path(&self) -> Option<&str> {
        self.store.as_ref().and_then(|s| s.sqlite_path.as_deref())
    }
}
