pub mod codec;
pub mod config;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod providers;
pub mod queue;

pub use crate::config::{Limits, QueueConfig, DEFAULT_CAPACITY};
pub use crate::domains::message::MessageRecord;
pub use crate::error::{ChatQueueError, Result};
pub use crate::interfaces::store::MessageBoxStore;
pub use crate::providers::{FileMessageBoxStore, SqliteMessageBoxStore};
pub use crate::queue::MessageQueue;
