use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatQueueError {
    #[error("queue for chat {chat_id} is full (capacity {capacity})")]
    CapacityExceeded { chat_id: u32, capacity: usize },
    #[error("truncated stream: {0}")]
    TruncatedStream(String),
    #[error("record declares {declared} payload bytes, limit is {limit}")]
    OversizedRecord { declared: u64, limit: u64 },
    #[error("stream declares {declared} records, capacity is {capacity}")]
    CountExceedsCapacity { declared: u32, capacity: usize },
    #[error("box for chat {chat_id} has {extra} unexpected trailing bytes")]
    TrailingData { chat_id: u32, extra: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ChatQueueError {
    /// Maps an `UnexpectedEof` from a short read onto `TruncatedStream`.
    pub(crate) fn from_read(err: std::io::Error, what: impl FnOnce() -> String) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ChatQueueError::TruncatedStream(what())
        } else {
            ChatQueueError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatQueueError>;
