use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Fixed header size of an encoded record: sender, chat, payload length.
pub const RECORD_HEADER_LEN: usize = 4 + 4 + 8;

/// One chat message. The payload is owned; cloning copies the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRecord {
    pub sender_id: u32,
    pub chat_id: u32,
    payload: Vec<u8>,
}

impl MessageRecord {
    pub fn new(sender_id: u32, chat_id: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            sender_id,
            chat_id,
            payload: payload.into(),
        }
    }

    pub fn text(sender_id: u32, chat_id: u32, content: &str) -> Self {
        Self::new(sender_id, chat_id, content.as_bytes())
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_length(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Lossy UTF-8 view, for display only.
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Moves the payload out, leaving this record empty.
    pub fn take_payload(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.payload)
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_LEN + self.payload.len()
    }
}
