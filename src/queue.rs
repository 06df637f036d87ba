//! Bounded FIFO of message records for one chat, and its persistence stream.
//!
//! ```text
//! QueueStream := chat_id:u32 length:u32 Record{length}
//! ```
//!
//! A full queue refuses new records. It never evicts the oldest one.

use std::collections::VecDeque;
use std::io::{Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codec;
use crate::config::{self, Limits, DEFAULT_CAPACITY};
use crate::domains::message::MessageRecord;
use crate::error::{ChatQueueError, Result};

const QUEUE_HEADER_LEN: usize = 4 + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQueue {
    chat_id: u32,
    capacity: usize,
    records: VecDeque<MessageRecord>,
}

impl MessageQueue {
    pub fn new(chat_id: u32) -> Self {
        Self::with_capacity(chat_id, DEFAULT_CAPACITY)
    }

    /// The capacity is clamped into `1..=u32::MAX`.
    pub fn with_capacity(chat_id: u32, capacity: usize) -> Self {
        let capacity = config::effective_capacity(capacity);
        Self {
            chat_id,
            capacity,
            records: VecDeque::new(),
        }
    }

    pub fn with_limits(chat_id: u32, limits: &Limits) -> Self {
        Self::with_capacity(chat_id, limits.effective_capacity())
    }

    pub fn chat_id(&self) -> u32 {
        self.chat_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Appends to the tail. Returns `false` and drops the record when full.
    pub fn push(&mut self, record: MessageRecord) -> bool {
        if self.is_full() {
            tracing::debug!(
                chat_id = self.chat_id,
                capacity = self.capacity,
                sender_id = record.sender_id,
                "queue full, message dropped"
            );
            return false;
        }
        self.records.push_back(record);
        true
    }

    pub fn try_push(&mut self, record: MessageRecord) -> Result<()> {
        if self.push(record) {
            Ok(())
        } else {
            Err(ChatQueueError::CapacityExceeded {
                chat_id: self.chat_id,
                capacity: self.capacity,
            })
        }
    }

    pub fn peek(&self) -> Option<&MessageRecord> {
        self.records.front()
    }

    pub fn pop(&mut self) -> Option<MessageRecord> {
        self.records.pop_front()
    }

    /// Head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.records.iter()
    }

    fn encode_header(&self) -> [u8; QUEUE_HEADER_LEN] {
        let mut buf = [0u8; QUEUE_HEADER_LEN];
        buf[0..4].copy_from_slice(&self.chat_id.to_le_bytes());
        // len <= capacity <= u32::MAX
        buf[4..8].copy_from_slice(&(self.records.len() as u32).to_le_bytes());
        buf
    }

    fn parse_header(buf: &[u8; QUEUE_HEADER_LEN], limits: &Limits) -> Result<(u32, u32)> {
        let mut chat = [0u8; 4];
        let mut count = [0u8; 4];
        chat.copy_from_slice(&buf[0..4]);
        count.copy_from_slice(&buf[4..8]);
        let chat_id = u32::from_le_bytes(chat);
        let count = u32::from_le_bytes(count);
        let capacity = limits.effective_capacity();
        if count as usize > capacity {
            return Err(ChatQueueError::CountExceedsCapacity {
                declared: count,
                capacity,
            });
        }
        Ok((chat_id, count))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode_header())?;
        for record in &self.records {
            codec::write_record(writer, record)?;
        }
        tracing::debug!(chat_id = self.chat_id, len = self.len(), "queue written");
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body: usize = self.records.iter().map(MessageRecord::encoded_len).sum();
        let mut buf = Vec::with_capacity(QUEUE_HEADER_LEN + body);
        buf.extend_from_slice(&self.encode_header());
        for record in &self.records {
            buf.extend_from_slice(&codec::encode(record));
        }
        buf
    }

    /// Rebuilds a queue from its persistence stream. Nothing is returned
    /// unless every declared record was decoded.
    pub fn read_from<R: Read>(reader: &mut R, limits: &Limits) -> Result<Self> {
        let mut buf = [0u8; QUEUE_HEADER_LEN];
        reader
            .read_exact(&mut buf)
            .map_err(|e| ChatQueueError::from_read(e, || "queue header".to_string()))?;
        let (chat_id, count) = Self::parse_header(&buf, limits)?;

        let mut queue = Self::with_limits(chat_id, limits);
        for index in 0..count {
            let record = codec::read_record(reader, limits)
                .map_err(|e| with_record_context(e, index, count))?;
            queue.try_push(record)?;
        }
        tracing::debug!(chat_id, len = count, "queue read");
        Ok(queue)
    }

    /// Like `read_from`, but `bytes` must hold exactly one queue stream.
    pub fn from_bytes(mut bytes: &[u8], limits: &Limits) -> Result<Self> {
        let queue = Self::read_from(&mut bytes, limits)?;
        if !bytes.is_empty() {
            return Err(ChatQueueError::TrailingData {
                chat_id: queue.chat_id,
                extra: bytes.len() as u64,
            });
        }
        Ok(queue)
    }

    pub async fn write_to_async<W>(&self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.encode_header()).await?;
        for record in &self.records {
            codec::write_record_async(writer, record).await?;
        }
        writer.flush().await?;
        tracing::debug!(chat_id = self.chat_id, len = self.len(), "queue written");
        Ok(())
    }

    pub async fn read_from_async<R>(reader: &mut R, limits: &Limits) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; QUEUE_HEADER_LEN];
        reader
            .read_exact(&mut buf)
            .await
            .map_err(|e| ChatQueueError::from_read(e, || "queue header".to_string()))?;
        let (chat_id, count) = Self::parse_header(&buf, limits)?;

        let mut queue = Self::with_limits(chat_id, limits);
        for index in 0..count {
            let record = codec::read_record_async(reader, limits)
                .await
                .map_err(|e| with_record_context(e, index, count))?;
            queue.try_push(record)?;
        }
        tracing::debug!(chat_id, len = count, "queue read");
        Ok(queue)
    }
}

fn with_record_context(err: ChatQueueError, index: u32, count: u32) -> ChatQueueError {
    match err {
        ChatQueueError::TruncatedStream(what) => ChatQueueError::TruncatedStream(format!(
            "{what} (record {} of {count})",
            index + 1
        )),
        other => other,
    }
}

impl<'a> IntoIterator for &'a MessageQueue {
    type Item = &'a MessageRecord;
    type IntoIter = std::collections::vec_deque::Iter<'a, MessageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut queue = MessageQueue::with_capacity(1, 0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(MessageRecord::text(1, 1, "a")));
        assert!(!queue.push(MessageRecord::text(1, 1, "b")));
    }

    #[test]
    fn truncation_names_the_missing_record() {
        let mut queue = MessageQueue::new(9);
        queue.push(MessageRecord::text(1, 9, "one"));
        queue.push(MessageRecord::text(2, 9, "two"));
        let bytes = queue.to_bytes();
        let cut = &bytes[..bytes.len() - 1];

        let err = MessageQueue::from_bytes(cut, &Limits::default()).unwrap_err();
        match err {
            ChatQueueError::TruncatedStream(what) => {
                assert!(what.contains("record 2 of 2"), "{what}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_to_matches_to_bytes() {
        let mut queue = MessageQueue::new(3);
        queue.push(MessageRecord::text(1, 3, "x"));
        let mut out = Vec::new();
        queue.write_to(&mut out).unwrap();
        assert_eq!(out, queue.to_bytes());
    }
}
