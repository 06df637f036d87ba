//! Byte layout of a single record.
//!
//! ```text
//! Record := sender_id:u32 chat_id:u32 payload_length:u64 payload:byte[payload_length]
//! ```
//!
//! Every integer is little-endian. There is no padding, terminator or checksum.

use std::io::{Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Limits;
use crate::domains::message::{MessageRecord, RECORD_HEADER_LEN};
use crate::error::{ChatQueueError, Result};

struct Header {
    sender_id: u32,
    chat_id: u32,
    payload_length: u64,
}

fn encode_header(record: &MessageRecord) -> [u8; RECORD_HEADER_LEN] {
    let mut buf = [0u8; RECORD_HEADER_LEN];
    buf[0..4].copy_from_slice(&record.sender_id.to_le_bytes());
    buf[4..8].copy_from_slice(&record.chat_id.to_le_bytes());
    buf[8..16].copy_from_slice(&record.payload_length().to_le_bytes());
    buf
}

fn parse_header(buf: &[u8; RECORD_HEADER_LEN]) -> Header {
    let mut sender = [0u8; 4];
    let mut chat = [0u8; 4];
    let mut len = [0u8; 8];
    sender.copy_from_slice(&buf[0..4]);
    chat.copy_from_slice(&buf[4..8]);
    len.copy_from_slice(&buf[8..16]);
    Header {
        sender_id: u32::from_le_bytes(sender),
        chat_id: u32::from_le_bytes(chat),
        payload_length: u64::from_le_bytes(len),
    }
}

/// Validates the declared length before anything is allocated for it.
fn checked_payload_len(declared: u64, limits: &Limits) -> Result<usize> {
    if declared > limits.max_payload_len {
        return Err(ChatQueueError::OversizedRecord {
            declared,
            limit: limits.max_payload_len,
        });
    }
    usize::try_from(declared).map_err(|_| ChatQueueError::OversizedRecord {
        declared,
        limit: limits.max_payload_len,
    })
}

pub fn encode(record: &MessageRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.encoded_len());
    buf.extend_from_slice(&encode_header(record));
    buf.extend_from_slice(record.payload());
    buf
}

/// Decodes one record from the front of `bytes`. Trailing bytes are ignored.
pub fn decode(mut bytes: &[u8], limits: &Limits) -> Result<MessageRecord> {
    read_record(&mut bytes, limits)
}

pub fn write_record<W: Write>(writer: &mut W, record: &MessageRecord) -> Result<()> {
    writer.write_all(&encode_header(record))?;
    writer.write_all(record.payload())?;
    Ok(())
}

pub fn read_record<R: Read>(reader: &mut R, limits: &Limits) -> Result<MessageRecord> {
    let mut buf = [0u8; RECORD_HEADER_LEN];
    reader
        .read_exact(&mut buf)
        .map_err(|e| ChatQueueError::from_read(e, || "record header".to_string()))?;
    let header = parse_header(&buf);

    let len = checked_payload_len(header.payload_length, limits)?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(|e| {
        ChatQueueError::from_read(e, || format!("record payload of {len} bytes"))
    })?;

    Ok(MessageRecord::new(header.sender_id, header.chat_id, payload))
}

pub async fn write_record_async<W>(writer: &mut W, record: &MessageRecord) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_header(record)).await?;
    writer.write_all(record.payload()).await?;
    Ok(())
}

pub async fn read_record_async<R>(reader: &mut R, limits: &Limits) -> Result<MessageRecord>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; RECORD_HEADER_LEN];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| ChatQueueError::from_read(e, || "record header".to_string()))?;
    let header = parse_header(&buf);

    let len = checked_payload_len(header.payload_length, limits)?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        ChatQueueError::from_read(e, || format!("record payload of {len} bytes"))
    })?;

    Ok(MessageRecord::new(header.sender_id, header.chat_id, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_little_endian_and_unpadded() {
        let record = MessageRecord::new(0x0102_0304, 5, b"hi".to_vec());
        let bytes = encode(&record);
        assert_eq!(
            bytes,
            vec![4, 3, 2, 1, 5, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, b'h', b'i']
        );
    }

    #[test]
    fn ceiling_checked_before_allocation() {
        let limits = Limits {
            capacity: 20,
            max_payload_len: 4,
        };
        let mut bytes = encode(&MessageRecord::new(1, 1, Vec::new()));
        bytes[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = decode(&bytes, &limits).unwrap_err();
        assert!(matches!(
            err,
            ChatQueueError::OversizedRecord {
                declared: u64::MAX,
                limit: 4
            }
        ));
    }
}
