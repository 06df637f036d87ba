#![allow(dead_code)]

use chat_queue::{MessageQueue, MessageRecord};

pub fn record(sender_id: u32, chat_id: u32, text: &str) -> MessageRecord {
    MessageRecord::text(sender_id, chat_id, text)
}

/// A queue for `chat_id` holding `count` numbered messages.
pub fn filled_queue(chat_id: u32, count: usize) -> MessageQueue {
    let mut queue = MessageQueue::new(chat_id);
    for i in 0..count {
        assert!(queue.push(record(i as u32, chat_id, &format!("message {i}"))));
    }
    queue
}

pub fn texts(records: &[MessageRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.payload_str().into_owned())
        .collect()
}
