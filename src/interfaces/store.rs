use async_trait::async_trait;

use crate::config::Limits;
use crate::domains::message::MessageRecord;
use crate::error::Result;
use crate::queue::MessageQueue;

/// Persists one message box (a `MessageQueue`) per chat.
#[async_trait]
pub trait MessageBoxStore: Send + Sync {
    fn limits(&self) -> &Limits;

    async fn load(&self, chat_id: u32) -> Result<Option<MessageQueue>>;

    /// Replaces whatever is stored for `queue.chat_id()`.
    async fn save(&self, queue: &MessageQueue) -> Result<()>;

    /// Returns whether a box existed.
    async fn remove(&self, chat_id: u32) -> Result<bool>;

    async fn load_or_create(&self, chat_id: u32) -> Result<MessageQueue> {
        Ok(match self.load(chat_id).await? {
            Some(queue) => queue,
            None => MessageQueue::with_limits(chat_id, self.limits()),
        })
    }

    /// Pushes into the box of `record.chat_id` and returns the new length.
    /// A full box is left untouched.
    async fn append(&self, record: MessageRecord) -> Result<usize> {
        let mut queue = self.load_or_create(record.chat_id).await?;
        queue.try_push(record)?;
        self.save(&queue).await?;
        Ok(queue.len())
    }

    async fn pop(&self, chat_id: u32) -> Result<Option<MessageRecord>> {
        let Some(mut queue) = self.load(chat_id).await? else {
            return Ok(None);
        };
        let record = queue.pop();
        if record.is_some() {
            self.save(&queue).await?;
        }
        Ok(record)
    }

    /// Pops everything in FIFO order and persists the empty box.
    async fn drain(&self, chat_id: u32) -> Result<Vec<MessageRecord>> {
        let Some(mut queue) = self.load(chat_id).await? else {
            return Ok(Vec::new());
        };
        let mut drained = Vec::with_capacity(queue.len());
        while let Some(record) = queue.pop() {
            drained.push(record);
        }
        self.save(&queue).await?;
        Ok(drained)
    }
}
