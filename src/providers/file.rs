use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::{self, BufReader, BufWriter};

use crate::config::Limits;
use crate::error::{ChatQueueError, Result};
use crate::interfaces::store::MessageBoxStore;
use crate::queue::MessageQueue;

/// One `<chat_id>.box` file per chat under `root`.
#[derive(Debug, Clone)]
pub struct FileMessageBoxStore {
    root: PathBuf,
    limits: Limits,
}

impl FileMessageBoxStore {
    pub fn new<P: Into<PathBuf>>(root: P, limits: Limits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn box_path(&self, chat_id: u32) -> PathBuf {
        self.root.join(format!("{chat_id}.box"))
    }

    fn tmp_path(&self, chat_id: u32) -> PathBuf {
        self.root.join(format!("{chat_id}.box.tmp"))
    }

    async fn write_and_swap(&self, queue: &MessageQueue, tmp: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(tmp).await?);
        queue.write_to_async(&mut writer).await?;
        writer.into_inner().sync_all().await?;
        fs::rename(tmp, self.box_path(queue.chat_id())).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageBoxStore for FileMessageBoxStore {
    fn limits(&self) -> &Limits {
        &self.limits
    }

    async fn load(&self, chat_id: u32) -> Result<Option<MessageQueue>> {
        let file = match File::open(self.box_path(chat_id)).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);
        let queue = MessageQueue::read_from_async(&mut reader, &self.limits).await?;
        let extra = io::copy(&mut reader, &mut io::sink()).await?;
        if extra > 0 {
            return Err(ChatQueueError::TrailingData { chat_id, extra });
        }
        Ok(Some(queue))
    }

    async fn save(&self, queue: &MessageQueue) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        let tmp = self.tmp_path(queue.chat_id());
        if let Err(e) = self.write_and_swap(queue, &tmp).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        path = %tmp.display(),
                        error = %cleanup,
                        "stale temp box left behind"
                    );
                }
            }
            return Err(e);
        }
        tracing::info!(
            chat_id = queue.chat_id(),
            len = queue.len(),
            path = %self.box_path(queue.chat_id()).display(),
            "message box saved"
        );
        Ok(())
    }

    async fn remove(&self, chat_id: u32) -> Result<bool> {
        match fs::remove_file(self.box_path(chat_id)).await {
            Ok(()) => {
                tracing::info!(chat_id, "message box removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
