use clap::Parser;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use chat_queue::config::{QueueConfig, DEFAULT_BOX_DIR};
use chat_queue::error::{ChatQueueError, Result};
use chat_queue::interfaces::store::MessageBoxStore;
use chat_queue::providers::{FileMessageBoxStore, SqliteMessageBoxStore};
use chat_queue::{MessageQueue, MessageRecord};

#[derive(Parser, Debug)]
#[command(name = "chat-queue")]
#[command(about = "Per-chat bounded message boxes")]
struct Cli {
    #[arg(long, env = "CHAT_QUEUE_CONFIG")]
    config: Option<String>,

    #[arg(long)]
    box_dir: Option<String>,

    #[arg(long, help = "Store boxes in this SQLite database instead of files")]
    sqlite: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    Push {
        #[arg(long)]
        chat_id: u32,

        #[arg(long)]
        sender_id: u32,

        #[arg(long)]
        text: String,
    },
    Pop {
        #[arg(long)]
        chat_id: u32,
    },
    Peek {
        #[arg(long)]
        chat_id: u32,
    },
    Show {
        #[arg(long)]
        chat_id: u32,
    },
    Clear {
        #[arg(long)]
        chat_id: u32,
    },
    Demo,
}

fn record_json(record: &MessageRecord) -> Value {
    json!({
        "sender_id": record.sender_id,
        "chat_id": record.chat_id,
        "payload_length": record.payload_length(),
        "text": record.payload_str(),
    })
}

fn queue_json(queue: &MessageQueue) -> Value {
    json!({
        "chat_id": queue.chat_id(),
        "capacity": queue.capacity(),
        "length": queue.len(),
        "messages": queue.iter().map(record_json).collect::<Vec<_>>(),
    })
}

fn print_record(record: Option<&MessageRecord>) {
    match record {
        Some(record) => println!("[{}] {}", record.sender_id, record.payload_str()),
        None => println!("(empty)"),
    }
}

fn build_store(cli: &Cli, config: &QueueConfig) -> Result<Box<dyn MessageBoxStore>> {
    let limits = config.limits()?;
    if let Some(db) = cli.sqlite.as_deref().or(config.sqlite_path()) {
        return Ok(Box::new(SqliteMessageBoxStore::new(db, limits)));
    }
    let dir = cli
        .box_dir
        .as_deref()
        .or(config.box_dir())
        .unwrap_or(DEFAULT_BOX_DIR);
    Ok(Box::new(FileMessageBoxStore::new(dir, limits)))
}

fn run_demo() {
    let mut queue = MessageQueue::new(0);
    queue.push(MessageRecord::text(0, 1, "Hello world"));
    queue.push(MessageRecord::text(1, 0, "Hey there!"));

    println!("{}", queue.len());
    while let Some(record) = queue.pop() {
        println!("{}", record.payload_str());
        println!("{}", queue.len());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chat_queue=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => QueueConfig::from_file(path)?,
        None => QueueConfig::default(),
    };

    let store = build_store(&cli, &config)?;
    match cli.command {
        Commands::Push {
            chat_id,
            sender_id,
            text,
        } => {
            let len = store
                .append(MessageRecord::text(sender_id, chat_id, &text))
                .await?;
            println!("{len}");
        }
        Commands::Pop { chat_id } => {
            let record = store.pop(chat_id).await?;
            print_record(record.as_ref());
        }
        Commands::Peek { chat_id } => {
            let queue = store.load_or_create(chat_id).await?;
            print_record(queue.peek());
        }
        Commands::Show { chat_id } => {
            let queue = store.load_or_create(chat_id).await?;
            let out = serde_json::to_string_pretty(&queue_json(&queue))
                .map_err(|e| ChatQueueError::Serialization(e.to_string()))?;
            println!("{out}");
        }
        Commands::Clear { chat_id } => {
            let removed = store.remove(chat_id).await?;
            println!("{}", if removed { "removed" } else { "no box" });
        }
        Commands::Demo => run_demo(),
    }
    Ok(())
}
