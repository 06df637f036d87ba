pub mod file;
pub mod sqlite;

pub use file::FileMessageBoxStore;
pub use sqlite::SqliteMessageBoxStore;
