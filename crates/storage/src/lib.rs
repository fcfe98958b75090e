pub mod error;
pub mod history;

pub use error::StorageError;
pub use history::{HistoryStore, ScanHistoryItem, DEFAULT_HISTORY_LIMIT, HISTORY_FILE};
