/// Alert records, the persisted document and the store
pub mod document;
pub mod record;
pub mod store;

pub use document::AlertDocument;
pub use record::{AlertRecord, AlertValue, AlertsByTime};
pub use store::{AlertStore, DEFAULT_ALERTS_PATH, DEFAULT_INDENT};
