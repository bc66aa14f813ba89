pub mod error;
pub mod model;
pub mod store;

pub use error::StoreError;
pub use model::DedupRecord;
pub use store::{DedupStore, memory_store::InMemoryDedupStore, sqlite_store::SqliteDedupStore};
