pub mod schema;
pub mod store;

pub use store::{AttemptRow, RunSummary, Store, StoreStats};
