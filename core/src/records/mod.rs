pub mod scan;
pub mod store;

pub use scan::{ScanKey, ScanRecord};
pub use store::{MemoryStore, ScanStore};
