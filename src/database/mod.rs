mod connection;
pub mod pool;
pub mod queries;
pub mod reader;
pub mod store;
mod tables;
pub mod types;
pub mod writer;

pub use reader::Reader;
pub use store::SqlStore;
pub use writer::Writer;

pub const FILENAME: &str = "ledger.db";
