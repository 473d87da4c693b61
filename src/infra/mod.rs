//! Loading of the reference tables: remote sheets, disk cache and the
//! embedded fallback data.

pub mod cache;
pub mod loader;
pub mod mock;
pub mod sheets;

pub use loader::{load_tables, LoadOptions, LoadedTables};
pub use sheets::{LoadReport, SheetsClient, SheetsError, TablePayload, TableSource};
