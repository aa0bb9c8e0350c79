pub mod sqlite;

pub use sqlite::{ClientRepository, Database, InvoiceRepository, Session, StorageError};
