pub mod csv;

pub use self::csv::{parse_clients_csv, ClientImporter, ImportError};
