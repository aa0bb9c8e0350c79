pub mod service;

pub use service::{InvoiceError, InvoiceService};
