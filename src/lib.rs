pub mod api;
pub mod core;
pub mod import;
pub mod invoicing;
pub mod models;
pub mod notify;
pub mod pdf;
pub mod storage;
pub mod telemetry;

// Re-export commonly used types
pub use models::{Client, Invoice, InvoiceCreate, InvoiceCreated, NewClient, NewInvoice};

pub use import::ClientImporter;
pub use invoicing::InvoiceService;
pub use notify::{InvoiceNotifier, Mailer, SmtpMailer};
pub use pdf::InvoiceRenderer;
pub use storage::Database;
