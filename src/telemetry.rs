use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

pub static CLIENTS_IMPORTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("clients_imported_total", "Client rows inserted from CSV uploads")
        .expect("metric can be registered")
});

pub static INVOICES_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("invoices_created_total", "Invoices persisted")
        .expect("metric can be registered")
});

pub static PDF_RENDERS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("invoice_pdf_renders_total", "Invoice documents rendered to disk")
        .expect("metric can be registered")
});

/// Email attempts labelled `sent`, `not_found` or `failed`.
pub static INVOICE_EMAILS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("invoice_emails_total", "Invoice email requests", &["outcome"])
        .expect("metric can be registered")
});

/// Registers every metric up front so `/metrics` lists them before first use.
pub fn register_metrics() {
    Lazy::force(&CLIENTS_IMPORTED);
    Lazy::force(&INVOICES_CREATED);
    Lazy::force(&PDF_RENDERS);
    Lazy::force(&INVOICE_EMAILS);
}
