use thiserror::Error;

use crate::models::{Invoice, InvoiceCreate, NewInvoice};
use crate::storage::{Database, StorageError};
use crate::telemetry;

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Client not found")]
    ClientNotFound(i64),
    #[error("{0} must be a finite number")]
    InvalidAmount(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Creates invoices with their derived total.
#[derive(Clone)]
pub struct InvoiceService {
    db: Database,
}

impl InvoiceService {
    pub fn new(db: Database) -> Self {
        InvoiceService { db }
    }

    /// Persists a new invoice for an existing client and returns the stored
    /// row.
    pub async fn create(&self, request: &InvoiceCreate) -> Result<Invoice, InvoiceError> {
        if !request.amount.is_finite() {
            return Err(InvoiceError::InvalidAmount("amount"));
        }
        if !request.tax.is_finite() {
            return Err(InvoiceError::InvalidAmount("tax"));
        }
        if !(request.amount + request.tax).is_finite() {
            return Err(InvoiceError::InvalidAmount("total"));
        }

        let new_invoice = NewInvoice::from(request);
        let invoices = self.db.invoices();

        let mut session = self.db.begin().await?;
        if !self.db.clients().exists(&mut session, request.client_id).await? {
            return Err(InvoiceError::ClientNotFound(request.client_id));
        }
        let id = invoices.insert(&mut session, &new_invoice).await?;
        session.commit().await.map_err(StorageError::from)?;

        let invoice = invoices
            .find(id)
            .await?
            .ok_or(StorageError::Database(sqlx::Error::RowNotFound))?;

        telemetry::INVOICES_CREATED.inc();
        tracing::info!(
            invoice_id = invoice.id,
            client_id = invoice.client_id,
            total = invoice.total,
            "invoice created"
        );

        Ok(invoice)
    }
}
