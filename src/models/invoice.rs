use serde::{Deserialize, Serialize};

/// A stored invoice. `total` was computed as `amount + tax` at creation and
/// is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: i64,
    pub client_id: i64,
    pub amount: f64,
    pub tax: f64,
    pub total: f64,
}

/// Request body of `POST /create_invoice/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreate {
    pub client_id: i64,
    pub amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub client_id: i64,
    pub amount: f64,
    pub tax: f64,
    pub total: f64,
}

impl From<&InvoiceCreate> for NewInvoice {
    fn from(request: &InvoiceCreate) -> Self {
        NewInvoice {
            client_id: request.client_id,
            amount: request.amount,
            tax: request.tax,
            total: request.amount + request.tax,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceCreated {
    pub msg: &'static str,
    #[serde(flatten)]
    pub invoice: Invoice,
}

impl From<Invoice> for InvoiceCreated {
    fn from(invoice: Invoice) -> Self {
        InvoiceCreated {
            msg: "Invoice created successfully",
            invoice,
        }
    }
}
