use std::sync::Arc;

use thiserror::Error;

use super::composer::EmailComposer;
use super::mailer::{MailError, Mailer};
use crate::core::DocumentError;
use crate::pdf::InvoiceRenderer;
use crate::storage::{Database, StorageError};
use crate::telemetry;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invoice not found")]
    InvoiceNotFound(i64),
    #[error("Client not found")]
    ClientNotFound(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to render invoice: {0}")]
    Render(#[from] DocumentError),
    #[error("failed to compose email: {0}")]
    Template(#[from] minijinja::Error),
    #[error("{0}")]
    Delivery(#[from] MailError),
}

/// Emails a rendered invoice to its client.
pub struct InvoiceNotifier {
    db: Database,
    renderer: InvoiceRenderer,
    composer: EmailComposer,
    mailer: Arc<dyn Mailer>,
}

impl InvoiceNotifier {
    pub fn new(
        db: Database,
        renderer: InvoiceRenderer,
        composer: EmailComposer,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        InvoiceNotifier {
            db,
            renderer,
            composer,
            mailer,
        }
    }

    pub fn renderer(&self) -> &InvoiceRenderer {
        &self.renderer
    }

    /// Sends invoice `invoice_id` to its client and returns the recipient
    /// address. Nothing is rendered or sent for an unknown invoice.
    pub async fn send_invoice(&self, invoice_id: i64) -> Result<String, NotifyError> {
        let result = self.deliver(invoice_id).await;

        let outcome = match &result {
            Ok(_) => "sent",
            Err(NotifyError::InvoiceNotFound(_)) => "not_found",
            Err(_) => "failed",
        };
        telemetry::INVOICE_EMAILS.with_label_values(&[outcome]).inc();

        result
    }

    async fn deliver(&self, invoice_id: i64) -> Result<String, NotifyError> {
        let Some(invoice) = self.db.invoices().find(invoice_id).await? else {
            tracing::warn!(invoice_id, "email requested for unknown invoice");
            return Err(NotifyError::InvoiceNotFound(invoice_id));
        };

        let client = self
            .db
            .clients()
            .find(invoice.client_id)
            .await?
            .ok_or(NotifyError::ClientNotFound(invoice.client_id))?;

        let document = self.renderer.render_cached(&invoice, &client).await?;
        let email = self.composer.compose(&invoice, &client, &document)?;

        if let Err(e) = self.mailer.send(&email).await {
            tracing::error!(invoice_id, to = %client.email, error = %e, "failed to email invoice");
            return Err(e.into());
        }

        tracing::info!(invoice_id, to = %client.email, "invoice emailed");
        Ok(client.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceCreate, NewClient};
    use crate::invoicing::InvoiceService;
    use crate::notify::mailer::testing::RecordingMailer;

    struct Fixture {
        notifier: InvoiceNotifier,
        mailer: Arc<RecordingMailer>,
        _dir: tempfile::TempDir,
    }

    async fn fixture(mailer: RecordingMailer) -> Fixture {
        let db = Database::connect("sqlite::memory:").await.expect("connect");
        db.init_schema().await.expect("schema");

        let mut session = db.begin().await.unwrap();
        db.clients()
            .insert(&mut session, &NewClient::new("Alice", "a@x.com"))
            .await
            .unwrap();
        session.commit().await.unwrap();
        InvoiceService::new(db.clone())
            .create(&InvoiceCreate { client_id: 1, amount: 100.0, tax: 8.0 })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mailer = Arc::new(mailer);
        let notifier = InvoiceNotifier::new(
            db,
            InvoiceRenderer::new(dir.path()),
            EmailComposer::new("billing@example.com", "RCTI Team").unwrap(),
            mailer.clone(),
        );

        Fixture {
            notifier,
            mailer,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn sends_invoice_with_pdf_attached() {
        let fx = fixture(RecordingMailer::default()).await;

        let recipient = fx.notifier.send_invoice(1).await.unwrap();
        assert_eq!(recipient, "a@x.com");

        let sent = fx.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, "Invoice #1");
        let attachment = sent[0].attachment.as_ref().expect("attachment");
        assert_eq!(attachment.filename, "invoice_1.pdf");
        assert!(attachment.bytes.starts_with(b"%PDF"));
        assert!(fx.notifier.renderer().document_path(1).exists());
    }

    #[tokio::test]
    async fn unknown_invoice_never_reaches_mailer() {
        let fx = fixture(RecordingMailer::default()).await;

        let err = fx.notifier.send_invoice(99).await.unwrap_err();
        assert!(matches!(err, NotifyError::InvoiceNotFound(99)));
        assert_eq!(err.to_string(), "Invoice not found");
        assert!(fx.mailer.sent().is_empty());
        assert!(!fx.notifier.renderer().document_path(99).exists());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_once() {
        let fx = fixture(RecordingMailer::failing("connection refused")).await;

        let err = fx.notifier.send_invoice(1).await.unwrap_err();
        assert!(matches!(err, NotifyError::Delivery(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(fx.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn resend_reuses_rendered_document() {
        let fx = fixture(RecordingMailer::default()).await;

        fx.notifier.send_invoice(1).await.unwrap();
        fx.notifier.send_invoice(1).await.unwrap();

        let sent = fx.mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].attachment, sent[1].attachment);
    }
}
