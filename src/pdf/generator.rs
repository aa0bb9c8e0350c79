use std::path::PathBuf;

use uuid::Uuid;

use super::builder::PdfBuilder;
use crate::core::{DocumentResult, Money, PdfConfig};
use crate::models::{Client, Invoice};
use crate::telemetry;

/// A rendered invoice document and where it lives on disk.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    /// `true` when an existing file was reused instead of rendering.
    pub reused: bool,
}

impl RenderedDocument {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Renders invoices to PDF and caches the result by invoice id.
#[derive(Clone)]
pub struct InvoiceRenderer {
    config: PdfConfig,
    output_dir: PathBuf,
}

impl InvoiceRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        InvoiceRenderer {
            config: PdfConfig::default(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document_path(&self, invoice_id: i64) -> PathBuf {
        self.output_dir.join(format!("invoice_{}.pdf", invoice_id))
    }

    pub fn render(&self, invoice: &Invoice, client: &Client) -> DocumentResult<Vec<u8>> {
        let mut builder = PdfBuilder::new().with_config(self.config.clone());
        builder
            .add_title("Invoice")
            .add_line_break()
            .add_line(&format!("Invoice ID: {}", invoice.id))
            .add_line(&format!("Client: {} ({})", client.name, client.email))
            .add_line(&format!("Amount: {}", Money::new(invoice.amount).format()))
            .add_line(&format!("Tax: {}", Money::new(invoice.tax).format()))
            .add_line(&format!("Total: {}", Money::new(invoice.total).format()));
        builder.build()
    }

    /// Returns the cached document for `invoice`, rendering it first if no
    /// file exists yet. Cached files are never invalidated.
    pub async fn render_cached(
        &self,
        invoice: &Invoice,
        client: &Client,
    ) -> DocumentResult<RenderedDocument> {
        let path = self.document_path(invoice.id);

        if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            tracing::debug!(path = %path.display(), "reusing rendered invoice");
            return Ok(RenderedDocument {
                path,
                bytes,
                reused: true,
            });
        }

        let bytes = tokio::task::spawn_blocking({
            let renderer = self.clone();
            let invoice = invoice.clone();
            let client = client.clone();
            move || renderer.render(&invoice, &client)
        })
        .await??;

        tokio::fs::create_dir_all(&self.output_dir).await?;

        // Rename is atomic, so racing first renders never expose a partial file.
        let temp_path = self
            .output_dir
            .join(format!(".invoice_{}.{}.tmp", invoice.id, Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&temp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        telemetry::PDF_RENDERS.inc();
        tracing::info!(invoice_id = invoice.id, path = %path.display(), "rendered invoice");

        Ok(RenderedDocument {
            path,
            bytes,
            reused: false,
        })
    }
}
