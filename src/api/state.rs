use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::core::{PageSize, PdfConfig};
use crate::import::ClientImporter;
use crate::invoicing::InvoiceService;
use crate::notify::{EmailComposer, InvoiceNotifier, Mailer, SmtpMailer, SmtpSettings};
use crate::pdf::InvoiceRenderer;
use crate::storage::Database;

#[derive(Clone)]
pub struct ApiState {
    pub db: Database,
    pub importer: ClientImporter,
    pub invoices: InvoiceService,
    pub notifier: Arc<InvoiceNotifier>,
    pub config: Arc<AppConfig>,
}

/// Runtime settings, read from the environment at startup.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub document_dir: PathBuf,
    pub pdf_page_size: PageSize,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Falls back to `sender_address` when empty.
    pub smtp_username: String,
    pub smtp_password: String,
    pub sender_address: String,
    pub email_signature: String,
    pub max_upload_size_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite://invoices.db?mode=rwc".to_string(),
            document_dir: PathBuf::from("invoices"),
            pdf_page_size: PageSize::A4,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            sender_address: "invoices@localhost".to_string(),
            email_signature: "RCTI Team".to_string(),
            max_upload_size_bytes: 10_485_760, // 10MB
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with environment variables (`DATABASE_URL`,
    /// `SMTP_HOST`, ...).
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = AppConfig::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("document_dir", defaults.document_dir.to_string_lossy().into_owned())?
            .set_default("pdf_page_size", "a4")?
            .set_default("smtp_host", defaults.smtp_host)?
            .set_default("smtp_port", i64::from(defaults.smtp_port))?
            .set_default("smtp_username", defaults.smtp_username)?
            .set_default("smtp_password", defaults.smtp_password)?
            .set_default("sender_address", defaults.sender_address)?
            .set_default("email_signature", defaults.email_signature)?
            .set_default("max_upload_size_bytes", defaults.max_upload_size_bytes as i64)?
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn smtp_settings(&self) -> SmtpSettings {
        let username = if self.smtp_username.is_empty() {
            self.sender_address.clone()
        } else {
            self.smtp_username.clone()
        };

        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username,
            password: self.smtp_password.clone(),
        }
    }
}

impl ApiState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database_url).await?;
        db.init_schema().await?;

        let mailer = Arc::new(SmtpMailer::new(&config.smtp_settings())?);

        Self::from_parts(config, db, mailer)
    }

    /// Wires the services around an already initialized database and mailer.
    pub fn from_parts(
        config: AppConfig,
        db: Database,
        mailer: Arc<dyn Mailer>,
    ) -> anyhow::Result<Self> {
        let renderer = InvoiceRenderer::new(config.document_dir.clone())
            .with_config(PdfConfig::with_page_size(config.pdf_page_size));
        let composer = EmailComposer::new(
            config.sender_address.clone(),
            config.email_signature.clone(),
        )?;
        let notifier = InvoiceNotifier::new(db.clone(), renderer, composer, mailer);

        Ok(ApiState {
            importer: ClientImporter::new(db.clone()),
            invoices: InvoiceService::new(db.clone()),
            notifier: Arc::new(notifier),
            db,
            config: Arc::new(config),
        })
    }
}
