use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::TryStreamExt;
use thiserror::Error;

use crate::models::NewClient;
use crate::storage::{Database, StorageError};
use crate::telemetry;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to parse CSV: {0}")]
    Parse(#[from] csv_async::Error),
    #[error("CSV is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Parses an uploaded client list. The header row must contain `name` and
/// `email`; other columns are ignored. Nothing is returned unless every row
/// parses.
pub async fn parse_clients_csv(data: &[u8]) -> Result<Vec<NewClient>, ImportError> {
    let mut reader = AsyncReaderBuilder::new()
        .trim(Trim::Headers)
        .create_reader(data);

    let headers = reader.headers().await?.clone();
    let name_idx = column_index(&headers, "name")?;
    let email_idx = column_index(&headers, "email")?;

    let records: Vec<StringRecord> = reader.records().try_collect().await?;

    Ok(records
        .iter()
        .map(|record| NewClient {
            name: record.get(name_idx).unwrap_or_default().to_string(),
            email: record.get(email_idx).unwrap_or_default().to_string(),
        })
        .collect())
}

fn column_index(headers: &StringRecord, column: &'static str) -> Result<usize, ImportError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or(ImportError::MissingColumn(column))
}

/// Bulk-inserts clients from CSV in a single transaction.
#[derive(Clone)]
pub struct ClientImporter {
    db: Database,
}

impl ClientImporter {
    pub fn new(db: Database) -> Self {
        ClientImporter { db }
    }

    /// Returns the number of clients inserted. Any failing row aborts the
    /// whole batch.
    pub async fn import(&self, data: &[u8]) -> Result<usize, ImportError> {
        let clients = parse_clients_csv(data).await?;

        let repo = self.db.clients();
        let mut session = self.db.begin().await?;
        for client in &clients {
            repo.insert(&mut session, client).await?;
        }
        session.commit().await.map_err(StorageError::from)?;

        telemetry::CLIENTS_IMPORTED.inc_by(clients.len() as u64);
        tracing::info!(rows = clients.len(), "imported clients from CSV");

        Ok(clients.len())
    }
}
