use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use thiserror::Error;

use crate::models::{Client, Invoice, NewClient, NewInvoice};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )",
    "CREATE INDEX IF NOT EXISTS ix_clients_name ON clients (name)",
    "CREATE TABLE IF NOT EXISTS invoices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL REFERENCES clients (id),
        amount REAL NOT NULL,
        tax REAL NOT NULL,
        total REAL NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS ix_invoices_client_id ON invoices (client_id)",
];

/// A database session. Dropping it without `commit` rolls back.
pub type Session = Transaction<'static, Sqlite>;

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens a pool for `database_url` with foreign keys enforced.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Creates the `clients` and `invoices` tables when absent.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StorageError::Schema)?;
        }
        Ok(())
    }

    pub async fn begin(&self) -> Result<Session, StorageError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    pub fn clients(&self) -> ClientRepository {
        ClientRepository {
            pool: self.pool.clone(),
        }
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository {
            pool: self.pool.clone(),
        }
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to create schema: {0}")]
    Schema(sqlx::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for the `clients` table.
#[derive(Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Stages a client inside an open session and returns its id.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        client: &NewClient,
    ) -> Result<i64, StorageError> {
        let result = sqlx::query("INSERT INTO clients (name, email) VALUES (?, ?)")
            .bind(&client.name)
            .bind(&client.email)
            .execute(conn)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn exists(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<bool, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE id = ?")
            .bind(id)
            .fetch_one(conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Client>, StorageError> {
        let client = sqlx::query_as::<_, Client>("SELECT id, name, email FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Repository for the `invoices` table.
#[derive(Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Stages an invoice inside an open session and returns its id.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        invoice: &NewInvoice,
    ) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO invoices (client_id, amount, tax, total) VALUES (?, ?, ?, ?)",
        )
        .bind(invoice.client_id)
        .bind(invoice.amount)
        .bind(invoice.tax)
        .bind(invoice.total)
        .execute(conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find(&self, id: i64) -> Result<Option<Invoice>, StorageError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT id, client_id, amount, tax, total FROM invoices WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice)
    }

    pub async fn count_for_client(&self, client_id: i64) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE client_id = ?")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
