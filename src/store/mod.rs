//! Append-only persistence for readings and leituras.
//!
//! Two backends implement the same traits: [`PgStore`] on top of a Postgres
//! pool and [`MemoryStore`] for runs without a database (and for tests).
//! Both are safe to share between the HTTP handlers and the simulator task.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::models::{Leitura, NewLeitura, NewReading, Reading};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist a new reading and return its stored form, including the
    /// assigned id and, when none was supplied, the receipt timestamp.
    async fn append(&self, reading: NewReading) -> Result<Reading, StorageError>;

    /// Every stored reading, in no particular order.
    async fn list_all(&self) -> Result<Vec<Reading>, StorageError>;

    /// Readings of one device, newest first.
    async fn list_by_device(&self, device_id: &str) -> Result<Vec<Reading>, StorageError>;

    /// Readings of one device with `start <= timestamp <= end`, newest first.
    async fn list_by_device_and_range(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StorageError>;
}

#[async_trait]
pub trait LeituraStore: Send + Sync {
    async fn append(&self, leitura: NewLeitura) -> Result<Leitura, StorageError>;

    /// All leituras ordered by `data_hora` descending; rows without a
    /// timestamp come last.
    async fn list_recent(&self) -> Result<Vec<Leitura>, StorageError>;

    /// The most recent leitura, if any.
    async fn latest(&self) -> Result<Option<Leitura>, StorageError>;
}
