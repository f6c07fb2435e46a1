use std::{cmp::Reverse, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LeituraStore, ReadingStore, StorageError};
use crate::db::models::{Leitura, NewLeitura, NewReading, Reading};

/// In-process store used when no `DATABASE_URL` is configured.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Appends take the write lock only long enough to push one row, so
/// concurrent writers (HTTP handlers and the simulator) never interleave
/// partial records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    readings: Arc<RwLock<Vec<Reading>>>,
    leituras: Arc<RwLock<Vec<Leitura>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn append(&self, reading: NewReading) -> Result<Reading, StorageError> {
        let stored = Reading {
            id: Uuid::new_v4(),
            device_id: reading.device_id,
            soil_moisture: reading.soil_moisture,
            battery_level: reading.battery_level,
            timestamp: reading.timestamp.unwrap_or_else(Utc::now),
        };
        self.readings.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Reading>, StorageError> {
        Ok(self.readings.read().await.clone())
    }

    async fn list_by_device(&self, device_id: &str) -> Result<Vec<Reading>, StorageError> {
        let mut rows: Vec<Reading> = self
            .readings
            .read()
            .await
            .iter()
            .filter(|r| r.device_id == device_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| Reverse(r.timestamp));
        Ok(rows)
    }

    async fn list_by_device_and_range(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StorageError> {
        let mut rows = self.list_by_device(device_id).await?;
        rows.retain(|r| start <= r.timestamp && r.timestamp <= end);
        Ok(rows)
    }
}

#[async_trait]
impl LeituraStore for MemoryStore {
    async fn append(&self, leitura: NewLeitura) -> Result<Leitura, StorageError> {
        let stored = Leitura {
            id: Uuid::new_v4(),
            sensor_id: leitura.sensor_id,
            umidade: leitura.umidade,
            temperatura: leitura.temperatura,
            status: leitura.status,
            data_hora: Some(leitura.data_hora.unwrap_or_else(Utc::now)),
        };
        self.leituras.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self) -> Result<Vec<Leitura>, StorageError> {
        let mut rows = self.leituras.read().await.clone();
        // `None` sorts below `Some`, so reversing puts undated rows last.
        rows.sort_by_key(|l| Reverse(l.data_hora));
        Ok(rows)
    }

    async fn latest(&self) -> Result<Option<Leitura>, StorageError> {
        Ok(self.list_recent().await?.into_iter().next())
    }
}
