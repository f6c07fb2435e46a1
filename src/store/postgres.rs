use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{LeituraStore, ReadingStore, StorageError};
use crate::db::models::{Leitura, NewLeitura, NewReading, Reading};

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn append(&self, reading: NewReading) -> Result<Reading, StorageError> {
        let row = sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO sensor_data (device_id, soil_moisture, battery_level, "timestamp")
            VALUES ($1, $2, $3, COALESCE($4, now()))
            RETURNING id, device_id, soil_moisture, battery_level, "timestamp"
            "#,
        )
        .bind(&reading.device_id)
        .bind(reading.soil_moisture)
        .bind(reading.battery_level)
        .bind(reading.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Reading>, StorageError> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, device_id, soil_moisture, battery_level, "timestamp"
            FROM sensor_data
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_by_device(&self, device_id: &str) -> Result<Vec<Reading>, StorageError> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, device_id, soil_moisture, battery_level, "timestamp"
            FROM sensor_data
            WHERE device_id = $1
            ORDER BY "timestamp" DESC
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_by_device_and_range(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StorageError> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT id, device_id, soil_moisture, battery_level, "timestamp"
            FROM sensor_data
            WHERE device_id = $1
              AND "timestamp" BETWEEN $2 AND $3
            ORDER BY "timestamp" DESC
            "#,
        )
        .bind(device_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl LeituraStore for PgStore {
    async fn append(&self, leitura: NewLeitura) -> Result<Leitura, StorageError> {
        let row = sqlx::query_as::<_, Leitura>(
            r#"
            INSERT INTO leituras (sensor_id, umidade, temperatura, status, data_hora)
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            RETURNING id, sensor_id, umidade, temperatura, status, data_hora
            "#,
        )
        .bind(&leitura.sensor_id)
        .bind(leitura.umidade)
        .bind(leitura.temperatura)
        .bind(&leitura.status)
        .bind(leitura.data_hora)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_recent(&self) -> Result<Vec<Leitura>, StorageError> {
        let rows = sqlx::query_as::<_, Leitura>(
            r#"
            SELECT id, sensor_id, umidade, temperatura, status, data_hora
            FROM leituras
            ORDER BY data_hora DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn latest(&self) -> Result<Option<Leitura>, StorageError> {
        let row = sqlx::query_as::<_, Leitura>(
            r#"
            SELECT id, sensor_id, umidade, temperatura, status, data_hora
            FROM leituras
            ORDER BY data_hora DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// Tests (need a live Postgres: `DATABASE_URL=... cargo test -- --ignored`)
// ---------------------------------------------------------------------------
