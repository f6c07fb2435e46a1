use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::validation::{validate, ValidTelemetry, ValidationError};
use crate::{
    db::models::{NewReading, Reading},
    store::{ReadingStore, StorageError},
};

/// Soil moisture percentage below which a drought alert is logged.
pub const DEFAULT_DROUGHT_THRESHOLD: f64 = 30.0;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// `true` when a reading must raise a drought alert. The boundary itself
/// does not alert.
pub fn is_drought(soil_moisture: f64, threshold: f64) -> bool {
    soil_moisture < threshold
}

/// Validates, timestamps and persists readings coming from devices and the
/// simulator.
pub struct IngestionService {
    store: Arc<dyn ReadingStore>,
    drought_threshold: f64,
}

impl IngestionService {
    pub fn new(store: Arc<dyn ReadingStore>, drought_threshold: f64) -> Self {
        Self {
            store,
            drought_threshold,
        }
    }

    /// Validates raw values and stores them through [`Self::record`].
    ///
    /// Invalid input is rejected before anything is written.
    pub async fn submit(
        &self,
        device_id: &str,
        soil_moisture: f64,
        battery_level: f64,
    ) -> Result<Reading, TelemetryError> {
        let telemetry = validate(Some(device_id), Some(soil_moisture), Some(battery_level))?;
        self.record(telemetry).await
    }

    /// Stores one reading stamped with the current server time.
    ///
    /// Readings below the drought threshold additionally emit a `warn!`
    /// event; nothing else is triggered. Submissions are not deduplicated.
    pub async fn record(&self, telemetry: ValidTelemetry) -> Result<Reading, TelemetryError> {
        let device_id = telemetry.device_id();
        let soil_moisture = telemetry.soil_moisture();
        let battery_level = telemetry.battery_level();

        info!(
            device_id = %device_id,
            soil_moisture,
            battery_level,
            "Receiving telemetry"
        );

        if is_drought(soil_moisture, self.drought_threshold) {
            warn!(
                device_id = %device_id,
                soil_moisture,
                threshold = self.drought_threshold,
                "Drought alert: soil moisture below threshold"
            );
        }

        let reading = self
            .store
            .append(NewReading {
                device_id: device_id.to_owned(),
                soil_moisture,
                battery_level,
                timestamp: Some(Utc::now()),
            })
            .await?;

        debug!(device_id = %device_id, id = %reading.id, "Telemetry persisted");
        Ok(reading)
    }

    /// Every stored reading, in store order.
    pub async fn list_all(&self) -> Result<Vec<Reading>, TelemetryError> {
        Ok(self.store.list_all().await?)
    }

    /// Readings of one device, newest first, optionally limited to an
    /// inclusive time range.
    pub async fn list_by_device(
        &self,
        device_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Reading>, TelemetryError> {
        let rows = match range {
            Some((start, end)) => {
                self.store
                    .list_by_device_and_range(device_id, start, end)
                    .await?
            }
            None => self.store.list_by_device(device_id).await?,
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fmt,
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;
    use chrono::Duration;
    use tracing::{
        field::{Field, Visit},
        Event, Level, Subscriber,
    };
    use tracing_subscriber::{layer::Context, prelude::*, Layer};

    use super::*;
    use crate::store::MemoryStore;

    /// One recorded log event: its level, `device_id` field and message.
    #[derive(Debug, Clone)]
    struct Captured {
        level: Level,
        device_id: Option<String>,
        message: String,
    }

    /// Layer that keeps every event so tests can assert on what was logged.
    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<Captured>>>,
    }

    impl CaptureLayer {
        fn take(&self) -> Vec<Captured> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    #[derive(Default)]
    struct FieldVisitor {
        device_id: Option<String>,
        message: String,
    }

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            match field.name() {
                "device_id" => self.device_id = Some(format!("{value:?}")),
                "message" => self.message = format!("{value:?}"),
                _ => {}
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(Captured {
                level: *event.metadata().level(),
                device_id: visitor.device_id,
                message: visitor.message,
            });
        }
    }

    fn service() -> (IngestionService, MemoryStore) {
        let store = MemoryStore::new();
        let svc = IngestionService::new(Arc::new(store.clone()), DEFAULT_DROUGHT_THRESHOLD);
        (svc, store)
    }

    /// Store whose every operation fails, as if the database were down.
    struct DownStore;

    #[async_trait]
    impl ReadingStore for DownStore {
        async fn append(&self, _: NewReading) -> Result<Reading, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list_all(&self) -> Result<Vec<Reading>, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list_by_device(&self, _: &str) -> Result<Vec<Reading>, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list_by_device_and_range(
            &self,
            _: &str,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<Vec<Reading>, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[test]
    fn drought_boundary_is_exclusive() {
        assert!(is_drought(29.9, DEFAULT_DROUGHT_THRESHOLD));
        assert!(!is_drought(30.0, DEFAULT_DROUGHT_THRESHOLD));
        assert!(!is_drought(80.0, DEFAULT_DROUGHT_THRESHOLD));
    }

    #[tokio::test]
    async fn submit_persists_exactly_one_reading() {
        let (svc, store) = service();
        let before = Utc::now();
        let r = svc.submit("D1", 42.3, 3.8).await.unwrap();
        let after = Utc::now();

        assert_eq!(r.device_id, "D1");
        assert_eq!(r.soil_moisture, 42.3);
        assert_eq!(r.battery_level, 3.8);
        assert!(before <= r.timestamp && r.timestamp <= after);

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![r]);
    }

    #[tokio::test]
    async fn submit_below_threshold_still_persists() {
        let (svc, store) = service();
        svc.submit("D1", 29.9, 3.7).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drought_alert_is_logged_only_below_threshold() {
        let capture = CaptureLayer::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(capture.clone()),
        );
        let (svc, _store) = service();

        svc.submit("D1", 29.9, 3.7).await.unwrap();
        let events = capture.take();
        let warns: Vec<_> = events.iter().filter(|e| e.level == Level::WARN).collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].device_id.as_deref(), Some("D1"));
        assert!(warns[0].message.contains("Drought alert"));
        let received = events
            .iter()
            .filter(|e| e.level == Level::INFO && e.message == "Receiving telemetry")
            .count();
        assert_eq!(received, 1);

        svc.submit("D1", 30.0, 3.7).await.unwrap();
        let events = capture.take();
        assert!(events.iter().all(|e| e.level != Level::WARN));
        let received = events
            .iter()
            .filter(|e| e.level == Level::INFO && e.message == "Receiving telemetry")
            .count();
        assert_eq!(received, 1);
    }

    #[tokio::test]
    async fn invalid_submission_writes_nothing() {
        let (svc, store) = service();

        for (id, soil, battery) in [("", 50.0, 3.7), ("D1", -1.0, 3.7), ("D1", 101.0, 3.7), ("D1", 50.0, -0.5)] {
            let err = svc.submit(id, soil, battery).await.unwrap_err();
            assert!(matches!(err, TelemetryError::Validation(_)));
        }

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_stores_validated_values() {
        let (svc, store) = service();
        let telemetry = validate(Some("HELTEC-02"), Some(61.4), Some(4.0)).unwrap();

        let r = svc.record(telemetry).await.unwrap();
        assert_eq!(r.device_id, "HELTEC-02");
        assert_eq!(r.soil_moisture, 61.4);
        assert_eq!(r.battery_level, 4.0);
        assert_eq!(store.list_all().await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn duplicate_submissions_are_not_deduplicated() {
        let (svc, store) = service();
        let a = svc.submit("D1", 50.0, 3.7).await.unwrap();
        let b = svc.submit("D1", 50.0, 3.7).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_storage_error() {
        let svc = IngestionService::new(Arc::new(DownStore), DEFAULT_DROUGHT_THRESHOLD);
        let err = svc.submit("D1", 50.0, 3.7).await.unwrap_err();
        assert!(matches!(err, TelemetryError::Storage(_)));
    }

    #[tokio::test]
    async fn list_by_device_applies_optional_range() {
        let (svc, store) = service();
        let t0 = Utc::now() - Duration::hours(1);
        for i in 0..3 {
            ReadingStore::append(
                &store,
                NewReading {
                    device_id: "D1".into(),
                    soil_moisture: 50.0,
                    battery_level: 3.7,
                    timestamp: Some(t0 + Duration::minutes(i * 10)),
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(svc.list_by_device("D1", None).await.unwrap().len(), 3);
        let ranged = svc
            .list_by_device("D1", Some((t0, t0 + Duration::minutes(10))))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);
        assert!(svc.list_by_device("D2", None).await.unwrap().is_empty());
    }
}
