use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::{
    db::models::{Leitura, NewLeitura},
    store::{LeituraStore, StorageError},
};

/// Status tag written on records created by a manual irrigation request.
pub const MANUAL_IRRIGATION_STATUS: &str = "IRRIGACAO_MANUAL";
/// Sensor id used when there is no previous leitura to copy from.
pub const MANUAL_SENSOR_ID: &str = "MANUAL";

pub struct LeituraService {
    store: Arc<dyn LeituraStore>,
}

impl LeituraService {
    pub fn new(store: Arc<dyn LeituraStore>) -> Self {
        Self { store }
    }

    /// All leituras, newest first.
    pub async fn list(&self) -> Result<Vec<Leitura>, StorageError> {
        self.store.list_recent().await
    }

    /// Records a manual irrigation request.
    ///
    /// The new row carries the sensor values of the most recent leitura so
    /// the dashboard can show what the soil looked like when irrigation was
    /// requested; with an empty table it falls back to zeroed values.
    pub async fn manual_irrigation(&self) -> Result<Leitura, StorageError> {
        let base = self.store.latest().await?;

        let (sensor_id, umidade, temperatura) = match base {
            Some(last) => (last.sensor_id, last.umidade, last.temperatura),
            None => (Some(MANUAL_SENSOR_ID.to_owned()), Some(0.0), Some(0.0)),
        };

        let leitura = self
            .store
            .append(NewLeitura {
                sensor_id,
                umidade,
                temperatura,
                status: Some(MANUAL_IRRIGATION_STATUS.to_owned()),
                data_hora: Some(Utc::now()),
            })
            .await?;

        info!(
            sensor_id = ?leitura.sensor_id,
            id = %leitura.id,
            "Manual irrigation requested"
        );
        Ok(leitura)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn manual_irrigation_without_history_uses_defaults() {
        let svc = LeituraService::new(Arc::new(MemoryStore::new()));
        let l = svc.manual_irrigation().await.unwrap();

        assert_eq!(l.sensor_id.as_deref(), Some(MANUAL_SENSOR_ID));
        assert_eq!(l.umidade, Some(0.0));
        assert_eq!(l.temperatura, Some(0.0));
        assert_eq!(l.status.as_deref(), Some(MANUAL_IRRIGATION_STATUS));
        assert!(l.data_hora.is_some());
    }

    #[tokio::test]
    async fn manual_irrigation_copies_latest_reading() {
        let store = MemoryStore::new();
        let t0 = Utc::now() - Duration::minutes(10);
        for (offset, sensor, umidade) in [(0, "S-old", 70.0), (5, "S-new", 35.5)] {
            store
                .append(NewLeitura {
                    sensor_id: Some(sensor.to_owned()),
                    umidade: Some(umidade),
                    temperatura: Some(31.2),
                    status: Some("ATENCAO".to_owned()),
                    data_hora: Some(t0 + Duration::minutes(offset)),
                })
                .await
                .unwrap();
        }

        let svc = LeituraService::new(Arc::new(store.clone()));
        let l = svc.manual_irrigation().await.unwrap();

        assert_eq!(l.sensor_id.as_deref(), Some("S-new"));
        assert_eq!(l.umidade, Some(35.5));
        assert_eq!(l.temperatura, Some(31.2));
        assert_eq!(l.status.as_deref(), Some(MANUAL_IRRIGATION_STATUS));

        let all = svc.list().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, l.id);
    }
}
