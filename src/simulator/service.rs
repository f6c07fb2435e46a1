use std::{ops::RangeInclusive, sync::Arc, time::Duration};

use rand::Rng;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{db::models::Reading, telemetry::IngestionService};

/// Percent range drawn for synthetic soil moisture.
pub const SOIL_MOISTURE_RANGE: RangeInclusive<f64> = 20.0..=80.0;
/// Typical LiPo cell voltage range drawn for synthetic battery level.
pub const BATTERY_LEVEL_RANGE: RangeInclusive<f64> = 3.0..=4.2;

/// Stands in for field hardware: every interval it submits one synthetic
/// reading per configured device through the ingestion path.
///
/// The random source is a type parameter so tests can drive it with a
/// seeded generator.
pub struct Simulator<R> {
    telemetry: Arc<IngestionService>,
    device_ids: Vec<String>,
    interval: Duration,
    rng: R,
}

impl<R: Rng + Send> Simulator<R> {
    pub fn new(
        telemetry: Arc<IngestionService>,
        device_ids: Vec<String>,
        interval: Duration,
        rng: R,
    ) -> Self {
        Self {
            telemetry,
            device_ids,
            interval,
            rng,
        }
    }

    /// Runs cycles until `shutdown` is cancelled.
    /// Spawn this via `tokio::spawn`.
    ///
    /// Cycles execute one after another on this task, so a slow cycle
    /// delays the next tick instead of overlapping it.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            devices = self.device_ids.len(),
            "Simulator started"
        );
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        info!("Simulator stopped");
    }

    /// Submits one reading per device and returns the ones that were stored.
    ///
    /// A failed submission is logged and does not stop the remaining
    /// devices of the cycle.
    pub async fn run_cycle(&mut self) -> Vec<Reading> {
        let mut stored = Vec::with_capacity(self.device_ids.len());

        for device_id in &self.device_ids {
            let (soil_moisture, battery_level) = synthesize(&mut self.rng);

            match self
                .telemetry
                .submit(device_id, soil_moisture, battery_level)
                .await
            {
                Ok(reading) => {
                    debug!(
                        device_id = %device_id,
                        soil_moisture,
                        battery_level,
                        "Simulated reading stored"
                    );
                    stored.push(reading);
                }
                Err(e) => {
                    error!(device_id = %device_id, error = %e, "Failed to store simulated reading");
                }
            }
        }

        info!(
            devices = self.device_ids.len(),
            stored = stored.len(),
            "Simulation cycle complete"
        );
        stored
    }
}

/// Draws `(soil_moisture, battery_level)` uniformly from their ranges,
/// each rounded to one decimal place.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let soil_moisture = round_one_decimal(rng.gen_range(SOIL_MOISTURE_RANGE));
    let battery_level = round_one_decimal(rng.gen_range(BATTERY_LEVEL_RANGE));
    (soil_moisture, battery_level)
}

#[inline]
pub(crate) fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
