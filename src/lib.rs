pub mod api;
pub mod config;
pub mod db;
pub mod leituras;
pub mod simulator;
pub mod store;
pub mod telemetry;
pub mod weather;
