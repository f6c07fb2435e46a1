pub mod service;

pub use service::Simulator;
