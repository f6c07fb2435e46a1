pub mod service;

pub use service::LeituraService;
