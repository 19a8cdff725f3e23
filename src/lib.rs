pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use api::{router, AppState, PageRenderer};
pub use config::AppConfig;
pub use error::ProcessError;
pub use service::{HttpExtractor, InvoiceExtractor, UploadController};
