pub mod error;
pub mod handlers;
pub mod views;

pub use error::ApiError;
pub use views::PageRenderer;

use crate::service::UploadController;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 单个上传文件的大小上限; 整批请求不设上限
pub const MAX_UPLOAD_FILE_BYTES: usize = 16 * 1024 * 1024;

/// 共享状态: 上传控制器 + 页面渲染器
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<UploadController>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(controller: UploadController, pages: PageRenderer) -> Self {
        Self {
            controller: Arc::new(controller),
            pages: Arc::new(pages),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/invoices/:index", get(handlers::show_invoice))
        .route("/upload", post(handlers::upload))
        .route("/export.csv", get(handlers::download_csv))
        .route("/api/invoices", get(handlers::list_invoices))
        .route("/health", get(handlers::health_check))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::disable()))
        .with_state(state)
}
