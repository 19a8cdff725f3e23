use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// HTTP 层错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no existe la factura #{0}")]
    InvoiceNotFound(usize),

    #[error("no hay facturas para exportar")]
    NothingToExport,

    #[error("error al generar la página: {0}")]
    Render(#[from] tera::Error),

    #[error("error al generar el CSV: {0}")]
    Export(#[from] csv::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvoiceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NothingToExport => StatusCode::CONFLICT,
            ApiError::Render(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{:?}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
