use crate::api::{error::ApiError, AppState, MAX_UPLOAD_FILE_BYTES};
use crate::error::ProcessError;
use crate::service::{export_csv, Snapshot, UploadedFile, REPORT_FILE_NAME};
use axum::{
    extract::{multipart::Field, Json, Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 主页面
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let page = state.pages.render_page(&state.controller.snapshot())?;
    Ok(Html(page))
}

/// 选中发票并显示详情
pub async fn show_invoice(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Html<String>, ApiError> {
    state
        .controller
        .select(index)
        .ok_or(ApiError::InvoiceNotFound(index))?;

    let page = state.pages.render_page(&state.controller.snapshot())?;
    Ok(Html(page))
}

/// 上传一批 .txt 文件; 批次在后台处理, 立即回到主页面显示进度
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Redirect {
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut interrupted = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(mut field)) => {
                // 未选择文件时浏览器也会提交一个空文件名的字段
                let Some(name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
                else {
                    continue;
                };
                files.push(read_field(name, &mut field).await);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("[Upload] multipart 读取中断: {}", e.body_text());
                // 中断发生在某个文件内部时, 该文件已带文件名记录错误
                let last_failed = files.last().map(|f| f.data.is_err()).unwrap_or(false);
                if !last_failed {
                    interrupted = Some(
                        ProcessError::FileRead(e.body_text()).display_for("archivos restantes del lote"),
                    );
                }
                break;
            }
        }
    }

    if !files.is_empty() || interrupted.is_some() {
        state.controller.spawn_batch(files, interrupted);
    }

    Redirect::to("/")
}

/// 按块读取单个文件, 超过上限的文件标记为读取失败
async fn read_field(name: String, field: &mut Field<'_>) -> UploadedFile {
    let mut data = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if data.len() + chunk.len() > MAX_UPLOAD_FILE_BYTES {
                    while let Ok(Some(_)) = field.chunk().await {}
                    return UploadedFile::failed(
                        name,
                        format!(
                            "el archivo supera {} MiB",
                            MAX_UPLOAD_FILE_BYTES / (1024 * 1024)
                        ),
                    );
                }
                data.extend_from_slice(&chunk);
            }
            Ok(None) => return UploadedFile::new(name, data),
            Err(e) => return UploadedFile::failed(name, e.body_text()),
        }
    }
}

/// 下载 CSV 报表
pub async fn download_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let invoices = state.controller.invoices();
    if invoices.is_empty() {
        return Err(ApiError::NothingToExport);
    }

    let body = export_csv(&invoices)?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", REPORT_FILE_NAME),
        ),
    ];
    Ok((headers, body).into_response())
}

/// 当前状态 (JSON)
pub async fn list_invoices(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.controller.snapshot())
}
