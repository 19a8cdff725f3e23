use crate::error::ProcessError;
use crate::models::ProcessedInvoice;
use crate::service::InvoiceExtractor;
use serde::Serialize;
use std::borrow::Borrow;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;

/// 上传的单个文件 (读取失败时 data 为错误描述)
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Result<Vec<u8>, String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: Ok(data.into()),
        }
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Err(reason.into()),
        }
    }

    /// 读取全文; 与浏览器一致, 非法 UTF-8 字节替换为 U+FFFD, 去掉 BOM
    pub fn read_text(&self) -> Result<String, ProcessError> {
        if !is_txt(&self.name) {
            return Err(ProcessError::FileRead(
                "solo se aceptan archivos .txt".to_string(),
            ));
        }

        let bytes = self
            .data
            .as_ref()
            .map_err(|reason| ProcessError::FileRead(reason.clone()))?;

        let text = match String::from_utf8(bytes.clone()) {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!("[Upload] {} 不是合法的 UTF-8, 已替换非法字节", self.name);
                String::from_utf8_lossy(bytes).into_owned()
            }
        };

        match text.strip_prefix('\u{feff}') {
            Some(stripped) => Ok(stripped.to_string()),
            None => Ok(text),
        }
    }
}

fn is_txt(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// 批次处理结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: Vec<String>,
}

/// 页面渲染用的状态快照
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub invoices: Vec<ProcessedInvoice>,
    pub selected: Option<usize>,
    pub processing: bool,
    pub error: Option<String>,
}

impl Snapshot {
    pub fn selected_invoice(&self) -> Option<&ProcessedInvoice> {
        self.selected.and_then(|i| self.invoices.get(i))
    }
}

#[derive(Debug, Default)]
struct SessionState {
    invoices: Vec<ProcessedInvoice>,
    selected: Option<usize>,
    last_error: Option<String>,
    active_batches: usize,
}

/// 上传与处理控制器
/// 持有已处理发票列表、处理中标志、最近一次错误和当前选中项
pub struct UploadController {
    extractor: Arc<dyn InvoiceExtractor>,
    state: RwLock<SessionState>,
}

impl UploadController {
    pub fn new(extractor: Arc<dyn InvoiceExtractor>) -> Self {
        Self {
            extractor,
            state: RwLock::new(SessionState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 按顺序逐个处理文件; 单个文件失败只记录错误, 不中断批次
    pub async fn process_batch(&self, files: Vec<UploadedFile>) -> BatchReport {
        let _batch = BatchGuard::enter(self);
        self.run_batch(files).await
    }

    /// 在后台任务中处理批次, 返回前处理中标志已置位
    /// interrupted: 上传流中断时追加的错误消息, 批次结束后记录
    pub fn spawn_batch(
        self: &Arc<Self>,
        files: Vec<UploadedFile>,
        interrupted: Option<String>,
    ) -> JoinHandle<BatchReport> {
        let batch = BatchGuard::enter(self.clone());
        tokio::spawn(async move {
            let controller: &UploadController = batch.controller.borrow();
            let report = controller.run_batch(files).await;
            if let Some(message) = interrupted {
                tracing::error!("[Upload] {}", message);
                controller.write().last_error = Some(message);
            }
            report
        })
    }

    async fn run_batch(&self, files: Vec<UploadedFile>) -> BatchReport {
        tracing::info!("[Upload] 批次开始: {} 个文件", files.len());

        let mut report = BatchReport::default();
        for file in files {
            match self.process_file(&file).await {
                Ok(processed) => {
                    tracing::info!(
                        "[Upload] {} -> {} ({} items)",
                        file.name,
                        processed.invoice.invoice_number,
                        processed.item_count()
                    );
                    self.write().invoices.push(processed);
                    report.processed += 1;
                }
                Err(e) => {
                    let message = e.display_for(&file.name);
                    tracing::error!("[Upload] {}", message);
                    self.write().last_error = Some(message);
                    report.failed.push(file.name);
                }
            }
        }

        tracing::info!(
            "[Upload] 批次结束: 成功 {}, 失败 {}",
            report.processed,
            report.failed.len()
        );
        report
    }

    async fn process_file(&self, file: &UploadedFile) -> Result<ProcessedInvoice, ProcessError> {
        let text = file.read_text()?;
        let invoice = self.extractor.extract(&text).await?;
        Ok(ProcessedInvoice::new(file.name.clone(), invoice))
    }

    pub fn is_processing(&self) -> bool {
        self.read().active_batches > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    pub fn invoices(&self) -> Vec<ProcessedInvoice> {
        self.read().invoices.clone()
    }

    /// 选中某张发票; 下标越界返回 None 且不改变当前选中
    pub fn select(&self, index: usize) -> Option<ProcessedInvoice> {
        let mut state = self.write();
        let invoice = state.invoices.get(index).cloned()?;
        state.selected = Some(index);
        Some(invoice)
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        Snapshot {
            invoices: state.invoices.clone(),
            selected: state.selected,
            processing: state.active_batches > 0,
            error: state.last_error.clone(),
        }
    }
}

/// 批次期间保持处理中标志; 被 drop 时 (包括任务被中止) 计数减一
struct BatchGuard<C: Borrow<UploadController>> {
    controller: C,
}

impl<C: Borrow<UploadController>> BatchGuard<C> {
    fn enter(controller: C) -> Self {
        {
            let mut state = controller.borrow().write();
            state.active_batches += 1;
            state.last_error = None;
        }
        Self { controller }
    }
}

impl<C: Borrow<UploadController>> Drop for BatchGuard<C> {
    fn drop(&mut self) {
        let mut state = self.controller.borrow().write();
        state.active_batches = state.active_batches.saturating_sub(1);
    }
}
