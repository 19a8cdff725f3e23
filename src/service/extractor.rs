use crate::config::ExtractorConfig;
use crate::error::ProcessError;
use crate::models::Invoice;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// 发票抽取服务: 原始文本 -> 结构化发票
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<Invoice, ProcessError>;
}

/// 请求体: { "body": "<原始文本>" }
#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    body: &'a str,
}

/// 通过 HTTP POST 调用外部抽取服务
pub struct HttpExtractor {
    client: Client,
    url: String,
}

impl HttpExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InvoiceExtractor for HttpExtractor {
    async fn extract(&self, raw_text: &str) -> Result<Invoice, ProcessError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ExtractRequest { body: raw_text })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = %status, bytes = body.len(), "extractor responded");

        if !status.is_success() {
            return Err(ProcessError::Endpoint {
                status: status.as_u16(),
                detail: error_detail(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        parse_invoice(&body)
    }
}

/// 解析成功响应; 兼容 Lambda 代理格式 { statusCode, headers, body: "<json>" }
pub fn parse_invoice(body: &[u8]) -> Result<Invoice, ProcessError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ProcessError::MalformedResponse(e.to_string()))?;

    let envelope = match (
        value.get("statusCode").and_then(Value::as_u64),
        value.get("body").and_then(Value::as_str),
    ) {
        (Some(code), Some(inner)) => Some((code, inner)),
        _ => None,
    };

    match envelope {
        Some((code, inner)) if code >= 400 => Err(ProcessError::Endpoint {
            status: u16::try_from(code).unwrap_or(500),
            detail: error_detail(inner.as_bytes()).unwrap_or_else(|| inner.to_string()),
        }),
        Some((_, inner)) => serde_json::from_str(inner)
            .map_err(|e| ProcessError::MalformedResponse(e.to_string())),
        None => serde_json::from_value(value)
            .map_err(|e| ProcessError::MalformedResponse(e.to_string())),
    }
}

/// 错误响应中的可读信息: FastAPI 的 detail, 或 Lambda 的 error
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let field = value.get("detail").or_else(|| value.get("error"))?;

    match field {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}
