use thiserror::Error;

/// 单个文件处理失败的原因
#[derive(Debug, Error)]
pub enum ProcessError {
    /// 文件读取失败: 上传流中断, 非 UTF-8 内容或非 .txt 文件
    #[error("no se pudo leer el archivo: {0}")]
    FileRead(String),

    /// 网络失败, 请求没有拿到响应
    #[error("{0}")]
    Network(String),

    /// 抽取服务返回了非成功状态
    #[error("{detail} (HTTP {status})")]
    Endpoint { status: u16, detail: String },

    /// 响应不是预期的发票结构
    #[error("respuesta inesperada del servicio: {0}")]
    MalformedResponse(String),
}

impl ProcessError {
    /// 页面横幅展示的消息, 包含文件名
    pub fn display_for(&self, file_name: &str) -> String {
        format!("Error en {}: {}", file_name, self)
    }
}

impl From<reqwest::Error> for ProcessError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProcessError::MalformedResponse(e.to_string())
        } else {
            ProcessError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_message_names_the_file() {
        let err = ProcessError::Endpoint {
            status: 500,
            detail: "No se proporcionó texto de factura".to_string(),
        };
        assert_eq!(
            err.display_for("factura_02.txt"),
            "Error en factura_02.txt: No se proporcionó texto de factura (HTTP 500)"
        );
    }

    #[test]
    fn malformed_response_message() {
        let err = ProcessError::MalformedResponse("missing field `items`".to_string());
        assert!(err.display_for("a.txt").starts_with("Error en a.txt: respuesta inesperada"));
    }
}
