use invoice_desk::{router, AppConfig, AppState, HttpExtractor, PageRenderer, UploadController};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式, 级别可由 RUST_LOG 覆盖
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 抽取服务客户端 + 上传控制器
    let extractor = HttpExtractor::new(&config.extractor)?;
    info!("Extractor endpoint: {}", extractor.url());
    let controller = UploadController::new(Arc::new(extractor));

    let state = AppState::new(controller, PageRenderer::new()?);
    let app = router(state);

    // 启动服务器
    let addr = config.bind_addr();
    info!("Server listening on {}", addr);
    info!("Endpoints:");
    info!("  GET  /                 - 页面");
    info!("  POST /upload           - 上传 .txt 发票");
    info!("  GET  /export.csv       - 导出 CSV");
    info!("  GET  /api/invoices     - 状态 (JSON)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
