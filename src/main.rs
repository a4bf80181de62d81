use invoice_balance::{api, report, runner, AppConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting with config: {:?}", config);

    match std::env::args().nth(1).as_deref() {
        Some("serve") => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        _ => solve_once(config).await,
    }
}

/// 读取发票文件求解一次并输出报表；找到精确解时退出码为 0
async fn solve_once(config: AppConfig) -> Result<ExitCode, BoxError> {
    let search = config.search;
    let result = tokio::task::spawn_blocking(move || runner::run_once(&search)).await??;

    println!("{}", report::render_table(&result));

    Ok(if result.solved {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

async fn serve(config: AppConfig) -> Result<(), BoxError> {
    let app = api::router(Arc::new(config.search.clone())).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/solve       - Stochastic search");
    info!("  POST /api/solve/fast  - Greedy search");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
