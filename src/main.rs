//! # Social Feed 主程序
//!
//! Instagram 授权与最近媒体列表服务

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use social_feed::{
    Result,
    app::AppContext,
    config, lerror, linfo,
    logging::{self, LogComponent, LogStage},
    server::ApiServer,
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "social-feed", version, about = "Instagram feed service")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref());

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );

    if let Err(e) = run(args).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务启动失败: {e:?}")
        );
        std::process::exit(1);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    linfo!(
        "system",
        LogStage::Configuration,
        LogComponent::Config,
        "config_loaded",
        &format!(
            "配置加载完成: store={:?}, app_url={}",
            config.store.store_type, config.instagram.app_url
        )
    );

    let context = AppContext::from_config(config).await?;
    ApiServer::new(Arc::new(context)).serve().await
}
