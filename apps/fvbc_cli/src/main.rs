// apps/fvbc_cli/src/main.rs

//! FVBC 命令行界面
//!
//! 从算例文件构建平面边界，驱动边界条件随时间更新，
//! 输出面值与修正法向梯度的统计以及持久化状态。

mod case;
mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;

/// 非正交修正边界条件命令行工具
#[derive(Parser)]
#[command(name = "fvbc_cli")]
#[command(author = "FVBC Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Non-orthogonal corrected boundary conditions driver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行算例
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证算例
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // 库层使用 log 门面，try_init 同时安装 log → tracing 桥接
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志初始化失败: {e}"))?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
