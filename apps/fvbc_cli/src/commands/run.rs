// apps/fvbc_cli/src/commands/run.rs

//! 运行算例命令
//!
//! 每个时间步：推进时间 → 用解析解重采样内部场 → 更新边界条件 → 输出统计。
//! 指定 `--comms` 时走 `evaluate` 入口，否则走 `update_coeffs`。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use fvbc_boundary::CommsMode;
use tracing::info;

use crate::case::{Case, CaseConfig};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 算例文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 结束时间 [s]，覆盖算例文件
    #[arg(short = 't', long)]
    pub end_time: Option<f64>,

    /// 时间步长 [s]，覆盖算例文件
    #[arg(long)]
    pub dt: Option<f64>,

    /// 通信模式 (blocking, scheduled, nonBlocking)
    #[arg(long)]
    pub comms: Option<String>,

    /// 统计输出间隔（步数）
    #[arg(long, default_value = "1")]
    pub report_every: u64,

    /// 最终状态输出文件（JSON）
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_comms(name: &str) -> Result<CommsMode> {
    match name.to_lowercase().as_str() {
        "blocking" => Ok(CommsMode::Blocking),
        "scheduled" => Ok(CommsMode::Scheduled),
        "nonblocking" | "non-blocking" => Ok(CommsMode::NonBlocking),
        other => bail!("未知的通信模式: {other}"),
    }
}

fn log_reports(case: &Case) -> Result<()> {
    for r in case.reports()? {
        info!(
            "t={:.4} s [{}] {}: |value| ∈ [{:.6e}, {:.6e}], |snGrad| ∈ [{:.6e}, {:.6e}]",
            case.time.value(),
            r.patch,
            r.type_name,
            r.value_range.0,
            r.value_range.1,
            r.sn_grad_range.0,
            r.sn_grad_range.1
        );
    }
    Ok(())
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== FVBC 算例运行 ===");

    let mut config = CaseConfig::load(&args.config)?;
    if let Some(end_time) = args.end_time {
        config.end_time = end_time;
    }
    if let Some(dt) = args.dt {
        config.delta_t = dt;
    }
    let comms = args.comms.as_deref().map(parse_comms).transpose()?;
    let report_every = args.report_every.max(1);

    let mut case = Case::build(&config).context("构建算例失败")?;
    info!(
        "结束时间={} s, 时间步长={} s, 通信模式={}",
        config.end_time,
        config.delta_t,
        comms.map_or("none", |c| c.name())
    );

    let start = Instant::now();
    case.update(comms)?;
    log_reports(&case)?;

    // 时间累加存在舍入误差
    let end = config.end_time - 1e-9 * config.delta_t;
    while case.time.value() < end {
        case.advance(config.delta_t)?;
        case.update(comms)?;
        if case.time.index() % report_every == 0 {
            log_reports(&case)?;
        }
    }

    info!("=== 运行完成 ===");
    info!("总步数: {}", case.time.index());
    info!("计算时间: {:.3} s", start.elapsed().as_secs_f64());

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&case.state())?;
        std::fs::write(path, json)
            .with_context(|| format!("无法写入状态文件: {}", path.display()))?;
        info!("状态已写入: {}", path.display());
    }

    Ok(())
}
