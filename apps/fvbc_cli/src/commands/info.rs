// apps/fvbc_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出已注册的边界类型，输出默认配置与示例算例。

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fvbc_boundary::prelude::*;
use fvbc_foundation::GeometryTolerance;
use glam::DVec3;
use tracing::info;

use crate::case::CaseConfig;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 列出边界类型
    #[arg(long)]
    pub types: bool,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,

    /// 将示例算例写入文件（.yaml/.yml/.json）
    #[arg(long)]
    pub example: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== FVBC 信息 ===");

    if let Some(path) = &args.example {
        CaseConfig::example().save(path)?;
        println!("示例算例已写入: {}", path.display());
    }

    if args.types {
        print_types();
    }

    if args.defaults {
        print_defaults()?;
    }

    if args.example.is_none() && !args.types && !args.defaults {
        print_types();
        println!();
        print_defaults()?;
    }

    Ok(())
}

fn print_types() {
    println!("=== 边界类型 ===");
    println!("FVBC CLI 版本: {}", env!("CARGO_PKG_VERSION"));

    println!("\n标量场:");
    for name in BoundaryRegistry::scalar().type_names() {
        println!("  - {name}");
    }

    println!("\n矢量场:");
    for name in BoundaryRegistry::vector().type_names() {
        println!("  - {name}");
    }
}

fn print_defaults() -> Result<()> {
    println!("=== 默认配置 ===");

    let settings = CorrectorSettings::default();
    println!("nonOrthogonalCorrections: {}", settings.non_orthogonal_corrections);
    println!("secondOrder: {}", settings.second_order);
    println!("extrapolateValue: {}", BoundaryConfig::<f64>::new("").extrapolate_value);
    println!("通信模式: {}", CommsMode::default());

    println!("\nTaylor-Green 涡参数:");
    print!("{}", serde_yaml::to_string(&TaylorGreenConfig::default())?);

    println!("\n几何容差:");
    print!("{}", serde_yaml::to_string(&GeometryTolerance::default())?);

    println!("\n示例边界条件:");
    let example = BoundaryConfig::<DVec3>::new("decayingTaylorGreenVortexVelocity")
        .with_taylor_green(TaylorGreenConfig::default());
    print!("{}", serde_yaml::to_string(&example)?);
    Ok(())
}
