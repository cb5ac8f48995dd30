// apps/fvbc_cli/src/commands/validate.rs

//! 算例验证命令
//!
//! 逐个边界生成几何并构造边界条件，收集所有错误而不是遇到第一个就停止，
//! 同时报告网格质量相关的警告。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use fvbc_boundary::prelude::*;
use fvbc_foundation::FvError;
use fvbc_mesh::{MeshGeometry, PatchBuilder, PatchGeometry};
use glam::DVec3;
use tracing::{error, info, warn};

use crate::case::{CaseConfig, PatchCase};

/// 超过该非正交角（度）时给出警告
const SEVERE_NON_ORTHOGONALITY: f64 = 70.0;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 算例文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== FVBC 算例验证 ===");

    let Some(path) = &args.config else {
        println!("用法: fvbc_cli validate --config <算例文件> [--strict]");
        return Ok(());
    };

    let mut result = ValidationResult::default();
    validate_case(path, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_case(path: &Path, result: &mut ValidationResult) {
    println!("\n检查算例文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("算例文件不存在: {}", path.display()));
        return;
    }

    let config = match CaseConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(format!("{e:#}"));
            return;
        }
    };

    if let Err(e) = config.validate() {
        result.add_error(e.to_string());
    }

    let mut mesh = MeshGeometry::new();
    let mut owners: HashMap<usize, (String, DVec3)> = HashMap::new();

    for patch in &config.patches {
        let name = patch.geometry.name.as_str();
        let faces = match PatchBuilder::plane(&patch.geometry) {
            Ok(f) => f,
            Err(e) => {
                result.add_error(describe(&e));
                continue;
            }
        };
        let handle = match mesh.add_patch(name, &faces) {
            Ok(h) => h,
            Err(e) => {
                result.add_error(describe(&e));
                continue;
            }
        };

        for face in &faces {
            if let Some((other, centre)) = owners.get(&face.owner) {
                if (*centre - face.owner_centre).length() > 1e-12 {
                    result.add_warning(format!(
                        "单元 {} 同时属于边界 '{}' 与 '{}'，中心不一致",
                        face.owner, other, name
                    ));
                }
            } else {
                owners.insert(face.owner, (name.to_owned(), face.owner_centre));
            }
        }

        if let Ok(geom) = mesh.patch(handle) {
            check_geometry(geom, patch, result);
        }

        let ctx = BuildContext::new(&mesh, handle);
        if let Some(cfg) = &patch.scalar {
            if let Err(e) = BoundaryRegistry::scalar().build(&ctx, cfg) {
                result.add_error(describe(&e));
            }
        }
        if let Some(cfg) = &patch.vector {
            if let Err(e) = BoundaryRegistry::vector().build(&ctx, cfg) {
                result.add_error(describe(&e));
            }
        }
        if patch.scalar.is_none() && patch.vector.is_none() {
            result.add_warning(format!("边界 '{name}' 未指定任何边界条件"));
        }

        println!("  ✓ 边界 '{}': {} 个面", name, faces.len());
    }
}

fn check_geometry(geom: &PatchGeometry, patch: &PatchCase, result: &mut ValidationResult) {
    let max_angle = geom.max_non_orthogonality();
    if max_angle > SEVERE_NON_ORTHOGONALITY {
        result.add_warning(format!(
            "边界 '{}' 最大非正交角 {:.1}° 超过 {}°",
            geom.name(),
            max_angle,
            SEVERE_NON_ORTHOGONALITY
        ));
    }

    if !geom.is_orthogonal() {
        let uncorrected = patch
            .scalar
            .as_ref()
            .map(|c| !c.non_orthogonal_corrections)
            .into_iter()
            .chain(patch.vector.as_ref().map(|c| !c.non_orthogonal_corrections))
            .any(|off| off);
        if uncorrected {
            result.add_warning(format!(
                "边界 '{}' 非正交（{:.1}°）但关闭了非正交修正",
                geom.name(),
                max_angle
            ));
        }
    }
}

fn describe(err: &FvError) -> String {
    let kind = if err.is_config() {
        "配置错误"
    } else if err.is_mapping() {
        "映射错误"
    } else {
        "几何错误"
    };
    format!("{kind}: {err}")
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(config: &CaseConfig, name: &str) -> ValidationResult {
        let path = std::env::temp_dir()
            .join(format!("fvbc_validate_{name}_{}.yaml", std::process::id()));
        config.save(&path).unwrap();
        let mut result = ValidationResult::default();
        validate_case(&path, &mut result);
        let _ = std::fs::remove_file(&path);
        result
    }

    #[test]
    fn test_example_is_clean() {
        let result = validate(&CaseConfig::example(), "clean");
        assert!(result.is_ok_strict(), "{:?} {:?}", result.errors, result.warnings);
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = CaseConfig::example();
        config.delta_t = 0.0;
        config.patches[0].scalar = Some(BoundaryConfig::new("slip"));
        config.patches[0].vector = Some(
            BoundaryConfig::new("decayingTaylorGreenVortexVelocity").with_taylor_green(
                TaylorGreenConfig {
                    kinematic_viscosity: -1.0,
                    ..Default::default()
                },
            ),
        );
        let result = validate(&config, "errors");
        assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    }

    #[test]
    fn test_severe_skew_warns() {
        let mut config = CaseConfig::example();
        config.patches[0].geometry.skew = 3.0;
        config.patches[0].vector.as_mut().unwrap().non_orthogonal_corrections = false;
        let result = validate(&config, "skew");
        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 2, "{:?}", result.warnings);
    }
}
