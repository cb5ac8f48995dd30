// apps/fvbc_cli/src/case.rs

//! 算例
//!
//! 算例文件（YAML 或 JSON，按扩展名识别）描述若干平面边界、
//! 每个边界上标量场与速度场的边界条件，以及用于初始化内部场的
//! Taylor-Green 涡参数：
//!
//! ```yaml
//! endTime: 1.0
//! deltaT: 0.1
//! initialField:
//!   referenceVelocity: 1.0
//!   kinematicViscosity: 0.01
//! patches:
//!   - geometry:
//!       name: top
//!       origin: [0.0, 0.0, 1.0]
//!       spanU: [3.14, 0.0, 0.0]
//!       spanV: [0.0, 3.14, 0.0]
//!       divisions: [8, 8]
//!       cellDepth: 0.1
//!       skew: 0.4
//!     vector:
//!       type: decayingTaylorGreenVortexVelocity
//!     scalar:
//!       type: fixedGradientCorrected
//!       gradient: 0.0
//! ```
//!
//! 内部场在每个时间步用解析解在所属单元中心重新采样（值与梯度），
//! 边界条件据此更新。

use std::path::Path;

use anyhow::{bail, Context, Result};
use fvbc_boundary::prelude::*;
use fvbc_boundary::{PatchFieldState, TaylorGreenVortex};
use fvbc_mesh::{MeshGeometry, PatchBuilder, PlanePatchSpec, SimTime};
use glam::DVec3;
use serde::{Deserialize, Serialize};

fn default_end_time() -> f64 {
    1.0
}

fn default_delta_t() -> f64 {
    0.1
}

// ============================================================
// 算例文件
// ============================================================

/// 算例文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseConfig {
    /// 结束时间 [s]
    #[serde(default = "default_end_time")]
    pub end_time: f64,
    /// 时间步长 [s]
    #[serde(default = "default_delta_t")]
    pub delta_t: f64,
    /// 内部场解析解
    #[serde(default)]
    pub initial_field: TaylorGreenConfig,
    /// 边界
    pub patches: Vec<PatchCase>,
}

/// 单个边界
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchCase {
    /// 平面几何
    pub geometry: PlanePatchSpec,
    /// 标量场（压力）边界条件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<BoundaryConfig<f64>>,
    /// 速度场边界条件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<BoundaryConfig<DVec3>>,
}

/// 文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => bail!("无法识别的文件格式: '{}'（支持 .yaml/.yml/.json）", path.display()),
        }
    }
}

impl CaseConfig {
    /// 读取算例文件
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取算例文件: {}", path.display()))?;
        let config = match format {
            Format::Yaml => serde_yaml::from_str(&content).context("YAML 解析错误")?,
            Format::Json => serde_json::from_str(&content).context("JSON 解析错误")?,
        };
        Ok(config)
    }

    /// 写出算例文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match Format::of(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, content)
            .with_context(|| format!("无法写入算例文件: {}", path.display()))
    }

    /// 示例算例：偏斜顶面上的解析速度与修正梯度压力
    pub fn example() -> Self {
        let half_pi = std::f64::consts::FRAC_PI_2;
        Self {
            end_time: default_end_time(),
            delta_t: default_delta_t(),
            initial_field: TaylorGreenConfig::default(),
            patches: vec![PatchCase {
                geometry: PlanePatchSpec {
                    name: "top".into(),
                    origin: DVec3::new(0.0, 0.0, 1.0),
                    span_u: DVec3::new(half_pi, 0.0, 0.0),
                    span_v: DVec3::new(0.0, half_pi, 0.0),
                    divisions: [8, 8],
                    cell_depth: 0.1,
                    skew: 0.4,
                    first_owner: 0,
                },
                scalar: Some(
                    BoundaryConfig::new(fvbc_boundary::CorrectedGradientBoundary::<f64>::TYPE_NAME)
                        .with_gradient(0.0),
                ),
                vector: Some(BoundaryConfig::new(
                    fvbc_boundary::AnalyticVelocityBoundary::TYPE_NAME,
                )),
            }],
        }
    }

    /// 时间控制与边界列表检查
    pub fn validate(&self) -> Result<()> {
        if !(self.end_time.is_finite() && self.end_time > 0.0) {
            bail!("endTime 必须为正: {}", self.end_time);
        }
        if !(self.delta_t.is_finite() && self.delta_t > 0.0) {
            bail!("deltaT 必须为正: {}", self.delta_t);
        }
        if self.patches.is_empty() {
            bail!("算例没有任何边界");
        }
        Ok(())
    }
}

// ============================================================
// 构建后的算例
// ============================================================

/// 单个边界上的边界条件
pub struct CasePatch {
    /// 边界名称
    pub name: String,
    /// 标量边界条件
    pub scalar: Option<ScalarPatchField>,
    /// 速度边界条件
    pub vector: Option<VectorPatchField>,
}

/// 一个边界条件的统计
#[derive(Debug, Clone)]
pub struct PatchReport {
    /// 边界名称
    pub patch: String,
    /// 边界条件类型名
    pub type_name: &'static str,
    /// 面值模长范围
    pub value_range: (f64, f64),
    /// 法向梯度模长范围
    pub sn_grad_range: (f64, f64),
}

/// 持久化输出
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseState {
    /// 时间
    pub time: f64,
    /// 时间步索引
    pub time_index: u64,
    /// 各边界状态
    pub patches: Vec<PatchStateRecord>,
}

/// 单个边界的持久化状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchStateRecord {
    /// 边界名称
    pub patch: String,
    /// 标量边界条件状态
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<PatchFieldState<f64>>,
    /// 速度边界条件状态
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<PatchFieldState<DVec3>>,
}

/// 网格、时间、内部场与边界条件
pub struct Case {
    /// 网格几何
    pub mesh: MeshGeometry,
    /// 仿真时间
    pub time: SimTime,
    /// 边界
    pub patches: Vec<CasePatch>,
    /// 压力场
    pub pressure: CellField<f64>,
    /// 速度场
    pub velocity: CellField<DVec3>,
    cell_centres: Vec<DVec3>,
    solution: TaylorGreenVortex,
}

fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn report<T: FieldValue, B: PatchFieldOps<T>>(
    bc: &B,
    ctx: &EvalContext<'_, T>,
) -> Result<PatchReport> {
    let sn_grad = bc.sn_grad(ctx)?;
    Ok(PatchReport {
        patch: bc.patch_name().to_owned(),
        type_name: bc.type_name(),
        value_range: range(bc.value().iter().map(|v| v.magnitude())),
        sn_grad_range: range(sn_grad.iter().map(|v| v.magnitude())),
    })
}

impl Case {
    /// 按算例文件构建，任一边界失败即整体失败
    pub fn build(config: &CaseConfig) -> Result<Self> {
        config.validate()?;

        let mut mesh = MeshGeometry::new();
        let mut cell_centres: Vec<DVec3> = Vec::new();
        let mut handles = Vec::with_capacity(config.patches.len());

        for patch in &config.patches {
            let name = &patch.geometry.name;
            let faces = PatchBuilder::plane(&patch.geometry)
                .with_context(|| format!("边界 '{name}' 几何生成失败"))?;
            let handle = mesh
                .add_patch(name, &faces)
                .with_context(|| format!("边界 '{name}' 几何无效"))?;

            for face in &faces {
                if face.owner >= cell_centres.len() {
                    cell_centres.resize(face.owner + 1, DVec3::ZERO);
                }
                cell_centres[face.owner] = face.owner_centre;
            }
            handles.push(handle);
        }

        let scalar_registry = BoundaryRegistry::scalar();
        let vector_registry = BoundaryRegistry::vector();
        let mut patches = Vec::with_capacity(config.patches.len());
        for (patch, handle) in config.patches.iter().zip(handles) {
            let name = patch.geometry.name.clone();
            let ctx = BuildContext::new(&mesh, handle);
            let scalar = patch
                .scalar
                .as_ref()
                .map(|cfg| scalar_registry.build(&ctx, cfg))
                .transpose()
                .with_context(|| format!("边界 '{name}' 标量边界条件构造失败"))?;
            let vector = patch
                .vector
                .as_ref()
                .map(|cfg| vector_registry.build(&ctx, cfg))
                .transpose()
                .with_context(|| format!("边界 '{name}' 速度边界条件构造失败"))?;
            patches.push(CasePatch {
                name,
                scalar,
                vector,
            });
        }

        let solution = TaylorGreenVortex::new("initialField", config.initial_field)?;
        let n_cells = cell_centres.len();
        let mut case = Self {
            mesh,
            time: SimTime::new(0.0),
            patches,
            pressure: CellField::uniform("p", n_cells, 0.0),
            velocity: CellField::uniform("U", n_cells, DVec3::ZERO),
            cell_centres,
            solution,
        };
        case.sample_fields()?;

        tracing::info!(
            "算例: {} 个边界, {} 个面, {} 个贴壁单元",
            case.patches.len(),
            case.mesh.patches().map(|(_, g)| g.len()).sum::<usize>(),
            n_cells
        );
        Ok(case)
    }

    /// 在当前时间用解析解重新采样内部场
    pub fn sample_fields(&mut self) -> Result<()> {
        let t = self.time.value();
        let tg = &self.solution;
        let centres = &self.cell_centres;

        self.pressure
            .set_values(centres.iter().map(|x| tg.pressure(t, *x)).collect())?;
        self.pressure
            .set_gradients(centres.iter().map(|x| tg.pressure_gradient(t, *x)).collect())?;
        self.velocity
            .set_values(centres.iter().map(|x| tg.velocity(t, *x)).collect())?;
        self.velocity
            .set_gradients(centres.iter().map(|x| tg.velocity_gradient(t, *x)).collect())?;
        Ok(())
    }

    /// 推进一个时间步并重新采样内部场
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        self.time.advance(dt);
        self.sample_fields()
    }

    /// 更新所有边界条件；给出通信模式时走 `evaluate`
    pub fn update(&mut self, comms: Option<CommsMode>) -> Result<()> {
        let scalar_ctx = EvalContext::new(&self.mesh, &self.time, &self.pressure);
        let vector_ctx = EvalContext::new(&self.mesh, &self.time, &self.velocity);

        for patch in &mut self.patches {
            if let Some(bc) = patch.scalar.as_mut() {
                match comms {
                    Some(mode) => bc.evaluate(&scalar_ctx, mode)?,
                    None => bc.update_coeffs(&scalar_ctx)?,
                }
            }
            if let Some(bc) = patch.vector.as_mut() {
                match comms {
                    Some(mode) => bc.evaluate(&vector_ctx, mode)?,
                    None => bc.update_coeffs(&vector_ctx)?,
                }
            }
        }
        Ok(())
    }

    /// 各边界条件的面值与法向梯度统计
    pub fn reports(&self) -> Result<Vec<PatchReport>> {
        let scalar_ctx = EvalContext::new(&self.mesh, &self.time, &self.pressure);
        let vector_ctx = EvalContext::new(&self.mesh, &self.time, &self.velocity);

        let mut reports = Vec::new();
        for patch in &self.patches {
            if let Some(bc) = &patch.scalar {
                reports.push(report(bc, &scalar_ctx)?);
            }
            if let Some(bc) = &patch.vector {
                reports.push(report(bc, &vector_ctx)?);
            }
        }
        Ok(reports)
    }

    /// 当前持久化状态
    pub fn state(&self) -> CaseState {
        CaseState {
            time: self.time.value(),
            time_index: self.time.index(),
            patches: self
                .patches
                .iter()
                .map(|p| PatchStateRecord {
                    patch: p.name.clone(),
                    scalar: p.scalar.as_ref().map(|bc| bc.write_state()),
                    vector: p.vector.as_ref().map(|bc| bc.write_state()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_round_trips_through_yaml() {
        let example = CaseConfig::example();
        let yaml = serde_yaml::to_string(&example).unwrap();
        let parsed: CaseConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.patches.len(), 1);
        assert_eq!(parsed.patches[0].geometry, example.patches[0].geometry);
        assert_eq!(parsed.patches[0].vector, example.patches[0].vector);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
patches:
  - geometry:
      name: wall
      origin: [0.0, 0.0, 0.0]
      spanU: [1.0, 0.0, 0.0]
      spanV: [0.0, 1.0, 0.0]
      divisions: [2, 2]
      cellDepth: 0.2
    scalar:
      type: fixedGradientCorrected
      gradient: 1.5
"#;
        let config: CaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.end_time, 1.0);
        assert_eq!(config.delta_t, 0.1);
        let scalar = config.patches[0].scalar.as_ref().unwrap();
        assert!(scalar.non_orthogonal_corrections);
        assert!(scalar.extrapolate_value);
        assert_eq!(scalar.gradient, Some(1.5));
        assert!(config.patches[0].vector.is_none());
    }

    #[test]
    fn test_build_and_update_example() {
        let mut case = Case::build(&CaseConfig::example()).unwrap();
        assert_eq!(case.pressure.len(), 64);

        case.update(None).unwrap();
        case.advance(0.1).unwrap();
        case.update(Some(CommsMode::Scheduled)).unwrap();

        let reports = case.reports().unwrap();
        assert_eq!(reports.len(), 2);
        for r in &reports {
            assert!(r.value_range.0 <= r.value_range.1);
            assert!(r.sn_grad_range.1.is_finite());
        }

        let state = case.state();
        assert_eq!(state.time_index, 1);
        assert!(state.patches[0].scalar.as_ref().unwrap().gradient.is_some());
        assert!(state.patches[0].vector.as_ref().unwrap().taylor_green.is_some());
    }

    #[test]
    fn test_bundled_case_builds() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases/skewed_channel.yaml");
        let config = CaseConfig::load(&path).unwrap();
        let mut case = Case::build(&config).unwrap();
        assert_eq!(case.patches.len(), 2);
        assert_eq!(case.velocity.len(), 256 + 64);

        case.update(None).unwrap();
        let outlet = case.patches[1].scalar.as_ref().unwrap();
        assert!(outlet.value().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_unknown_type_fails_build() {
        let mut config = CaseConfig::example();
        config.patches[0].scalar = Some(BoundaryConfig::new("slip"));
        let err = Case::build(&config).err().unwrap();
        assert!(format!("{err:#}").contains("slip"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::of(Path::new("case.yml")).unwrap(), Format::Yaml);
        assert_eq!(Format::of(Path::new("case.JSON")).unwrap(), Format::Json);
        assert!(Format::of(Path::new("case.toml")).is_err());
    }
}
