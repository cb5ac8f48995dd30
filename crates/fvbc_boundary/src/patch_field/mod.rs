// crates/fvbc_boundary/src/patch_field/mod.rs

//! 边界场
//!
//! 每种边界条件实现 [`PatchFieldOps`]，运行时通过封闭枚举
//! [`ScalarPatchField`] / [`VectorPatchField`] 分发，类型名到构造函数的
//! 映射见 [`crate::registry`]。
//!
//! # 更新协议
//!
//! ```text
//! 构造 ──> update_coeffs ──> 求解器读取 value / sn_grad / 系数 ──> 时间推进 ─┐
//!              ↑                                                          │
//!              └──────────────────── 过期 ────────────────────────────────┘
//! ```
//!
//! 过期判断基于 [`UpdateStamp`]（时间与场、几何的实例标识及各自的计数器）：
//! 印记不变时 `update_coeffs` 不做任何事，`evaluate` 总是重新计算。
//!
//! # 系数拆分
//!
//! ```text
//! sn_grad = gradient_internal_coeffs · φ_P + orthogonal_boundary_coeffs
//!         + gradient_boundary_coeffs + second_order_boundary_coeffs
//! ```
//!
//! - Dirichlet 类（固定值、解析速度）：`−Δ`、`Δ φ_f`、非正交修正、二阶修正
//! - 修正梯度类：`0`、给定梯度、`0`、`0`（修正已体现在面值中）

mod analytic_velocity;
mod corrected_gradient;
mod fixed_value;

pub use analytic_velocity::AnalyticVelocityBoundary;
pub use corrected_gradient::CorrectedGradientBoundary;
pub use fixed_value::FixedValueBoundary;

use fvbc_foundation::{FvError, FvResult};
use fvbc_mesh::{MeshGeometry, PatchGeometry, PatchHandle, SimTime};
use glam::DVec3;

use crate::comms::CommsMode;
use crate::corrector::{NonOrthogonalCorrector, SnGradParts};
use crate::field::CellField;
use crate::mapper::{FaceMapper, ReverseMapper};
use crate::state::PatchFieldState;
use crate::value::FieldValue;

// ============================================================
// 上下文
// ============================================================

/// 构造上下文
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// 网格几何
    pub mesh: &'a MeshGeometry,
    /// 目标边界
    pub patch: PatchHandle,
}

impl<'a> BuildContext<'a> {
    /// 创建上下文
    pub fn new(mesh: &'a MeshGeometry, patch: PatchHandle) -> Self {
        Self { mesh, patch }
    }

    /// 目标边界几何
    pub fn geometry(&self) -> FvResult<&'a PatchGeometry> {
        self.mesh.patch(self.patch)
    }
}

/// 求值上下文：网格、当前时间与内部单元场
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a, T: FieldValue> {
    /// 网格几何
    pub mesh: &'a MeshGeometry,
    /// 当前仿真时间
    pub time: &'a SimTime,
    /// 内部单元场
    pub field: &'a CellField<T>,
}

impl<'a, T: FieldValue> EvalContext<'a, T> {
    /// 创建上下文
    pub fn new(mesh: &'a MeshGeometry, time: &'a SimTime, field: &'a CellField<T>) -> Self {
        Self { mesh, time, field }
    }
}

// ============================================================
// 过期判断
// ============================================================

/// 最近一次更新时的外部状态
///
/// 计数器只在同一对象内有意义，因此同时记录时间值的位模式、
/// 场实例标识和几何构建标识；换用另一个场、时间或网格都会判为过期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateStamp {
    /// 时间步索引
    pub time_index: u64,
    /// 时间值（`f64::to_bits`）
    pub time_bits: u64,
    /// 内部场实例标识
    pub field_id: u64,
    /// 内部场代际
    pub field_generation: u64,
    /// 边界几何构建标识
    pub geometry_id: u64,
    /// 边界拓扑版本
    pub topology_version: u64,
}

impl UpdateStamp {
    /// 当前外部状态
    pub fn current<T: FieldValue>(ctx: &EvalContext<'_, T>, patch: &PatchGeometry) -> Self {
        Self {
            time_index: ctx.time.index(),
            time_bits: ctx.time.value().to_bits(),
            field_id: ctx.field.id(),
            field_generation: ctx.field.generation(),
            geometry_id: patch.build_id(),
            topology_version: patch.topology_version(),
        }
    }
}

/// 印记缺失或与当前状态不一致即为过期
pub(crate) fn is_stale<T: FieldValue>(
    stamp: Option<UpdateStamp>,
    ctx: &EvalContext<'_, T>,
    patch: PatchHandle,
) -> bool {
    match (stamp, ctx.mesh.patch(patch)) {
        (Some(stamp), Ok(geom)) => stamp != UpdateStamp::current(ctx, geom),
        _ => true,
    }
}

// ============================================================
// 公共操作
// ============================================================

/// 边界场操作集合
pub trait PatchFieldOps<T: FieldValue> {
    /// 运行时类型名
    fn type_name(&self) -> &'static str;

    /// 边界句柄
    fn patch(&self) -> PatchHandle;

    /// 边界名称
    fn patch_name(&self) -> &str;

    /// 当前面值（Dirichlet 数据）
    fn value(&self) -> &[T];

    /// 是否需要更新
    fn needs_update(&self, ctx: &EvalContext<'_, T>) -> bool;

    /// 更新面值，未过期时为空操作
    fn update_coeffs(&mut self, ctx: &EvalContext<'_, T>) -> FvResult<()>;

    /// 重新计算面值并标记可供求解器使用
    fn evaluate(&mut self, ctx: &EvalContext<'_, T>, comms: CommsMode) -> FvResult<()>;

    /// 最近一次 `evaluate` 使用的通信模式
    fn last_comms(&self) -> Option<CommsMode>;

    /// 面法向梯度
    fn sn_grad(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>>;

    /// 隐式矩阵系数
    fn gradient_internal_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<f64>>;

    /// 正交显式部分
    fn orthogonal_boundary_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>>;

    /// 非正交显式修正部分 `−Δ k·∇φ_P`，不含二阶项
    fn gradient_boundary_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>>;

    /// 二阶显式修正部分，未启用二阶修正时为零
    fn second_order_boundary_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>>;

    /// 拓扑变化后重排面数据，`mesh` 中的边界几何须已更新
    fn auto_map(&mut self, mapper: &FaceMapper, mesh: &MeshGeometry, time: &SimTime)
        -> FvResult<()>;

    /// 从同类型的源边界逐面复制
    fn rmap(&mut self, source: &Self, mapper: &ReverseMapper) -> FvResult<()>
    where
        Self: Sized;

    /// 持久化状态（不含面法向梯度）
    fn write_state(&self) -> PatchFieldState<T>;
}

// ============================================================
// Dirichlet 类共享实现
// ============================================================

/// 给定面值的修正法向梯度
pub(crate) fn dirichlet_sn_grad<T: FieldValue>(
    corrector: &NonOrthogonalCorrector,
    ctx: &EvalContext<'_, T>,
    patch: PatchHandle,
    value: &[T],
) -> FvResult<Vec<T>> {
    let geom = ctx.mesh.patch(patch)?;
    corrector.patch_sn_grad(geom, ctx.field, value)
}

/// 给定面值的系数拆分
pub(crate) fn dirichlet_split<T: FieldValue>(
    corrector: &NonOrthogonalCorrector,
    ctx: &EvalContext<'_, T>,
    patch: PatchHandle,
    value: &[T],
) -> FvResult<Vec<SnGradParts<T>>> {
    let geom = ctx.mesh.patch(patch)?;
    corrector.patch_split(geom, ctx.field, value)
}

/// 映射器尺寸必须与重建后的边界一致
pub(crate) fn check_mapper(mapper: &FaceMapper, geom: &PatchGeometry) -> FvResult<()> {
    FvError::check_size("face mapper", geom.len(), mapper.len())
}

// ============================================================
// 封闭枚举分发
// ============================================================

/// 标量边界场
#[derive(Debug, Clone)]
pub enum ScalarPatchField {
    /// 固定值
    FixedValue(FixedValueBoundary<f64>),
    /// 修正梯度
    CorrectedGradient(CorrectedGradientBoundary<f64>),
}

/// 矢量边界场
#[derive(Debug, Clone)]
pub enum VectorPatchField {
    /// 固定值
    FixedValue(FixedValueBoundary<DVec3>),
    /// 修正梯度
    CorrectedGradient(CorrectedGradientBoundary<DVec3>),
    /// 解析速度
    AnalyticVelocity(AnalyticVelocityBoundary),
}

macro_rules! impl_patch_field_ops {
    ($enum:ident, $t:ty, [$($variant:ident),+ $(,)?]) => {
        impl PatchFieldOps<$t> for $enum {
            fn type_name(&self) -> &'static str {
                match self { $(Self::$variant(bc) => bc.type_name(),)+ }
            }

            fn patch(&self) -> PatchHandle {
                match self { $(Self::$variant(bc) => bc.patch(),)+ }
            }

            fn patch_name(&self) -> &str {
                match self { $(Self::$variant(bc) => bc.patch_name(),)+ }
            }

            fn value(&self) -> &[$t] {
                match self { $(Self::$variant(bc) => bc.value(),)+ }
            }

            fn needs_update(&self, ctx: &EvalContext<'_, $t>) -> bool {
                match self { $(Self::$variant(bc) => bc.needs_update(ctx),)+ }
            }

            fn update_coeffs(&mut self, ctx: &EvalContext<'_, $t>) -> FvResult<()> {
                match self { $(Self::$variant(bc) => bc.update_coeffs(ctx),)+ }
            }

            fn evaluate(&mut self, ctx: &EvalContext<'_, $t>, comms: CommsMode) -> FvResult<()> {
                match self { $(Self::$variant(bc) => bc.evaluate(ctx, comms),)+ }
            }

            fn last_comms(&self) -> Option<CommsMode> {
                match self { $(Self::$variant(bc) => bc.last_comms(),)+ }
            }

            fn sn_grad(&self, ctx: &EvalContext<'_, $t>) -> FvResult<Vec<$t>> {
                match self { $(Self::$variant(bc) => bc.sn_grad(ctx),)+ }
            }

            fn gradient_internal_coeffs(&self, ctx: &EvalContext<'_, $t>) -> FvResult<Vec<f64>> {
                match self { $(Self::$variant(bc) => bc.gradient_internal_coeffs(ctx),)+ }
            }

            fn orthogonal_boundary_coeffs(&self, ctx: &EvalContext<'_, $t>) -> FvResult<Vec<$t>> {
                match self { $(Self::$variant(bc) => bc.orthogonal_boundary_coeffs(ctx),)+ }
            }

            fn gradient_boundary_coeffs(&self, ctx: &EvalContext<'_, $t>) -> FvResult<Vec<$t>> {
                match self { $(Self::$variant(bc) => bc.gradient_boundary_coeffs(ctx),)+ }
            }

            fn second_order_boundary_coeffs(&self, ctx: &EvalContext<'_, $t>) -> FvResult<Vec<$t>> {
                match self { $(Self::$variant(bc) => bc.second_order_boundary_coeffs(ctx),)+ }
            }

            fn auto_map(
                &mut self,
                mapper: &FaceMapper,
                mesh: &MeshGeometry,
                time: &SimTime,
            ) -> FvResult<()> {
                match self { $(Self::$variant(bc) => bc.auto_map(mapper, mesh, time),)+ }
            }

            fn rmap(&mut self, source: &Self, mapper: &ReverseMapper) -> FvResult<()> {
                match (self, source) {
                    $((Self::$variant(dst), Self::$variant(src)) => dst.rmap(src, mapper),)+
                    (dst, src) => Err(FvError::config(
                        dst.patch_name(),
                        format!(
                            "rmap 源类型 '{}' 与目标类型 '{}' 不一致",
                            src.type_name(),
                            dst.type_name()
                        ),
                    )),
                }
            }

            fn write_state(&self) -> PatchFieldState<$t> {
                match self { $(Self::$variant(bc) => bc.write_state(),)+ }
            }
        }
    };
}

impl_patch_field_ops!(ScalarPatchField, f64, [FixedValue, CorrectedGradient]);
impl_patch_field_ops!(
    VectorPatchField,
    DVec3,
    [FixedValue, CorrectedGradient, AnalyticVelocity]
);
