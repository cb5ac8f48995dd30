// crates/fvbc_boundary/src/patch_field/corrected_gradient.rs

//! 非正交修正的给定梯度边界
//!
//! 用户给定面法向梯度 `g`，边界根据网格几何与内部场推导面值。
//! 两种策略在构造时确定：
//!
//! - 外推（`extrapolateValue: true`）: 单元值沿修正向量外推后加法向梯度贡献
//! - 直接（`extrapolateValue: false`）: 反解修正公式，使修正法向梯度恰为 `g`
//!
//! 关闭非正交修正时两种策略都退化为 `φ_P + g/Δ`。

use fvbc_foundation::{FvError, FvResult};
use fvbc_mesh::{MeshGeometry, PatchHandle, SimTime};

use super::{check_mapper, is_stale, BuildContext, EvalContext, PatchFieldOps, UpdateStamp};
use crate::comms::CommsMode;
use crate::config::BoundaryConfig;
use crate::corrector::{check_patch_inputs, map_faces, NonOrthogonalCorrector};
use crate::mapper::{FaceMapper, ReverseMapper};
use crate::state::PatchFieldState;
use crate::value::FieldValue;

/// 非正交修正的给定梯度边界
#[derive(Debug, Clone)]
pub struct CorrectedGradientBoundary<T: FieldValue> {
    patch: PatchHandle,
    name: String,
    corrector: NonOrthogonalCorrector,
    extrapolate_value: bool,
    gradient: Vec<T>,
    value: Vec<T>,
    stamp: Option<UpdateStamp>,
    comms: Option<CommsMode>,
}

impl<T: FieldValue> CorrectedGradientBoundary<T> {
    /// 运行时类型名
    pub const TYPE_NAME: &'static str = "fixedGradientCorrected";

    /// 从配置构造，`gradient` 必须给出，`value` 为可选初值
    pub fn new(ctx: &BuildContext<'_>, config: &BoundaryConfig<T>) -> FvResult<Self> {
        let geom = ctx.geometry()?;
        let gradient = config
            .gradient
            .ok_or_else(|| FvError::missing_config(geom.name(), "gradient"))?;
        let initial = config.value.unwrap_or(T::ZERO);

        log::debug!(
            "创建 {} 边界 '{}' ({}, {} 个面): nonOrthogonalCorrections={}, secondOrder={}, extrapolateValue={}",
            Self::TYPE_NAME,
            geom.name(),
            T::LABEL,
            geom.len(),
            config.non_orthogonal_corrections,
            config.second_order,
            config.extrapolate_value
        );

        Ok(Self {
            patch: ctx.patch,
            name: geom.name().to_owned(),
            corrector: NonOrthogonalCorrector::new(config.corrector_settings()),
            extrapolate_value: config.extrapolate_value,
            gradient: vec![gradient; geom.len()],
            value: vec![initial; geom.len()],
            stamp: None,
            comms: None,
        })
    }

    /// 从持久化状态恢复
    pub fn from_state(ctx: &BuildContext<'_>, state: &PatchFieldState<T>) -> FvResult<Self> {
        let geom = ctx.geometry()?;
        let gradient = state
            .gradient
            .clone()
            .ok_or_else(|| FvError::missing_config(geom.name(), "gradient"))?;
        FvError::check_size("value", geom.len(), state.value.len())?;
        FvError::check_size("gradient", geom.len(), gradient.len())?;

        Ok(Self {
            patch: ctx.patch,
            name: geom.name().to_owned(),
            corrector: NonOrthogonalCorrector::new(state.corrector_settings()),
            extrapolate_value: state.extrapolate_value.unwrap_or(true),
            gradient,
            value: state.value.clone(),
            stamp: None,
            comms: None,
        })
    }

    /// 修正器
    pub fn corrector(&self) -> &NonOrthogonalCorrector {
        &self.corrector
    }

    /// 是否使用外推策略
    pub fn extrapolate_value(&self) -> bool {
        self.extrapolate_value
    }

    /// 给定法向梯度
    pub fn gradient(&self) -> &[T] {
        &self.gradient
    }

    /// 替换给定梯度，面值随之过期
    pub fn set_gradient(&mut self, gradient: Vec<T>) -> FvResult<()> {
        FvError::check_size("gradient", self.gradient.len(), gradient.len())?;
        self.gradient = gradient;
        self.stamp = None;
        Ok(())
    }

    /// 由给定梯度计算面值
    fn compute_value(&mut self, ctx: &EvalContext<'_, T>) -> FvResult<()> {
        let geom = ctx.mesh.patch(self.patch)?;
        FvError::check_size("gradient", geom.len(), self.gradient.len())?;
        check_patch_inputs(geom, ctx.field, self.value.len())?;

        let corrector = &self.corrector;
        let gradient = &self.gradient;
        let field = ctx.field;
        let extrapolate = self.extrapolate_value;

        self.value = map_faces(geom.len(), |i| {
            let face = geom.face(i);
            let owner_value = field.value(face.owner);
            let owner_gradient = field.gradient(face.owner);
            if extrapolate {
                corrector.extrapolate_face_value(&face, owner_value, owner_gradient, gradient[i])
            } else {
                corrector.solve_face_value(&face, owner_value, owner_gradient, gradient[i])
            }
        });
        self.stamp = Some(UpdateStamp::current(ctx, geom));
        Ok(())
    }
}

impl<T: FieldValue> PatchFieldOps<T> for CorrectedGradientBoundary<T> {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn patch(&self) -> PatchHandle {
        self.patch
    }

    fn patch_name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &[T] {
        &self.value
    }

    fn needs_update(&self, ctx: &EvalContext<'_, T>) -> bool {
        is_stale(self.stamp, ctx, self.patch)
    }

    fn update_coeffs(&mut self, ctx: &EvalContext<'_, T>) -> FvResult<()> {
        if !self.needs_update(ctx) {
            log::trace!("边界 '{}' 未过期，跳过更新", self.name);
            return Ok(());
        }
        self.compute_value(ctx)
    }

    fn evaluate(&mut self, ctx: &EvalContext<'_, T>, comms: CommsMode) -> FvResult<()> {
        self.comms = Some(comms);
        self.compute_value(ctx)
    }

    fn last_comms(&self) -> Option<CommsMode> {
        self.comms
    }

    /// 返回给定梯度 `g`
    ///
    /// 外推模式且启用二阶修正时，面值取梯形公式
    /// `φ_P + k·∇φ_P + ½(g + n·∇φ_P)(n·d)`，由该面值反算的法向梯度是
    /// `½(g + n·∇φ_P)`，只有 `n·∇φ_P = g` 时才与本返回值一致。
    /// 直接模式下两者恒等。
    fn sn_grad(&self, _ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        Ok(self.gradient.clone())
    }

    fn gradient_internal_coeffs(&self, _ctx: &EvalContext<'_, T>) -> FvResult<Vec<f64>> {
        Ok(vec![0.0; self.gradient.len()])
    }

    fn orthogonal_boundary_coeffs(&self, _ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        Ok(self.gradient.clone())
    }

    fn gradient_boundary_coeffs(&self, _ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        Ok(vec![T::ZERO; self.gradient.len()])
    }

    fn second_order_boundary_coeffs(&self, _ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        Ok(vec![T::ZERO; self.gradient.len()])
    }

    fn auto_map(&mut self, mapper: &FaceMapper, mesh: &MeshGeometry, _time: &SimTime) -> FvResult<()> {
        let geom = mesh.patch(self.patch)?;
        check_mapper(mapper, geom)?;

        let value = mapper.map(&self.name, &self.value, |_| T::ZERO)?;
        let gradient = mapper.map(&self.name, &self.gradient, |_| T::ZERO)?;
        self.value = value;
        self.gradient = gradient;
        self.stamp = None;

        log::debug!(
            "边界 '{}' autoMap: {} 个面, {} 个新面置零梯度/零值",
            self.name,
            mapper.len(),
            mapper.n_unmapped()
        );
        Ok(())
    }

    fn rmap(&mut self, source: &Self, mapper: &ReverseMapper) -> FvResult<()> {
        // 先校验再写入，任一失败都不改变自身
        mapper.validate(&self.name, self.value.len())?;
        FvError::check_size("reverse-mapped source", mapper.source_size(), source.gradient.len())?;

        mapper.apply(&self.name, &mut self.value, &source.value)?;
        mapper.apply(&self.name, &mut self.gradient, &source.gradient)?;
        self.stamp = None;
        Ok(())
    }

    fn write_state(&self) -> PatchFieldState<T> {
        PatchFieldState::new(Self::TYPE_NAME, &self.name, self.corrector.settings())
            .with_extrapolate_value(self.extrapolate_value)
            .with_value(self.value.clone())
            .with_gradient(self.gradient.clone())
    }
}
