// crates/fvbc_boundary/src/patch_field/fixed_value.rs

//! 固定值边界（未修正）
//!
//! 经典 Dirichlet 条件，法向梯度使用未修正的单侧差分 `Δ (φ_f − φ_P)`，
//! 作为修正格式的兼容基线。

use fvbc_foundation::{FvError, FvResult};
use fvbc_mesh::{MeshGeometry, PatchHandle, SimTime};

use super::{
    check_mapper, dirichlet_sn_grad, dirichlet_split, is_stale, BuildContext, EvalContext,
    PatchFieldOps, UpdateStamp,
};
use crate::comms::CommsMode;
use crate::config::BoundaryConfig;
use crate::corrector::{CorrectorSettings, NonOrthogonalCorrector};
use crate::mapper::{FaceMapper, ReverseMapper};
use crate::state::PatchFieldState;
use crate::value::FieldValue;

/// 固定值边界
#[derive(Debug, Clone)]
pub struct FixedValueBoundary<T: FieldValue> {
    patch: PatchHandle,
    name: String,
    value: Vec<T>,
    stamp: Option<UpdateStamp>,
    comms: Option<CommsMode>,
}

impl<T: FieldValue> FixedValueBoundary<T> {
    /// 运行时类型名
    pub const TYPE_NAME: &'static str = "fixedValue";

    /// 从配置构造，`value` 必须给出
    pub fn new(ctx: &BuildContext<'_>, config: &BoundaryConfig<T>) -> FvResult<Self> {
        let geom = ctx.geometry()?;
        let value = config
            .value
            .ok_or_else(|| FvError::missing_config(geom.name(), "value"))?;

        log::debug!(
            "创建 {} 边界 '{}' ({}, {} 个面)",
            Self::TYPE_NAME,
            geom.name(),
            T::LABEL,
            geom.len()
        );

        Ok(Self {
            patch: ctx.patch,
            name: geom.name().to_owned(),
            value: vec![value; geom.len()],
            stamp: None,
            comms: None,
        })
    }

    /// 从持久化状态恢复
    pub fn from_state(ctx: &BuildContext<'_>, state: &PatchFieldState<T>) -> FvResult<Self> {
        let geom = ctx.geometry()?;
        FvError::check_size("value", geom.len(), state.value.len())?;
        Ok(Self {
            patch: ctx.patch,
            name: geom.name().to_owned(),
            value: state.value.clone(),
            stamp: None,
            comms: None,
        })
    }

    /// 替换面值
    pub fn set_value(&mut self, value: Vec<T>) -> FvResult<()> {
        FvError::check_size("value", self.value.len(), value.len())?;
        self.value = value;
        self.stamp = None;
        Ok(())
    }
}

impl<T: FieldValue> PatchFieldOps<T> for FixedValueBoundary<T> {
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
            return Ok(());
        }
        let geom = ctx.mesh.patch(self.patch)?;
        FvError::check_size("value", geom.len(), self.value.len())?;
        self.stamp = Some(UpdateStamp::current(ctx, geom));
        Ok(())
    }

    fn evaluate(&mut self, ctx: &EvalContext<'_, T>, comms: CommsMode) -> FvResult<()> {
        self.comms = Some(comms);
        self.stamp = None;
        self.update_coeffs(ctx)
    }

    fn last_comms(&self) -> Option<CommsMode> {
        self.comms
    }

    fn sn_grad(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        dirichlet_sn_grad(&NonOrthogonalCorrector::uncorrected(), ctx, self.patch, &self.value)
    }

    fn gradient_internal_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<f64>> {
        let geom = ctx.mesh.patch(self.patch)?;
        Ok(geom.delta_coeffs().iter().map(|d| -d).collect())
    }

    fn orthogonal_boundary_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        let parts =
            dirichlet_split(&NonOrthogonalCorrector::uncorrected(), ctx, self.patch, &self.value)?;
        Ok(parts.into_iter().map(|p| p.orthogonal).collect())
    }

    fn gradient_boundary_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        let geom = ctx.mesh.patch(self.patch)?;
        Ok(vec![T::ZERO; geom.len()])
    }

    fn second_order_boundary_coeffs(&self, ctx: &EvalContext<'_, T>) -> FvResult<Vec<T>> {
        self.gradient_boundary_coeffs(ctx)
    }

    fn auto_map(&mut self, mapper: &FaceMapper, mesh: &MeshGeometry, _time: &SimTime) -> FvResult<()> {
        let geom = mesh.patch(self.patch)?;
        check_mapper(mapper, geom)?;
        self.value = mapper.map(&self.name, &self.value, |_| T::ZERO)?;
        self.stamp = None;

        log::debug!(
            "边界 '{}' autoMap: {} 个面, {} 个新面置零",
            self.name,
            mapper.len(),
            mapper.n_unmapped()
        );
        Ok(())
    }

    fn rmap(&mut self, source: &Self, mapper: &ReverseMapper) -> FvResult<()> {
        mapper.apply(&self.name, &mut self.value, &source.value)?;
        self.stamp = None;
        Ok(())
    }

    fn write_state(&self) -> PatchFieldState<T> {
        PatchFieldState::new(Self::TYPE_NAME, &self.name, CorrectorSettings::UNCORRECTED)
            .with_value(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CellField;
    use fvbc_mesh::{PatchBuilder, PlanePatchSpec};
    use glam::DVec3;

    fn setup(skew: f64) -> (MeshGeometry, PatchHandle) {
        let spec = PlanePatchSpec {
            name: "wall".into(),
            origin: DVec3::ZERO,
            span_u: DVec3::X,
            span_v: DVec3::Y,
            divisions: [3, 1],
            cell_depth: 0.2,
            skew,
            first_owner: 0,
        };
        let mut mesh = MeshGeometry::new();
        let h = mesh
            .add_patch("wall", &PatchBuilder::plane(&spec).unwrap())
            .unwrap();
        (mesh, h)
    }

    #[test]
    fn test_missing_value_rejected() {
        let (mesh, h) = setup(0.0);
        let cfg = BoundaryConfig::<f64>::new(FixedValueBoundary::<f64>::TYPE_NAME);
        let err = FixedValueBoundary::new(&BuildContext::new(&mesh, h), &cfg).unwrap_err();
        assert!(matches!(err, FvError::MissingConfig { .. }));
    }

    #[test]
    fn test_uncorrected_sn_grad_on_skewed_patch() {
        let (mesh, h) = setup(0.5);
        let cfg = BoundaryConfig::new(FixedValueBoundary::<f64>::TYPE_NAME).with_value(2.0);
        let bc = FixedValueBoundary::new(&BuildContext::new(&mesh, h), &cfg).unwrap();

        let field = CellField::uniform("T", 3, 1.0)
            .with_gradients(vec![DVec3::X; 3])
            .unwrap();
        let time = SimTime::new(0.0);
        let ctx = EvalContext::new(&mesh, &time, &field);

        let geom = mesh.patch(h).unwrap();
        let sn = bc.sn_grad(&ctx).unwrap();
        for (i, s) in sn.iter().enumerate() {
            assert_eq!(*s, (2.0 - 1.0) * geom.delta_coeffs()[i]);
        }
        assert!(bc
            .gradient_boundary_coeffs(&ctx)
            .unwrap()
            .iter()
            .all(|c| *c == 0.0));
    }

    #[test]
    fn test_update_then_evaluate_records_comms() {
        let (mesh, h) = setup(0.0);
        let cfg = BoundaryConfig::new(FixedValueBoundary::<f64>::TYPE_NAME).with_value(2.0);
        let mut bc = FixedValueBoundary::new(&BuildContext::new(&mesh, h), &cfg).unwrap();

        let field = CellField::uniform("T", 3, 1.0);
        let time = SimTime::new(0.0);
        let ctx = EvalContext::new(&mesh, &time, &field);

        assert!(bc.needs_update(&ctx));
        bc.update_coeffs(&ctx).unwrap();
        assert!(!bc.needs_update(&ctx));
        assert_eq!(bc.last_comms(), None);

        bc.evaluate(&ctx, CommsMode::NonBlocking).unwrap();
        assert_eq!(bc.last_comms(), Some(CommsMode::NonBlocking));
    }
}
