// crates/fvbc_boundary/src/patch_field/analytic_velocity.rs

//! 解析速度边界
//!
//! 每次更新在当前时间、各面中心处求值解析剖面，作为 Dirichlet 数据。
//! 返回的法向梯度总是按自身的修正开关进行非正交修正，
//! 与求解器全局的梯度格式无关。
//!
//! 拓扑变化时新插入的面直接用剖面重新求值，不从相邻面插值。

use fvbc_foundation::{FvError, FvResult};
use fvbc_mesh::{MeshGeometry, PatchHandle, SimTime};
use glam::DVec3;

use super::{
    check_mapper, dirichlet_sn_grad, dirichlet_split, is_stale, BuildContext, EvalContext,
    PatchFieldOps, UpdateStamp,
};
use crate::comms::CommsMode;
use crate::config::{BoundaryConfig, TableConfig, TaylorGreenConfig};
use crate::corrector::{map_faces, NonOrthogonalCorrector};
use crate::mapper::{FaceMapper, ReverseMapper};
use crate::profile::{TaylorGreenVortex, VelocityProfile};
use crate::state::PatchFieldState;

/// 解析速度边界
#[derive(Debug, Clone)]
pub struct AnalyticVelocityBoundary {
    patch: PatchHandle,
    name: String,
    profile: VelocityProfile,
    corrector: NonOrthogonalCorrector,
    value: Vec<DVec3>,
    stamp: Option<UpdateStamp>,
    comms: Option<CommsMode>,
}

impl AnalyticVelocityBoundary {
    /// 运行时类型名
    pub const TYPE_NAME: &'static str = "decayingTaylorGreenVortexVelocity";

    /// 从配置构造
    ///
    /// `taylorGreen` 与 `table` 至多给出一个；都未给出时使用默认 Taylor-Green 参数。
    pub fn new(ctx: &BuildContext<'_>, config: &BoundaryConfig<DVec3>) -> FvResult<Self> {
        let geom = ctx.geometry()?;
        let profile = build_profile(geom.name(), config.taylor_green, config.table.as_ref())?;

        log::debug!(
            "创建 {} 边界 '{}' ({} 个面, 剖面 {}): nonOrthogonalCorrections={}, secondOrder={}",
            Self::TYPE_NAME,
            geom.name(),
            geom.len(),
            profile.name(),
            config.non_orthogonal_corrections,
            config.second_order
        );

        Ok(Self {
            patch: ctx.patch,
            name: geom.name().to_owned(),
            profile,
            corrector: NonOrthogonalCorrector::new(config.corrector_settings()),
            value: vec![DVec3::ZERO; geom.len()],
            stamp: None,
            comms: None,
        })
    }

    /// 从持久化状态恢复
    pub fn from_state(ctx: &BuildContext<'_>, state: &PatchFieldState<DVec3>) -> FvResult<Self> {
        let geom = ctx.geometry()?;
        FvError::check_size("value", geom.len(), state.value.len())?;
        let profile = build_profile(geom.name(), state.taylor_green, state.table.as_ref())?;

        Ok(Self {
            patch: ctx.patch,
            name: geom.name().to_owned(),
            profile,
            corrector: NonOrthogonalCorrector::new(state.corrector_settings()),
            value: state.value.clone(),
            stamp: None,
            comms: None,
        })
    }

    /// 剖面
    pub fn profile(&self) -> &VelocityProfile {
        &self.profile
    }

    /// 修正器
    pub fn corrector(&self) -> &NonOrthogonalCorrector {
        &self.corrector
    }

    fn evaluate_profile(&mut self, ctx: &EvalContext<'_, DVec3>) -> FvResult<()> {
        let geom = ctx.mesh.patch(self.patch)?;
        FvError::check_size("value", geom.len(), self.value.len())?;

        let t = ctx.time.value();
        let profile = &self.profile;
        let centres = geom.face_centres();
        self.value = map_faces(geom.len(), |i| profile.velocity(t, centres[i]));
        self.stamp = Some(UpdateStamp::current(ctx, geom));
        Ok(())
    }
}

fn build_profile(
    patch: &str,
    taylor_green: Option<TaylorGreenConfig>,
    table: Option<&TableConfig<DVec3>>,
) -> FvResult<VelocityProfile> {
    match (taylor_green, table) {
        (Some(_), Some(_)) => Err(FvError::config(
            patch,
            "taylorGreen 与 table 不能同时指定",
        )),
        (None, Some(table)) => Ok(VelocityProfile::Tabulated(table.build(patch)?)),
        (tg, None) => Ok(VelocityProfile::TaylorGreen(TaylorGreenVortex::new(
            patch,
            tg.unwrap_or_default(),
        )?)),
    }
}

impl PatchFieldOps<DVec3> for AnalyticVelocityBoundary {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn patch(&self) -> PatchHandle {
        self.patch
    }

    fn patch_name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &[DVec3] {
        &self.value
    }

    fn needs_update(&self, ctx: &EvalContext<'_, DVec3>) -> bool {
        is_stale(self.stamp, ctx, self.patch)
    }

    fn update_coeffs(&mut self, ctx: &EvalContext<'_, DVec3>) -> FvResult<()> {
        if !self.needs_update(ctx) {
            log::trace!("边界 '{}' 未过期，跳过更新", self.name);
            return Ok(());
        }
        self.evaluate_profile(ctx)
    }

    fn evaluate(&mut self, ctx: &EvalContext<'_, DVec3>, comms: CommsMode) -> FvResult<()> {
        self.comms = Some(comms);
        self.evaluate_profile(ctx)
    }

    fn last_comms(&self) -> Option<CommsMode> {
        self.comms
    }

    fn sn_grad(&self, ctx: &EvalContext<'_, DVec3>) -> FvResult<Vec<DVec3>> {
        dirichlet_sn_grad(&self.corrector, ctx, self.patch, &self.value)
    }

    fn gradient_internal_coeffs(&self, ctx: &EvalContext<'_, DVec3>) -> FvResult<Vec<f64>> {
        let geom = ctx.mesh.patch(self.patch)?;
        Ok(geom.delta_coeffs().iter().map(|d| -d).collect())
    }

    fn orthogonal_boundary_coeffs(&self, ctx: &EvalContext<'_, DVec3>) -> FvResult<Vec<DVec3>> {
        let parts = dirichlet_split(&self.corrector, ctx, self.patch, &self.value)?;
        Ok(parts.into_iter().map(|p| p.orthogonal).collect())
    }

    fn gradient_boundary_coeffs(&self, ctx: &EvalContext<'_, DVec3>) -> FvResult<Vec<DVec3>> {
        let parts = dirichlet_split(&self.corrector, ctx, self.patch, &self.value)?;
        Ok(parts.into_iter().map(|p| p.correction).collect())
    }

    fn second_order_boundary_coeffs(&self, ctx: &EvalContext<'_, DVec3>) -> FvResult<Vec<DVec3>> {
        let parts = dirichlet_split(&self.corrector, ctx, self.patch, &self.value)?;
        Ok(parts.into_iter().map(|p| p.second_order).collect())
    }

    fn auto_map(&mut self, mapper: &FaceMapper, mesh: &MeshGeometry, time: &SimTime) -> FvResult<()> {
        let geom = mesh.patch(self.patch)?;
        check_mapper(mapper, geom)?;

        let t = time.value();
        let centres = geom.face_centres();
        let profile = &self.profile;
        self.value = mapper.map(&self.name, &self.value, |i| profile.velocity(t, centres[i]))?;
        self.stamp = None;

        log::debug!(
            "边界 '{}' autoMap: {} 个面, {} 个新面按解析式求值 (t={})",
            self.name,
            mapper.len(),
            mapper.n_unmapped(),
            t
        );
        Ok(())
    }

    fn rmap(&mut self, source: &Self, mapper: &ReverseMapper) -> FvResult<()> {
        mapper.apply(&self.name, &mut self.value, &source.value)?;
        self.stamp = None;
        Ok(())
    }

    fn write_state(&self) -> PatchFieldState<DVec3> {
        let state = PatchFieldState::new(Self::TYPE_NAME, &self.name, self.corrector.settings())
            .with_value(self.value.clone());
        match &self.profile {
            VelocityProfile::TaylorGreen(tg) => state.with_taylor_green(*tg.config()),
            VelocityProfile::Tabulated(table) => state.with_table(TableConfig::from(table)),
        }
    }
}
