// crates/fvbc_boundary/src/registry.rs

//! 边界类型注册表
//!
//! 运行时类型名 → 构造函数。构造在配置解析阶段完成，
//! 之后通过封闭枚举分发，不依赖运行时类型信息。
//!
//! ```
//! use fvbc_boundary::registry::BoundaryRegistry;
//!
//! let scalar = BoundaryRegistry::scalar();
//! assert!(scalar.contains("fixedGradientCorrected"));
//! assert!(!scalar.contains("decayingTaylorGreenVortexVelocity"));
//!
//! let vector = BoundaryRegistry::vector();
//! assert_eq!(vector.type_names().len(), 3);
//! ```

use std::collections::BTreeMap;

use fvbc_foundation::{FvError, FvResult};
use glam::DVec3;

use crate::config::BoundaryConfig;
use crate::patch_field::{
    AnalyticVelocityBoundary, BuildContext, CorrectedGradientBoundary, FixedValueBoundary,
    ScalarPatchField, VectorPatchField,
};
use crate::state::PatchFieldState;
use crate::value::FieldValue;

/// 从配置构造
pub type BuildFn<T, F> = fn(&BuildContext<'_>, &BoundaryConfig<T>) -> FvResult<F>;

/// 从持久化状态恢复
pub type RestoreFn<T, F> = fn(&BuildContext<'_>, &PatchFieldState<T>) -> FvResult<F>;

struct RegistryEntry<T, F> {
    build: BuildFn<T, F>,
    restore: RestoreFn<T, F>,
}

/// 边界类型注册表
pub struct BoundaryRegistry<T, F> {
    entries: BTreeMap<&'static str, RegistryEntry<T, F>>,
}

impl<T: FieldValue, F> Default for BoundaryRegistry<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldValue, F> BoundaryRegistry<T, F> {
    /// 空注册表
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// 注册类型，同名覆盖
    pub fn register(
        &mut self,
        type_name: &'static str,
        build: BuildFn<T, F>,
        restore: RestoreFn<T, F>,
    ) -> &mut Self {
        if self
            .entries
            .insert(type_name, RegistryEntry { build, restore })
            .is_some()
        {
            log::warn!("边界类型 '{}' 被重复注册，覆盖旧的构造函数", type_name);
        }
        self
    }

    /// 是否已注册
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// 已注册的类型名（按字母序）
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    fn entry(&self, patch: &str, type_name: &str) -> FvResult<&RegistryEntry<T, F>> {
        self.entries.get(type_name).ok_or_else(|| {
            FvError::unknown_boundary_type(
                patch,
                type_name,
                self.type_names().into_iter().map(String::from).collect(),
            )
        })
    }

    /// 按配置中的类型名构造
    pub fn build(&self, ctx: &BuildContext<'_>, config: &BoundaryConfig<T>) -> FvResult<F> {
        let geom = ctx.geometry()?;
        let entry = self.entry(geom.name(), &config.type_name)?;
        (entry.build)(ctx, config)
    }

    /// 按状态中的类型名恢复
    pub fn restore(&self, ctx: &BuildContext<'_>, state: &PatchFieldState<T>) -> FvResult<F> {
        let geom = ctx.geometry()?;
        if state.patch != geom.name() {
            return Err(FvError::config(
                geom.name(),
                format!("状态属于边界 '{}'", state.patch),
            ));
        }
        let entry = self.entry(geom.name(), &state.type_name)?;
        (entry.restore)(ctx, state)
    }
}

impl BoundaryRegistry<f64, ScalarPatchField> {
    /// 标量场的内置类型
    pub fn scalar() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                FixedValueBoundary::<f64>::TYPE_NAME,
                |ctx, cfg| Ok(ScalarPatchField::FixedValue(FixedValueBoundary::new(ctx, cfg)?)),
                |ctx, state| {
                    Ok(ScalarPatchField::FixedValue(FixedValueBoundary::from_state(
                        ctx, state,
                    )?))
                },
            )
            .register(
                CorrectedGradientBoundary::<f64>::TYPE_NAME,
                |ctx, cfg| {
                    Ok(ScalarPatchField::CorrectedGradient(
                        CorrectedGradientBoundary::new(ctx, cfg)?,
                    ))
                },
                |ctx, state| {
                    Ok(ScalarPatchField::CorrectedGradient(
                        CorrectedGradientBoundary::from_state(ctx, state)?,
                    ))
                },
            );
        registry
    }
}

impl BoundaryRegistry<DVec3, VectorPatchField> {
    /// 矢量场的内置类型
    pub fn vector() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                FixedValueBoundary::<DVec3>::TYPE_NAME,
                |ctx, cfg| Ok(VectorPatchField::FixedValue(FixedValueBoundary::new(ctx, cfg)?)),
                |ctx, state| {
                    Ok(VectorPatchField::FixedValue(FixedValueBoundary::from_state(
                        ctx, state,
                    )?))
                },
            )
            .register(
                CorrectedGradientBoundary::<DVec3>::TYPE_NAME,
                |ctx, cfg| {
                    Ok(VectorPatchField::CorrectedGradient(
                        CorrectedGradientBoundary::new(ctx, cfg)?,
                    ))
                },
                |ctx, state| {
                    Ok(VectorPatchField::CorrectedGradient(
                        CorrectedGradientBoundary::from_state(ctx, state)?,
                    ))
                },
            )
            .register(
                AnalyticVelocityBoundary::TYPE_NAME,
                |ctx, cfg| {
                    Ok(VectorPatchField::AnalyticVelocity(
                        AnalyticVelocityBoundary::new(ctx, cfg)?,
                    ))
                },
                |ctx, state| {
                    Ok(VectorPatchField::AnalyticVelocity(
                        AnalyticVelocityBoundary::from_state(ctx, state)?,
                    ))
                },
            );
        registry
    }
}
