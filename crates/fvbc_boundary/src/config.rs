// crates/fvbc_boundary/src/config.rs

//! 边界条件配置
//!
//! 字典风格的键值配置，键名使用 camelCase：
//!
//! ```yaml
//! type: fixedGradientCorrected
//! nonOrthogonalCorrections: true   # 默认 true
//! secondOrder: false               # 默认 false
//! extrapolateValue: true           # 默认 true
//! gradient: 0.0
//! ```
//!
//! 解析时只检查语法，常数的合法性在构造边界条件时统一校验，
//! 校验失败不会得到部分构造的边界条件。

use std::f64::consts::TAU;

use fvbc_foundation::{FvError, FvResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::corrector::CorrectorSettings;
use crate::profile::{ExtrapolationMode, TabulatedProfile};
use crate::value::FieldValue;

fn default_true() -> bool {
    true
}

// ============================================================
// 边界配置
// ============================================================

/// 单个边界的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryConfig<T> {
    /// 运行时类型名
    #[serde(rename = "type")]
    pub type_name: String,

    /// 非正交修正开关
    #[serde(default = "default_true")]
    pub non_orthogonal_corrections: bool,

    /// 二阶显式修正开关
    #[serde(default)]
    pub second_order: bool,

    /// 面值计算策略：true 沿修正向量外推，false 反解修正公式
    #[serde(default = "default_true")]
    pub extrapolate_value: bool,

    /// 均匀面值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,

    /// 均匀法向梯度
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<T>,

    /// 衰减 Taylor-Green 涡参数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taylor_green: Option<TaylorGreenConfig>,

    /// 表格时间序列
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableConfig<T>>,
}

impl<T> BoundaryConfig<T> {
    /// 指定类型名的默认配置
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            non_orthogonal_corrections: true,
            second_order: false,
            extrapolate_value: true,
            value: None,
            gradient: None,
            taylor_green: None,
            table: None,
        }
    }

    /// 修正开关
    pub fn corrector_settings(&self) -> CorrectorSettings {
        CorrectorSettings {
            non_orthogonal_corrections: self.non_orthogonal_corrections,
            second_order: self.second_order,
        }
    }

    /// 设置修正开关
    pub fn with_corrections(mut self, non_orthogonal: bool, second_order: bool) -> Self {
        self.non_orthogonal_corrections = non_orthogonal;
        self.second_order = second_order;
        self
    }

    /// 设置面值策略
    pub fn with_extrapolate_value(mut self, extrapolate: bool) -> Self {
        self.extrapolate_value = extrapolate;
        self
    }

    /// 设置均匀面值
    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    /// 设置均匀梯度
    pub fn with_gradient(mut self, gradient: T) -> Self {
        self.gradient = Some(gradient);
        self
    }

    /// 设置 Taylor-Green 参数
    pub fn with_taylor_green(mut self, config: TaylorGreenConfig) -> Self {
        self.taylor_green = Some(config);
        self
    }

    /// 设置表格时间序列
    pub fn with_table(mut self, table: TableConfig<T>) -> Self {
        self.table = Some(table);
        self
    }
}

// ============================================================
// 衰减 Taylor-Green 涡
// ============================================================

/// 衰减 Taylor-Green 涡参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaylorGreenConfig {
    /// 参考速度 U [m/s]
    pub reference_velocity: f64,
    /// 运动粘度 ν [m²/s]
    pub kinematic_viscosity: f64,
    /// 特征长度 L [m]，波数 k = 2π/L
    pub characteristic_length: f64,
    /// 涡心坐标
    pub origin: DVec3,
    /// 密度 [kg/m³]（仅用于压力）
    pub density: f64,
}

impl Default for TaylorGreenConfig {
    fn default() -> Self {
        Self {
            reference_velocity: 1.0,
            kinematic_viscosity: 0.01,
            characteristic_length: TAU,
            origin: DVec3::ZERO,
            density: 1.0,
        }
    }
}

impl TaylorGreenConfig {
    /// 校验常数
    pub fn validate(&self, patch: &str) -> FvResult<()> {
        if !self.reference_velocity.is_finite() {
            return Err(FvError::invalid_config(
                patch,
                "referenceVelocity",
                self.reference_velocity,
                "必须有限",
            ));
        }
        if !(self.kinematic_viscosity.is_finite() && self.kinematic_viscosity >= 0.0) {
            return Err(FvError::invalid_config(
                patch,
                "kinematicViscosity",
                self.kinematic_viscosity,
                "必须为非负有限值",
            ));
        }
        if !(self.characteristic_length.is_finite() && self.characteristic_length > 0.0) {
            return Err(FvError::invalid_config(
                patch,
                "characteristicLength",
                self.characteristic_length,
                "必须为正",
            ));
        }
        if !self.origin.is_finite() {
            return Err(FvError::invalid_config(patch, "origin", self.origin, "必须有限"));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(FvError::invalid_config(patch, "density", self.density, "必须为正"));
        }
        Ok(())
    }
}

// ============================================================
// 表格时间序列
// ============================================================

/// 表格时间序列配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig<T> {
    /// 时间点
    pub times: Vec<f64>,
    /// 对应的值
    pub values: Vec<T>,
    /// 外推模式
    #[serde(default)]
    pub extrapolation: ExtrapolationMode,
}

impl<T: FieldValue> TableConfig<T> {
    /// 构建并校验时间序列
    pub fn build(&self, patch: &str) -> FvResult<TabulatedProfile<T>> {
        Ok(
            TabulatedProfile::new(patch, self.times.clone(), self.values.clone())?
                .with_extrapolation(self.extrapolation),
        )
    }
}

impl<T: FieldValue> From<&TabulatedProfile<T>> for TableConfig<T> {
    fn from(profile: &TabulatedProfile<T>) -> Self {
        Self {
            times: profile.times().to_vec(),
            values: profile.values().to_vec(),
            extrapolation: profile.extrapolation(),
        }
    }
}
