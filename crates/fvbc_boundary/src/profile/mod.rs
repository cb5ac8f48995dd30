// crates/fvbc_boundary/src/profile/mod.rs

//! 时变边界剖面
//!
//! - [`TaylorGreenVortex`]: 衰减 Taylor-Green 涡解析解
//! - [`TabulatedProfile`]: 表格时间序列，整个边界均匀
//!
//! 剖面是时间和面中心位置的纯函数，不持有仿真时间。

mod tabulated;
mod taylor_green;

pub use tabulated::{ExtrapolationMode, TabulatedProfile};
pub use taylor_green::TaylorGreenVortex;

use glam::{DMat3, DVec3};

/// 解析速度边界的剖面来源
#[derive(Debug, Clone, PartialEq)]
pub enum VelocityProfile {
    /// 衰减 Taylor-Green 涡
    TaylorGreen(TaylorGreenVortex),
    /// 表格时间序列
    Tabulated(TabulatedProfile<DVec3>),
}

impl VelocityProfile {
    /// 时刻 `t`、位置 `x` 处的速度
    #[inline]
    pub fn velocity(&self, t: f64, x: DVec3) -> DVec3 {
        match self {
            Self::TaylorGreen(tg) => tg.velocity(t, x),
            Self::Tabulated(table) => table.value_at(t),
        }
    }

    /// 速度梯度张量（表格剖面空间均匀，梯度为零）
    pub fn velocity_gradient(&self, t: f64, x: DVec3) -> DMat3 {
        match self {
            Self::TaylorGreen(tg) => tg.velocity_gradient(t, x),
            Self::Tabulated(_) => DMat3::ZERO,
        }
    }

    /// 剖面名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::TaylorGreen(_) => "taylorGreen",
            Self::Tabulated(_) => "table",
        }
    }
}
