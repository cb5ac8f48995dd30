// crates/fvbc_boundary/src/profile/taylor_green.rs

//! 衰减 Taylor-Green 涡
//!
//! 二维不可压 Navier-Stokes 方程的解析解：
//!
//! ```text
//! u = −U cos(k x̃) sin(k ỹ) F(t)
//! v =  U sin(k x̃) cos(k ỹ) F(t)
//! w =  0
//! p = −ρ U²/4 [cos(2k x̃) + cos(2k ỹ)] F(t)²
//!
//! k = 2π/L,  F(t) = exp(−2 ν k² t),  x̃ = x − x₀
//! ```

use fvbc_foundation::FvResult;
use glam::{DMat3, DVec3};

use crate::config::TaylorGreenConfig;

/// 衰减 Taylor-Green 涡
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaylorGreenVortex {
    config: TaylorGreenConfig,
    wavenumber: f64,
}

impl TaylorGreenVortex {
    /// 从配置创建，非法常数立即报错
    pub fn new(patch: &str, config: TaylorGreenConfig) -> FvResult<Self> {
        config.validate(patch)?;
        Ok(Self {
            wavenumber: std::f64::consts::TAU / config.characteristic_length,
            config,
        })
    }

    /// 配置
    pub fn config(&self) -> &TaylorGreenConfig {
        &self.config
    }

    /// 波数 k
    #[inline]
    pub fn wavenumber(&self) -> f64 {
        self.wavenumber
    }

    /// 衰减因子 F(t)
    #[inline]
    pub fn decay(&self, t: f64) -> f64 {
        let k = self.wavenumber;
        (-2.0 * self.config.kinematic_viscosity * k * k * t).exp()
    }

    #[inline]
    fn phases(&self, x: DVec3) -> (f64, f64, f64, f64) {
        let r = x - self.config.origin;
        let (sx, cx) = (self.wavenumber * r.x).sin_cos();
        let (sy, cy) = (self.wavenumber * r.y).sin_cos();
        (sx, cx, sy, cy)
    }

    /// 速度
    pub fn velocity(&self, t: f64, x: DVec3) -> DVec3 {
        let (sx, cx, sy, cy) = self.phases(x);
        let amp = self.config.reference_velocity * self.decay(t);
        DVec3::new(-amp * cx * sy, amp * sx * cy, 0.0)
    }

    /// 速度梯度张量，第 i 列为 ∂U/∂xᵢ
    pub fn velocity_gradient(&self, t: f64, x: DVec3) -> DMat3 {
        let (sx, cx, sy, cy) = self.phases(x);
        let a = self.config.reference_velocity * self.decay(t) * self.wavenumber;
        DMat3::from_cols(
            DVec3::new(a * sx * sy, a * cx * cy, 0.0),
            DVec3::new(-a * cx * cy, -a * sx * sy, 0.0),
            DVec3::ZERO,
        )
    }

    /// 压力
    pub fn pressure(&self, t: f64, x: DVec3) -> f64 {
        let r = x - self.config.origin;
        let k2 = 2.0 * self.wavenumber;
        let u = self.config.reference_velocity;
        let f = self.decay(t);
        -self.config.density * 0.25 * u * u * ((k2 * r.x).cos() + (k2 * r.y).cos()) * f * f
    }

    /// 压力梯度
    pub fn pressure_gradient(&self, t: f64, x: DVec3) -> DVec3 {
        let r = x - self.config.origin;
        let k2 = 2.0 * self.wavenumber;
        let u = self.config.reference_velocity;
        let f = self.decay(t);
        let a = self.config.density * 0.25 * u * u * k2 * f * f;
        DVec3::new(a * (k2 * r.x).sin(), a * (k2 * r.y).sin(), 0.0)
    }
}
