// crates/fvbc_boundary/src/value.rs

//! 场值抽象
//!
//! 边界条件同时服务标量场与矢量场。[`FieldValue`] 统一二者的算术运算，
//! 并给出梯度类型与方向导数：
//!
//! | 场类型 | 梯度类型 | `directional(∇φ, e)` |
//! |--------|----------|----------------------|
//! | `f64`  | `DVec3`  | `∇φ · e`             |
//! | `DVec3`| `DMat3`  | `∇U · e`（第 i 列为 ∂U/∂xᵢ） |

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

use glam::{DMat3, DVec3};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 边界场值类型
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + 'static
{
    /// 单元梯度类型
    type Gradient: Copy + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// 零值
    const ZERO: Self;

    /// 零梯度
    const ZERO_GRADIENT: Self::Gradient;

    /// 类型标签（用于日志和状态文件）
    const LABEL: &'static str;

    /// 沿方向 `dir` 的方向导数 `dir · ∇φ`
    fn directional(grad: &Self::Gradient, dir: DVec3) -> Self;

    /// 模
    fn magnitude(self) -> f64;
}

impl FieldValue for f64 {
    type Gradient = DVec3;

    const ZERO: Self = 0.0;
    const ZERO_GRADIENT: DVec3 = DVec3::ZERO;
    const LABEL: &'static str = "scalar";

    #[inline]
    fn directional(grad: &DVec3, dir: DVec3) -> f64 {
        grad.dot(dir)
    }

    #[inline]
    fn magnitude(self) -> f64 {
        self.abs()
    }
}

impl FieldValue for DVec3 {
    type Gradient = DMat3;

    const ZERO: Self = DVec3::ZERO;
    const ZERO_GRADIENT: DMat3 = DMat3::ZERO;
    const LABEL: &'static str = "vector";

    #[inline]
    fn directional(grad: &DMat3, dir: DVec3) -> DVec3 {
        *grad * dir
    }

    #[inline]
    fn magnitude(self) -> f64 {
        self.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_directional() {
        let grad = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(f64::directional(&grad, DVec3::Y), 2.0);
        assert_eq!(f64::directional(&grad, DVec3::ZERO), 0.0);
    }

    #[test]
    fn test_vector_directional_uses_columns() {
        // U = (y, 0, 0) → ∂U/∂y = (1, 0, 0)
        let grad = DMat3::from_cols(DVec3::ZERO, DVec3::X, DVec3::ZERO);
        assert_eq!(DVec3::directional(&grad, DVec3::Y), DVec3::X);
        assert_eq!(DVec3::directional(&grad, DVec3::X), DVec3::ZERO);
    }
}
