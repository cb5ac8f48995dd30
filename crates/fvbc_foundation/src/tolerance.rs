// crates/fvbc_foundation/src/tolerance.rs

//! 几何容差配置
//!
//! 网格几何校验使用的阈值，通过参数注入而非全局变量传递。

use serde::{Deserialize, Serialize};

/// 几何容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryTolerance {
    /// 面积向量模的最小值
    pub min_face_area: f64,
    /// 正交距离 n·d 的最小值
    pub min_orthogonal_distance: f64,
    /// 非正交修正向量被视为零的阈值（相对 |d|）
    pub orthogonal_rel: f64,
}

impl Default for GeometryTolerance {
    fn default() -> Self {
        Self {
            min_face_area: 1e-30,
            min_orthogonal_distance: 1e-15,
            orthogonal_rel: 1e-12,
        }
    }
}

impl GeometryTolerance {
    /// 面积是否可接受
    #[inline]
    pub fn is_area_valid(&self, mag: f64) -> bool {
        mag.is_finite() && mag > self.min_face_area
    }

    /// 正交距离是否可接受
    #[inline]
    pub fn is_distance_valid(&self, dist: f64) -> bool {
        dist.is_finite() && dist > self.min_orthogonal_distance
    }

    /// 修正向量相对位移是否可忽略（近似正交面）
    #[inline]
    pub fn is_orthogonal(&self, correction_mag: f64, delta_mag: f64) -> bool {
        correction_mag <= self.orthogonal_rel * delta_mag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        let tol = GeometryTolerance::default();
        assert!(tol.is_area_valid(1e-6));
        assert!(!tol.is_area_valid(0.0));
        assert!(!tol.is_distance_valid(0.0));
        assert!(!tol.is_distance_valid(-0.1));
        assert!(!tol.is_distance_valid(f64::NAN));
    }

    #[test]
    fn test_is_orthogonal() {
        let tol = GeometryTolerance::default();
        assert!(tol.is_orthogonal(0.0, 0.1));
        assert!(!tol.is_orthogonal(1e-3, 0.1));
    }
}
