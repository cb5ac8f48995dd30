// crates/fvbc_boundary/src/corrector.rs

//! 非正交修正算法
//!
//! 边界面法向梯度的修正估计，由三项依次叠加：
//!
//! ```text
//! 基础项:     Δ (φ_f − φ_P)                 Δ = 1/(n·d)
//! 非正交项:  −Δ (k · ∇φ_P)                  k = d − (n·d) n
//! 二阶项:    −Δ r (φ_f − φ_P − d · ∇φ_P)    r = |k|²/|d|²
//! ```
//!
//! 基础项使用法向投影距离而非几何距离。非正交项补回基础项遗漏的切向梯度贡献。
//! 二阶项沿完整位移 `d` 做高阶重构，消去非正交项残留的 `|k|²/(n·d)` 曲率误差：
//! 对二次场 `φ = |x|²`，修正结果与同一法向距离下正交网格的单侧差分一致。
//!
//! 约束：
//!
//! - `k ≡ 0`（正交面）时只剩基础项，与 `secondOrder` 无关
//! - 关闭 `nonOrthogonalCorrections` 时 `k` 视为零，逐位复现未修正公式
//! - 单元梯度不可用（首次迭代）时修正项取零
//!
//! 算法无状态，逐面独立，可任意顺序并行求值。

use fvbc_foundation::{FvError, FvResult};
use fvbc_mesh::{FaceGeometry, PatchGeometry};
use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::field::CellField;
use crate::value::FieldValue;

/// 面数达到该值时按面并行
pub const PARALLEL_THRESHOLD: usize = 2048;

/// 逐面求值，大边界使用 Rayon 并行
pub(crate) fn map_faces<R, F>(n_faces: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    if n_faces >= PARALLEL_THRESHOLD {
        (0..n_faces).into_par_iter().map(f).collect()
    } else {
        (0..n_faces).map(f).collect()
    }
}

// ============================================================
// 修正开关
// ============================================================

/// 修正开关（构造后不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectorSettings {
    /// 是否施加非正交修正
    pub non_orthogonal_corrections: bool,
    /// 是否施加二阶显式修正
    pub second_order: bool,
}

impl Default for CorrectorSettings {
    fn default() -> Self {
        Self {
            non_orthogonal_corrections: true,
            second_order: false,
        }
    }
}

impl CorrectorSettings {
    /// 完全关闭修正
    pub const UNCORRECTED: Self = Self {
        non_orthogonal_corrections: false,
        second_order: false,
    };
}

// ============================================================
// 纯函数形式
// ============================================================

/// 修正后的面法向梯度
///
/// 依次叠加基础项、非正交项、二阶项。`correction` 为零或
/// `owner_gradient` 为 `None` 时直接返回基础项。
pub fn corrected_sn_grad<T: FieldValue>(
    owner_value: T,
    owner_gradient: Option<&T::Gradient>,
    face_value: T,
    normal: DVec3,
    correction: DVec3,
    orthogonal_distance: f64,
    second_order: bool,
) -> T {
    let delta_coeff = 1.0 / orthogonal_distance;
    let base = (face_value - owner_value) * delta_coeff;

    match correction_terms(
        owner_value,
        owner_gradient,
        face_value,
        normal,
        correction,
        orthogonal_distance,
        second_order,
    ) {
        Some((non_orth, None)) => base + non_orth,
        Some((non_orth, Some(second))) => base + non_orth + second,
        None => base,
    }
}

/// 非正交项与二阶项
fn correction_terms<T: FieldValue>(
    owner_value: T,
    owner_gradient: Option<&T::Gradient>,
    face_value: T,
    normal: DVec3,
    correction: DVec3,
    orthogonal_distance: f64,
    second_order: bool,
) -> Option<(T, Option<T>)> {
    let grad = owner_gradient?;
    if correction == DVec3::ZERO {
        return None;
    }
    let delta_coeff = 1.0 / orthogonal_distance;

    let non_orth = T::directional(grad, correction) * -delta_coeff;
    if !second_order {
        return Some((non_orth, None));
    }

    let d = normal * orthogonal_distance + correction;
    let ratio = correction.length_squared() / d.length_squared();
    let residual = face_value - owner_value - T::directional(grad, d);
    Some((non_orth, Some(residual * (-delta_coeff * ratio))))
}

// ============================================================
// 系数拆分
// ============================================================

/// 面法向梯度的系数拆分
///
/// `snGrad = internal_coeff · φ_P + orthogonal + correction + second_order`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnGradParts<T> {
    /// 隐式矩阵系数 `−Δ`
    pub internal_coeff: f64,
    /// 正交显式部分 `Δ φ_f`
    pub orthogonal: T,
    /// 非正交显式修正 `−Δ k·∇φ_P`
    pub correction: T,
    /// 二阶显式修正，未启用时为零
    pub second_order: T,
}

impl<T: FieldValue> SnGradParts<T> {
    /// 重组完整的面法向梯度
    pub fn total(&self, owner_value: T) -> T {
        owner_value * self.internal_coeff + self.orthogonal + self.correction + self.second_order
    }
}

// ============================================================
// 修正器
// ============================================================

/// 非正交修正器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NonOrthogonalCorrector {
    settings: CorrectorSettings,
}

impl NonOrthogonalCorrector {
    /// 创建修正器
    pub fn new(settings: CorrectorSettings) -> Self {
        Self { settings }
    }

    /// 未修正的经典单侧差分
    pub fn uncorrected() -> Self {
        Self::new(CorrectorSettings::UNCORRECTED)
    }

    /// 修正开关
    pub fn settings(&self) -> CorrectorSettings {
        self.settings
    }

    /// 生效的修正向量，关闭修正时为零
    #[inline]
    fn effective_correction(&self, face: &FaceGeometry) -> DVec3 {
        if self.settings.non_orthogonal_corrections {
            face.correction
        } else {
            DVec3::ZERO
        }
    }

    /// 单个面的修正法向梯度
    #[inline]
    pub fn sn_grad<T: FieldValue>(
        &self,
        face: &FaceGeometry,
        owner_value: T,
        owner_gradient: Option<&T::Gradient>,
        face_value: T,
    ) -> T {
        corrected_sn_grad(
            owner_value,
            owner_gradient,
            face_value,
            face.normal,
            self.effective_correction(face),
            face.orthogonal_distance,
            self.settings.second_order,
        )
    }

    /// 单个面的系数拆分
    pub fn split<T: FieldValue>(
        &self,
        face: &FaceGeometry,
        owner_value: T,
        owner_gradient: Option<&T::Gradient>,
        face_value: T,
    ) -> SnGradParts<T> {
        let (correction, second_order) = match correction_terms(
            owner_value,
            owner_gradient,
            face_value,
            face.normal,
            self.effective_correction(face),
            face.orthogonal_distance,
            self.settings.second_order,
        ) {
            Some((non_orth, second)) => (non_orth, second.unwrap_or(T::ZERO)),
            None => (T::ZERO, T::ZERO),
        };

        SnGradParts {
            internal_coeff: -face.delta_coeff,
            orthogonal: face_value * face.delta_coeff,
            correction,
            second_order,
        }
    }

    /// 反解面值：给定目标法向梯度，求使修正梯度等于该值的面值（直接模式）
    ///
    /// `φ_f = φ_P + (g/Δ + k·∇φ_P − r d·∇φ_P) / (1 − r)`
    pub fn solve_face_value<T: FieldValue>(
        &self,
        face: &FaceGeometry,
        owner_value: T,
        owner_gradient: Option<&T::Gradient>,
        sn_grad: T,
    ) -> T {
        let k = self.effective_correction(face);
        match owner_gradient {
            Some(grad) if k != DVec3::ZERO => {
                let rhs = sn_grad / face.delta_coeff + T::directional(grad, k);
                if !self.settings.second_order {
                    return owner_value + rhs;
                }
                let d = face.normal * face.orthogonal_distance + k;
                let ratio = k.length_squared() / d.length_squared();
                owner_value + (rhs - T::directional(grad, d) * ratio) / (1.0 - ratio)
            }
            _ => owner_value + sn_grad / face.delta_coeff,
        }
    }

    /// 外推面值：沿修正向量外推单元值，再加法向梯度贡献（外推模式）
    ///
    /// - 一阶: `φ_P + k·∇φ_P + g/Δ`
    /// - 二阶: `φ_P + k·∇φ_P + ½ (g + n·∇φ_P) (n·d)`
    pub fn extrapolate_face_value<T: FieldValue>(
        &self,
        face: &FaceGeometry,
        owner_value: T,
        owner_gradient: Option<&T::Gradient>,
        sn_grad: T,
    ) -> T {
        match owner_gradient {
            Some(grad) if self.settings.non_orthogonal_corrections => {
                let along_k = T::directional(grad, face.correction);
                if self.settings.second_order {
                    let along_n = T::directional(grad, face.normal);
                    owner_value + along_k + (sn_grad + along_n) * (0.5 * face.orthogonal_distance)
                } else {
                    owner_value + along_k + sn_grad / face.delta_coeff
                }
            }
            _ => owner_value + sn_grad / face.delta_coeff,
        }
    }

    // ========================================================
    // 整个边界
    // ========================================================

    /// 整个边界的修正法向梯度
    pub fn patch_sn_grad<T: FieldValue>(
        &self,
        patch: &PatchGeometry,
        field: &CellField<T>,
        face_values: &[T],
    ) -> FvResult<Vec<T>> {
        check_patch_inputs(patch, field, face_values.len())?;
        Ok(map_faces(patch.len(), |i| {
            let face = patch.face(i);
            self.sn_grad(
                &face,
                field.value(face.owner),
                field.gradient(face.owner),
                face_values[i],
            )
        }))
    }

    /// 整个边界的系数拆分
    pub fn patch_split<T: FieldValue>(
        &self,
        patch: &PatchGeometry,
        field: &CellField<T>,
        face_values: &[T],
    ) -> FvResult<Vec<SnGradParts<T>>> {
        check_patch_inputs(patch, field, face_values.len())?;
        Ok(map_faces(patch.len(), |i| {
            let face = patch.face(i);
            self.split(
                &face,
                field.value(face.owner),
                field.gradient(face.owner),
                face_values[i],
            )
        }))
    }
}

/// 检查面值长度与所属单元索引
pub(crate) fn check_patch_inputs<T: FieldValue>(
    patch: &PatchGeometry,
    field: &CellField<T>,
    n_face_values: usize,
) -> FvResult<()> {
    FvError::check_size("face values", patch.len(), n_face_values)?;
    for &owner in patch.face_cells() {
        FvError::check_index("Cell", owner, field.len())?;
    }
    Ok(())
}
