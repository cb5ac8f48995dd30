// crates/fvbc_mesh/src/patch.rs

//! 边界面片几何
//!
//! 一个 patch 是属于同一网格区域的有序边界面序列。本模块只读地描述其几何：
//!
//! ```text
//!            n (单位外法向)
//!            ↑
//!   ─────────●───────── 边界面 f
//!           /|
//!        d / | n·d  (正交距离)
//!         /  |
//!        P ──┘
//!          k = d − (n·d) n   (非正交修正向量)
//! ```
//!
//! - `d`: 单元中心 P 到面中心 f 的位移
//! - `n·d`: 正交距离，其倒数为 delta 系数 Δ
//! - `k`: 去掉法向投影后的切向残差，正交网格上恒为零
//!
//! 几何在构建时校验，零面积或非正的正交距离都会以
//! [`FvError::Geometry`] 报告，并指明边界名称和面索引。

use std::sync::atomic::{AtomicU64, Ordering};

use fvbc_foundation::{FvError, FvResult, GeometryTolerance};
use glam::DVec3;
use serde::{Deserialize, Serialize};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

fn next_geometry_id() -> u64 {
    NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)
}

/// 单个边界面的原始数据（网格提供）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchFace {
    /// 面中心
    pub centre: DVec3,
    /// 面积向量（方向为外法向，模为面积）
    pub area: DVec3,
    /// 所属单元索引
    pub owner: usize,
    /// 所属单元中心
    pub owner_centre: DVec3,
}

/// 单个面的派生几何，供非正交修正使用
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    /// 面中心
    pub centre: DVec3,
    /// 单位外法向
    pub normal: DVec3,
    /// 面积
    pub mag_area: f64,
    /// 所属单元索引
    pub owner: usize,
    /// 单元中心到面中心的位移 d
    pub delta: DVec3,
    /// 非正交修正向量 k
    pub correction: DVec3,
    /// 正交距离 n·d
    pub orthogonal_distance: f64,
    /// delta 系数 1/(n·d)
    pub delta_coeff: f64,
}

/// 边界面片几何（由外部网格拥有，边界条件只读访问）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchGeometry {
    name: String,
    face_centres: Vec<DVec3>,
    normals: Vec<DVec3>,
    mag_areas: Vec<f64>,
    face_cells: Vec<usize>,
    delta: Vec<DVec3>,
    correction: Vec<DVec3>,
    orthogonal_distance: Vec<f64>,
    delta_coeffs: Vec<f64>,
    /// 拓扑版本，每次重建递增
    topology_version: u64,
    /// 构建标识，进程内唯一
    #[serde(skip, default = "next_geometry_id")]
    build_id: u64,
}

impl PatchGeometry {
    /// 从原始面数据构建并校验几何
    pub fn build(
        name: impl Into<String>,
        faces: &[PatchFace],
        tol: &GeometryTolerance,
    ) -> FvResult<Self> {
        let name = name.into();
        let n = faces.len();

        let mut geom = Self {
            name,
            face_centres: Vec::with_capacity(n),
            normals: Vec::with_capacity(n),
            mag_areas: Vec::with_capacity(n),
            face_cells: Vec::with_capacity(n),
            delta: Vec::with_capacity(n),
            correction: Vec::with_capacity(n),
            orthogonal_distance: Vec::with_capacity(n),
            delta_coeffs: Vec::with_capacity(n),
            topology_version: 0,
            build_id: next_geometry_id(),
        };

        for (i, face) in faces.iter().enumerate() {
            let mag = face.area.length();
            if !tol.is_area_valid(mag) {
                return Err(FvError::geometry(
                    &geom.name,
                    i,
                    format!("面积向量模 {mag:e} 无效（零长度法向）"),
                ));
            }
            let normal = face.area / mag;

            let d = face.centre - face.owner_centre;
            let dist = normal.dot(d);
            if !tol.is_distance_valid(dist) {
                return Err(FvError::geometry(
                    &geom.name,
                    i,
                    format!("正交距离 n·d = {dist:e} 非正"),
                ));
            }

            let mut k = d - dist * normal;
            if tol.is_orthogonal(k.length(), d.length()) {
                k = DVec3::ZERO;
            }

            geom.face_centres.push(face.centre);
            geom.normals.push(normal);
            geom.mag_areas.push(mag);
            geom.face_cells.push(face.owner);
            geom.delta.push(d);
            geom.correction.push(k);
            geom.orthogonal_distance.push(dist);
            geom.delta_coeffs.push(1.0 / dist);
        }

        log::debug!(
            "构建边界几何 '{}': {} 个面, 最大非正交角 {:.2}°",
            geom.name,
            n,
            geom.max_non_orthogonality()
        );

        Ok(geom)
    }

    /// 边界名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 面数
    #[inline]
    pub fn len(&self) -> usize {
        self.face_centres.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_centres.is_empty()
    }

    /// 拓扑版本
    #[inline]
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    /// 构建标识，每次构建（含反序列化）得到新值
    #[inline]
    pub fn build_id(&self) -> u64 {
        self.build_id
    }

    pub(crate) fn set_topology_version(&mut self, version: u64) {
        self.topology_version = version;
    }

    /// 面中心
    pub fn face_centres(&self) -> &[DVec3] {
        &self.face_centres
    }

    /// 单位外法向
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// 面积
    pub fn mag_areas(&self) -> &[f64] {
        &self.mag_areas
    }

    /// 所属单元索引
    pub fn face_cells(&self) -> &[usize] {
        &self.face_cells
    }

    /// 单元中心到面中心位移
    pub fn delta(&self) -> &[DVec3] {
        &self.delta
    }

    /// 非正交修正向量
    pub fn correction_vectors(&self) -> &[DVec3] {
        &self.correction
    }

    /// 正交距离
    pub fn orthogonal_distances(&self) -> &[f64] {
        &self.orthogonal_distance
    }

    /// delta 系数
    pub fn delta_coeffs(&self) -> &[f64] {
        &self.delta_coeffs
    }

    /// 第 `i` 个面的完整几何
    #[inline]
    pub fn face(&self, i: usize) -> FaceGeometry {
        FaceGeometry {
            centre: self.face_centres[i],
            normal: self.normals[i],
            mag_area: self.mag_areas[i],
            owner: self.face_cells[i],
            delta: self.delta[i],
            correction: self.correction[i],
            orthogonal_distance: self.orthogonal_distance[i],
            delta_coeff: self.delta_coeffs[i],
        }
    }

    /// 正交比 (n·d)/|d|，正交面为 1
    pub fn orthogonality_ratio(&self, i: usize) -> f64 {
        self.orthogonal_distance[i] / self.delta[i].length()
    }

    /// 第 `i` 个面的非正交角 [度]
    pub fn non_orthogonality(&self, i: usize) -> f64 {
        self.orthogonality_ratio(i).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// 最大非正交角 [度]
    pub fn max_non_orthogonality(&self) -> f64 {
        (0..self.len())
            .map(|i| self.non_orthogonality(i))
            .fold(0.0, f64::max)
    }

    /// 是否所有面都正交
    pub fn is_orthogonal(&self) -> bool {
        self.correction.iter().all(|k| *k == DVec3::ZERO)
    }

    /// 总面积
    pub fn total_area(&self) -> f64 {
        self.mag_areas.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(centre: DVec3, owner_centre: DVec3) -> PatchFace {
        PatchFace {
            centre,
            area: DVec3::new(0.0, 0.0, 0.01),
            owner: 0,
            owner_centre,
        }
    }

    #[test]
    fn test_orthogonal_face() {
        let faces = [face(DVec3::new(0.0, 0.0, 1.0), DVec3::new(0.0, 0.0, 0.9))];
        let geom = PatchGeometry::build("top", &faces, &GeometryTolerance::default()).unwrap();

        let f = geom.face(0);
        assert_eq!(f.normal, DVec3::Z);
        assert_eq!(f.correction, DVec3::ZERO);
        assert!((f.orthogonal_distance - 0.1).abs() < 1e-14);
        assert!((f.delta_coeff - 10.0).abs() < 1e-10);
        assert!((f.mag_area - 0.01).abs() < 1e-15);
        assert!(geom.is_orthogonal());
        assert!(geom.max_non_orthogonality() < 1e-6);
    }

    #[test]
    fn test_skewed_face_decomposition() {
        let faces = [face(DVec3::new(0.0, 0.0, 1.0), DVec3::new(-0.1, 0.0, 0.9))];
        let geom = PatchGeometry::build("top", &faces, &GeometryTolerance::default()).unwrap();

        let f = geom.face(0);
        assert!((f.orthogonal_distance - 0.1).abs() < 1e-14);
        assert!((f.correction - DVec3::new(0.1, 0.0, 0.0)).length() < 1e-14);
        // d = n·d n + k
        assert!((f.normal * f.orthogonal_distance + f.correction - f.delta).length() < 1e-14);
        assert!((geom.non_orthogonality(0) - 45.0).abs() < 1e-8);
        assert!(!geom.is_orthogonal());
    }

    #[test]
    fn test_zero_area_rejected() {
        let mut f = face(DVec3::Z, DVec3::ZERO);
        f.area = DVec3::ZERO;
        let faces = [face(DVec3::Z, DVec3::ZERO), f];

        let err = PatchGeometry::build("wall", &faces, &GeometryTolerance::default()).unwrap_err();
        match err {
            FvError::Geometry { patch, face, .. } => {
                assert_eq!(patch, "wall");
                assert_eq!(face, 1);
            }
            other => panic!("Expected Geometry error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_orthogonal_distance_rejected() {
        // 单元中心位于面所在平面内
        let faces = [face(DVec3::new(0.0, 0.0, 1.0), DVec3::new(0.5, 0.0, 1.0))];
        let err = PatchGeometry::build("wall", &faces, &GeometryTolerance::default()).unwrap_err();
        assert!(matches!(err, FvError::Geometry { face: 0, .. }));
    }

    #[test]
    fn test_serde_roundtrip_keeps_geometry() {
        let faces = [face(DVec3::new(0.0, 0.0, 1.0), DVec3::new(-0.1, 0.0, 0.9))];
        let geom = PatchGeometry::build("top", &faces, &GeometryTolerance::default()).unwrap();
        let json = serde_json::to_string(&geom).unwrap();
        let back: PatchGeometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "top");
        assert_eq!(back.correction_vectors(), geom.correction_vectors());
        assert_ne!(back.build_id(), geom.build_id());
    }

    #[test]
    fn test_each_build_has_own_id() {
        let faces = [face(DVec3::new(0.0, 0.0, 1.0), DVec3::new(0.0, 0.0, 0.5))];
        let tol = GeometryTolerance::default();
        let a = PatchGeometry::build("top", &faces, &tol).unwrap();
        let b = PatchGeometry::build("top", &faces, &tol).unwrap();
        assert_ne!(a.build_id(), b.build_id());
        assert_eq!(a.clone().build_id(), a.build_id());
    }
}
