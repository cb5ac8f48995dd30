// crates/fvbc_boundary/tests/common/mod.rs
//!
//! 集成测试共用的网格与场构造

#![allow(dead_code)]

use fvbc_boundary::CellField;
use fvbc_mesh::{MeshGeometry, PatchBuilder, PatchFace, PatchGeometry, PatchHandle, PlanePatchSpec};
use glam::DVec3;

/// z = 1 平面上 `n` 个面的条带边界，单元中心在面下方 `depth/2` 处
pub fn strip_spec(name: &str, n: usize, depth: f64, skew: f64) -> PlanePatchSpec {
    PlanePatchSpec {
        name: name.into(),
        origin: DVec3::new(0.0, 0.0, 1.0),
        span_u: DVec3::new(0.25 * n as f64, 0.0, 0.0),
        span_v: DVec3::new(0.0, 0.25, 0.0),
        divisions: [n, 1],
        cell_depth: depth,
        skew,
        first_owner: 0,
    }
}

/// 单边界网格
pub fn strip_mesh(name: &str, n: usize, depth: f64, skew: f64) -> (MeshGeometry, PatchHandle) {
    let faces = PatchBuilder::plane(&strip_spec(name, n, depth, skew)).unwrap();
    let mut mesh = MeshGeometry::new();
    let handle = mesh.add_patch(name, &faces).unwrap();
    (mesh, handle)
}

/// 所属单元中心
pub fn owner_centres(geom: &PatchGeometry) -> Vec<DVec3> {
    (0..geom.len())
        .map(|i| geom.face_centres()[i] - geom.delta()[i])
        .collect()
}

/// 由几何还原原始面数据
pub fn raw_faces(geom: &PatchGeometry) -> Vec<PatchFace> {
    (0..geom.len())
        .map(|i| PatchFace {
            centre: geom.face_centres()[i],
            area: geom.normals()[i] * geom.mag_areas()[i],
            owner: geom.face_cells()[i],
            owner_centre: geom.face_centres()[i] - geom.delta()[i],
        })
        .collect()
}

/// 用解析函数在所属单元中心采样标量场及其梯度
pub fn sample_scalar(
    geom: &PatchGeometry,
    phi: impl Fn(DVec3) -> f64,
    grad: impl Fn(DVec3) -> DVec3,
) -> CellField<f64> {
    let centres = owner_centres(geom);
    CellField::new("phi", centres.iter().map(|x| phi(*x)).collect())
        .with_gradients(centres.iter().map(|x| grad(*x)).collect())
        .unwrap()
}
