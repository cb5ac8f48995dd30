// crates/fvbc_mesh/src/builder.rs

//! 平面边界生成器
//!
//! 生成矩形平面上的规则边界面，每个面对应一个贴壁单元。
//! `skew` 沿第一条边方向平移单元中心，得到可控的非正交角 `atan(skew)`。

use fvbc_foundation::{FvError, FvResult};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::patch::PatchFace;

/// 平面边界描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanePatchSpec {
    /// 边界名称
    pub name: String,
    /// 矩形角点
    pub origin: DVec3,
    /// 第一条边
    pub span_u: DVec3,
    /// 第二条边，外法向为 `span_u × span_v`
    pub span_v: DVec3,
    /// 两个方向的划分数
    pub divisions: [usize; 2],
    /// 贴壁单元厚度（单元中心到面的法向距离的两倍）
    pub cell_depth: f64,
    /// 切向偏斜量，tan(非正交角)
    #[serde(default)]
    pub skew: f64,
    /// 第一个面的所属单元索引
    #[serde(default)]
    pub first_owner: usize,
}

/// 平面边界生成器
pub struct PatchBuilder;

impl PatchBuilder {
    /// 按描述生成边界面
    pub fn plane(spec: &PlanePatchSpec) -> FvResult<Vec<PatchFace>> {
        let [nu, nv] = spec.divisions;
        if nu == 0 || nv == 0 {
            return Err(FvError::invalid_config(
                &spec.name,
                "divisions",
                format!("{nu}x{nv}"),
                "划分数必须为正",
            ));
        }
        if !(spec.cell_depth.is_finite() && spec.cell_depth > 0.0) {
            return Err(FvError::invalid_config(
                &spec.name,
                "cellDepth",
                spec.cell_depth,
                "必须为正",
            ));
        }
        if !spec.skew.is_finite() {
            return Err(FvError::invalid_config(&spec.name, "skew", spec.skew, "必须有限"));
        }

        let du = spec.span_u / nu as f64;
        let dv = spec.span_v / nv as f64;
        let area = du.cross(dv);
        let normal = area.normalize_or_zero();
        if normal == DVec3::ZERO {
            return Err(FvError::config(&spec.name, "平面两条边共线"));
        }
        let tangent = spec.span_u.normalize_or_zero();

        let half = 0.5 * spec.cell_depth;
        let mut faces = Vec::with_capacity(nu * nv);
        for j in 0..nv {
            for i in 0..nu {
                let centre = spec.origin + (i as f64 + 0.5) * du + (j as f64 + 0.5) * dv;
                let owner_centre = centre - half * normal - spec.skew * half * tangent;
                faces.push(PatchFace {
                    centre,
                    area,
                    owner: spec.first_owner + j * nu + i,
                    owner_centre,
                });
            }
        }
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchGeometry;
    use fvbc_foundation::GeometryTolerance;

    fn spec(skew: f64) -> PlanePatchSpec {
        PlanePatchSpec {
            name: "top".into(),
            origin: DVec3::new(0.0, 0.0, 1.0),
            span_u: DVec3::new(1.0, 0.0, 0.0),
            span_v: DVec3::new(0.0, 1.0, 0.0),
            divisions: [4, 2],
            cell_depth: 0.2,
            skew,
            first_owner: 10,
        }
    }

    #[test]
    fn test_plane_orthogonal() {
        let faces = PatchBuilder::plane(&spec(0.0)).unwrap();
        assert_eq!(faces.len(), 8);
        assert_eq!(faces[0].owner, 10);
        assert_eq!(faces[7].owner, 17);

        let geom = PatchGeometry::build("top", &faces, &GeometryTolerance::default()).unwrap();
        assert!(geom.is_orthogonal());
        assert!((geom.total_area() - 1.0).abs() < 1e-12);
        for &dist in geom.orthogonal_distances() {
            assert!((dist - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_plane_skew_angle() {
        let faces = PatchBuilder::plane(&spec(1.0)).unwrap();
        let geom = PatchGeometry::build("top", &faces, &GeometryTolerance::default()).unwrap();

        assert!((geom.max_non_orthogonality() - 45.0).abs() < 1e-8);
        let k = geom.correction_vectors()[0];
        assert!((k - DVec3::new(0.1, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_plane_rejects_bad_input() {
        let mut s = spec(0.0);
        s.divisions = [0, 1];
        assert!(PatchBuilder::plane(&s).is_err());

        let mut s = spec(0.0);
        s.cell_depth = -1.0;
        assert!(PatchBuilder::plane(&s).is_err());

        let mut s = spec(0.0);
        s.span_v = s.span_u;
        assert!(PatchBuilder::plane(&s).is_err());
    }
}
