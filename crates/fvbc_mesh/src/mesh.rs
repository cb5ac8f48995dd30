// crates/fvbc_mesh/src/mesh.rs

//! 网格几何容器
//!
//! `MeshGeometry` 以 Arena 持有全部边界几何，边界条件只保存 [`PatchHandle`]。
//! 拓扑变化（加密、分解、负载均衡）通过 [`MeshGeometry::replace_patch`]
//! 重建几何，句柄保持有效，拓扑版本递增，边界条件据此判断需要映射。

use std::collections::HashMap;

use fvbc_foundation::{Arena, ArenaTag, FvError, FvResult, GeometryTolerance, Handle};

use crate::patch::{PatchFace, PatchGeometry};

/// 边界几何 Arena 标记
#[derive(Debug, Clone, Copy)]
pub struct PatchTag;
impl ArenaTag for PatchTag {}

/// 边界几何句柄
pub type PatchHandle = Handle<PatchTag>;

/// 网格边界几何集合
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    patches: Arena<PatchGeometry, PatchTag>,
    names: HashMap<String, PatchHandle>,
    tolerance: GeometryTolerance,
}

impl MeshGeometry {
    /// 使用默认容差创建空网格
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定容差创建空网格
    pub fn with_tolerance(tolerance: GeometryTolerance) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// 几何容差
    pub fn tolerance(&self) -> &GeometryTolerance {
        &self.tolerance
    }

    /// 边界数量
    pub fn n_patches(&self) -> usize {
        self.patches.len()
    }

    /// 添加边界，名称必须唯一
    pub fn add_patch(
        &mut self,
        name: impl Into<String>,
        faces: &[PatchFace],
    ) -> FvResult<PatchHandle> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(FvError::config(&name, "边界名称重复"));
        }
        let geom = PatchGeometry::build(name.clone(), faces, &self.tolerance)?;
        let handle = self.patches.insert(geom);
        self.names.insert(name, handle);
        Ok(handle)
    }

    /// 获取边界几何
    pub fn patch(&self, handle: PatchHandle) -> FvResult<&PatchGeometry> {
        self.patches
            .get(handle)
            .ok_or_else(|| FvError::stale_handle(format!("patch {handle}")))
    }

    /// 按名称查找边界
    pub fn find_patch(&self, name: &str) -> Option<PatchHandle> {
        self.names.get(name).copied()
    }

    /// 重建边界拓扑，句柄不变，拓扑版本加一
    pub fn replace_patch(&mut self, handle: PatchHandle, faces: &[PatchFace]) -> FvResult<()> {
        let old = self
            .patches
            .get(handle)
            .ok_or_else(|| FvError::stale_handle(format!("patch {handle}")))?;
        let version = old.topology_version() + 1;
        let old_len = old.len();

        let mut geom = PatchGeometry::build(old.name().to_owned(), faces, &self.tolerance)?;
        geom.set_topology_version(version);

        log::debug!(
            "边界 '{}' 拓扑重建: {} -> {} 个面, 版本 {}",
            geom.name(),
            old_len,
            geom.len(),
            version
        );

        if let Some(slot) = self.patches.get_mut(handle) {
            *slot = geom;
        }
        Ok(())
    }

    /// 删除边界
    pub fn remove_patch(&mut self, handle: PatchHandle) -> Option<PatchGeometry> {
        let geom = self.patches.remove(handle)?;
        self.names.remove(geom.name());
        Some(geom)
    }

    /// 遍历全部边界
    pub fn patches(&self) -> impl Iterator<Item = (PatchHandle, &PatchGeometry)> + '_ {
        self.patches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn faces(n: usize) -> Vec<PatchFace> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                PatchFace {
                    centre: DVec3::new(x, 0.0, 1.0),
                    area: DVec3::new(0.0, 0.0, 1.0),
                    owner: i,
                    owner_centre: DVec3::new(x, 0.0, 0.5),
                }
            })
            .collect()
    }

    #[test]
    fn test_add_and_find() {
        let mut mesh = MeshGeometry::new();
        let h = mesh.add_patch("top", &faces(3)).unwrap();

        assert_eq!(mesh.find_patch("top"), Some(h));
        assert_eq!(mesh.find_patch("bottom"), None);
        assert_eq!(mesh.patch(h).unwrap().len(), 3);
        assert_eq!(mesh.n_patches(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut mesh = MeshGeometry::new();
        mesh.add_patch("top", &faces(1)).unwrap();
        assert!(mesh.add_patch("top", &faces(1)).is_err());
    }

    #[test]
    fn test_replace_bumps_version() {
        let mut mesh = MeshGeometry::new();
        let h = mesh.add_patch("top", &faces(3)).unwrap();
        assert_eq!(mesh.patch(h).unwrap().topology_version(), 0);
        let first_build = mesh.patch(h).unwrap().build_id();

        mesh.replace_patch(h, &faces(5)).unwrap();
        let geom = mesh.patch(h).unwrap();
        assert_eq!(geom.len(), 5);
        assert_eq!(geom.topology_version(), 1);
        assert_ne!(geom.build_id(), first_build);
        assert_eq!(geom.name(), "top");
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut mesh = MeshGeometry::new();
        let h = mesh.add_patch("top", &faces(2)).unwrap();
        mesh.remove_patch(h);

        assert!(matches!(mesh.patch(h), Err(FvError::StaleHandle { .. })));
        assert_eq!(mesh.find_patch("top"), None);
    }
}
