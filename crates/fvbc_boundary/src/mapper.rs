// crates/fvbc_boundary/src/mapper.rs

//! 拓扑映射描述符
//!
//! 网格拓扑变化后，边界场需要随面的插入、删除、重排同步调整：
//!
//! - [`FaceMapper`]（autoMap）: 新面索引 → 旧面索引，`None` 表示无来源，需填充默认值
//! - [`ReverseMapper`]（rmap）: 源边界面索引 → 目标面索引，逐面精确复制
//!
//! 任何越界索引都会使整个映射失败，不会截断或部分写入。

use fvbc_foundation::{FvError, FvResult, MapSide};

/// 正向映射（autoMap）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMapper {
    addressing: Vec<Option<usize>>,
    source_size: usize,
}

impl FaceMapper {
    /// 创建映射，`addressing[new] = Some(old)`
    pub fn new(addressing: Vec<Option<usize>>, source_size: usize) -> Self {
        Self {
            addressing,
            source_size,
        }
    }

    /// 恒等映射
    pub fn identity(n_faces: usize) -> Self {
        Self::new((0..n_faces).map(Some).collect(), n_faces)
    }

    /// 映射后的面数
    pub fn len(&self) -> usize {
        self.addressing.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.addressing.is_empty()
    }

    /// 映射前的面数
    pub fn source_size(&self) -> usize {
        self.source_size
    }

    /// 寻址表
    pub fn addressing(&self) -> &[Option<usize>] {
        &self.addressing
    }

    /// 是否为恒等映射
    pub fn is_identity(&self) -> bool {
        self.addressing.len() == self.source_size
            && self
                .addressing
                .iter()
                .enumerate()
                .all(|(i, a)| *a == Some(i))
    }

    /// 无来源的面数
    pub fn n_unmapped(&self) -> usize {
        self.addressing.iter().filter(|a| a.is_none()).count()
    }

    /// 校验所有来源索引
    pub fn validate(&self, patch: &str) -> FvResult<()> {
        for &old in self.addressing.iter().flatten() {
            if old >= self.source_size {
                return Err(FvError::mapping_out_of_range(
                    patch,
                    old,
                    self.source_size,
                    MapSide::Source,
                ));
            }
        }
        Ok(())
    }

    /// 映射一组面数据，无来源的面由 `fill(new_index)` 填充
    pub fn map<V: Copy>(
        &self,
        patch: &str,
        old: &[V],
        fill: impl Fn(usize) -> V,
    ) -> FvResult<Vec<V>> {
        FvError::check_size("mapped face data", self.source_size, old.len())?;
        self.validate(patch)?;

        Ok(self
            .addressing
            .iter()
            .enumerate()
            .map(|(i, a)| match a {
                Some(src) => old[*src],
                None => fill(i),
            })
            .collect())
    }
}

/// 反向映射（rmap）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseMapper {
    /// `destinations[src] = Some(dst)`
    destinations: Vec<Option<usize>>,
}

impl ReverseMapper {
    /// 创建映射，按源面索引给出目标面
    pub fn new(destinations: Vec<Option<usize>>) -> Self {
        Self { destinations }
    }

    /// 由完整寻址表创建：源面 `i` 写入目标面 `addressing[i]`
    pub fn from_addressing(addressing: &[usize]) -> Self {
        Self::new(addressing.iter().copied().map(Some).collect())
    }

    /// 源边界面数
    pub fn source_size(&self) -> usize {
        self.destinations.len()
    }

    /// 目标索引表
    pub fn destinations(&self) -> &[Option<usize>] {
        &self.destinations
    }

    /// 校验目标索引
    pub fn validate(&self, patch: &str, destination_size: usize) -> FvResult<()> {
        for &dst in self.destinations.iter().flatten() {
            if dst >= destination_size {
                return Err(FvError::mapping_out_of_range(
                    patch,
                    dst,
                    destination_size,
                    MapSide::Destination,
                ));
            }
        }
        Ok(())
    }

    /// 将源数据复制到目标，未涉及的目标面保持不变
    pub fn apply<V: Copy>(&self, patch: &str, destination: &mut [V], source: &[V]) -> FvResult<()> {
        FvError::check_size("reverse-mapped source", self.destinations.len(), source.len())?;
        self.validate(patch, destination.len())?;

        for (src, dst) in self.destinations.iter().enumerate() {
            if let Some(dst) = dst {
                destination[*dst] = source[src];
            }
        }
        Ok(())
    }
}
