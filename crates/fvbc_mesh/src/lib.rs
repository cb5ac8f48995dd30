// crates/fvbc_mesh/src/lib.rs

//! FVBC 网格几何层
//!
//! 边界条件所依赖的外部网格协作者，只提供只读几何查询：
//!
//! - [`patch`]: 边界面几何（法向、面积、正交距离、非正交修正向量）
//! - [`mesh`]: 以句柄寻址的边界几何集合
//! - [`time`]: 仿真时间
//! - [`builder`]: 平面边界生成器

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod mesh;
pub mod patch;
pub mod time;

pub use builder::{PatchBuilder, PlanePatchSpec};
pub use mesh::{MeshGeometry, PatchHandle, PatchTag};
pub use patch::{FaceGeometry, PatchFace, PatchGeometry};
pub use time::SimTime;
