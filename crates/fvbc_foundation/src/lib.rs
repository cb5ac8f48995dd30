// crates/fvbc_foundation/src/lib.rs

//! FVBC Foundation Layer
//!
//! 基础层，提供整个项目共用的抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型（配置 / 几何 / 映射）
//! - [`arena`]: 带代际验证的泛型 Arena 与句柄
//! - [`tolerance`]: 几何容差
//!
//! # 示例
//!
//! ```
//! use fvbc_foundation::prelude::*;
//!
//! fn check_distance(d: f64) -> FvResult<()> {
//!     ensure!(d > 0.0, FvError::geometry("wall", 0, "正交距离非正"));
//!     Ok(())
//! }
//! assert!(check_distance(0.0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod error;
pub mod tolerance;

pub use arena::{Arena, ArenaTag, Handle};
pub use error::{FvError, FvResult, MapSide};
pub use tolerance::GeometryTolerance;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::arena::{Arena, ArenaTag, Handle};
    pub use crate::error::{FvError, FvResult, MapSide};
    pub use crate::tolerance::GeometryTolerance;
    pub use crate::{ensure, require};
}
