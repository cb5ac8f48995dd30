// crates/fvbc_boundary/src/lib.rs

//! FVBC 边界条件层
//!
//! 非正交网格上的边界条件：给定解析或表格边界值，结合网格几何与内部场，
//! 给出经过非正交修正的面法向梯度；或者给定法向梯度，推导与之一致的面值。
//!
//! # 模块概览
//!
//! - [`corrector`]: 非正交修正算法（两类边界共用）
//! - [`patch_field`]: 边界条件及其操作集合
//! - [`profile`]: 时变边界剖面（Taylor-Green 涡、表格时间序列）
//! - [`mapper`]: 拓扑映射描述符
//! - [`registry`]: 类型名到构造函数的注册表
//! - [`config`] / [`state`]: 配置与持久化状态
//!
//! # 示例
//!
//! ```
//! use fvbc_boundary::prelude::*;
//! use fvbc_mesh::{MeshGeometry, PatchFace, SimTime};
//! use glam::DVec3;
//!
//! let faces: Vec<PatchFace> = (0..4)
//!     .map(|i| PatchFace {
//!         centre: DVec3::new(i as f64, 0.0, 1.0),
//!         area: DVec3::Z,
//!         owner: i,
//!         owner_centre: DVec3::new(i as f64, 0.0, 0.9),
//!     })
//!     .collect();
//! let mut mesh = MeshGeometry::new();
//! let patch = mesh.add_patch("outlet", &faces).unwrap();
//!
//! let config = BoundaryConfig::new("fixedGradientCorrected")
//!     .with_gradient(0.0)
//!     .with_extrapolate_value(false);
//! let mut bc = BoundaryRegistry::scalar()
//!     .build(&BuildContext::new(&mesh, patch), &config)
//!     .unwrap();
//!
//! let field = CellField::new("T", vec![1.0, 2.0, 3.0, 4.0]);
//! let time = SimTime::new(0.0);
//! bc.update_coeffs(&EvalContext::new(&mesh, &time, &field)).unwrap();
//! assert_eq!(bc.value(), &[1.0, 2.0, 3.0, 4.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod comms;
pub mod config;
pub mod corrector;
pub mod field;
pub mod mapper;
pub mod patch_field;
pub mod profile;
pub mod registry;
pub mod state;
pub mod value;

pub use comms::CommsMode;
pub use config::{BoundaryConfig, TableConfig, TaylorGreenConfig};
pub use corrector::{corrected_sn_grad, CorrectorSettings, NonOrthogonalCorrector, SnGradParts};
pub use field::CellField;
pub use mapper::{FaceMapper, ReverseMapper};
pub use patch_field::{
    AnalyticVelocityBoundary, BuildContext, CorrectedGradientBoundary, EvalContext,
    FixedValueBoundary, PatchFieldOps, ScalarPatchField, UpdateStamp, VectorPatchField,
};
pub use profile::{ExtrapolationMode, TabulatedProfile, TaylorGreenVortex, VelocityProfile};
pub use registry::BoundaryRegistry;
pub use state::PatchFieldState;
pub use value::FieldValue;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::comms::CommsMode;
    pub use crate::config::{BoundaryConfig, TaylorGreenConfig};
    pub use crate::corrector::{CorrectorSettings, NonOrthogonalCorrector};
    pub use crate::field::CellField;
    pub use crate::mapper::{FaceMapper, ReverseMapper};
    pub use crate::patch_field::{
        BuildContext, EvalContext, PatchFieldOps, ScalarPatchField, VectorPatchField,
    };
    pub use crate::registry::BoundaryRegistry;
    pub use crate::value::FieldValue;
}
