// crates/fvbc_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `FvError` 枚举和 `FvResult` 类型别名，覆盖边界条件计算中的三类错误：
//!
//! 1. **配置错误**: 构造时缺失或非法的常数（如负粘度），立即失败，不会部分构造
//! 2. **几何不一致**: 网格提供的几何数据非法（零长度法向、零正交距离），致命错误
//! 3. **映射越界**: 映射描述符引用了当前或源边界面范围之外的索引
//!
//! 所有与边界相关的错误都携带边界名称（以及面索引），便于定位问题。
//!
//! # 示例
//!
//! ```
//! use fvbc_foundation::error::{FvError, FvResult};
//!
//! fn read_viscosity(nu: f64) -> FvResult<f64> {
//!     if nu < 0.0 {
//!         return Err(FvError::invalid_config("inlet", "kinematicViscosity", nu, "必须非负"));
//!     }
//!     Ok(nu)
//! }
//!
//! assert!(read_viscosity(-1.0).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type FvResult<T> = Result<T, FvError>;

/// 映射操作中越界索引所在的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSide {
    /// 源边界（映射前的面）
    Source,
    /// 目标边界（映射后的面）
    Destination,
}

impl std::fmt::Display for MapSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "源"),
            Self::Destination => write!(f, "目标"),
        }
    }
}

/// 边界条件错误类型
#[derive(Error, Debug)]
pub enum FvError {
    // ========================================================================
    // 配置错误
    // ========================================================================
    /// 通用配置错误
    #[error("边界 '{patch}' 配置错误: {message}")]
    Config {
        /// 边界名称
        patch: String,
        /// 具体错误信息
        message: String,
    },

    /// 缺少必需的配置项
    #[error("边界 '{patch}' 缺少必需的配置项: {key}")]
    MissingConfig {
        /// 边界名称
        patch: String,
        /// 配置键名
        key: String,
    },

    /// 配置值无效
    #[error("边界 '{patch}' 配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 边界名称
        patch: String,
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 未注册的边界条件类型
    #[error("边界 '{patch}' 使用了未知的边界类型 '{type_name}' (已注册: {known:?})")]
    UnknownBoundaryType {
        /// 边界名称
        patch: String,
        /// 请求的类型名
        type_name: String,
        /// 已注册的类型名
        known: Vec<String>,
    },

    // ========================================================================
    // 几何错误
    // ========================================================================
    /// 网格几何不一致
    #[error("边界 '{patch}' 第 {face} 个面几何非法: {message}")]
    Geometry {
        /// 边界名称
        patch: String,
        /// 面的局部索引
        face: usize,
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 映射与尺寸错误
    // ========================================================================
    /// 映射描述符中的索引越界
    #[error("边界 '{patch}' 映射越界: {side}索引 {index} 超出范围 0..{len}")]
    MappingOutOfRange {
        /// 边界名称
        patch: String,
        /// 越界的索引
        index: usize,
        /// 对应一侧的面数
        len: usize,
        /// 越界发生在源还是目标
        side: MapSide,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    // ========================================================================
    // 其他
    // ========================================================================
    /// 句柄已失效（元素被删除或槽位被复用）
    #[error("句柄已失效: {resource}")]
    StaleHandle {
        /// 资源描述
        resource: String,
    },

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 失败原因
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl FvError {
    /// 通用配置错误
    pub fn config(patch: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            patch: patch.into(),
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(patch: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingConfig {
            patch: patch.into(),
            key: key.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        patch: impl Into<String>,
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            patch: patch.into(),
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// 未知边界类型
    pub fn unknown_boundary_type(
        patch: impl Into<String>,
        type_name: impl Into<String>,
        known: Vec<String>,
    ) -> Self {
        Self::UnknownBoundaryType {
            patch: patch.into(),
            type_name: type_name.into(),
            known,
        }
    }

    /// 几何错误
    pub fn geometry(patch: impl Into<String>, face: usize, message: impl Into<String>) -> Self {
        Self::Geometry {
            patch: patch.into(),
            face,
            message: message.into(),
        }
    }

    /// 映射越界
    pub fn mapping_out_of_range(
        patch: impl Into<String>,
        index: usize,
        len: usize,
        side: MapSide,
    ) -> Self {
        Self::MappingOutOfRange {
            patch: patch.into(),
            index,
            len,
            side,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 句柄失效
    pub fn stale_handle(resource: impl Into<String>) -> Self {
        Self::StaleHandle {
            resource: resource.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 是否为配置类错误
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::MissingConfig { .. }
                | Self::InvalidConfig { .. }
                | Self::UnknownBoundaryType { .. }
        )
    }

    /// 是否为映射类错误
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::MappingOutOfRange { .. })
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl FvError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> FvResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> FvResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

/// 条件不满足时返回错误
///
/// ```
/// use fvbc_foundation::{ensure, error::{FvError, FvResult}};
///
/// fn positive(x: f64) -> FvResult<()> {
///     ensure!(x > 0.0, FvError::config("wall", "必须为正"));
///     Ok(())
/// }
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// 解包 `Option`，为 `None` 时返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
