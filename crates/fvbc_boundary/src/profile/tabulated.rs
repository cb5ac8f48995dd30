// crates/fvbc_boundary/src/profile/tabulated.rs

//! 表格时间序列
//!
//! 在整个边界上均匀施加随时间变化的值，时间点之间线性插值，
//! 超出数据范围时按 [`ExtrapolationMode`] 处理。
//!
//! ```
//! use fvbc_boundary::profile::{ExtrapolationMode, TabulatedProfile};
//!
//! let table = TabulatedProfile::new("inlet", vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.5])
//!     .unwrap()
//!     .with_extrapolation(ExtrapolationMode::Cyclic);
//!
//! assert!((table.value_at(0.5) - 0.5).abs() < 1e-12);
//! assert!((table.value_at(3.0) - 1.0).abs() < 1e-12); // 3.0 → 1.0
//! ```

use fvbc_foundation::{FvError, FvResult};
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// 外推模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationMode {
    /// 超出范围时返回端点值
    #[default]
    Clamp,
    /// 使用首/末两点的斜率线性延伸
    Linear,
    /// `t → t_start + (t − t_start) mod (t_end − t_start)`
    Cyclic,
}

impl ExtrapolationMode {
    /// 模式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clamp => "Clamp",
            Self::Linear => "Linear",
            Self::Cyclic => "Cyclic",
        }
    }
}

/// 表格时间序列（时间严格递增，非空）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedProfile<T> {
    times: Vec<f64>,
    values: Vec<T>,
    extrapolation: ExtrapolationMode,
}

impl<T: FieldValue> TabulatedProfile<T> {
    /// 创建并校验时间表，`patch` 仅用于错误信息
    pub fn new(patch: &str, times: Vec<f64>, values: Vec<T>) -> FvResult<Self> {
        if times.is_empty() {
            return Err(FvError::missing_config(patch, "table.times"));
        }
        if times.len() != values.len() {
            return Err(FvError::invalid_config(
                patch,
                "table.values",
                values.len(),
                format!("长度必须与 times 相同 ({})", times.len()),
            ));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(FvError::invalid_config(patch, "table.times", t, "必须有限"));
        }
        for i in 1..times.len() {
            if times[i] <= times[i - 1] {
                return Err(FvError::invalid_config(
                    patch,
                    "table.times",
                    format!("times[{}]={} <= times[{}]={}", i, times[i], i - 1, times[i - 1]),
                    "必须严格递增",
                ));
            }
        }

        Ok(Self {
            times,
            values,
            extrapolation: ExtrapolationMode::Clamp,
        })
    }

    /// 设置外推模式
    pub fn with_extrapolation(mut self, mode: ExtrapolationMode) -> Self {
        self.extrapolation = mode;
        self
    }

    /// 外推模式
    pub fn extrapolation(&self) -> ExtrapolationMode {
        self.extrapolation
    }

    /// 时间点
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// 数值
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 时间范围
    pub fn time_range(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// 时刻 `t` 的值
    pub fn value_at(&self, t: f64) -> T {
        let (t_start, t_end) = self.time_range();
        if t < t_start || t > t_end {
            return self.extrapolate(t, t_start, t_end);
        }
        self.interpolate(t)
    }

    fn extrapolate(&self, t: f64, t_start: f64, t_end: f64) -> T {
        let n = self.values.len();
        match self.extrapolation {
            ExtrapolationMode::Clamp => {
                if t < t_start {
                    self.values[0]
                } else {
                    self.values[n - 1]
                }
            }
            ExtrapolationMode::Cyclic => {
                let period = t_end - t_start;
                if period <= 0.0 {
                    return self.values[0];
                }
                self.interpolate(t_start + (t - t_start).rem_euclid(period))
            }
            ExtrapolationMode::Linear => {
                if n < 2 {
                    return self.values[0];
                }
                if t < t_start {
                    let slope = (self.values[1] - self.values[0]) / (self.times[1] - t_start);
                    self.values[0] + slope * (t - t_start)
                } else {
                    let slope =
                        (self.values[n - 1] - self.values[n - 2]) / (t_end - self.times[n - 2]);
                    self.values[n - 1] + slope * (t - t_end)
                }
            }
        }
    }

    /// 区间内线性插值（假设 t 在范围内）
    fn interpolate(&self, t: f64) -> T {
        let n = self.times.len();
        // 第一个大于 t 的时间点
        let upper = self.times.partition_point(|&ti| ti <= t);
        if upper == 0 {
            return self.values[0];
        }
        if upper >= n {
            return self.values[n - 1];
        }

        let (t0, t1) = (self.times[upper - 1], self.times[upper]);
        let (v0, v1) = (self.values[upper - 1], self.values[upper]);
        v0 + (v1 - v0) * ((t - t0) / (t1 - t0))
    }
}
