// crates/fvbc_mesh/src/time.rs

//! 仿真时间
//!
//! 边界条件只查询当前时间，从不推进它。时间索引每步递增，
//! 作为边界条件过期判断的一部分。

use serde::{Deserialize, Serialize};

/// 仿真时间
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimTime {
    value: f64,
    index: u64,
}

impl SimTime {
    /// 从给定起始时间创建
    pub fn new(start: f64) -> Self {
        Self {
            value: start,
            index: 0,
        }
    }

    /// 当前时间 [s]
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 时间步索引
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// 推进一个时间步
    pub fn advance(&mut self, dt: f64) {
        self.value += dt;
        self.index += 1;
    }
}
