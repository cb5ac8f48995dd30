// crates/fvbc_boundary/src/comms.rs

//! 通信模式令牌
//!
//! `evaluate` 接收调用方指定的跨进程通信模式，原样传递给外部并行层。
//! 单进程运行不需要数据交换，但模式仍被记录，不会被升级或降级。

use serde::{Deserialize, Serialize};

/// 跨进程通信模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommsMode {
    /// 阻塞交换
    #[default]
    Blocking,
    /// 按预定调度顺序交换
    Scheduled,
    /// 非阻塞交换
    NonBlocking,
}

impl CommsMode {
    /// 模式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Scheduled => "scheduled",
            Self::NonBlocking => "nonBlocking",
        }
    }
}

impl std::fmt::Display for CommsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
