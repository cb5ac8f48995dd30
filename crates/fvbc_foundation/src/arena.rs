// crates/fvbc_foundation/src/arena.rs

//! 带代际验证的泛型 Arena
//!
//! 网格几何由外部拥有，边界条件只持有轻量级句柄 [`Handle`]，
//! 通过 Arena 查询几何数据，避免生命周期纠缠和引用计数。
//!
//! # 设计目标
//!
//! - **O(1)复杂度**: 插入和删除均为常数时间
//! - **类型安全**: 通过标记类型防止不同 Arena 的句柄混用
//! - **悬垂检测**: 槽位复用时代际递增，旧句柄访问返回 `None`
//!
//! # 示例
//!
//! ```
//! use fvbc_foundation::arena::{Arena, ArenaTag};
//!
//! #[derive(Debug, Clone, Copy)]
//! struct PatchTag;
//! impl ArenaTag for PatchTag {}
//!
//! let mut arena: Arena<&str, PatchTag> = Arena::new();
//! let h = arena.insert("inlet");
//! assert_eq!(arena.get(h), Some(&"inlet"));
//!
//! arena.remove(h);
//! let h2 = arena.insert("outlet");
//! assert_eq!(h2.index(), h.index()); // 复用槽位
//! assert_eq!(arena.get(h), None);    // 旧句柄失效
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

// ============================================================================
// 标记类型
// ============================================================================

/// Arena 标记 trait，用于类型安全地区分不同用途的 Arena
pub trait ArenaTag: 'static + Copy + Send + Sync {}

// ============================================================================
// 句柄类型
// ============================================================================

/// 带代际号的类型安全句柄（8 字节）
///
/// - `index`: 槽位索引
/// - `generation`: 代际号 (1 起始，0 表示无效)
#[derive(Serialize, Deserialize)]
#[repr(C)]
pub struct Handle<Tag> {
    index: u32,
    generation: u32,
    #[serde(skip)]
    _marker: PhantomData<fn() -> Tag>,
}

// 手动实现 Copy 和 Clone，避免对 Tag 施加约束
impl<Tag> Copy for Handle<Tag> {}

impl<Tag> Clone for Handle<Tag> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag> Handle<Tag> {
    /// 无效句柄常量
    pub const INVALID: Self = Self {
        index: u32::MAX,
        generation: 0,
        _marker: PhantomData,
    };

    #[inline]
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// 槽位索引
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// 槽位索引（usize）
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.index as usize
    }

    /// 代际号
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// 是否为有效句柄（不检查 Arena 中的当前状态）
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.index != u32::MAX && self.generation != 0
    }
}

impl<Tag> Default for Handle<Tag> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<Tag> PartialEq for Handle<Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<Tag> Eq for Handle<Tag> {}

impl<Tag> Hash for Handle<Tag> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<Tag> fmt::Debug for Handle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle({}@{})", self.index, self.generation)
        } else {
            write!(f, "Handle(INVALID)")
        }
    }
}

impl<Tag> fmt::Display for Handle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.index, self.generation)
    }
}

// ============================================================================
// Slot 定义
// ============================================================================

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied { value: T, generation: u32 },
    Vacant { next_free: Option<u32>, generation: u32 },
}

impl<T> Slot<T> {
    fn generation(&self) -> u32 {
        match self {
            Self::Occupied { generation, .. } | Self::Vacant { generation, .. } => *generation,
        }
    }
}

// ============================================================================
// Arena 实现
// ============================================================================

/// 泛型内存池
///
/// 空闲槽位形成链表，删除后复用；复用时代际号递增，
/// 因此指向已删除元素的句柄不会误读到新元素。
#[derive(Debug, Clone)]
pub struct Arena<T, Tag: ArenaTag> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
    _marker: PhantomData<Tag>,
}

impl<T, Tag: ArenaTag> Default for Arena<T, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Tag: ArenaTag> Arena<T, Tag> {
    /// 创建空 Arena
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// 有效元素数量
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 插入元素并返回句柄
    pub fn insert(&mut self, value: T) -> Handle<Tag> {
        match self.free_head {
            Some(free_idx) => {
                let slot = &mut self.slots[free_idx as usize];
                let (next_free, generation) = match slot {
                    Slot::Vacant {
                        next_free,
                        generation,
                    } => (*next_free, next_generation(*generation)),
                    Slot::Occupied { .. } => {
                        unreachable!("Arena corruption: free_head points to occupied slot")
                    }
                };
                *slot = Slot::Occupied { value, generation };
                self.free_head = next_free;
                self.len += 1;
                Handle::new(free_idx, generation)
            }
            None => {
                let idx = self.slots.len() as u32;
                self.slots.push(Slot::Occupied {
                    value,
                    generation: 1,
                });
                self.len += 1;
                Handle::new(idx, 1)
            }
        }
    }

    /// 获取元素引用（代际不匹配返回 `None`）
    #[inline]
    pub fn get(&self, handle: Handle<Tag>) -> Option<&T> {
        match self.slots.get(handle.as_usize())? {
            Slot::Occupied { value, generation } if *generation == handle.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// 获取元素可变引用
    #[inline]
    pub fn get_mut(&mut self, handle: Handle<Tag>) -> Option<&mut T> {
        match self.slots.get_mut(handle.as_usize())? {
            Slot::Occupied { value, generation } if *generation == handle.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// 句柄是否仍然有效
    #[inline]
    pub fn contains(&self, handle: Handle<Tag>) -> bool {
        self.get(handle).is_some()
    }

    /// 删除元素并返回其值
    pub fn remove(&mut self, handle: Handle<Tag>) -> Option<T> {
        let idx = handle.as_usize();
        if !self.contains(handle) {
            return None;
        }

        let generation = self.slots[idx].generation();
        let old = std::mem::replace(
            &mut self.slots[idx],
            Slot::Vacant {
                next_free: self.free_head,
                generation,
            },
        );
        self.free_head = Some(handle.index);
        self.len -= 1;

        match old {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// 遍历所有有效元素及其句柄
    pub fn iter(&self) -> impl Iterator<Item = (Handle<Tag>, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Occupied { value, generation } => {
                    Some((Handle::new(i as u32, *generation), value))
                }
                Slot::Vacant { .. } => None,
            })
    }

    /// 清空 Arena
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

#[inline]
fn next_generation(generation: u32) -> u32 {
    let next = generation.wrapping_add(1);
    if next == 0 {
        1
    } else {
        next
    }
}

// ============================================================================
// 测试
// ============================================================================
