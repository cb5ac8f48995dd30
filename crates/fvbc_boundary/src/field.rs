// crates/fvbc_boundary/src/field.rs

//! 内部单元场
//!
//! 边界条件通过所属单元索引读取单元值和单元梯度。
//! 每个场实例拥有进程内唯一的标识，每次修改都会递增代际号，
//! 边界条件以（标识, 代际号）判断自身是否过期。

use std::sync::atomic::{AtomicU64, Ordering};

use fvbc_foundation::{FvError, FvResult};

use crate::value::FieldValue;

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

fn next_field_id() -> u64 {
    NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed)
}

/// 内部单元场（值 + 可选梯度）
#[derive(Debug)]
pub struct CellField<T: FieldValue> {
    id: u64,
    name: String,
    values: Vec<T>,
    /// 首次迭代前梯度可能尚未计算
    gradients: Option<Vec<T::Gradient>>,
    generation: u64,
}

impl<T: FieldValue> CellField<T> {
    /// 从单元值创建，梯度未知
    pub fn new(name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            id: next_field_id(),
            name: name.into(),
            values,
            gradients: None,
            generation: 0,
        }
    }

    /// 创建均匀场
    pub fn uniform(name: impl Into<String>, n_cells: usize, value: T) -> Self {
        Self::new(name, vec![value; n_cells])
    }

    /// 附带单元梯度
    pub fn with_gradients(mut self, gradients: Vec<T::Gradient>) -> FvResult<Self> {
        self.set_gradients(gradients)?;
        Ok(self)
    }

    /// 场名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 实例标识，克隆得到新标识
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 代际号
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 单元值
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// 单元梯度
    pub fn gradients(&self) -> Option<&[T::Gradient]> {
        self.gradients.as_deref()
    }

    /// 单元值
    #[inline]
    pub fn value(&self, cell: usize) -> T {
        self.values[cell]
    }

    /// 单元梯度
    #[inline]
    pub fn gradient(&self, cell: usize) -> Option<&T::Gradient> {
        self.gradients.as_ref().map(|g| &g[cell])
    }

    /// 替换全部单元值，已有梯度随之失效
    pub fn set_values(&mut self, values: Vec<T>) -> FvResult<()> {
        FvError::check_size("cell values", self.values.len(), values.len())?;
        self.values = values;
        self.gradients = None;
        self.generation += 1;
        Ok(())
    }

    /// 修改单元值
    pub fn values_mut(&mut self) -> &mut [T] {
        self.generation += 1;
        &mut self.values
    }

    /// 设置单元梯度
    pub fn set_gradients(&mut self, gradients: Vec<T::Gradient>) -> FvResult<()> {
        FvError::check_size("cell gradients", self.values.len(), gradients.len())?;
        self.gradients = Some(gradients);
        self.generation += 1;
        Ok(())
    }

    /// 清除单元梯度
    pub fn clear_gradients(&mut self) {
        if self.gradients.take().is_some() {
            self.generation += 1;
        }
    }
}

impl<T: FieldValue> Clone for CellField<T> {
    fn clone(&self) -> Self {
        Self {
            id: next_field_id(),
            name: self.name.clone(),
            values: self.values.clone(),
            gradients: self.gradients.clone(),
            generation: self.generation,
        }
    }
}
