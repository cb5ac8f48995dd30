// crates/fvbc_boundary/src/state.rs

//! 边界场持久化状态
//!
//! 写出全部配置开关与当前面值；修正梯度类还写出给定梯度。
//! 面法向梯度是派生量，从不持久化，恢复后按需重新计算。

use serde::{Deserialize, Serialize};

use crate::config::{BoundaryConfig, TableConfig, TaylorGreenConfig};
use crate::corrector::CorrectorSettings;

/// 边界场持久化状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchFieldState<T> {
    /// 运行时类型名
    #[serde(rename = "type")]
    pub type_name: String,
    /// 边界名称
    pub patch: String,
    /// 非正交修正开关
    pub non_orthogonal_corrections: bool,
    /// 二阶修正开关
    pub second_order: bool,
    /// 面值策略（仅修正梯度类）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extrapolate_value: Option<bool>,
    /// Taylor-Green 参数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taylor_green: Option<TaylorGreenConfig>,
    /// 表格时间序列
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableConfig<T>>,
    /// 面值
    pub value: Vec<T>,
    /// 给定法向梯度（仅修正梯度类）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<T>>,
}

impl<T> PatchFieldState<T> {
    /// 创建状态，面值为空
    pub fn new(type_name: &str, patch: &str, settings: CorrectorSettings) -> Self {
        Self {
            type_name: type_name.to_owned(),
            patch: patch.to_owned(),
            non_orthogonal_corrections: settings.non_orthogonal_corrections,
            second_order: settings.second_order,
            extrapolate_value: None,
            taylor_green: None,
            table: None,
            value: Vec::new(),
            gradient: None,
        }
    }

    /// 设置面值
    pub fn with_value(mut self, value: Vec<T>) -> Self {
        self.value = value;
        self
    }

    /// 设置给定梯度
    pub fn with_gradient(mut self, gradient: Vec<T>) -> Self {
        self.gradient = Some(gradient);
        self
    }

    /// 设置面值策略
    pub fn with_extrapolate_value(mut self, extrapolate: bool) -> Self {
        self.extrapolate_value = Some(extrapolate);
        self
    }

    /// 设置 Taylor-Green 参数
    pub fn with_taylor_green(mut self, config: TaylorGreenConfig) -> Self {
        self.taylor_green = Some(config);
        self
    }

    /// 设置表格时间序列
    pub fn with_table(mut self, table: TableConfig<T>) -> Self {
        self.table = Some(table);
        self
    }

    /// 修正开关
    pub fn corrector_settings(&self) -> CorrectorSettings {
        CorrectorSettings {
            non_orthogonal_corrections: self.non_orthogonal_corrections,
            second_order: self.second_order,
        }
    }
}

impl<T: Clone> PatchFieldState<T> {
    /// 对应的构造配置（不含逐面数据）
    pub fn to_config(&self) -> BoundaryConfig<T> {
        let mut config = BoundaryConfig::new(self.type_name.clone())
            .with_corrections(self.non_orthogonal_corrections, self.second_order);
        if let Some(extrapolate) = self.extrapolate_value {
            config = config.with_extrapolate_value(extrapolate);
        }
        config.taylor_green = self.taylor_green;
        config.table = self.table.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layout() {
        let state = PatchFieldState::new(
            "fixedGradientCorrected",
            "outlet",
            CorrectorSettings::default(),
        )
        .with_extrapolate_value(false)
        .with_value(vec![1.0, 2.0])
        .with_gradient(vec![0.0, 0.5]);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["type"], "fixedGradientCorrected");
        assert_eq!(json["nonOrthogonalCorrections"], true);
        assert_eq!(json["secondOrder"], false);
        assert_eq!(json["extrapolateValue"], false);
        assert!(json.get("taylorGreen").is_none());

        let back: PatchFieldState<f64> = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_to_config_keeps_flags() {
        let state = PatchFieldState::<f64>::new(
            "fixedGradientCorrected",
            "outlet",
            CorrectorSettings {
                non_orthogonal_corrections: false,
                second_order: true,
            },
        )
        .with_extrapolate_value(false);

        let cfg = state.to_config();
        assert!(!cfg.non_orthogonal_corrections);
        assert!(cfg.second_order);
        assert!(!cfg.extrapolate_value);
        assert_eq!(cfg.corrector_settings(), state.corrector_settings());
    }
}
