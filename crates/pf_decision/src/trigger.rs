//! 坍缩触发条件
//!
//! 六个独立条件各带阈值与紧迫乘子；越过阈值的条件按
//! `(值 − 阈值) × 乘子` 累积坍缩概率，单项贡献最大者为主触发。
//! 评估是纯函数：对任一单项输入单调不减。
//!
//! 阈值/乘子是沿用的缺省常量，未经领域验证，按配置项暴露。

use serde::{Deserialize, Serialize};

/// 触发条件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    TimePressure,
    ConfidenceThreshold,
    ExternalPressure,
    ResourceDepletion,
    OpportunityWindow,
    CognitiveLoad,
    ComplexityOverload,
}

/// 单条件阈值与紧迫乘子
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TriggerSetting {
    pub threshold: f64,
    pub multiplier: f64,
}

/// 坍缩评估配置
#[derive(Debug, Clone)]
pub struct CollapseConfig {
    pub time_pressure: TriggerSetting,
    pub confidence: TriggerSetting,
    pub external_pressure: TriggerSetting,
    pub resource_depletion: TriggerSetting,
    pub opportunity_window: TriggerSetting,
    pub cognitive_load: TriggerSetting,
    /// 叠加态选项数上限
    pub max_options: usize,
    /// 复杂度过载判定 (选项数 / 上限)
    pub complexity_threshold: f64,
    /// 复杂度过载的固定加项
    pub complexity_bonus: f64,
    /// 坍缩阈值
    pub collapse_threshold: f64,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            time_pressure: TriggerSetting {
                threshold: 0.7,
                multiplier: 2.0,
            },
            confidence: TriggerSetting {
                threshold: 0.85,
                multiplier: 1.5,
            },
            external_pressure: TriggerSetting {
                threshold: 0.6,
                multiplier: 1.2,
            },
            resource_depletion: TriggerSetting {
                threshold: 0.3,
                multiplier: 1.8,
            },
            opportunity_window: TriggerSetting {
                threshold: 0.75,
                multiplier: 1.6,
            },
            cognitive_load: TriggerSetting {
                threshold: 0.8,
                multiplier: 1.4,
            },
            max_options: 7,
            complexity_threshold: 0.8,
            complexity_bonus: 0.3,
            collapse_threshold: 0.5,
        }
    }
}

/// 六个条件的当前读数
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TriggerValues {
    pub time_pressure: f64,
    pub confidence: f64,
    pub external_pressure: f64,
    pub resource_depletion: f64,
    pub opportunity_window: f64,
    pub cognitive_load: f64,
}

/// 坍缩评估结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapseAssessment {
    /// 累积坍缩概率 [0,1]
    pub probability: f64,
    /// 主触发 (单项贡献最大者)
    pub primary_trigger: Option<TriggerKind>,
    /// 各条件贡献
    pub contributions: Vec<(TriggerKind, f64)>,
}

impl CollapseAssessment {
    /// 是否应当坍缩
    pub fn should_collapse(&self, config: &CollapseConfig) -> bool {
        self.probability > config.collapse_threshold
    }
}

/// 评估坍缩压力 (纯函数，对任一单项输入单调不减)
pub fn assess_collapse(
    values: &TriggerValues,
    option_count: usize,
    config: &CollapseConfig,
) -> CollapseAssessment {
    let checks = [
        (TriggerKind::TimePressure, values.time_pressure, config.time_pressure),
        (TriggerKind::ConfidenceThreshold, values.confidence, config.confidence),
        (
            TriggerKind::ExternalPressure,
            values.external_pressure,
            config.external_pressure,
        ),
        (
            TriggerKind::ResourceDepletion,
            values.resource_depletion,
            config.resource_depletion,
        ),
        (
            TriggerKind::OpportunityWindow,
            values.opportunity_window,
            config.opportunity_window,
        ),
        (TriggerKind::CognitiveLoad, values.cognitive_load, config.cognitive_load),
    ];

    let mut probability = 0.0;
    let mut contributions = Vec::new();
    let mut primary: Option<(TriggerKind, f64)> = None;

    for (kind, value, setting) in checks {
        let value = if value.is_finite() { value } else { 0.5 };
        if value > setting.threshold {
            let contribution = (value - setting.threshold) * setting.multiplier;
            probability += contribution;
            contributions.push((kind, contribution));
            if primary.map_or(true, |(_, best)| contribution > best) {
                primary = Some((kind, contribution));
            }
        }
    }

    // 选项数越过复杂度线：固定加项，主触发没有时记为复杂度过载
    let complexity = option_count as f64 / config.max_options.max(1) as f64;
    if complexity > config.complexity_threshold {
        probability += config.complexity_bonus;
        contributions.push((TriggerKind::ComplexityOverload, config.complexity_bonus));
        if primary.is_none() {
            primary = Some((TriggerKind::ComplexityOverload, config.complexity_bonus));
        }
    }

    CollapseAssessment {
        probability: probability.clamp(0.0, 1.0),
        primary_trigger: primary.map(|(kind, _)| kind),
        contributions,
    }
}
