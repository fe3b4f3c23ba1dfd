//! 信任矩阵
//!
//! 每个实体五个独立维度，从历史计数器经 Beta 后验均值推出；
//! 无历史时落在中性先验 Beta(5,5) 的 0.5。整体信任是固定权重和：
//! 胜任 0.25 / 善意 0.25 / 正直 0.20 / 可预期 0.15 / 透明 0.15。
//! 记录只增不删，衰减由调用方在两次使用之间施加。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 中性先验 Beta(5,5)
const PRIOR_ALPHA: f64 = 5.0;
const PRIOR_BETA: f64 = 5.0;

/// Beta(prior+hits, prior+misses) 后验均值
fn posterior_mean(hits: f64, misses: f64) -> f64 {
    (PRIOR_ALPHA + hits) / (PRIOR_ALPHA + PRIOR_BETA + hits + misses)
}

/// 实体历史计数器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityHistory {
    /// 成功次数
    pub successes: u32,
    /// 失败次数
    pub failures: u32,
    /// 正向指标
    pub positive_indicators: u32,
    /// 负向指标
    pub negative_indicators: u32,
    /// 行为一致性读数 [0,1]
    pub consistency: f64,
    /// 透明度读数 [0,1]
    pub transparency: f64,
}

impl EntityHistory {
    /// 按衰减率缩减历史计数 (调用方在两次使用之间施加)
    pub fn decay(&mut self, rate: f64) {
        let rate = rate.clamp(0.0, 1.0);
        let keep = 1.0 - rate;
        self.successes = (self.successes as f64 * keep).round() as u32;
        self.failures = (self.failures as f64 * keep).round() as u32;
        self.positive_indicators = (self.positive_indicators as f64 * keep).round() as u32;
        self.negative_indicators = (self.negative_indicators as f64 * keep).round() as u32;
    }
}

/// 五维信任估计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustDimensions {
    pub competence: f64,
    pub benevolence: f64,
    pub integrity: f64,
    pub predictability: f64,
    pub transparency: f64,
}

impl TrustDimensions {
    /// 从历史计数器推导；全部维度都有后验或读数来源
    pub fn from_history(history: &EntityHistory) -> Self {
        let competence = posterior_mean(history.successes as f64, history.failures as f64);
        let benevolence = posterior_mean(
            history.positive_indicators as f64,
            history.negative_indicators as f64,
        );
        let consistency = history.consistency.clamp(0.0, 1.0);
        Self {
            competence,
            benevolence,
            integrity: benevolence * 0.5 + consistency * 0.5,
            predictability: consistency,
            transparency: history.transparency.clamp(0.0, 1.0),
        }
    }

    /// 无历史实体的中性估计
    pub fn neutral() -> Self {
        Self {
            competence: 0.5,
            benevolence: 0.5,
            integrity: 0.5,
            predictability: 0.5,
            transparency: 0.5,
        }
    }
}

/// 维度权重与衰减配置
#[derive(Debug, Clone)]
pub struct TrustWeights {
    pub competence: f64,
    pub benevolence: f64,
    pub integrity: f64,
    pub predictability: f64,
    pub transparency: f64,
    /// 调用方建议的衰减率
    pub decay_rate: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            competence: 0.25,
            benevolence: 0.25,
            integrity: 0.20,
            predictability: 0.15,
            transparency: 0.15,
            decay_rate: 0.05,
        }
    }
}

/// 信任矩阵：实体历史 + 固定权重聚合
#[derive(Debug, Clone, Default)]
pub struct TrustMatrix {
    histories: HashMap<String, EntityHistory>,
    weights: TrustWeights,
}

impl TrustMatrix {
    pub fn new(weights: TrustWeights) -> Self {
        Self {
            histories: HashMap::new(),
            weights,
        }
    }

    /// 记录或更新一个实体的历史
    pub fn record(&mut self, entity: impl Into<String>, history: EntityHistory) {
        self.histories.insert(entity.into(), history);
    }

    /// 指定实体的五维估计，无历史时中性
    pub fn dimensions(&self, entity: &str) -> TrustDimensions {
        self.histories
            .get(entity)
            .map(TrustDimensions::from_history)
            .unwrap_or_else(TrustDimensions::neutral)
    }

    /// 固定权重整体信任
    pub fn overall_trust(&self, entity: &str) -> f64 {
        let d = self.dimensions(entity);
        let w = &self.weights;
        d.competence * w.competence
            + d.benevolence * w.benevolence
            + d.integrity * w.integrity
            + d.predictability * w.predictability
            + d.transparency * w.transparency
    }

    /// 一组实体的平均整体信任；空集回中性 0.5
    pub fn mean_trust(&self, entities: &[String]) -> f64 {
        if entities.is_empty() {
            return 0.5;
        }
        entities
            .iter()
            .map(|e| self.overall_trust(e))
            .sum::<f64>()
            / entities.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reliable_history() -> EntityHistory {
        EntityHistory {
            successes: 9,
            failures: 1,
            positive_indicators: 6,
            negative_indicators: 1,
            consistency: 0.8,
            transparency: 0.9,
        }
    }

    fn shaky_history() -> EntityHistory {
        EntityHistory {
            successes: 3,
            failures: 4,
            positive_indicators: 1,
            negative_indicators: 3,
            consistency: 0.3,
            transparency: 0.3,
        }
    }

    #[test]
    fn test_unknown_entity_is_neutral() {
        let matrix = TrustMatrix::default();
        assert!((matrix.overall_trust("stranger") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_track_record_orders_trust() {
        let mut matrix = TrustMatrix::default();
        matrix.record("mentor", reliable_history());
        matrix.record("flake", shaky_history());
        let mentor = matrix.overall_trust("mentor");
        let flake = matrix.overall_trust("flake");
        assert!(mentor > 0.6);
        assert!(flake < 0.5);
        assert!(mentor > flake);
    }

    #[test]
    fn test_posterior_mean_matches_neutral_prior() {
        // 9 成功 / 1 失败：Beta(14,6) 均值 0.7
        let d = TrustDimensions::from_history(&reliable_history());
        assert!((d.competence - 0.7).abs() < 1e-9);
        // 无数据回到先验均值
        let empty = TrustDimensions::from_history(&EntityHistory::default());
        assert!((empty.competence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_entity_list_is_neutral() {
        let matrix = TrustMatrix::default();
        assert!((matrix.mean_trust(&[]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_decay_shrinks_counters() {
        let mut history = reliable_history();
        history.decay(0.5);
        assert!(history.successes <= 5);
        assert!(history.failures <= 1);
    }
}
