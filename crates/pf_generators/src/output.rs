//! 生成器输出模型
//!
//! 每种生成器产出带标签的结构化数据 (和的类型，穷尽匹配)，
//! 噪声副本由核心输出按噪声水平扰动得到。

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};

use crate::descriptor::GeneratorKind;

/// 扰动阈值：组合噪声低于该值时直接跳过扰动
pub const NOISE_FLOOR: f64 = 0.1;

/// 按种类分型的核心输出
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorOutputKind {
    Reality {
        /// 处境评估
        situation_assessment: f64,
        /// 现实锚定度
        grounding: f64,
        summary: String,
    },
    Memory {
        /// 回忆强度
        recall_strength: f64,
        /// 关联度
        relevance: f64,
        summary: String,
    },
    Prediction {
        /// 预测视界置信
        horizon_confidence: f64,
        /// 分支因子
        branching_factor: f64,
        summary: String,
    },
    Pattern {
        /// 规律度
        regularity: f64,
        /// 新颖度
        novelty: f64,
        summary: String,
    },
    Creative {
        /// 发散度
        divergence: f64,
        /// 流畅度
        fluency: f64,
        summary: String,
    },
}

impl GeneratorOutputKind {
    /// 对应的生成器种类
    pub fn kind(&self) -> GeneratorKind {
        match self {
            GeneratorOutputKind::Reality { .. } => GeneratorKind::Reality,
            GeneratorOutputKind::Memory { .. } => GeneratorKind::Memory,
            GeneratorOutputKind::Prediction { .. } => GeneratorKind::Prediction,
            GeneratorOutputKind::Pattern { .. } => GeneratorKind::Pattern,
            GeneratorOutputKind::Creative { .. } => GeneratorKind::Creative,
        }
    }

    /// 主评分，干涉引擎与聚合层只消费这一标量
    pub fn primary_score(&self) -> f64 {
        match self {
            GeneratorOutputKind::Reality {
                situation_assessment,
                ..
            } => *situation_assessment,
            GeneratorOutputKind::Memory { recall_strength, .. } => *recall_strength,
            GeneratorOutputKind::Prediction {
                horizon_confidence, ..
            } => *horizon_confidence,
            GeneratorOutputKind::Pattern { regularity, .. } => *regularity,
            GeneratorOutputKind::Creative { divergence, .. } => *divergence,
        }
    }

    /// 生成噪声副本：每个数值字段叠加 N(0, noise·0.1) 扰动后收敛回 [0,1]。
    /// 组合噪声低于 `NOISE_FLOOR` 时为无操作快路径，返回等值副本。
    pub fn perturbed(&self, noise: f64, sampler: &mut dyn Sampler) -> Self {
        if noise < NOISE_FLOOR {
            return self.clone();
        }
        let mut jitter = |v: f64| (v + sampler.gaussian(0.0, noise * 0.1)).clamp(0.0, 1.0);
        match self.clone() {
            GeneratorOutputKind::Reality {
                situation_assessment,
                grounding,
                summary,
            } => GeneratorOutputKind::Reality {
                situation_assessment: jitter(situation_assessment),
                grounding: jitter(grounding),
                summary,
            },
            GeneratorOutputKind::Memory {
                recall_strength,
                relevance,
                summary,
            } => GeneratorOutputKind::Memory {
                recall_strength: jitter(recall_strength),
                relevance: jitter(relevance),
                summary,
            },
            GeneratorOutputKind::Prediction {
                horizon_confidence,
                branching_factor,
                summary,
            } => GeneratorOutputKind::Prediction {
                horizon_confidence: jitter(horizon_confidence),
                branching_factor: jitter(branching_factor),
                summary,
            },
            GeneratorOutputKind::Pattern {
                regularity,
                novelty,
                summary,
            } => GeneratorOutputKind::Pattern {
                regularity: jitter(regularity),
                novelty: jitter(novelty),
                summary,
            },
            GeneratorOutputKind::Creative {
                divergence,
                fluency,
                summary,
            } => GeneratorOutputKind::Creative {
                divergence: jitter(divergence),
                fluency: jitter(fluency),
                summary,
            },
        }
    }
}

/// 串扰相互强化标志
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrossTalkFlags {
    /// 被现实生成器锚定
    pub reality_anchored: bool,
    /// 被记忆生成器补充
    pub memory_informed: bool,
    /// 被预测生成器引导
    pub prediction_guided: bool,
    /// 被模式生成器强化
    pub pattern_reinforced: bool,
    /// 被创造生成器增强
    pub creative_enhanced: bool,
}

impl CrossTalkFlags {
    /// 标记被 `other` 种类强化
    pub fn mark(&mut self, other: GeneratorKind) {
        match other {
            GeneratorKind::Reality => self.reality_anchored = true,
            GeneratorKind::Memory => self.memory_informed = true,
            GeneratorKind::Prediction => self.prediction_guided = true,
            GeneratorKind::Pattern => self.pattern_reinforced = true,
            GeneratorKind::Creative => self.creative_enhanced = true,
        }
    }

    /// 已设置的标志数
    pub fn count(&self) -> usize {
        [
            self.reality_anchored,
            self.memory_informed,
            self.prediction_guided,
            self.pattern_reinforced,
            self.creative_enhanced,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

/// 一次生成器激活的运行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorRunResult {
    /// 种类
    pub kind: GeneratorKind,
    /// 核心输出
    pub output: GeneratorOutputKind,
    /// 噪声副本
    pub noisy_output: GeneratorOutputKind,
    /// 处理置信度 [0,1]
    pub confidence: f64,
    /// 消耗能量
    pub energy_consumed: f64,
    /// 处理耗时 (启发式单位)
    pub processing_ms: f64,
    /// 串扰标志
    pub crosstalk: CrossTalkFlags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_sampling::StdSampler;

    #[test]
    fn test_low_noise_fast_path_is_noop() {
        let mut sampler = StdSampler::seeded(11);
        let output = GeneratorOutputKind::Reality {
            situation_assessment: 0.7,
            grounding: 0.8,
            summary: "steady".to_string(),
        };
        let noisy = output.perturbed(0.05, &mut sampler);
        assert_eq!(noisy.primary_score(), 0.7);
    }

    #[test]
    fn test_perturbed_stays_bounded() {
        let mut sampler = StdSampler::seeded(12);
        let output = GeneratorOutputKind::Creative {
            divergence: 0.9,
            fluency: 0.1,
            summary: "wild".to_string(),
        };
        for _ in 0..64 {
            let noisy = output.perturbed(0.9, &mut sampler);
            assert!((0.0..=1.0).contains(&noisy.primary_score()));
        }
    }

    #[test]
    fn test_crosstalk_flag_marking() {
        let mut flags = CrossTalkFlags::default();
        flags.mark(GeneratorKind::Reality);
        flags.mark(GeneratorKind::Creative);
        assert!(flags.reality_anchored);
        assert!(flags.creative_enhanced);
        assert_eq!(flags.count(), 2);
    }
}
