//! 量子选项模型
//!
//! 每个候选选项带九个质量维度 (可外部供给，缺省从方向性 Beta 先验抽取)
//! 与一个基础概率。不变式：每次归一化后，全体选项的活跃概率字段之和为 1。

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 调用方提交的候选选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOption {
    /// 不透明负载
    pub payload: serde_json::Value,
    /// 涉及的实体 (信任加权用)
    pub involved_entities: Vec<String>,
    /// 质量维度 (缺省时抽样)
    pub quality: Option<QualityScores>,
    /// 基础概率先验权重 (缺省时从 U(0.1,1.0) 抽取)
    pub prior_weight: Option<f64>,
}

impl CandidateOption {
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            payload,
            involved_entities: Vec::new(),
            quality: None,
            prior_weight: None,
        }
    }
}

/// 九个质量维度，均在 [0,1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityScores {
    pub feasibility: f64,
    pub desirability: f64,
    pub risk: f64,
    pub information_completeness: f64,
    pub outcome_predictability: f64,
    pub value_consistency: f64,
    pub goal_alignment: f64,
    pub timing: f64,
    pub resource_requirement: f64,
}

impl QualityScores {
    /// 从方向性先验抽样：风险持怀疑 Beta(3,7)，可行性持乐观 Beta(6,4)
    pub fn sample(sampler: &mut dyn Sampler) -> Self {
        Self {
            feasibility: sampler.beta(6.0, 4.0),
            desirability: sampler.beta(5.0, 5.0),
            risk: sampler.beta(3.0, 7.0),
            information_completeness: sampler.beta(4.0, 6.0),
            outcome_predictability: sampler.beta(5.0, 5.0),
            value_consistency: sampler.beta(6.0, 4.0),
            goal_alignment: sampler.beta(6.0, 4.0),
            timing: sampler.beta(5.0, 5.0),
            resource_requirement: sampler.beta(4.0, 6.0),
        }
    }
}

/// 叠加态中的加权选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantumOption {
    /// 唯一 id
    pub id: Uuid,
    /// 不透明负载
    pub payload: serde_json::Value,
    /// 基础概率 (归一化后)
    pub base_probability: f64,
    /// 质量维度
    pub quality: QualityScores,
    /// 信任加权后的概率 (管线推进时覆写)
    pub trust_adjusted_probability: Option<f64>,
    /// 社会加权后的概率 (管线推进时覆写)
    pub social_adjusted_probability: Option<f64>,
    /// 涉及实体
    pub involved_entities: Vec<String>,
}

impl QuantumOption {
    /// 从候选选项创建，质量/先验缺省时抽样补齐
    pub fn from_candidate(candidate: &CandidateOption, sampler: &mut dyn Sampler) -> Self {
        let base = candidate
            .prior_weight
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or_else(|| sampler.uniform(0.1, 1.0));
        Self {
            id: Uuid::new_v4(),
            payload: candidate.payload.clone(),
            base_probability: base,
            quality: candidate
                .quality
                .clone()
                .unwrap_or_else(|| QualityScores::sample(sampler)),
            trust_adjusted_probability: None,
            social_adjusted_probability: None,
            involved_entities: candidate.involved_entities.clone(),
        }
    }

    /// 当前活跃概率：取管线推进最远的字段
    pub fn current_probability(&self) -> f64 {
        self.social_adjusted_probability
            .or(self.trust_adjusted_probability)
            .unwrap_or(self.base_probability)
    }
}

/// 把活跃概率字段归一化到和为 1。
/// 空集与全零权重集都不做除零：前者无操作，后者均分。
pub fn normalize(options: &mut [QuantumOption]) {
    if options.is_empty() {
        return;
    }
    let total: f64 = options.iter().map(|o| o.current_probability().max(0.0)).sum();
    let count = options.len() as f64;
    for option in options.iter_mut() {
        let normalized = if total > f64::EPSILON {
            option.current_probability().max(0.0) / total
        } else {
            1.0 / count
        };
        if option.social_adjusted_probability.is_some() {
            option.social_adjusted_probability = Some(normalized);
        } else if option.trust_adjusted_probability.is_some() {
            option.trust_adjusted_probability = Some(normalized);
        } else {
            option.base_probability = normalized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_sampling::StdSampler;
    use serde_json::json;

    fn options_from(weights: &[f64], sampler: &mut StdSampler) -> Vec<QuantumOption> {
        weights
            .iter()
            .map(|w| {
                let mut candidate = CandidateOption::new(json!({"w": w}));
                candidate.prior_weight = Some(*w);
                QuantumOption::from_candidate(&candidate, sampler)
            })
            .collect()
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let mut sampler = StdSampler::seeded(10);
        let mut options = options_from(&[0.6, 0.3, 0.1], &mut sampler);
        normalize(&mut options);
        let total: f64 = options.iter().map(|o| o.current_probability()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_after_each_stage() {
        let mut sampler = StdSampler::seeded(11);
        let mut options = options_from(&[2.0, 1.0], &mut sampler);
        normalize(&mut options);
        // 信任阶段覆写后再归一化，不变式仍成立
        for option in options.iter_mut() {
            option.trust_adjusted_probability = Some(option.base_probability * 0.7);
        }
        normalize(&mut options);
        let total: f64 = options.iter().map(|o| o.current_probability()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_handles_zero_weights() {
        let mut sampler = StdSampler::seeded(12);
        let mut options = options_from(&[1.0, 1.0], &mut sampler);
        for option in options.iter_mut() {
            option.base_probability = 0.0;
        }
        normalize(&mut options);
        for option in &options {
            assert!((option.current_probability() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sampled_quality_in_bounds() {
        let mut sampler = StdSampler::seeded(13);
        for _ in 0..32 {
            let quality = QualityScores::sample(&mut sampler);
            for value in [
                quality.feasibility,
                quality.desirability,
                quality.risk,
                quality.information_completeness,
                quality.outcome_predictability,
                quality.value_consistency,
                quality.goal_alignment,
                quality.timing,
                quality.resource_requirement,
            ] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
