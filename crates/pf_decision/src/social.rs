//! 社会建模
//!
//! 固定枚举的关系角色 (家庭期望/同辈比较/权威/未来自我/理想自我/社会群体)，
//! 每个角色带影响权重、模型精度、情绪冲击常量。认可概率从中性先验
//! Beta(5,5) 抽取后按角色规则调整。防递归自我建模失控：精度 < 0.3 的
//! 模型计入递归深度；身份威胁被标记时，社会乘子从 [0.6,1.0] 收窄到
//! [0.7,1.0] (保护性收窄)。

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};

use crate::option::QuantumOption;

/// 社会模型角色 (固定枚举集)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialModelKind {
    FamilyExpectations,
    PeerComparisons,
    AuthorityFigures,
    FutureSelf,
    IdealSelf,
    SocialGroups,
}

impl SocialModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialModelKind::FamilyExpectations => "family_expectations",
            SocialModelKind::PeerComparisons => "peer_comparisons",
            SocialModelKind::AuthorityFigures => "authority_figures",
            SocialModelKind::FutureSelf => "future_self",
            SocialModelKind::IdealSelf => "ideal_self",
            SocialModelKind::SocialGroups => "social_groups",
        }
    }
}

impl std::fmt::Display for SocialModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 角色常量画像
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialModelProfile {
    /// 影响权重
    pub influence_weight: f64,
    /// 模型精度 (低于 0.3 计入递归深度)
    pub model_accuracy: f64,
    /// 情绪冲击
    pub emotional_impact: f64,
}

/// 社会加权配置
#[derive(Debug, Clone)]
pub struct SocialWeights {
    pub family: SocialModelProfile,
    pub peers: SocialModelProfile,
    pub authority: SocialModelProfile,
    pub future_self: SocialModelProfile,
    pub ideal_self: SocialModelProfile,
    pub social_groups: SocialModelProfile,
    /// 递归深度上限
    pub recursion_limit: usize,
    /// 高情绪冲击判定线
    pub emotional_impact_threshold: f64,
    /// 高情绪冲击模型计数上限
    pub emotional_model_limit: usize,
}

impl SocialWeights {
    pub fn profile(&self, kind: SocialModelKind) -> &SocialModelProfile {
        match kind {
            SocialModelKind::FamilyExpectations => &self.family,
            SocialModelKind::PeerComparisons => &self.peers,
            SocialModelKind::AuthorityFigures => &self.authority,
            SocialModelKind::FutureSelf => &self.future_self,
            SocialModelKind::IdealSelf => &self.ideal_self,
            SocialModelKind::SocialGroups => &self.social_groups,
        }
    }
}

impl Default for SocialWeights {
    fn default() -> Self {
        Self {
            family: SocialModelProfile {
                influence_weight: 0.8,
                model_accuracy: 0.6,
                emotional_impact: 0.9,
            },
            peers: SocialModelProfile {
                influence_weight: 0.6,
                model_accuracy: 0.5,
                emotional_impact: 0.7,
            },
            authority: SocialModelProfile {
                influence_weight: 0.5,
                model_accuracy: 0.6,
                emotional_impact: 0.6,
            },
            future_self: SocialModelProfile {
                influence_weight: 0.7,
                model_accuracy: 0.4,
                emotional_impact: 0.5,
            },
            ideal_self: SocialModelProfile {
                influence_weight: 0.6,
                model_accuracy: 0.25,
                emotional_impact: 0.85,
            },
            social_groups: SocialModelProfile {
                influence_weight: 0.4,
                model_accuracy: 0.5,
                emotional_impact: 0.5,
            },
            recursion_limit: 3,
            emotional_impact_threshold: 0.8,
            emotional_model_limit: 2,
        }
    }
}

/// 单个选项的社会加权评估
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAssessment {
    /// 社会乘子
    pub multiplier: f64,
    /// 身份威胁标记
    pub identity_threat: bool,
    /// 递归深度
    pub recursive_depth: usize,
    /// 社会焦虑 (高情绪冲击 × 低认可)
    pub social_anxiety: f64,
}

impl SocialAssessment {
    /// 无社会模型时的中性评估 (乘子 1.0)
    pub fn neutral() -> Self {
        Self {
            multiplier: 1.0,
            identity_threat: false,
            recursive_depth: 0,
            social_anxiety: 0.0,
        }
    }
}

/// 角色规则：在中性认可先验上叠加角色特有偏置
fn adjust_approval(
    kind: SocialModelKind,
    base_approval: f64,
    option: &QuantumOption,
) -> f64 {
    let q = &option.quality;
    let adjusted = match kind {
        // 未来自我偏向长期后果对齐
        SocialModelKind::FutureSelf => base_approval * 0.5 + q.goal_alignment * 0.5,
        // 理想自我偏向价值一致性
        SocialModelKind::IdealSelf => base_approval * 0.5 + q.value_consistency * 0.5,
        // 家庭期望对风险敏感
        SocialModelKind::FamilyExpectations => base_approval * (1.0 - q.risk * 0.3),
        // 同辈比较偏向可欲性
        SocialModelKind::PeerComparisons => base_approval * 0.7 + q.desirability * 0.3,
        // 权威偏向价值一致性 (较弱)
        SocialModelKind::AuthorityFigures => base_approval * 0.8 + q.value_consistency * 0.2,
        SocialModelKind::SocialGroups => base_approval,
    };
    adjusted.clamp(0.0, 1.0)
}

/// 对一个选项评估全部声明的社会模型
pub fn evaluate_social(
    models: &[SocialModelKind],
    option: &QuantumOption,
    weights: &SocialWeights,
    sampler: &mut dyn Sampler,
) -> SocialAssessment {
    if models.is_empty() {
        return SocialAssessment::neutral();
    }

    let recursive_depth = models
        .iter()
        .filter(|m| weights.profile(**m).model_accuracy < 0.3)
        .count();
    let high_impact = models
        .iter()
        .filter(|m| weights.profile(**m).emotional_impact > weights.emotional_impact_threshold)
        .count();
    let identity_threat =
        high_impact > weights.emotional_model_limit || recursive_depth > weights.recursion_limit;

    let mut weighted_approval = 0.0;
    let mut weight_total = 0.0;
    let mut anxiety = 0.0;
    for model in models {
        let profile = weights.profile(*model);
        let base_approval = sampler.beta(5.0, 5.0);
        let approval = adjust_approval(*model, base_approval, option);
        weighted_approval += approval * profile.influence_weight;
        weight_total += profile.influence_weight;
        anxiety += profile.emotional_impact * (1.0 - approval);
    }
    let aggregate = if weight_total > f64::EPSILON {
        weighted_approval / weight_total
    } else {
        0.5
    };
    let social_anxiety = (anxiety / models.len() as f64).clamp(0.0, 1.0);

    // 威胁被标记时保护性收窄乘子下限
    let floor = if identity_threat { 0.7 } else { 0.6 };
    let multiplier = floor + aggregate * (1.0 - floor);

    if identity_threat {
        tracing::debug!(
            recursive_depth,
            high_impact,
            "identity threat flagged, social multiplier narrowed"
        );
    }

    SocialAssessment {
        multiplier,
        identity_threat,
        recursive_depth,
        social_anxiety,
    }
}
