//! 决策坍缩引擎
//!
//! 管线：候选选项 → 加权叠加态 → 信任加权 → 社会加权 → 触发评估。
//! 每个加权阶段之后都重新归一化，保持概率和为 1 的不变式。
//! 坍缩压力越过阈值时选出单一选项并给出校准置信度；否则输出
//! 叠加态报告与信息缺口清单。历史封顶 100 条，超限裁到 50。

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use pf_core::context::{clamp_unit, EnvironmentalContext};
use pf_core::Result;
use pf_sampling::{Sampler, StdSampler};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::option::{normalize, CandidateOption, QuantumOption};
use crate::social::{evaluate_social, SocialAssessment, SocialModelKind, SocialWeights};
use crate::trigger::{assess_collapse, CollapseAssessment, CollapseConfig, TriggerValues};
use crate::trust::{TrustMatrix, TrustWeights};

/// 叠加态选项数建议上限之外的历史容量常量
const HISTORY_CAP: usize = 100;
const HISTORY_TRIM: usize = 50;

/// 紧迫读数越过此线时确定性选最高概率项
const URGENCY_DETERMINISTIC: f64 = 0.8;

/// 决策引擎配置
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub collapse: CollapseConfig,
    pub trust: TrustWeights,
    pub social: SocialWeights,
}

/// 单次决策请求
#[derive(Debug, Clone)]
pub struct DecisionContext {
    /// 候选选项 (至少一个)
    pub options: Vec<CandidateOption>,
    /// 时间压力读数
    pub time_pressure: f64,
    /// 外部压力读数
    pub external_pressure: f64,
    /// 机会窗口紧迫度
    pub opportunity_window: f64,
    /// 本次决策涉及的社会模型角色
    pub social_models: Vec<SocialModelKind>,
}

impl DecisionContext {
    pub fn new(options: Vec<CandidateOption>) -> Self {
        Self {
            options,
            time_pressure: 0.0,
            external_pressure: 0.0,
            opportunity_window: 0.0,
            social_models: Vec::new(),
        }
    }
}

/// 坍缩后的单一决策
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapsedDecision {
    pub id: Uuid,
    /// 选中项
    pub chosen: QuantumOption,
    /// 校准置信度 [0.1, 0.95]
    pub confidence: f64,
    /// 触发评估
    pub assessment: CollapseAssessment,
    /// 推理轨迹
    pub reasoning: Vec<String>,
    /// 未选中的前几名 (最多 3 个)
    pub alternatives: Vec<QuantumOption>,
    pub decided_at: DateTime<Utc>,
}

/// 未坍缩时的叠加态报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperpositionReport {
    /// 按活跃概率降序的全部选项
    pub options: Vec<QuantumOption>,
    /// 触发评估
    pub assessment: CollapseAssessment,
    /// 行动建议
    pub recommendation: String,
    /// 各选项的信息缺口 (1 − 信息完备度)，按概率降序
    pub information_needs: Vec<InformationNeed>,
}

/// 单个选项的信息缺口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformationNeed {
    pub option_id: Uuid,
    pub missing: f64,
}

/// 一次评估的两种结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecisionOutcome {
    Collapsed(CollapsedDecision),
    Superposition(SuperpositionReport),
}

/// 决策历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,
    /// 坍缩到的选项
    pub chosen: QuantumOption,
    /// 当时的其余候选，按概率降序
    pub alternatives: Vec<QuantumOption>,
    /// 触发评估快照
    pub assessment: CollapseAssessment,
    pub confidence: f64,
    pub probability: f64,
    pub decided_at: DateTime<Utc>,
}

/// 决策坍缩引擎
pub struct DecisionEngine {
    config: EngineConfig,
    trust: TrustMatrix,
    sampler: StdSampler,
    history: VecDeque<DecisionRecord>,
}

impl DecisionEngine {
    /// 固定种子构造，评估可复现
    pub fn seeded(config: EngineConfig, seed: u64) -> Self {
        let trust = TrustMatrix::new(config.trust.clone());
        Self {
            config,
            trust,
            sampler: StdSampler::seeded(seed),
            history: VecDeque::new(),
        }
    }

    pub fn new(config: EngineConfig) -> Self {
        let seed = pf_sampling::random_seed();
        Self::seeded(config, seed)
    }

    /// 信任矩阵可变访问，调用方据此预置实体历史
    pub fn trust_mut(&mut self) -> &mut TrustMatrix {
        &mut self.trust
    }

    pub fn history(&self) -> &VecDeque<DecisionRecord> {
        &self.history
    }

    /// 对一组候选选项跑完整管线
    pub async fn evaluate(
        &mut self,
        request: &DecisionContext,
        ctx: &EnvironmentalContext,
    ) -> Result<DecisionOutcome> {
        // 空候选集不是错误：返回空叠加态报告，管线继续可用
        if request.options.is_empty() {
            let assessment = CollapseAssessment {
                probability: 0.0,
                primary_trigger: None,
                contributions: Vec::new(),
            };
            return Ok(DecisionOutcome::Superposition(Self::superposition(
                Vec::new(),
                assessment,
            )));
        }

        // 叠加态构造
        let mut options: Vec<QuantumOption> = request
            .options
            .iter()
            .map(|c| QuantumOption::from_candidate(c, &mut self.sampler))
            .collect();
        normalize(&mut options);

        self.apply_trust(&mut options);
        normalize(&mut options);

        let assessments = self.apply_social(&mut options, &request.social_models);
        normalize(&mut options);

        // 概率降序排序，社会评估跟随同序
        let mut ranked: Vec<(QuantumOption, SocialAssessment)> =
            options.into_iter().zip(assessments).collect();
        ranked.sort_by(|a, b| {
            b.0.current_probability()
                .partial_cmp(&a.0.current_probability())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let values = self.trigger_values(request, ctx, &ranked);
        let assessment = assess_collapse(&values, ranked.len(), &self.config.collapse);

        if assessment.should_collapse(&self.config.collapse) {
            let urgency = values
                .time_pressure
                .max(values.external_pressure)
                .max(values.opportunity_window);
            let decision = self.collapse(ranked, assessment, urgency, ctx);
            tracing::info!(
                id = %decision.id,
                confidence = decision.confidence,
                trigger = ?decision.assessment.primary_trigger,
                "decision collapsed"
            );
            Ok(DecisionOutcome::Collapsed(decision))
        } else {
            tracing::debug!(
                probability = assessment.probability,
                options = ranked.len(),
                "superposition maintained"
            );
            Ok(DecisionOutcome::Superposition(Self::superposition(
                ranked, assessment,
            )))
        }
    }

    /// 信任加权：概率乘 0.5 + 均值信任 × 0.5，感知风险乘 1.5 − 均值信任。
    /// 无涉及实体的选项不受影响。
    fn apply_trust(&self, options: &mut [QuantumOption]) {
        for option in options.iter_mut() {
            if option.involved_entities.is_empty() {
                option.trust_adjusted_probability = Some(option.current_probability());
                continue;
            }
            let mean = self.trust.mean_trust(&option.involved_entities);
            let multiplier = 0.5 + mean * 0.5;
            option.trust_adjusted_probability = Some(option.current_probability() * multiplier);
            option.quality.risk = (option.quality.risk * (1.5 - mean)).clamp(0.0, 1.0);
        }
    }

    /// 社会加权：每个选项独立评估全部声明角色
    fn apply_social(
        &mut self,
        options: &mut [QuantumOption],
        models: &[SocialModelKind],
    ) -> Vec<SocialAssessment> {
        let mut assessments = Vec::with_capacity(options.len());
        for option in options.iter_mut() {
            let assessment =
                evaluate_social(models, option, &self.config.social, &mut self.sampler);
            option.social_adjusted_probability =
                Some(option.current_probability() * assessment.multiplier);
            assessments.push(assessment);
        }
        assessments
    }

    fn trigger_values(
        &self,
        request: &DecisionContext,
        ctx: &EnvironmentalContext,
        ranked: &[(QuantumOption, SocialAssessment)],
    ) -> TriggerValues {
        let top_probability = ranked
            .first()
            .map(|(o, _)| o.current_probability())
            .unwrap_or(0.0);
        TriggerValues {
            time_pressure: clamp_unit(request.time_pressure),
            confidence: top_probability,
            external_pressure: clamp_unit(request.external_pressure),
            resource_depletion: 1.0
                - clamp_unit(ctx.cognitive.energy).min(clamp_unit(ctx.cognitive.attention)),
            opportunity_window: clamp_unit(request.opportunity_window),
            cognitive_load: (ranked.len() as f64 / 10.0).min(1.0),
        }
    }

    fn collapse(
        &mut self,
        ranked: Vec<(QuantumOption, SocialAssessment)>,
        assessment: CollapseAssessment,
        urgency: f64,
        ctx: &EnvironmentalContext,
    ) -> CollapsedDecision {
        let deterministic = urgency > URGENCY_DETERMINISTIC;
        let chosen_index = if deterministic {
            0
        } else {
            let probs: Vec<f64> = ranked.iter().map(|(o, _)| o.current_probability()).collect();
            self.sampler.categorical(&probs)
        };

        let chosen_probability = ranked[chosen_index].0.current_probability();
        let best_other = ranked
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != chosen_index)
            .map(|(_, (o, _))| o.current_probability())
            .fold(0.0_f64, f64::max);
        let margin = (chosen_probability - best_other).max(0.0);

        let (chosen, social) = ranked[chosen_index].clone();
        let trust_confidence = self.trust.mean_trust(&chosen.involved_entities);
        let process_quality =
            (clamp_unit(ctx.cognitive.energy) + clamp_unit(ctx.cognitive.attention)) / 2.0;
        let confidence = (0.30 * margin
            + 0.20 * chosen.quality.information_completeness
            + 0.20 * trust_confidence
            + 0.15 * (1.0 - social.social_anxiety)
            + 0.15 * process_quality)
            .clamp(0.1, 0.95);

        let mut reasoning = vec![
            format!(
                "collapse pressure {:.3} exceeded threshold {:.2}",
                assessment.probability, self.config.collapse.collapse_threshold
            ),
            match assessment.primary_trigger {
                Some(trigger) => format!("primary trigger: {:?}", trigger),
                None => "no single dominant trigger".to_string(),
            },
        ];
        if deterministic {
            reasoning.push(format!(
                "urgency {:.2} above {:.2}, highest-probability option taken",
                urgency, URGENCY_DETERMINISTIC
            ));
        } else {
            reasoning.push(format!(
                "sampled proportionally to probability {:.3}",
                chosen_probability
            ));
        }
        reasoning.push(format!(
            "margin over best alternative {:.3}, confidence {:.3}",
            margin, confidence
        ));

        let alternatives: Vec<QuantumOption> = ranked
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != chosen_index)
            .map(|(_, (o, _))| o)
            .take(3)
            .collect();

        let decision = CollapsedDecision {
            id: Uuid::new_v4(),
            chosen,
            confidence,
            assessment,
            reasoning,
            alternatives,
            decided_at: Utc::now(),
        };

        self.history.push_back(DecisionRecord {
            id: decision.id,
            chosen: decision.chosen.clone(),
            alternatives: decision.alternatives.clone(),
            assessment: decision.assessment.clone(),
            confidence: decision.confidence,
            probability: chosen_probability,
            decided_at: decision.decided_at,
        });
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_TRIM;
            self.history.drain(..excess);
        }

        decision
    }

    fn superposition(
        ranked: Vec<(QuantumOption, SocialAssessment)>,
        assessment: CollapseAssessment,
    ) -> SuperpositionReport {
        let options: Vec<QuantumOption> = ranked.into_iter().map(|(o, _)| o).collect();
        let information_needs = options
            .iter()
            .map(|o| InformationNeed {
                option_id: o.id,
                missing: (1.0 - o.quality.information_completeness).clamp(0.0, 1.0),
            })
            .collect();
        let recommendation = if assessment.probability > 0.3 {
            "collapse imminent; prepare to commit".to_string()
        } else {
            "maintain superposition; gather more information".to_string()
        };
        SuperpositionReport {
            options,
            assessment,
            recommendation,
            information_needs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::QualityScores;
    use crate::trust::EntityHistory;
    use serde_json::json;

    fn flat_quality() -> QualityScores {
        QualityScores {
            feasibility: 0.6,
            desirability: 0.6,
            risk: 0.3,
            information_completeness: 0.6,
            outcome_predictability: 0.5,
            value_consistency: 0.6,
            goal_alignment: 0.6,
            timing: 0.5,
            resource_requirement: 0.4,
        }
    }

    fn candidate(label: &str, weight: f64) -> CandidateOption {
        let mut c = CandidateOption::new(json!(label));
        c.prior_weight = Some(weight);
        c.quality = Some(flat_quality());
        c
    }

    #[tokio::test]
    async fn test_empty_options_yield_superposition_report() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 1);
        let request = DecisionContext::new(Vec::new());
        let outcome = engine
            .evaluate(&request, &EnvironmentalContext::default())
            .await
            .unwrap();
        match outcome {
            DecisionOutcome::Superposition(report) => {
                assert!(report.options.is_empty());
                assert!(report.information_needs.is_empty());
                assert_eq!(report.assessment.probability, 0.0);
                assert!(report.assessment.primary_trigger.is_none());
                assert!(report.recommendation.contains("gather more information"));
            }
            DecisionOutcome::Collapsed(_) => panic!("expected superposition for empty input"),
        }
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_high_urgency_collapses_to_top_option() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 2);
        let mut request =
            DecisionContext::new(vec![candidate("leading", 0.7), candidate("trailing", 0.3)]);
        request.time_pressure = 0.9;
        request.external_pressure = 0.9;

        let outcome = engine
            .evaluate(&request, &EnvironmentalContext::default())
            .await
            .unwrap();
        match outcome {
            DecisionOutcome::Collapsed(decision) => {
                assert_eq!(decision.chosen.payload, json!("leading"));
                assert!((0.1..=0.95).contains(&decision.confidence));
                assert!(!decision.reasoning.is_empty());
                assert!(decision.alternatives.len() <= 3);
            }
            DecisionOutcome::Superposition(_) => panic!("expected collapse under high urgency"),
        }
    }

    #[tokio::test]
    async fn test_low_pressure_maintains_superposition() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 3);
        let request = DecisionContext::new(vec![
            candidate("a", 0.4),
            candidate("b", 0.35),
            candidate("c", 0.25),
        ]);
        let mut ctx = EnvironmentalContext::default();
        ctx.cognitive.energy = 0.8;
        ctx.cognitive.attention = 0.8;

        let outcome = engine.evaluate(&request, &ctx).await.unwrap();
        match outcome {
            DecisionOutcome::Superposition(report) => {
                assert_eq!(report.options.len(), 3);
                assert!(report.recommendation.contains("gather more information"));
                let total: f64 = report
                    .options
                    .iter()
                    .map(|o| o.current_probability())
                    .sum();
                assert!((total - 1.0).abs() < 1e-9);
                // 降序排列
                for pair in report.options.windows(2) {
                    assert!(
                        pair[0].current_probability() >= pair[1].current_probability()
                    );
                }
            }
            DecisionOutcome::Collapsed(_) => panic!("expected superposition under low pressure"),
        }
    }

    #[tokio::test]
    async fn test_moderate_pressure_recommends_imminent_collapse() {
        // 时间压力 0.8 贡献 0.2，默认情境资源耗竭贡献 0.18，合计 0.38:
        // 越过 0.3 提示线但未达 0.5 坍缩线
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 11);
        let mut request = DecisionContext::new(vec![candidate("a", 0.5), candidate("b", 0.5)]);
        request.time_pressure = 0.8;

        let outcome = engine
            .evaluate(&request, &EnvironmentalContext::default())
            .await
            .unwrap();
        match outcome {
            DecisionOutcome::Superposition(report) => {
                assert!(report.assessment.probability > 0.3);
                assert!(report.recommendation.contains("collapse imminent"));
            }
            DecisionOutcome::Collapsed(_) => panic!("expected superposition at moderate pressure"),
        }
    }

    #[tokio::test]
    async fn test_history_record_retains_options_and_assessment() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 12);
        let mut request =
            DecisionContext::new(vec![candidate("leading", 0.7), candidate("trailing", 0.3)]);
        request.time_pressure = 0.9;
        request.external_pressure = 0.9;

        let outcome = engine
            .evaluate(&request, &EnvironmentalContext::default())
            .await
            .unwrap();
        let decision = match outcome {
            DecisionOutcome::Collapsed(decision) => decision,
            DecisionOutcome::Superposition(_) => panic!("expected collapse under high urgency"),
        };

        let record = engine.history().back().unwrap();
        assert_eq!(record.id, decision.id);
        assert_eq!(record.chosen.id, decision.chosen.id);
        assert_eq!(record.chosen.payload, json!("leading"));
        assert_eq!(record.alternatives.len(), 1);
        assert_eq!(record.alternatives[0].payload, json!("trailing"));
        assert_eq!(record.assessment.probability, decision.assessment.probability);
        assert!(!record.assessment.contributions.is_empty());
    }

    #[tokio::test]
    async fn test_trust_orders_identical_options() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 4);
        engine.trust_mut().record(
            "mentor",
            EntityHistory {
                successes: 9,
                failures: 1,
                positive_indicators: 6,
                negative_indicators: 1,
                consistency: 0.8,
                transparency: 0.9,
            },
        );
        engine.trust_mut().record(
            "flake",
            EntityHistory {
                successes: 3,
                failures: 4,
                positive_indicators: 1,
                negative_indicators: 3,
                consistency: 0.3,
                transparency: 0.3,
            },
        );

        let mut with_mentor = candidate("ask mentor", 0.5);
        with_mentor.involved_entities = vec!["mentor".to_string()];
        let mut with_flake = candidate("ask flake", 0.5);
        with_flake.involved_entities = vec!["flake".to_string()];

        let mut ctx = EnvironmentalContext::default();
        ctx.cognitive.energy = 0.8;
        ctx.cognitive.attention = 0.8;

        let request = DecisionContext::new(vec![with_flake, with_mentor]);
        let outcome = engine.evaluate(&request, &ctx).await.unwrap();
        match outcome {
            DecisionOutcome::Superposition(report) => {
                assert_eq!(report.options[0].payload, json!("ask mentor"));
                assert!(
                    report.options[0].current_probability()
                        > report.options[1].current_probability()
                );
            }
            DecisionOutcome::Collapsed(_) => panic!("expected superposition"),
        }
    }

    #[tokio::test]
    async fn test_trusted_entity_raises_confidence() {
        // 同一选项、同一紧迫条件，只换涉及实体：高信任历史给出更高置信度
        let reliable = EntityHistory {
            successes: 9,
            failures: 1,
            positive_indicators: 6,
            negative_indicators: 1,
            consistency: 0.8,
            transparency: 0.9,
        };
        let shaky = EntityHistory {
            successes: 3,
            failures: 4,
            positive_indicators: 1,
            negative_indicators: 3,
            consistency: 0.3,
            transparency: 0.3,
        };
        let mut confidences = Vec::new();
        for (entity, history) in [("mentor", reliable), ("flake", shaky)] {
            let mut engine = DecisionEngine::seeded(EngineConfig::default(), 7);
            engine.trust_mut().record(entity, history);
            let mut option = candidate("delegate the task", 1.0);
            option.involved_entities = vec![entity.to_string()];
            let mut request = DecisionContext::new(vec![option]);
            request.time_pressure = 0.95;
            let outcome = engine
                .evaluate(&request, &EnvironmentalContext::default())
                .await
                .unwrap();
            match outcome {
                DecisionOutcome::Collapsed(decision) => confidences.push(decision.confidence),
                DecisionOutcome::Superposition(_) => panic!("expected collapse"),
            }
        }
        assert!(confidences[0] > confidences[1]);
    }

    #[tokio::test]
    async fn test_history_capped_and_trimmed() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 5);
        let ctx = EnvironmentalContext::default();
        for i in 0..101 {
            let mut request = DecisionContext::new(vec![candidate("only", 1.0)]);
            request.time_pressure = 0.95;
            let outcome = engine.evaluate(&request, &ctx).await.unwrap();
            assert!(matches!(outcome, DecisionOutcome::Collapsed(_)), "run {}", i);
        }
        assert_eq!(engine.history().len(), 50);
    }

    #[tokio::test]
    async fn test_social_models_shift_probabilities_within_band() {
        let mut engine = DecisionEngine::seeded(EngineConfig::default(), 6);
        let mut request =
            DecisionContext::new(vec![candidate("stay", 0.5), candidate("move", 0.5)]);
        request.social_models = vec![
            SocialModelKind::FamilyExpectations,
            SocialModelKind::FutureSelf,
        ];
        let outcome = engine
            .evaluate(&request, &EnvironmentalContext::default())
            .await
            .unwrap();
        match outcome {
            DecisionOutcome::Superposition(report) => {
                let total: f64 = report
                    .options
                    .iter()
                    .map(|o| o.current_probability())
                    .sum();
                assert!((total - 1.0).abs() < 1e-9);
            }
            DecisionOutcome::Collapsed(decision) => {
                assert!((0.1..=0.95).contains(&decision.confidence));
            }
        }
    }
}
