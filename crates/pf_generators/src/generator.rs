//! 生成器行为
//!
//! 每种生成器实现同一个异步契约；域内逻辑结合环境修正因子产出
//! 核心输出，置信度从种类偏置的 Beta 分布抽取。

use async_trait::async_trait;
use pf_core::context::clamp_unit;
use pf_core::{EnvironmentalContext, Query, QueryType, Result};
use pf_sampling::Sampler;

use crate::descriptor::{GeneratorDescriptor, GeneratorKind};
use crate::modifier::EnvironmentalModifier;
use crate::output::GeneratorOutputKind;

/// 解释生成器契约
#[async_trait]
pub trait InterpretationGenerator: Send + Sync {
    /// 种类
    fn kind(&self) -> GeneratorKind;

    /// 产出一次候选解读
    async fn interpret(
        &self,
        query: &Query,
        ctx: &EnvironmentalContext,
        modifier: &EnvironmentalModifier,
        sampler: &mut dyn Sampler,
    ) -> Result<GeneratorOutputKind>;

    /// 置信度 Beta 先验 (alpha, beta)，按种类偏置
    fn confidence_prior(&self) -> (f64, f64);
}

/// 按目录构造全部生成器实例，顺序与目录一致
pub fn build_generators() -> Vec<Box<dyn InterpretationGenerator>> {
    vec![
        Box::new(RealityGenerator),
        Box::new(MemoryGenerator),
        Box::new(PredictionGenerator),
        Box::new(PatternGenerator),
        Box::new(CreativeGenerator),
    ]
}

/// 从核心输出与先验抽取处理置信度
pub fn draw_confidence(
    generator: &dyn InterpretationGenerator,
    modifier: &EnvironmentalModifier,
    sampler: &mut dyn Sampler,
) -> f64 {
    let (alpha, beta) = generator.confidence_prior();
    (sampler.beta(alpha, beta) * modifier.confidence_adjustment).clamp(0.0, 1.0)
}

/// 运行耗时启发值
pub fn processing_time(
    descriptor: &GeneratorDescriptor,
    modifier: &EnvironmentalModifier,
    sampler: &mut dyn Sampler,
) -> f64 {
    let base = descriptor.processing_depth * 100.0 / modifier.speed_multiplier.max(0.1);
    base * sampler.uniform(0.8, 1.2)
}

/// 现实取向：当前处境锚定
pub struct RealityGenerator;

#[async_trait]
impl InterpretationGenerator for RealityGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Reality
    }

    async fn interpret(
        &self,
        _query: &Query,
        ctx: &EnvironmentalContext,
        _modifier: &EnvironmentalModifier,
        sampler: &mut dyn Sampler,
    ) -> Result<GeneratorOutputKind> {
        // 处境评估以环境舒适度与熟悉度为锚
        let grounding = clamp_unit(
            ctx.social.familiarity * 0.5 + ctx.physical.comfort * 0.3 + sampler.uniform(0.0, 0.2),
        );
        let situation_assessment =
            clamp_unit(grounding * 0.6 + (1.0 - ctx.cognitive.stress) * 0.3 + 0.1);
        Ok(GeneratorOutputKind::Reality {
            situation_assessment,
            grounding,
            summary: format!("present-moment reading, grounding {:.2}", grounding),
        })
    }

    fn confidence_prior(&self) -> (f64, f64) {
        (7.0, 3.0)
    }
}

/// 记忆取向：历史经验检索
pub struct MemoryGenerator;

#[async_trait]
impl InterpretationGenerator for MemoryGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Memory
    }

    async fn interpret(
        &self,
        query: &Query,
        ctx: &EnvironmentalContext,
        _modifier: &EnvironmentalModifier,
        sampler: &mut dyn Sampler,
    ) -> Result<GeneratorOutputKind> {
        let affinity = if query.query_type == QueryType::MemoryRecall {
            0.3
        } else {
            0.0
        };
        let recall_strength =
            clamp_unit(sampler.beta(5.0, 3.0) * 0.7 + ctx.social.familiarity * 0.3 + affinity);
        let relevance = clamp_unit(sampler.beta(4.0, 4.0) * 0.8 + affinity);
        Ok(GeneratorOutputKind::Memory {
            recall_strength,
            relevance,
            summary: format!("episodic echo, recall {:.2}", recall_strength),
        })
    }

    fn confidence_prior(&self) -> (f64, f64) {
        (6.0, 4.0)
    }
}

/// 预测取向：前瞻推演
pub struct PredictionGenerator;

#[async_trait]
impl InterpretationGenerator for PredictionGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Prediction
    }

    async fn interpret(
        &self,
        _query: &Query,
        ctx: &EnvironmentalContext,
        _modifier: &EnvironmentalModifier,
        sampler: &mut dyn Sampler,
    ) -> Result<GeneratorOutputKind> {
        // 期限压力压缩预测视界
        let horizon_confidence =
            clamp_unit(sampler.beta(5.0, 5.0) * (1.0 - ctx.temporal.deadline_pressure * 0.4));
        let branching_factor = clamp_unit(sampler.uniform(0.2, 0.9));
        Ok(GeneratorOutputKind::Prediction {
            horizon_confidence,
            branching_factor,
            summary: format!("forward trace, horizon {:.2}", horizon_confidence),
        })
    }

    fn confidence_prior(&self) -> (f64, f64) {
        (5.0, 5.0)
    }
}

/// 模式取向：规律抽取
pub struct PatternGenerator;

#[async_trait]
impl InterpretationGenerator for PatternGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Pattern
    }

    async fn interpret(
        &self,
        query: &Query,
        _ctx: &EnvironmentalContext,
        _modifier: &EnvironmentalModifier,
        sampler: &mut dyn Sampler,
    ) -> Result<GeneratorOutputKind> {
        let affinity = if query.query_type == QueryType::PatternAnalysis {
            0.2
        } else {
            0.0
        };
        let regularity = clamp_unit(sampler.beta(6.0, 4.0) + affinity);
        let novelty = clamp_unit(sampler.beta(3.0, 6.0));
        Ok(GeneratorOutputKind::Pattern {
            regularity,
            novelty,
            summary: format!("recurring structure, regularity {:.2}", regularity),
        })
    }

    fn confidence_prior(&self) -> (f64, f64) {
        (6.0, 4.0)
    }
}

/// 创造取向：发散联想
pub struct CreativeGenerator;

#[async_trait]
impl InterpretationGenerator for CreativeGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Creative
    }

    async fn interpret(
        &self,
        query: &Query,
        ctx: &EnvironmentalContext,
        _modifier: &EnvironmentalModifier,
        sampler: &mut dyn Sampler,
    ) -> Result<GeneratorOutputKind> {
        let task_bonus = if query.creative_task { 0.2 } else { 0.0 };
        let divergence =
            clamp_unit(sampler.beta(4.0, 4.0) * (0.7 + ctx.cognitive.energy * 0.3) + task_bonus);
        let fluency = clamp_unit(sampler.beta(5.0, 4.0));
        Ok(GeneratorOutputKind::Creative {
            divergence,
            fluency,
            summary: format!("divergent leap, spread {:.2}", divergence),
        })
    }

    fn confidence_prior(&self) -> (f64, f64) {
        (4.0, 6.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_sampling::StdSampler;

    #[tokio::test]
    async fn test_every_generator_produces_its_own_kind() {
        let generators = build_generators();
        let query = Query::new("what is happening here", QueryType::CurrentSituation);
        let ctx = EnvironmentalContext::default();
        let modifier = EnvironmentalModifier::default();
        let mut sampler = StdSampler::seeded(21);
        for generator in &generators {
            let output = generator
                .interpret(&query, &ctx, &modifier, &mut sampler)
                .await
                .unwrap();
            assert_eq!(output.kind(), generator.kind());
            assert!((0.0..=1.0).contains(&output.primary_score()));
        }
    }

    #[test]
    fn test_confidence_respects_adjustment() {
        let generator = RealityGenerator;
        let mut sampler = StdSampler::seeded(9);
        let depressed = EnvironmentalModifier {
            confidence_adjustment: 0.5,
            ..EnvironmentalModifier::default()
        };
        for _ in 0..32 {
            let confidence = draw_confidence(&generator, &depressed, &mut sampler);
            assert!(confidence <= 0.5);
        }
    }
}
