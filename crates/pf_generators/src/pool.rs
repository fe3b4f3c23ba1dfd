//! 生成器池
//!
//! 激活策略：每种生成器从 0.5 起步，按查询类型亲和调整，再按环境
//! 影响与认知能量修正，最后逐种做一次 Bernoulli 试验。激活集为空时
//! 强制激活现实取向生成器 (绝不返回零激活)。
//!
//! 各激活生成器的运行只读自己的描述符与共享上下文，互不干扰，
//! 因此以 fan-out/fan-in 并发执行，随后按目录声明顺序确定性合并。
//! 每个逻辑运行持有独立派生种子的采样器，保证可复现。

use std::collections::HashMap;

use futures::future::join_all;
use pf_core::{EnvironmentalContext, Query, QueryType, Result};
use pf_sampling::{Sampler, StdSampler};
use serde::{Deserialize, Serialize};

use crate::crosstalk::apply_crosstalk;
use crate::descriptor::{catalogue, default_descriptor, GeneratorDescriptor, GeneratorKind};
use crate::generator::{build_generators, draw_confidence, processing_time, InterpretationGenerator};
use crate::middleware::{apply_middleware, MiddlewareAction};
use crate::modifier::EnvironmentalModifier;
use crate::output::GeneratorRunResult;

/// 池配置
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// 生成器目录 (可按种类覆写噪声容忍/优先级/能量成本)
    pub descriptors: Vec<GeneratorDescriptor>,
    /// 环境影响抬升现实生成器的阈值
    pub influence_boost_threshold: f64,
    /// 低能量节能阈值
    pub low_energy_threshold: f64,
    /// 节能时的全局概率乘子
    pub conserve_factor: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            descriptors: catalogue(),
            influence_boost_threshold: 0.7,
            low_energy_threshold: 0.4,
            conserve_factor: 0.7,
        }
    }
}

/// 池运行元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMetadata {
    /// 总能量消耗
    pub total_energy: f64,
    /// 总处理耗时 (启发式单位)
    pub total_processing_ms: f64,
    /// 强化链接数
    pub reinforced_links: usize,
    /// 周期编号
    pub cycle: u64,
}

/// 池输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolOutput {
    /// 各种类运行结果 (目录声明顺序)
    pub results: Vec<GeneratorRunResult>,
    /// 激活种类
    pub active_kinds: Vec<GeneratorKind>,
    /// 连贯性评分
    pub coherence: f64,
    /// 中间件动作日志
    pub middleware_actions: Vec<MiddlewareAction>,
    /// 元数据
    pub metadata: PoolMetadata,
}

impl PoolOutput {
    /// 激活比率，供干涉引擎作为注意力振荡器振幅输入
    pub fn activity_ratio(&self) -> f64 {
        if GeneratorKind::ALL.is_empty() {
            return 0.0;
        }
        self.active_kinds.len() as f64 / GeneratorKind::ALL.len() as f64
    }
}

/// 解释生成器池 (每个推理会话一个实例)
pub struct GeneratorPool {
    config: PoolConfig,
    generators: Vec<Box<dyn InterpretationGenerator>>,
    sampler: StdSampler,
    seed: u64,
    cycle: u64,
}

impl GeneratorPool {
    /// 以固定种子创建
    pub fn seeded(config: PoolConfig, seed: u64) -> Self {
        Self {
            config,
            generators: build_generators(),
            sampler: StdSampler::seeded(seed),
            seed,
            cycle: 0,
        }
    }

    /// 以系统熵创建默认配置的池
    pub fn default_pool() -> Self {
        Self::seeded(PoolConfig::default(), pf_sampling::random_seed())
    }

    /// 计算每种生成器的最终激活概率
    fn activation_probabilities(
        &self,
        query: &Query,
        ctx: &EnvironmentalContext,
    ) -> HashMap<GeneratorKind, f64> {
        let mut probabilities: HashMap<GeneratorKind, f64> =
            GeneratorKind::ALL.iter().map(|k| (*k, 0.5)).collect();

        // 查询类型亲和
        match query.query_type {
            QueryType::CurrentSituation => {
                probabilities.insert(GeneratorKind::Reality, 0.9);
                probabilities.insert(GeneratorKind::Prediction, 0.3);
            }
            QueryType::MemoryRecall => {
                probabilities.insert(GeneratorKind::Memory, 0.9);
            }
            QueryType::Prediction => {
                probabilities.insert(GeneratorKind::Prediction, 0.9);
                probabilities.insert(GeneratorKind::Pattern, 0.7);
            }
            QueryType::PatternAnalysis => {
                probabilities.insert(GeneratorKind::Pattern, 0.9);
            }
            QueryType::CreativeExploration => {
                probabilities.insert(GeneratorKind::Creative, 0.9);
                probabilities.insert(GeneratorKind::Reality, 0.4);
            }
        }

        // 高环境影响抬升现实锚定
        if ctx.aggregate_influence() > self.config.influence_boost_threshold {
            if let Some(p) = probabilities.get_mut(&GeneratorKind::Reality) {
                *p += 0.2;
            }
        }

        // 低能量节能
        if ctx.cognitive.energy < self.config.low_energy_threshold {
            for p in probabilities.values_mut() {
                *p *= self.config.conserve_factor;
            }
        }

        for p in probabilities.values_mut() {
            *p = p.clamp(0.0, 1.0);
        }
        probabilities
    }

    /// 处理一次查询：中间件 → 激活 → 并发运行 → 串扰 → 聚合
    pub async fn process(
        &mut self,
        query: &Query,
        ctx: &EnvironmentalContext,
    ) -> Result<PoolOutput> {
        self.cycle += 1;
        let modifier = EnvironmentalModifier::from_context(ctx);
        let outcome = apply_middleware(query, ctx);
        let probabilities = self.activation_probabilities(&outcome.query, ctx);

        // 逐种 Bernoulli 试验，目录声明顺序
        let mut active_kinds: Vec<GeneratorKind> = GeneratorKind::ALL
            .iter()
            .copied()
            .filter(|kind| {
                let p = probabilities.get(kind).copied().unwrap_or(0.5);
                self.sampler.bernoulli(p)
            })
            .collect();

        // 激活集为空时强制现实取向
        if active_kinds.is_empty() {
            tracing::debug!("empty activation set, forcing reality generator");
            active_kinds.push(GeneratorKind::Reality);
        }

        // fan-out：每个激活生成器独立采样器，互不共享可变状态
        let runs = self
            .generators
            .iter()
            .enumerate()
            .filter(|(_, g)| active_kinds.contains(&g.kind()))
            .map(|(idx, generator)| {
                let mut run_sampler =
                    StdSampler::seeded(self.seed ^ (self.cycle.wrapping_mul(31) + idx as u64));
                let descriptor = self
                    .config
                    .descriptors
                    .iter()
                    .find(|d| d.kind == generator.kind())
                    .cloned()
                    .unwrap_or_else(|| default_descriptor(generator.kind()));
                let query = outcome.query.clone();
                let modifier = modifier.clone();
                async move {
                    let output = generator
                        .interpret(&query, ctx, &modifier, &mut run_sampler)
                        .await;
                    (generator.as_ref(), descriptor, output, run_sampler)
                }
            });
        let completed = join_all(runs).await;

        // fan-in：目录顺序已保持；单个生成器失败只隔离该项
        let mut results = Vec::with_capacity(completed.len());
        for (generator, descriptor, output, mut run_sampler) in completed {
            let output = match output {
                Ok(output) => output,
                Err(error) => {
                    tracing::warn!(kind = %descriptor.kind, %error, "generator run failed, skipping");
                    continue;
                }
            };
            let noise = descriptor.noise_tolerance * modifier.noise_amplification;
            let noisy_output = output.perturbed(noise, &mut run_sampler);
            let confidence = draw_confidence(generator, &modifier, &mut run_sampler);
            let energy_consumed = descriptor.energy_cost * modifier.energy_multiplier;
            let processing_ms = processing_time(&descriptor, &modifier, &mut run_sampler);
            results.push(GeneratorRunResult {
                kind: descriptor.kind,
                output,
                noisy_output,
                confidence,
                energy_consumed,
                processing_ms,
                crosstalk: Default::default(),
            });
        }

        let reinforced_links = apply_crosstalk(&mut results, &mut self.sampler);

        let coherence = if results.is_empty() {
            // 全部运行失败：中性连贯度
            0.5
        } else {
            let mean_confidence: f64 =
                results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64;
            (mean_confidence + reinforced_links as f64 * 0.05).clamp(0.0, 1.0)
        };

        let metadata = PoolMetadata {
            total_energy: results.iter().map(|r| r.energy_consumed).sum(),
            total_processing_ms: results.iter().map(|r| r.processing_ms).sum(),
            reinforced_links,
            cycle: self.cycle,
        };

        tracing::info!(
            cycle = self.cycle,
            active = active_kinds.len(),
            coherence,
            actions = outcome.actions.len(),
            "generator pool cycle complete"
        );

        Ok(PoolOutput {
            results,
            active_kinds,
            coherence,
            middleware_actions: outcome.actions,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_activation_never_empty() {
        // 低能量 + 各种查询类型下跑多个种子，激活集永不为空
        let mut ctx = EnvironmentalContext::default();
        ctx.cognitive.energy = 0.1;
        for seed in 0..32 {
            let mut pool = GeneratorPool::seeded(PoolConfig::default(), seed);
            let query = Query::new("anything", QueryType::CreativeExploration);
            let output = pool.process(&query, &ctx).await.unwrap();
            assert!(!output.active_kinds.is_empty());
        }
    }

    #[tokio::test]
    async fn test_current_situation_prefers_reality() {
        let ctx = EnvironmentalContext::default();
        let mut reality_hits = 0;
        for seed in 0..64 {
            let mut pool = GeneratorPool::seeded(PoolConfig::default(), seed);
            let query = Query::new("what is going on around me right now?", QueryType::CurrentSituation);
            let output = pool.process(&query, &ctx).await.unwrap();
            if output.active_kinds.contains(&GeneratorKind::Reality) {
                reality_hits += 1;
            }
        }
        // 激活概率 0.9，命中应占绝大多数
        assert!(reality_hits > 48);
    }

    #[tokio::test]
    async fn test_results_follow_catalogue_order() {
        let mut pool = GeneratorPool::seeded(PoolConfig::default(), 77);
        let query = Query::new("trace the recurring patterns in my week.", QueryType::PatternAnalysis);
        let output = pool
            .process(&query, &EnvironmentalContext::default())
            .await
            .unwrap();
        let kinds: Vec<GeneratorKind> = output.results.iter().map(|r| r.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }

    #[tokio::test]
    async fn test_coherence_and_confidence_bounded() {
        let mut pool = GeneratorPool::seeded(PoolConfig::default(), 5);
        let query = Query::new("will this plan work out next month?", QueryType::Prediction);
        let output = pool
            .process(&query, &EnvironmentalContext::default())
            .await
            .unwrap();
        assert!((0.0..=1.0).contains(&output.coherence));
        for result in &output.results {
            assert!((0.0..=1.0).contains(&result.confidence));
        }
        assert!(output.activity_ratio() > 0.0);
    }
}
