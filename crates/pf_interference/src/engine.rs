//! 干涉引擎
//!
//! 每个推理会话一个实例；每个周期从零实例化振荡器集，
//! 两两重算干涉模式，依次执行噪声注入与熔断器，
//! 最后给出派生指标快照。振荡器集只被本实例持有。

use std::collections::BTreeMap;

use pf_core::{EnvironmentalContext, Result};
use pf_sampling::{Sampler, StdSampler};
use serde::{Deserialize, Serialize};

use crate::breaker::{run_breakers, BreakerConfig, BreakerFlags, BreakerMetrics};
use crate::noise::{assess_and_inject, NoiseConfig, NoiseIntervention};
use crate::oscillator::{Oscillator, OscillatorKind, OscillatorProfiles};
use crate::pattern::{
    compute_global_pattern, compute_pair_pattern, InterferencePattern, InterferenceType,
    PatternKey,
};

/// 生成器池侧的活动快照。
/// 引擎只消费这两个标量，不依赖池的输出格式。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    /// 生成器激活比率 [0,1]
    pub generator_activity: f64,
    /// 池连贯性评分 [0,1]
    pub coherence: f64,
    /// 调用方是否声明创造性任务
    pub creative_task: bool,
}

/// 引擎配置
#[derive(Debug, Clone, Default)]
pub struct InterferenceConfig {
    /// 振荡器画像
    pub profiles: OscillatorProfiles,
    /// 噪声阈值
    pub noise: NoiseConfig,
    /// 熔断阈值
    pub breakers: BreakerConfig,
}

/// 每周期派生指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedIndices {
    /// 整体相干性 (相干效应均值)
    pub overall_coherence: f64,
    /// 模式稳定性 (稳定性影响均值)
    pub pattern_stability: f64,
    /// 认知共振占比
    pub cognitive_resonance: f64,
    /// 注意力聚焦度
    pub attention_focus: f64,
    /// 情绪振幅
    pub emotional_amplitude: f64,
    /// 创造潜力 (混沌/拍频占比)
    pub creative_potential: f64,
    /// 反刍风险
    pub rumination_risk: f64,
    /// 认知负载
    pub cognitive_load: f64,
    /// 应激指标
    pub stress_indicators: f64,
}

/// 一个周期的完整干涉报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterferenceReport {
    /// 振荡器快照 (熔断后状态)
    pub oscillators: Vec<Oscillator>,
    /// 键控干涉模式 (含全局聚合项)
    pub patterns: Vec<InterferencePattern>,
    /// 施加的噪声介入
    pub interventions: Vec<NoiseIntervention>,
    /// 熔断状态
    pub breakers: BreakerFlags,
    /// 整体噪声水平
    pub noise_level: f64,
    /// 派生指标
    pub indices: DerivedIndices,
}

impl InterferenceReport {
    /// 按键查找模式
    pub fn pattern(&self, key: PatternKey) -> Option<&InterferencePattern> {
        self.patterns.iter().find(|p| p.key == key)
    }
}

/// 干涉引擎
pub struct InterferenceEngine {
    config: InterferenceConfig,
    sampler: StdSampler,
    /// 紧急断路累计计数 (跨周期)
    emergency_count: u32,
}

impl InterferenceEngine {
    /// 以固定种子创建
    pub fn seeded(config: InterferenceConfig, seed: u64) -> Self {
        Self {
            config,
            sampler: StdSampler::seeded(seed),
            emergency_count: 0,
        }
    }

    /// 以系统熵创建默认配置的引擎
    pub fn default_engine() -> Self {
        Self::seeded(InterferenceConfig::default(), pf_sampling::random_seed())
    }

    /// 历史紧急断路次数
    pub fn emergency_count(&self) -> u32 {
        self.emergency_count
    }

    /// 按活跃条件实例化本周期的振荡器集
    fn instantiate_oscillators(
        &mut self,
        activity: &ActivitySnapshot,
        ctx: &EnvironmentalContext,
    ) -> Vec<Oscillator> {
        let profiles = self.config.profiles.clone();
        let mut oscillators = Vec::new();

        // 注意力：振幅随生成器激活比率缩放
        oscillators.push(Oscillator::new(
            OscillatorKind::Attention,
            profiles.profile(OscillatorKind::Attention),
            activity.generator_activity.clamp(0.0, 1.0),
            &mut self.sampler,
        ));

        // 情绪：振幅随外部情绪强度信号缩放，携带效价
        let mut emotional = Oscillator::new(
            OscillatorKind::Emotional,
            profiles.profile(OscillatorKind::Emotional),
            ctx.cognitive.emotional_intensity.clamp(0.0, 1.5),
            &mut self.sampler,
        );
        emotional.valence = Some(self.sampler.uniform(-1.0, 1.0));
        oscillators.push(emotional);

        // 思维模式：恒在
        oscillators.push(Oscillator::new(
            OscillatorKind::ThoughtPattern,
            profiles.profile(OscillatorKind::ThoughtPattern),
            0.7,
            &mut self.sampler,
        ));

        // 应激：门控在 stress > 0.3
        if ctx.cognitive.stress > 0.3 {
            oscillators.push(Oscillator::new(
                OscillatorKind::Stress,
                profiles.profile(OscillatorKind::Stress),
                ctx.cognitive.stress,
                &mut self.sampler,
            ));
        }

        // 动机：门控在动机信号存在
        if let Some(motivation) = ctx.cognitive.motivation {
            oscillators.push(Oscillator::new(
                OscillatorKind::Motivation,
                profiles.profile(OscillatorKind::Motivation),
                motivation.clamp(0.0, 1.0),
                &mut self.sampler,
            ));
        }

        oscillators
    }

    /// 计算一个干涉周期
    pub async fn calculate(
        &mut self,
        activity: &ActivitySnapshot,
        ctx: &EnvironmentalContext,
    ) -> Result<InterferenceReport> {
        let mut oscillators = self.instantiate_oscillators(activity, ctx);

        // 两两干涉 + 全局聚合项
        let mut patterns: BTreeMap<PatternKey, InterferencePattern> = BTreeMap::new();
        for i in 0..oscillators.len() {
            for j in (i + 1)..oscillators.len() {
                let pattern =
                    compute_pair_pattern(&oscillators[i], &oscillators[j], &mut self.sampler);
                patterns.insert(pattern.key, pattern);
            }
        }
        let global = compute_global_pattern(&oscillators, &mut self.sampler);
        patterns.insert(PatternKey::Global, global);

        // 噪声注入 (保护→创造→适应→紧急，累积)
        let noise_outcome = assess_and_inject(
            &mut patterns,
            &oscillators,
            activity.creative_task,
            &self.config.noise,
            &mut self.sampler,
        );
        if noise_outcome.emergency_fired {
            self.emergency_count += 1;
        }

        // 熔断器 (独立于噪声评估)
        let (breakers, metrics) = run_breakers(
            &mut patterns,
            &mut oscillators,
            &self.config.profiles,
            &self.config.breakers,
        );

        let indices = self.derive_indices(&oscillators, &patterns, &metrics);

        tracing::info!(
            oscillators = oscillators.len(),
            patterns = patterns.len(),
            interventions = noise_outcome.interventions.len(),
            noise_level = noise_outcome.noise_level,
            "interference cycle complete"
        );

        Ok(InterferenceReport {
            oscillators,
            patterns: patterns.into_values().collect(),
            interventions: noise_outcome.interventions,
            breakers,
            noise_level: noise_outcome.noise_level,
            indices,
        })
    }

    /// 派生指标：空模式集时回退到中性 0.5
    fn derive_indices(
        &self,
        oscillators: &[Oscillator],
        patterns: &BTreeMap<PatternKey, InterferencePattern>,
        metrics: &BreakerMetrics,
    ) -> DerivedIndices {
        let pairs: Vec<&InterferencePattern> = patterns
            .values()
            .filter(|p| p.key != PatternKey::Global)
            .collect();
        let mean =
            |values: &dyn Fn(&InterferencePattern) -> f64| -> f64 {
                if pairs.is_empty() {
                    0.5
                } else {
                    pairs.iter().map(|p| values(p)).sum::<f64>() / pairs.len() as f64
                }
            };

        let overall_coherence = mean(&|p| p.coherence_effect);
        let pattern_stability = mean(&|p| p.stability_impact);
        let cognitive_resonance = if pairs.is_empty() {
            0.0
        } else {
            pairs
                .iter()
                .filter(|p| p.interference_type == InterferenceType::Resonance)
                .count() as f64
                / pairs.len() as f64
        };
        let creative_potential = if pairs.is_empty() {
            0.0
        } else {
            pairs
                .iter()
                .filter(|p| {
                    matches!(
                        p.interference_type,
                        InterferenceType::Chaotic | InterferenceType::Beating
                    )
                })
                .count() as f64
                / pairs.len() as f64
        };

        let amplitude_of = |kind: OscillatorKind| -> f64 {
            oscillators
                .iter()
                .find(|o| o.kind == kind)
                .map(|o| o.amplitude)
                .unwrap_or(0.0)
        };
        let attention_profile = self.config.profiles.profile(OscillatorKind::Attention);
        let (lo, hi) = attention_profile.amplitude_range;
        let attention_focus =
            ((amplitude_of(OscillatorKind::Attention) - lo) / (hi - lo).max(f64::EPSILON))
                .clamp(0.0, 1.0);

        DerivedIndices {
            overall_coherence,
            pattern_stability,
            cognitive_resonance,
            attention_focus,
            emotional_amplitude: amplitude_of(OscillatorKind::Emotional),
            creative_potential,
            rumination_risk: metrics.rumination_risk,
            cognitive_load: metrics.cognitive_load,
            stress_indicators: metrics.anxiety_risk,
        }
    }
}
