//! 矫正噪声
//!
//! 四种独立可触发、同周期可组合的噪声：保护性/创造性/适应性/紧急。
//! 按声明顺序依次施加，对同一份模式表累积生效；
//! 紧急噪声达到危急等级时整体噪声水平强制为 1.0。

use std::collections::BTreeMap;

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};

use crate::oscillator::{Oscillator, OscillatorKind};
use crate::pattern::{InterferencePattern, InterferenceType, PatternKey};

/// 噪声种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Protective,
    Creative,
    Adaptive,
    Emergency,
}

/// 紧迫程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Moderate,
    High,
    Critical,
}

/// 一次噪声介入记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseIntervention {
    /// 种类
    pub kind: NoiseKind,
    /// 强度
    pub intensity: f64,
    /// 紧迫程度
    pub urgency: Urgency,
    /// 受影响的模式键
    pub targets: Vec<PatternKey>,
    /// 介入说明
    pub note: String,
}

/// 噪声评估阈值配置
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// 创造性增强潜力阈值
    pub creative_threshold: f64,
    /// 僵化度阈值
    pub rigidity_threshold: f64,
    /// 判定僵化模式的稳定性影响下限
    pub rigid_stability_floor: f64,
    /// 紧急：应激振幅上限
    pub emergency_amplitude: f64,
    /// 紧急：相干崩塌下限
    pub emergency_coherence: f64,
    /// 紧急：相干崩塌伴随的强度下限
    pub emergency_strength: f64,
    /// 保护性：高强度共振判定
    pub protective_resonance_strength: f64,
    /// 保护性：混沌模式情绪冲击判定
    pub protective_emotional_impact: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            creative_threshold: 0.6,
            rigidity_threshold: 0.7,
            rigid_stability_floor: 0.8,
            emergency_amplitude: 1.5,
            emergency_coherence: 0.1,
            emergency_strength: 0.7,
            protective_resonance_strength: 0.6,
            protective_emotional_impact: 0.7,
        }
    }
}

/// 噪声评估与注入的汇总结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseOutcome {
    /// 施加的介入 (按施加顺序)
    pub interventions: Vec<NoiseIntervention>,
    /// 整体噪声水平 [0,1]
    pub noise_level: f64,
    /// 本周期是否触发紧急断路
    pub emergency_fired: bool,
}

/// 保护性噪声目标判定
fn protective_targets(
    patterns: &BTreeMap<PatternKey, InterferencePattern>,
    config: &NoiseConfig,
) -> Vec<PatternKey> {
    patterns
        .iter()
        .filter(|(key, p)| match p.interference_type {
            InterferenceType::Destructive => key.touches(OscillatorKind::Attention),
            InterferenceType::Resonance => {
                key.touches(OscillatorKind::Stress)
                    && p.strength > config.protective_resonance_strength
            }
            InterferenceType::Chaotic => {
                p.emotional_impact > config.protective_emotional_impact
            }
            _ => false,
        })
        .map(|(key, _)| *key)
        .collect()
}

/// 评估并注入全部噪声，按 保护→创造→适应→紧急 顺序累积
pub fn assess_and_inject(
    patterns: &mut BTreeMap<PatternKey, InterferencePattern>,
    oscillators: &[Oscillator],
    creative_task: bool,
    config: &NoiseConfig,
    sampler: &mut dyn Sampler,
) -> NoiseOutcome {
    let mut interventions = Vec::new();
    let mut noise_level: f64 = 0.0;
    let mut emergency_fired = false;

    // 保护性：削弱命中模式的强度并加入随机化变异
    let targets = protective_targets(patterns, config);
    if !targets.is_empty() {
        let intensity = sampler.uniform(0.3, 0.6);
        for key in &targets {
            if let Some(p) = patterns.get_mut(key) {
                p.strength *= 1.0 - intensity;
                p.resultant_amplitude =
                    (p.resultant_amplitude + sampler.gaussian(0.0, 0.05)).max(0.0);
            }
        }
        noise_level += intensity * 0.5;
        interventions.push(NoiseIntervention {
            kind: NoiseKind::Protective,
            intensity,
            urgency: Urgency::High,
            targets,
            note: "harmful pattern strength reduced".to_string(),
        });
    }

    // 创造性：混沌/拍频占比高且调用方声明创造任务时放大其振幅
    let pair_count = patterns
        .values()
        .filter(|p| p.key != PatternKey::Global)
        .count();
    if pair_count > 0 {
        let loose = patterns
            .values()
            .filter(|p| {
                p.key != PatternKey::Global
                    && matches!(
                        p.interference_type,
                        InterferenceType::Chaotic | InterferenceType::Beating
                    )
            })
            .count();
        let creative_potential = loose as f64 / pair_count as f64;
        if creative_potential > config.creative_threshold && creative_task {
            let intensity = sampler.uniform(0.2, 0.5);
            let targets: Vec<PatternKey> = patterns
                .iter()
                .filter(|(key, p)| {
                    **key != PatternKey::Global
                        && matches!(
                            p.interference_type,
                            InterferenceType::Chaotic | InterferenceType::Beating
                        )
                })
                .map(|(key, _)| *key)
                .collect();
            for key in &targets {
                if let Some(p) = patterns.get_mut(key) {
                    p.resultant_amplitude *= 1.0 + intensity;
                }
            }
            noise_level += intensity * 0.4;
            interventions.push(NoiseIntervention {
                kind: NoiseKind::Creative,
                intensity,
                urgency: Urgency::Low,
                targets,
                note: format!("creative amplification, potential {:.2}", creative_potential),
            });
        }
    }

    // 适应性：僵化度过高时松动过稳模式
    if pair_count > 0 {
        let rigid: Vec<PatternKey> = patterns
            .iter()
            .filter(|(key, p)| {
                **key != PatternKey::Global && p.stability_impact > config.rigid_stability_floor
            })
            .map(|(key, _)| *key)
            .collect();
        let rigidity = rigid.len() as f64 / pair_count as f64;
        if rigidity > config.rigidity_threshold {
            let intensity = sampler.uniform(0.2, 0.4);
            for key in &rigid {
                if let Some(p) = patterns.get_mut(key) {
                    p.stability_impact *= 0.7;
                    p.strength *= 0.85;
                }
            }
            noise_level += intensity * 0.3;
            interventions.push(NoiseIntervention {
                kind: NoiseKind::Adaptive,
                intensity,
                urgency: Urgency::Moderate,
                targets: rigid,
                note: format!("rigidity loosened, score {:.2}", rigidity),
            });
        }
    }

    // 紧急：应激振幅越界或相干崩塌 → 均匀扰乱全部模式
    let stress_overload = oscillators
        .iter()
        .any(|o| o.kind == OscillatorKind::Stress && o.amplitude > config.emergency_amplitude);
    let coherence_collapse = patterns.values().any(|p| {
        p.coherence_effect < config.emergency_coherence && p.strength > config.emergency_strength
    });
    if stress_overload || coherence_collapse {
        emergency_fired = true;
        let targets: Vec<PatternKey> = patterns.keys().copied().collect();
        for p in patterns.values_mut() {
            p.strength *= 0.5;
            p.resultant_amplitude *= sampler.uniform(0.5, 0.9);
        }
        noise_level = 1.0;
        tracing::warn!(
            stress_overload,
            coherence_collapse,
            "emergency noise injected, all patterns disrupted"
        );
        interventions.push(NoiseIntervention {
            kind: NoiseKind::Emergency,
            intensity: 1.0,
            urgency: Urgency::Critical,
            targets,
            note: "uniform disruption under emergency condition".to_string(),
        });
    }

    NoiseOutcome {
        interventions,
        noise_level: noise_level.clamp(0.0, 1.0),
        emergency_fired,
    }
}
