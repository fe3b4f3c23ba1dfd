//! 熔断器
//!
//! 三个独立布尔熔断器，在噪声注入之后评估：
//! 反刍 (思维-情绪回路) / 焦虑螺旋 (应激指标) / 认知过载 (强度×振幅)。
//! 可同时触发多个；每个只压制自己对应的模式或振荡器。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::oscillator::{Oscillator, OscillatorKind, OscillatorProfiles};
use crate::pattern::{InterferencePattern, InterferenceType, PatternKey};

/// 熔断阈值配置
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// 反刍风险阈值
    pub rumination_threshold: f64,
    /// 焦虑螺旋风险阈值
    pub anxiety_threshold: f64,
    /// 认知过载阈值
    pub overload_threshold: f64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            rumination_threshold: 0.8,
            anxiety_threshold: 0.8,
            overload_threshold: 0.9,
        }
    }
}

/// 熔断状态 (相互独立)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BreakerFlags {
    /// 反刍熔断
    pub rumination: bool,
    /// 焦虑螺旋熔断
    pub anxiety_spiral: bool,
    /// 认知过载熔断
    pub cognitive_overload: bool,
}

/// 熔断评估过程量，回传给派生指标
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BreakerMetrics {
    pub rumination_risk: f64,
    pub anxiety_risk: f64,
    pub cognitive_load: f64,
}

fn pair_patterns(
    patterns: &BTreeMap<PatternKey, InterferencePattern>,
) -> impl Iterator<Item = &InterferencePattern> {
    patterns.values().filter(|p| p.key != PatternKey::Global)
}

/// 反刍风险：思维-情绪共振/相长回路的强度加权计数，按模式数归一
pub fn rumination_risk(patterns: &BTreeMap<PatternKey, InterferencePattern>) -> f64 {
    let count = pair_patterns(patterns).count();
    if count == 0 {
        return 0.0;
    }
    let loop_weight: f64 = pair_patterns(patterns)
        .filter(|p| {
            p.key.touches(OscillatorKind::ThoughtPattern)
                && p.key.touches(OscillatorKind::Emotional)
                && matches!(
                    p.interference_type,
                    InterferenceType::Resonance | InterferenceType::Constructive
                )
        })
        .map(|p| p.strength * 1.5)
        .sum();
    (loop_weight / count as f64).clamp(0.0, 1.0)
}

/// 焦虑螺旋风险：应激振荡器的振幅爬升 + 频率加速 + 相干崩解
pub fn anxiety_risk(
    oscillators: &[Oscillator],
    patterns: &BTreeMap<PatternKey, InterferencePattern>,
    profiles: &OscillatorProfiles,
) -> f64 {
    let Some(stress) = oscillators.iter().find(|o| o.kind == OscillatorKind::Stress) else {
        return 0.0;
    };
    let profile = profiles.profile(OscillatorKind::Stress);
    let (lo, hi) = profile.amplitude_range;
    let span = (hi - lo).max(f64::EPSILON);
    let escalation = ((stress.amplitude - lo) / span).clamp(0.0, 1.0);
    let acceleration = (stress.frequency / profile.base_frequency.max(f64::EPSILON))
        .min(2.0)
        / 2.0;

    let stress_patterns: Vec<&InterferencePattern> = pair_patterns(patterns)
        .filter(|p| p.key.touches(OscillatorKind::Stress))
        .collect();
    let breakdown = if stress_patterns.is_empty() {
        0.5
    } else {
        let mean_coherence: f64 = stress_patterns
            .iter()
            .map(|p| p.coherence_effect)
            .sum::<f64>()
            / stress_patterns.len() as f64;
        1.0 - mean_coherence
    };

    (escalation * 0.5 + acceleration * 0.2 + breakdown * 0.3).clamp(0.0, 1.0)
}

/// 认知负载：强度 × 合成振幅求和后归一
pub fn cognitive_load(patterns: &BTreeMap<PatternKey, InterferencePattern>) -> f64 {
    let count = pair_patterns(patterns).count();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = pair_patterns(patterns)
        .map(|p| p.strength * p.resultant_amplitude)
        .sum();
    (total / (count as f64 * 4.0)).clamp(0.0, 1.0)
}

/// 评估并执行全部熔断器，返回独立标志与过程量
pub fn run_breakers(
    patterns: &mut BTreeMap<PatternKey, InterferencePattern>,
    oscillators: &mut [Oscillator],
    profiles: &OscillatorProfiles,
    config: &BreakerConfig,
) -> (BreakerFlags, BreakerMetrics) {
    let metrics = BreakerMetrics {
        rumination_risk: rumination_risk(patterns),
        anxiety_risk: anxiety_risk(oscillators, patterns, profiles),
        cognitive_load: cognitive_load(patterns),
    };
    let mut flags = BreakerFlags::default();

    if metrics.rumination_risk > config.rumination_threshold {
        flags.rumination = true;
        for p in patterns.values_mut() {
            if p.key.touches(OscillatorKind::ThoughtPattern) {
                p.strength *= 0.3;
            }
        }
        tracing::warn!(risk = metrics.rumination_risk, "rumination breaker fired");
    }

    if metrics.anxiety_risk > config.anxiety_threshold {
        flags.anxiety_spiral = true;
        for oscillator in oscillators.iter_mut() {
            if oscillator.kind == OscillatorKind::Stress {
                oscillator.amplitude *= 0.4;
                oscillator.clamp_amplitude(profiles.profile(OscillatorKind::Stress));
            }
        }
        tracing::warn!(risk = metrics.anxiety_risk, "anxiety spiral breaker fired");
    }

    if metrics.cognitive_load > config.overload_threshold {
        flags.cognitive_overload = true;
        for p in patterns.values_mut() {
            p.strength *= 0.5;
            p.reduced_priority = true;
        }
        tracing::warn!(load = metrics.cognitive_load, "cognitive overload breaker fired");
    }

    (flags, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_sampling::StdSampler;

    fn pattern(
        key: PatternKey,
        interference_type: InterferenceType,
        strength: f64,
        resultant_amplitude: f64,
        coherence_effect: f64,
    ) -> InterferencePattern {
        InterferencePattern {
            key,
            interference_type,
            strength,
            resultant_amplitude,
            coherence_effect,
            stability_impact: 0.5,
            emotional_impact: 0.3,
            oscillator_count: 2,
            mean_frequency: 5.0,
            reduced_priority: false,
        }
    }

    fn stress_oscillator(amplitude: f64, frequency: f64) -> Oscillator {
        let profiles = OscillatorProfiles::default();
        let mut sampler = StdSampler::seeded(1);
        let mut osc = Oscillator::new(
            OscillatorKind::Stress,
            profiles.profile(OscillatorKind::Stress),
            0.5,
            &mut sampler,
        );
        osc.amplitude = amplitude;
        osc.frequency = frequency;
        osc
    }

    #[test]
    fn test_rumination_fires_alone() {
        // 仅满足反刍条件：思维-情绪共振回路，无应激振荡器，负载低
        let key = PatternKey::pair(OscillatorKind::ThoughtPattern, OscillatorKind::Emotional);
        let mut patterns = BTreeMap::new();
        patterns.insert(key, pattern(key, InterferenceType::Resonance, 0.9, 0.5, 0.6));
        let mut oscillators: Vec<Oscillator> = Vec::new();
        let profiles = OscillatorProfiles::default();
        let (flags, metrics) = run_breakers(
            &mut patterns,
            &mut oscillators,
            &profiles,
            &BreakerConfig::default(),
        );
        assert!(flags.rumination);
        assert!(!flags.anxiety_spiral);
        assert!(!flags.cognitive_overload);
        assert!(metrics.rumination_risk > 0.8);
        // 思维模式强度被压到 30%
        assert!((patterns[&key].strength - 0.9 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_anxiety_fires_alone() {
        // 仅满足焦虑条件：应激振荡器拉满，模式不构成反刍回路也不过载
        let key = PatternKey::pair(OscillatorKind::Stress, OscillatorKind::Attention);
        let mut patterns = BTreeMap::new();
        patterns.insert(key, pattern(key, InterferenceType::Destructive, 0.4, 0.3, 0.0));
        let mut oscillators = vec![stress_oscillator(1.8, 20.0)];
        let profiles = OscillatorProfiles::default();
        let (flags, _) = run_breakers(
            &mut patterns,
            &mut oscillators,
            &profiles,
            &BreakerConfig::default(),
        );
        assert!(!flags.rumination);
        assert!(flags.anxiety_spiral);
        assert!(!flags.cognitive_overload);
        // 应激振幅被压到 40% 并保持范围不变式
        assert!((oscillators[0].amplitude - 1.8 * 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_overload_fires_alone() {
        // 仅满足过载条件：高强度×高振幅，但既非应激也非思维-情绪回路
        let key = PatternKey::pair(OscillatorKind::Attention, OscillatorKind::Motivation);
        let mut patterns = BTreeMap::new();
        patterns.insert(key, pattern(key, InterferenceType::Chaotic, 2.0, 2.0, 0.5));
        let mut oscillators: Vec<Oscillator> = Vec::new();
        let profiles = OscillatorProfiles::default();
        let (flags, metrics) = run_breakers(
            &mut patterns,
            &mut oscillators,
            &profiles,
            &BreakerConfig::default(),
        );
        assert!(!flags.rumination);
        assert!(!flags.anxiety_spiral);
        assert!(flags.cognitive_overload);
        assert!(metrics.cognitive_load > 0.9);
        assert!(patterns[&key].reduced_priority);
    }

    #[test]
    fn test_quiet_cycle_trips_nothing() {
        let key = PatternKey::pair(OscillatorKind::Attention, OscillatorKind::Emotional);
        let mut patterns = BTreeMap::new();
        patterns.insert(key, pattern(key, InterferenceType::Constructive, 0.3, 0.5, 0.7));
        let mut oscillators = vec![stress_oscillator(0.3, 10.0)];
        let profiles = OscillatorProfiles::default();
        let (flags, _) = run_breakers(
            &mut patterns,
            &mut oscillators,
            &profiles,
            &BreakerConfig::default(),
        );
        assert!(!flags.rumination && !flags.anxiety_spiral && !flags.cognitive_overload);
    }

    #[test]
    fn test_risks_clamped_to_unit() {
        let key = PatternKey::pair(OscillatorKind::ThoughtPattern, OscillatorKind::Emotional);
        let mut patterns = BTreeMap::new();
        patterns.insert(key, pattern(key, InterferenceType::Resonance, 50.0, 50.0, 0.5));
        assert!(rumination_risk(&patterns) <= 1.0);
        assert!(cognitive_load(&patterns) <= 1.0);
    }
}
