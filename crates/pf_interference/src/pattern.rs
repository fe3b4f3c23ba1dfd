//! 干涉模式
//!
//! 分类是频率比与相位差的确定性函数；随机性只进入
//! 合成振幅/相干场采样，从不进入分类本身。
//! 模式键是对称的种类对 (规范排序)，外加一个全局聚合项。

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};

use crate::oscillator::{Oscillator, OscillatorKind};

/// 可判定为共振的谐波比集合
pub const HARMONIC_RATIOS: [f64; 8] = [
    0.5,
    2.0,
    1.0 / 3.0,
    3.0,
    0.25,
    4.0,
    0.2,
    5.0,
];

/// 干涉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterferenceType {
    /// 相长
    Constructive,
    /// 相消
    Destructive,
    /// 共振
    Resonance,
    /// 拍频
    Beating,
    /// 混沌
    Chaotic,
}

/// 模式键：规范排序的无序种类对，或全局聚合项
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PatternKey {
    Pair(OscillatorKind, OscillatorKind),
    Global,
}

impl PatternKey {
    /// 构造规范排序的对键，(a,b) 与 (b,a) 等价
    pub fn pair(a: OscillatorKind, b: OscillatorKind) -> Self {
        if a <= b {
            PatternKey::Pair(a, b)
        } else {
            PatternKey::Pair(b, a)
        }
    }

    /// 该键是否触及指定种类
    pub fn touches(&self, kind: OscillatorKind) -> bool {
        matches!(self, PatternKey::Pair(a, b) if *a == kind || *b == kind)
    }
}

/// 一条干涉模式 (每周期从当前振荡器集重算)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterferencePattern {
    /// 键
    pub key: PatternKey,
    /// 干涉类型
    pub interference_type: InterferenceType,
    /// 强度 = 易感性积 × 振幅积
    pub strength: f64,
    /// 合成振幅
    pub resultant_amplitude: f64,
    /// 相干性效应
    pub coherence_effect: f64,
    /// 稳定性影响
    pub stability_impact: f64,
    /// 情绪冲击
    pub emotional_impact: f64,
    /// 参与振荡器数 (对为 2，全局为全部)
    pub oscillator_count: usize,
    /// 参与振荡器平均频率
    pub mean_frequency: f64,
    /// 过载熔断后的降优先级标记
    pub reduced_priority: bool,
}

/// 两两干涉分类：频率比 r 与折叠到 [0,π] 的相位差的确定性函数
pub fn classify(f1: f64, f2: f64, phase_diff: f64) -> InterferenceType {
    if !(f1.is_finite() && f2.is_finite()) || f1 <= 0.0 || f2 <= 0.0 {
        return InterferenceType::Chaotic;
    }
    let r = f1 / f2;
    let dphi = {
        let wrapped = phase_diff.abs().rem_euclid(std::f64::consts::TAU);
        if wrapped > std::f64::consts::PI {
            std::f64::consts::TAU - wrapped
        } else {
            wrapped
        }
    };

    let quarter_pi = std::f64::consts::FRAC_PI_4;
    if (r - 1.0).abs() < 0.1 {
        if dphi < quarter_pi {
            return InterferenceType::Constructive;
        }
        if dphi > 3.0 * quarter_pi {
            return InterferenceType::Destructive;
        }
    }
    if HARMONIC_RATIOS.iter().any(|h| (r - h).abs() < 0.1) {
        return InterferenceType::Resonance;
    }
    if (r - 1.0).abs() < 0.2 {
        return InterferenceType::Beating;
    }
    InterferenceType::Chaotic
}

/// 从一对振荡器计算干涉模式
pub fn compute_pair_pattern(
    a: &Oscillator,
    b: &Oscillator,
    sampler: &mut dyn Sampler,
) -> InterferencePattern {
    let interference_type = classify(a.frequency, b.frequency, a.phase - b.phase);
    let strength = (a.susceptibility * b.susceptibility) * (a.amplitude * b.amplitude);

    let resultant_amplitude = match interference_type {
        InterferenceType::Constructive => a.amplitude + b.amplitude,
        InterferenceType::Destructive => (a.amplitude - b.amplitude).abs(),
        InterferenceType::Resonance => (a.amplitude * b.amplitude).sqrt() * 1.5,
        InterferenceType::Beating => (a.amplitude + b.amplitude) / 2.0,
        InterferenceType::Chaotic => {
            let lo = a.amplitude.min(b.amplitude);
            let hi = a.amplitude.max(b.amplitude);
            if hi - lo < f64::EPSILON {
                lo
            } else {
                sampler.uniform(lo, hi)
            }
        }
    };

    let bounded_strength = strength.min(1.0);
    let coherence_effect = match interference_type {
        InterferenceType::Constructive => 0.6 + 0.2 * bounded_strength,
        InterferenceType::Destructive => (0.3 - 0.2 * bounded_strength).max(0.0),
        InterferenceType::Resonance => 0.7 + 0.2 * bounded_strength,
        InterferenceType::Beating => 0.45,
        InterferenceType::Chaotic => sampler.uniform(0.0, 0.35),
    }
    .clamp(0.0, 1.0);

    let joint_stability = a.stability * b.stability;
    let stability_impact = match interference_type {
        InterferenceType::Constructive | InterferenceType::Resonance => {
            (joint_stability * 1.6).min(1.0)
        }
        InterferenceType::Beating => joint_stability * 0.8,
        InterferenceType::Destructive => joint_stability * 0.6,
        InterferenceType::Chaotic => joint_stability * 0.4,
    };

    let emotional_impact = if a.kind == OscillatorKind::Emotional {
        a.amplitude.min(1.0)
    } else if b.kind == OscillatorKind::Emotional {
        b.amplitude.min(1.0)
    } else {
        bounded_strength * 0.3
    };

    InterferencePattern {
        key: PatternKey::pair(a.kind, b.kind),
        interference_type,
        strength,
        resultant_amplitude,
        coherence_effect,
        stability_impact,
        emotional_impact,
        oscillator_count: 2,
        mean_frequency: (a.frequency + b.frequency) / 2.0,
        reduced_priority: false,
    }
}

/// 全局聚合项：振荡器数、平均频率/振幅、相干场采样
pub fn compute_global_pattern(
    oscillators: &[Oscillator],
    sampler: &mut dyn Sampler,
) -> InterferencePattern {
    let count = oscillators.len();
    let (mean_frequency, mean_amplitude, mean_stability) = if count == 0 {
        (0.5, 0.5, 0.5)
    } else {
        let n = count as f64;
        (
            oscillators.iter().map(|o| o.frequency).sum::<f64>() / n,
            oscillators.iter().map(|o| o.amplitude).sum::<f64>() / n,
            oscillators.iter().map(|o| o.stability).sum::<f64>() / n,
        )
    };
    let coherence_field = (sampler.uniform(0.3, 0.9) * 0.5 + mean_stability * 0.5).clamp(0.0, 1.0);

    InterferencePattern {
        key: PatternKey::Global,
        interference_type: if coherence_field >= 0.5 {
            InterferenceType::Constructive
        } else {
            InterferenceType::Beating
        },
        strength: mean_amplitude,
        resultant_amplitude: mean_amplitude,
        coherence_effect: coherence_field,
        stability_impact: mean_stability,
        emotional_impact: 0.0,
        oscillator_count: count,
        mean_frequency,
        reduced_priority: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ratio_small_phase_is_constructive() {
        // 场景：频率 0.5/0.5 (比 1.0)，相位差 0.1 rad
        assert_eq!(classify(0.5, 0.5, 0.1), InterferenceType::Constructive);
    }

    #[test]
    fn test_harmonic_ratio_is_resonance() {
        // 场景：频率 0.2/0.1 (比 2.0)，谐波匹配
        assert_eq!(classify(0.2, 0.1, 1.0), InterferenceType::Resonance);
    }

    #[test]
    fn test_unit_ratio_opposed_phase_is_destructive() {
        assert_eq!(
            classify(1.0, 1.0, std::f64::consts::PI),
            InterferenceType::Destructive
        );
    }

    #[test]
    fn test_near_unit_mid_phase_is_beating() {
        // |r−1| < 0.2 且未落入其他分类
        assert_eq!(
            classify(1.15, 1.0, std::f64::consts::FRAC_PI_2),
            InterferenceType::Beating
        );
    }

    #[test]
    fn test_far_ratio_is_chaotic() {
        assert_eq!(classify(7.3, 1.0, 0.3), InterferenceType::Chaotic);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for _ in 0..32 {
            assert_eq!(classify(0.5, 0.5, 0.1), classify(0.5, 0.5, 0.1));
        }
    }

    #[test]
    fn test_degenerate_frequency_is_chaotic() {
        assert_eq!(classify(0.0, 1.0, 0.0), InterferenceType::Chaotic);
        assert_eq!(classify(f64::NAN, 1.0, 0.0), InterferenceType::Chaotic);
    }

    #[test]
    fn test_pattern_key_is_symmetric() {
        assert_eq!(
            PatternKey::pair(OscillatorKind::Stress, OscillatorKind::Attention),
            PatternKey::pair(OscillatorKind::Attention, OscillatorKind::Stress)
        );
    }
}
