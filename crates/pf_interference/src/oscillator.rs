//! 振荡器模型
//!
//! 每个活跃认知子过程对应一个振荡器 (频率/振幅/相位/稳定性/易感性)。
//! 不变式：振幅在每次更新后都收敛回种类声明的范围。

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};

/// 振荡器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorKind {
    /// 注意力
    Attention,
    /// 情绪
    Emotional,
    /// 思维模式
    ThoughtPattern,
    /// 应激
    Stress,
    /// 动机
    Motivation,
}

impl OscillatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OscillatorKind::Attention => "attention",
            OscillatorKind::Emotional => "emotional",
            OscillatorKind::ThoughtPattern => "thought_pattern",
            OscillatorKind::Stress => "stress",
            OscillatorKind::Motivation => "motivation",
        }
    }
}

impl std::fmt::Display for OscillatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 种类常量画像：基频、振幅范围、相位稳定性、干涉易感性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscillatorProfile {
    /// 基准频率 (Hz 等效)
    pub base_frequency: f64,
    /// 振幅范围 (收敛目标)
    pub amplitude_range: (f64, f64),
    /// 相位稳定性
    pub phase_stability: f64,
    /// 干涉易感性
    pub susceptibility: f64,
}

/// 全种类画像配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscillatorProfiles {
    pub attention: OscillatorProfile,
    pub emotional: OscillatorProfile,
    pub thought_pattern: OscillatorProfile,
    pub stress: OscillatorProfile,
    pub motivation: OscillatorProfile,
}

impl OscillatorProfiles {
    /// 指定种类的画像
    pub fn profile(&self, kind: OscillatorKind) -> &OscillatorProfile {
        match kind {
            OscillatorKind::Attention => &self.attention,
            OscillatorKind::Emotional => &self.emotional,
            OscillatorKind::ThoughtPattern => &self.thought_pattern,
            OscillatorKind::Stress => &self.stress,
            OscillatorKind::Motivation => &self.motivation,
        }
    }
}

impl Default for OscillatorProfiles {
    fn default() -> Self {
        Self {
            attention: OscillatorProfile {
                base_frequency: 8.0,
                amplitude_range: (0.2, 1.2),
                phase_stability: 0.6,
                susceptibility: 0.7,
            },
            emotional: OscillatorProfile {
                base_frequency: 4.0,
                amplitude_range: (0.1, 1.5),
                phase_stability: 0.4,
                susceptibility: 0.9,
            },
            thought_pattern: OscillatorProfile {
                base_frequency: 6.0,
                amplitude_range: (0.3, 1.0),
                phase_stability: 0.7,
                susceptibility: 0.6,
            },
            stress: OscillatorProfile {
                base_frequency: 10.0,
                amplitude_range: (0.1, 1.8),
                phase_stability: 0.3,
                susceptibility: 0.8,
            },
            motivation: OscillatorProfile {
                base_frequency: 5.0,
                amplitude_range: (0.2, 1.1),
                phase_stability: 0.5,
                susceptibility: 0.5,
            },
        }
    }
}

/// 活跃认知子过程的振荡器状态 (每个干涉周期可变)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oscillator {
    /// 种类
    pub kind: OscillatorKind,
    /// 频率，严格为正
    pub frequency: f64,
    /// 振幅，收敛在种类范围内
    pub amplitude: f64,
    /// 相位 [0, 2π)
    pub phase: f64,
    /// 相位稳定性 (种类常量)
    pub stability: f64,
    /// 干涉易感性 (种类常量)
    pub susceptibility: f64,
    /// 情绪效价 (仅情绪振荡器携带)
    pub valence: Option<f64>,
}

impl Oscillator {
    /// 创建振荡器。振幅按 `amplitude_scale` 缩放后立即收敛进范围。
    pub fn new(
        kind: OscillatorKind,
        profile: &OscillatorProfile,
        amplitude_scale: f64,
        sampler: &mut dyn Sampler,
    ) -> Self {
        let frequency = (profile.base_frequency * sampler.uniform(0.9, 1.1)).max(1e-3);
        let raw_amplitude = profile.amplitude_range.1 * amplitude_scale.max(0.0);
        let phase = sampler.uniform(0.0, std::f64::consts::TAU);
        let mut oscillator = Self {
            kind,
            frequency,
            amplitude: raw_amplitude,
            phase,
            stability: profile.phase_stability,
            susceptibility: profile.susceptibility,
            valence: None,
        };
        oscillator.clamp_amplitude(profile);
        oscillator
    }

    /// 振幅收敛不变式
    pub fn clamp_amplitude(&mut self, profile: &OscillatorProfile) {
        let (lo, hi) = profile.amplitude_range;
        if !self.amplitude.is_finite() {
            self.amplitude = lo;
        }
        self.amplitude = self.amplitude.clamp(lo, hi);
    }
}
