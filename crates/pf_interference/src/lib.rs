//! # pf_interference - PsycheFlow Interference Engine
//!
//! 把并发活跃的认知子过程建模为振荡器，做两两干涉分类，
//! 在有害模式出现时注入矫正噪声，并以熔断器硬性压制
//! 反刍/焦虑螺旋/认知过载三类危险回路。

pub mod oscillator;
pub mod pattern;
pub mod noise;
pub mod breaker;
pub mod engine;

pub use breaker::BreakerFlags;
pub use engine::{
    ActivitySnapshot, DerivedIndices, InterferenceConfig, InterferenceEngine, InterferenceReport,
};
pub use noise::{NoiseIntervention, NoiseKind, Urgency};
pub use oscillator::{Oscillator, OscillatorKind, OscillatorProfile, OscillatorProfiles};
pub use pattern::{classify, InterferencePattern, InterferenceType, PatternKey};
