//! 环境上下文模型
//!
//! 外部编排层提供的环境读数，物理/社会/时间/认知四个子域，
//! 每个字段独立可缺省，缺省值为中性读数。

use serde::{Deserialize, Serialize};

/// 将任意读数收敛到 [0,1]，非有限值回退到中性 0.5
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// 物理环境读数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalContext {
    /// 环境噪声水平
    pub noise_level: f64,
    /// 拥挤程度
    pub crowding: f64,
    /// 舒适度
    pub comfort: f64,
}

impl Default for PhysicalContext {
    fn default() -> Self {
        Self {
            noise_level: 0.3,
            crowding: 0.3,
            comfort: 0.5,
        }
    }
}

/// 社会环境读数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialContext {
    /// 社会压力
    pub social_pressure: f64,
    /// 是否处于被观察状态
    pub being_observed: f64,
    /// 环境熟悉度
    pub familiarity: f64,
}

impl Default for SocialContext {
    fn default() -> Self {
        Self {
            social_pressure: 0.3,
            being_observed: 0.2,
            familiarity: 0.6,
        }
    }
}

/// 时间环境读数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalContext {
    /// 截止期限压力
    pub deadline_pressure: f64,
    /// 当前时段的精力基线
    pub time_of_day_energy: f64,
}

impl Default for TemporalContext {
    fn default() -> Self {
        Self {
            deadline_pressure: 0.2,
            time_of_day_energy: 0.6,
        }
    }
}

/// 认知状态读数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveContext {
    /// 认知能量
    pub energy: f64,
    /// 注意力余量
    pub attention: f64,
    /// 应激水平
    pub stress: f64,
    /// 动机强度 (缺失时动机振荡器不实例化)
    pub motivation: Option<f64>,
    /// 情绪强度信号 (来自外部记忆/情绪子系统)
    pub emotional_intensity: f64,
}

impl Default for CognitiveContext {
    fn default() -> Self {
        Self {
            energy: 0.6,
            attention: 0.6,
            stress: 0.2,
            motivation: None,
            emotional_intensity: 0.4,
        }
    }
}

/// 完整环境上下文
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentalContext {
    /// 物理子域
    pub physical: PhysicalContext,
    /// 社会子域
    pub social: SocialContext,
    /// 时间子域
    pub temporal: TemporalContext,
    /// 认知子域
    pub cognitive: CognitiveContext,
}

impl EnvironmentalContext {
    /// 聚合环境影响度，激活策略据此抬升现实取向生成器
    pub fn aggregate_influence(&self) -> f64 {
        let readings = [
            self.physical.noise_level,
            self.physical.crowding,
            self.social.social_pressure,
            self.social.being_observed,
            self.temporal.deadline_pressure,
            self.cognitive.stress,
        ];
        let sum: f64 = readings.iter().map(|v| clamp_unit(*v)).sum();
        sum / readings.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_is_neutral() {
        let ctx = EnvironmentalContext::default();
        let influence = ctx.aggregate_influence();
        assert!(influence > 0.0 && influence < 0.7);
    }

    #[test]
    fn test_clamp_unit_recovers_nan() {
        assert_eq!(clamp_unit(f64::NAN), 0.5);
        assert_eq!(clamp_unit(2.0), 1.0);
        assert_eq!(clamp_unit(-1.0), 0.0);
    }

    #[test]
    fn test_high_pressure_raises_influence() {
        let mut ctx = EnvironmentalContext::default();
        ctx.physical.noise_level = 0.9;
        ctx.physical.crowding = 0.9;
        ctx.social.social_pressure = 0.9;
        ctx.temporal.deadline_pressure = 0.9;
        ctx.cognitive.stress = 0.9;
        assert!(ctx.aggregate_influence() > 0.7);
    }
}
