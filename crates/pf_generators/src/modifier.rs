//! 环境修正因子
//!
//! 将环境上下文折算成四个运行期乘子，叠加到每个生成器的运行上。

use pf_core::context::clamp_unit;
use pf_core::EnvironmentalContext;
use serde::{Deserialize, Serialize};

/// 环境修正因子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalModifier {
    /// 能量乘子 (低能量状态下降低消耗)
    pub energy_multiplier: f64,
    /// 噪声放大系数 (嘈杂/拥挤环境放大扰动)
    pub noise_amplification: f64,
    /// 处理速度乘子 (期限压力下提速)
    pub speed_multiplier: f64,
    /// 置信度调整 (不利环境压低置信度)
    pub confidence_adjustment: f64,
}

impl EnvironmentalModifier {
    /// 从环境上下文折算修正因子
    pub fn from_context(ctx: &EnvironmentalContext) -> Self {
        let energy = clamp_unit(ctx.cognitive.energy);
        let crowding = clamp_unit(ctx.physical.crowding);
        let noise = clamp_unit(ctx.physical.noise_level);
        let deadline = clamp_unit(ctx.temporal.deadline_pressure);
        let stress = clamp_unit(ctx.cognitive.stress);

        let energy_multiplier = if energy < 0.4 { 0.7 } else { 1.0 };

        let mut noise_amplification = 1.0;
        if crowding > 0.6 {
            noise_amplification += 0.3;
        }
        if noise > 0.5 {
            noise_amplification += 0.2;
        }
        if stress > 0.6 {
            noise_amplification += 0.3;
        }

        let speed_multiplier = if deadline > 0.7 { 1.4 } else { 1.0 };

        let mut confidence_adjustment = 1.0;
        if deadline > 0.7 {
            confidence_adjustment -= 0.1;
        }
        if energy < 0.4 {
            confidence_adjustment -= 0.1;
        }
        if stress > 0.6 {
            confidence_adjustment -= 0.1;
        }

        Self {
            energy_multiplier,
            noise_amplification,
            speed_multiplier,
            confidence_adjustment,
        }
    }
}

impl Default for EnvironmentalModifier {
    fn default() -> Self {
        Self {
            energy_multiplier: 1.0,
            noise_amplification: 1.0,
            speed_multiplier: 1.0,
            confidence_adjustment: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_context_yields_neutral_modifier() {
        let modifier = EnvironmentalModifier::from_context(&EnvironmentalContext::default());
        assert_eq!(modifier.energy_multiplier, 1.0);
        assert_eq!(modifier.noise_amplification, 1.0);
        assert_eq!(modifier.speed_multiplier, 1.0);
    }

    #[test]
    fn test_hostile_context_amplifies_noise() {
        let mut ctx = EnvironmentalContext::default();
        ctx.physical.crowding = 0.9;
        ctx.physical.noise_level = 0.8;
        ctx.cognitive.stress = 0.8;
        let modifier = EnvironmentalModifier::from_context(&ctx);
        assert!(modifier.noise_amplification > 1.5);
        assert!(modifier.confidence_adjustment < 1.0);
    }

    #[test]
    fn test_low_energy_conserves_resources() {
        let mut ctx = EnvironmentalContext::default();
        ctx.cognitive.energy = 0.2;
        let modifier = EnvironmentalModifier::from_context(&ctx);
        assert_eq!(modifier.energy_multiplier, 0.7);
    }
}
