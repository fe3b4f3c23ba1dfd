//! 生成器串扰
//!
//! 对声明过亲和度的有序种类对，抽取 Beta(affinity×10, (1−affinity)×10)
//! 样本，超过对内阈值时在两侧结果上互相打强化标志。
//! 仅当 ≥2 种生成器激活时才评估。

use pf_sampling::Sampler;
use serde::{Deserialize, Serialize};

use crate::descriptor::GeneratorKind;
use crate::output::GeneratorRunResult;

/// 声明的串扰种类对
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossTalkPair {
    pub a: GeneratorKind,
    pub b: GeneratorKind,
    /// 亲和度权重
    pub affinity: f64,
    /// 对内触发阈值
    pub threshold: f64,
}

/// 内置声明对：预测↔模式 0.9 为最高亲和
pub const DECLARED_PAIRS: [CrossTalkPair; 5] = [
    CrossTalkPair {
        a: GeneratorKind::Reality,
        b: GeneratorKind::Memory,
        affinity: 0.7,
        threshold: 0.6,
    },
    CrossTalkPair {
        a: GeneratorKind::Memory,
        b: GeneratorKind::Prediction,
        affinity: 0.8,
        threshold: 0.6,
    },
    CrossTalkPair {
        a: GeneratorKind::Prediction,
        b: GeneratorKind::Pattern,
        affinity: 0.9,
        threshold: 0.65,
    },
    CrossTalkPair {
        a: GeneratorKind::Pattern,
        b: GeneratorKind::Creative,
        affinity: 0.75,
        threshold: 0.6,
    },
    CrossTalkPair {
        a: GeneratorKind::Reality,
        b: GeneratorKind::Creative,
        affinity: 0.5,
        threshold: 0.55,
    },
];

/// 评估串扰并打标，返回强化链接数。
/// 激活结果不足两个时无操作。
pub fn apply_crosstalk(results: &mut [GeneratorRunResult], sampler: &mut dyn Sampler) -> usize {
    if results.len() < 2 {
        return 0;
    }
    let mut reinforced = 0;
    for pair in DECLARED_PAIRS {
        let a_idx = results.iter().position(|r| r.kind == pair.a);
        let b_idx = results.iter().position(|r| r.kind == pair.b);
        let (Some(a_idx), Some(b_idx)) = (a_idx, b_idx) else {
            continue;
        };
        let draw = sampler.beta(pair.affinity * 10.0, (1.0 - pair.affinity) * 10.0);
        if draw > pair.threshold {
            results[a_idx].crosstalk.mark(pair.b);
            results[b_idx].crosstalk.mark(pair.a);
            reinforced += 1;
            tracing::debug!(
                pair_a = %pair.a,
                pair_b = %pair.b,
                draw,
                "cross-talk reinforcement"
            );
        }
    }
    reinforced
}
