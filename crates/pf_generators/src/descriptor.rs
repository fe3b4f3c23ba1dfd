//! 生成器目录
//!
//! 固定目录：现实/记忆/预测/模式/创造五种生成器。
//! 描述符构造后不可变；目录顺序即确定性合并顺序。

use serde::{Deserialize, Serialize};

/// 生成器种类 (固定目录)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// 现实取向：当前处境锚定
    Reality,
    /// 记忆取向：历史经验检索
    Memory,
    /// 预测取向：前瞻推演
    Prediction,
    /// 模式取向：规律抽取
    Pattern,
    /// 创造取向：发散联想
    Creative,
}

impl GeneratorKind {
    /// 目录声明顺序，合并结果时按此顺序迭代
    pub const ALL: [GeneratorKind; 5] = [
        GeneratorKind::Reality,
        GeneratorKind::Memory,
        GeneratorKind::Prediction,
        GeneratorKind::Pattern,
        GeneratorKind::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Reality => "reality",
            GeneratorKind::Memory => "memory",
            GeneratorKind::Prediction => "prediction",
            GeneratorKind::Pattern => "pattern",
            GeneratorKind::Creative => "creative",
        }
    }
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 优先级分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    Critical,
    High,
    Normal,
    Low,
}

/// 生成器描述符 (每种一份，构造后不可变)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorDescriptor {
    /// 种类
    pub kind: GeneratorKind,
    /// 专长标签
    pub specialization: String,
    /// 噪声容忍度 [0,1]
    pub noise_tolerance: f64,
    /// 优先级
    pub priority: PriorityClass,
    /// 能量成本
    pub energy_cost: f64,
    /// 处理深度 (影响处理耗时)
    pub processing_depth: f64,
}

/// 指定种类的内置描述符 (配置缺失时的回退，总函数不失败)
pub fn default_descriptor(kind: GeneratorKind) -> GeneratorDescriptor {
    let index = GeneratorKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(0);
    catalogue().swap_remove(index)
}

/// 内置生成器目录，按声明顺序返回
pub fn catalogue() -> Vec<GeneratorDescriptor> {
    vec![
        GeneratorDescriptor {
            kind: GeneratorKind::Reality,
            specialization: "situational grounding".to_string(),
            noise_tolerance: 0.2,
            priority: PriorityClass::Critical,
            energy_cost: 0.15,
            processing_depth: 0.4,
        },
        GeneratorDescriptor {
            kind: GeneratorKind::Memory,
            specialization: "experience retrieval".to_string(),
            noise_tolerance: 0.4,
            priority: PriorityClass::High,
            energy_cost: 0.25,
            processing_depth: 0.6,
        },
        GeneratorDescriptor {
            kind: GeneratorKind::Prediction,
            specialization: "forward simulation".to_string(),
            noise_tolerance: 0.5,
            priority: PriorityClass::Normal,
            energy_cost: 0.35,
            processing_depth: 0.8,
        },
        GeneratorDescriptor {
            kind: GeneratorKind::Pattern,
            specialization: "regularity extraction".to_string(),
            noise_tolerance: 0.45,
            priority: PriorityClass::Normal,
            energy_cost: 0.3,
            processing_depth: 0.7,
        },
        GeneratorDescriptor {
            kind: GeneratorKind::Creative,
            specialization: "divergent association".to_string(),
            noise_tolerance: 0.8,
            priority: PriorityClass::Low,
            energy_cost: 0.4,
            processing_depth: 0.9,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_matches_declared_order() {
        let descriptors = catalogue();
        assert_eq!(descriptors.len(), GeneratorKind::ALL.len());
        for (descriptor, kind) in descriptors.iter().zip(GeneratorKind::ALL) {
            assert_eq!(descriptor.kind, kind);
        }
    }

    #[test]
    fn test_noise_tolerance_in_unit_interval() {
        for descriptor in catalogue() {
            assert!((0.0..=1.0).contains(&descriptor.noise_tolerance));
        }
    }
}
