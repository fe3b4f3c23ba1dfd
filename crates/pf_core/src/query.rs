//! 查询模型

use serde::{Deserialize, Serialize};

/// 查询类型，驱动生成器激活概率的亲和调整
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// 当前处境评估
    CurrentSituation,
    /// 记忆回溯
    MemoryRecall,
    /// 前瞻预测
    Prediction,
    /// 模式分析
    PatternAnalysis,
    /// 创造性探索
    CreativeExploration,
}

/// 一次解释请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// 原始查询文本
    pub text: String,
    /// 查询类型
    pub query_type: QueryType,
    /// 调用方是否声明为创造性任务 (影响创造性噪声注入)
    pub creative_task: bool,
}

impl Query {
    /// 创建新查询
    pub fn new(text: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            text: text.into(),
            query_type,
            creative_task: false,
        }
    }

    /// 标记为创造性任务
    pub fn creative(mut self) -> Self {
        self.creative_task = true;
        self
    }
}
