//! 全局错误处理机制

use thiserror::Error;

/// PsycheFlow 统一错误类型
#[derive(Error, Debug)]
pub enum PsycheFlowError {
    #[error("Sampling error: {0}")]
    Sampling(String),

    #[error("Generator pool error: {0}")]
    Generator(String),

    #[error("Interference engine error: {0}")]
    Interference(String),

    #[error("Decision engine error: {0}")]
    Decision(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, PsycheFlowError>;
