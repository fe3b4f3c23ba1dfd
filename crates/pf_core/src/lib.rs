//! # pf_core - PsycheFlow Core Primitives
//!
//! 核心原语层，定义统一错误类型、环境上下文模型与查询模型。
//! 此 crate 是整个项目的基础依赖，不依赖其他业务 crate。

pub mod error;
pub mod context;
pub mod query;

pub use error::{PsycheFlowError, Result};
pub use context::{
    CognitiveContext, EnvironmentalContext, PhysicalContext, SocialContext, TemporalContext,
};
pub use query::{Query, QueryType};
