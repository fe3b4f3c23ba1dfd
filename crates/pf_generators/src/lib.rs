//! # pf_generators - PsycheFlow Interpretation Generator Pool
//!
//! 解释生成器池：固定目录的专职生成器，按概率激活子集，
//! 经过安全/相关性/连贯性中间件后并发运行，最后评估两两串扰。

pub mod descriptor;
pub mod generator;
pub mod middleware;
pub mod modifier;
pub mod output;
pub mod crosstalk;
pub mod pool;

pub use descriptor::{catalogue, GeneratorDescriptor, GeneratorKind, PriorityClass};
pub use generator::InterpretationGenerator;
pub use middleware::{FilterKind, MiddlewareAction, MiddlewareOutcome};
pub use modifier::EnvironmentalModifier;
pub use output::{CrossTalkFlags, GeneratorOutputKind, GeneratorRunResult};
pub use pool::{GeneratorPool, PoolConfig, PoolMetadata, PoolOutput};
