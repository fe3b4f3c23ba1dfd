//! # pf_sampling - PsycheFlow Sampling Primitive
//!
//! 受控非确定性的唯一来源：命名分布 (均匀/高斯/Beta/指数/类别) 的有界采样。
//! 每个引擎实例持有自己的采样器，种子可注入，保证测试可复现。

pub mod sampler;

pub use sampler::{random_seed, Sampler, StdSampler};
