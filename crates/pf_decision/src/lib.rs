//! # pf_decision - PsycheFlow Decision Collapse Engine
//!
//! 把候选选项构造成加权叠加态，依次经过信任加权与社会加权，
//! 用六个独立触发条件累积坍缩压力；压力越过阈值时坍缩为
//! 单一选项并给出校准置信度，否则维持叠加态等待更多信息。

pub mod option;
pub mod trust;
pub mod social;
pub mod trigger;
pub mod engine;

pub use engine::{
    CollapsedDecision, DecisionContext, DecisionEngine, DecisionOutcome, EngineConfig,
    SuperpositionReport,
};
pub use option::{CandidateOption, QualityScores, QuantumOption};
pub use social::{SocialAssessment, SocialModelKind, SocialModelProfile, SocialWeights};
pub use trigger::{assess_collapse, CollapseAssessment, CollapseConfig, TriggerKind, TriggerValues};
pub use trust::{EntityHistory, TrustDimensions, TrustMatrix, TrustWeights};
