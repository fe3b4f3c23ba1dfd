//! 查询中间件
//!
//! 三个独立过滤器：安全 (风险 > 0.3 触发内容消毒)、相关性 (特异度 < 0.5
//! 触发聚焦增强)、连贯性 (结构度 < 0.2 触发结构增强)。同一次调用可以
//! 触发多个过滤器，按声明顺序从左到右组合；过滤器只记录动作，从不报错。

use pf_core::{EnvironmentalContext, Query};
use serde::{Deserialize, Serialize};

/// 过滤器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Safety,
    Relevance,
    Coherence,
}

/// 一次中间件动作记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareAction {
    /// 触发的过滤器
    pub filter: FilterKind,
    /// 触发时的评分
    pub score: f64,
    /// 动作说明
    pub note: String,
}

/// 中间件链输出
#[derive(Debug, Clone)]
pub struct MiddlewareOutcome {
    /// 可能被转换过的查询
    pub query: Query,
    /// 触发的动作列表 (可为空)
    pub actions: Vec<MiddlewareAction>,
}

/// 风险关键词表，命中即抬升风险评分
const RISK_MARKERS: [&str; 6] = ["danger", "harm", "threat", "attack", "hurt", "crisis"];

/// 安全过滤：查询/上下文启发式风险评分，非有限值回退到高警惕 0.9
fn assess_risk(query: &Query, ctx: &EnvironmentalContext) -> f64 {
    let lower = query.text.to_lowercase();
    let marker_hits = RISK_MARKERS.iter().filter(|m| lower.contains(**m)).count();

    let risk = ctx.cognitive.stress * 0.3
        + ctx.social.social_pressure * 0.2
        + marker_hits as f64 * 0.3;

    if risk.is_finite() {
        risk.clamp(0.0, 1.0)
    } else {
        // 风险评估本身失效时宁可过度谨慎
        0.9
    }
}

fn safety_filter(query: Query, ctx: &EnvironmentalContext) -> (Query, Option<MiddlewareAction>) {
    let risk = assess_risk(&query, ctx);
    if risk <= 0.3 {
        return (query, None);
    }
    let mut sanitized = query.text.clone();
    for marker in RISK_MARKERS {
        if sanitized.to_lowercase().contains(marker) {
            sanitized = sanitized
                .split_whitespace()
                .map(|w| {
                    if w.to_lowercase().contains(marker) {
                        "[filtered]"
                    } else {
                        w
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
        }
    }
    let transformed = Query {
        text: sanitized,
        ..query
    };
    let action = MiddlewareAction {
        filter: FilterKind::Safety,
        score: risk,
        note: format!("content sanitized at risk {:.2}", risk),
    };
    (transformed, Some(action))
}

/// 相关性过滤：特异度低于 0.5 时附加聚焦标注
fn relevance_filter(query: Query) -> (Query, Option<MiddlewareAction>) {
    let word_count = query.text.split_whitespace().count();
    let specificity = (word_count as f64 / 12.0).min(1.0);
    if specificity >= 0.5 {
        return (query, None);
    }
    let focused = Query {
        text: format!("{} (focus: {:?})", query.text, query.query_type),
        ..query
    };
    let action = MiddlewareAction {
        filter: FilterKind::Relevance,
        score: specificity,
        note: format!("specificity boosted from {:.2}", specificity),
    };
    (focused, Some(action))
}

/// 连贯性过滤：结构度低于 0.2 时补全结构
fn coherence_filter(query: Query) -> (Query, Option<MiddlewareAction>) {
    let has_punctuation = query.text.contains(['.', '?', '!']);
    let structure = if has_punctuation { 0.6 } else { 0.15 };
    if structure >= 0.2 {
        return (query, None);
    }
    let structured = Query {
        text: format!("Consider: {}.", query.text),
        ..query
    };
    let action = MiddlewareAction {
        filter: FilterKind::Coherence,
        score: structure,
        note: format!("structure enhanced from {:.2}", structure),
    };
    (structured, Some(action))
}

/// 按声明顺序执行中间件链
pub fn apply_middleware(query: &Query, ctx: &EnvironmentalContext) -> MiddlewareOutcome {
    let mut actions = Vec::new();
    let mut current = query.clone();

    let (next, action) = safety_filter(current, ctx);
    current = next;
    actions.extend(action);

    let (next, action) = relevance_filter(current);
    current = next;
    actions.extend(action);

    let (next, action) = coherence_filter(current);
    current = next;
    actions.extend(action);

    MiddlewareOutcome {
        query: current,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::QueryType;

    #[test]
    fn test_benign_long_query_passes_unchanged() {
        let query = Query::new(
            "What is the best route to take for my commute this morning, given the weather?",
            QueryType::CurrentSituation,
        );
        let outcome = apply_middleware(&query, &EnvironmentalContext::default());
        assert!(outcome.actions.is_empty());
        assert_eq!(outcome.query.text, query.text);
    }

    #[test]
    fn test_risky_query_is_sanitized() {
        let query = Query::new(
            "Is there a danger or threat in this situation right now for me?",
            QueryType::CurrentSituation,
        );
        let outcome = apply_middleware(&query, &EnvironmentalContext::default());
        assert!(outcome
            .actions
            .iter()
            .any(|a| a.filter == FilterKind::Safety));
        assert!(outcome.query.text.contains("[filtered]"));
    }

    #[test]
    fn test_terse_query_triggers_both_boosts() {
        let query = Query::new("now", QueryType::CurrentSituation);
        let outcome = apply_middleware(&query, &EnvironmentalContext::default());
        let filters: Vec<FilterKind> = outcome.actions.iter().map(|a| a.filter).collect();
        // 过滤器从左到右组合，两个都触发
        assert!(filters.contains(&FilterKind::Relevance));
        assert!(filters.contains(&FilterKind::Coherence));
    }
}
