//! 路由表
//!
//! 路由规则把 [阈值, ∞) 的严重级别区间划分给各个 sink。规则之间不得
//! 有空隙或重叠，因此每个通过阈值的事件恰好命中一条规则。

use crate::core::severity::Severity;
use crate::error::{Result, SplitLogError};
use std::fmt;

/// 事件被投递到的 sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkRole {
    /// 低级别输出（默认 stdout）
    Low,
    /// 高级别输出（默认 stderr）
    High,
}

impl fmt::Display for SinkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkRole::Low => f.write_str("low"),
            SinkRole::High => f.write_str("high"),
        }
    }
}

/// 单条路由规则：`[lower, upper)`，`upper` 为 `None` 时无上界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingRule {
    pub lower: Severity,
    pub upper: Option<Severity>,
    pub sink: SinkRole,
}

impl RoutingRule {
    pub fn new(lower: Severity, upper: Option<Severity>, sink: SinkRole) -> Self {
        Self { lower, upper, sink }
    }

    /// 区间是否包含该级别
    pub fn contains(&self, severity: Severity) -> bool {
        severity >= self.lower && self.upper.map_or(true, |upper| severity < upper)
    }
}

/// 经过验证的路由表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    threshold: Severity,
    rules: Vec<RoutingRule>,
}

impl RouteTable {
    /// 由阈值和任意规则构造路由表
    ///
    /// 规则按 `lower` 排序后必须首尾相接，第一条覆盖阈值，最后一条无上界。
    pub fn new(threshold: Severity, mut rules: Vec<RoutingRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(SplitLogError::routing("at least one rule is required"));
        }
        rules.sort_by_key(|rule| rule.lower);

        for rule in &rules {
            if let Some(upper) = rule.upper {
                if upper <= rule.lower {
                    return Err(SplitLogError::routing(format!(
                        "empty range [{}, {})",
                        rule.lower, upper
                    )));
                }
            }
        }

        if rules[0].lower > threshold {
            return Err(SplitLogError::routing(format!(
                "no rule covers [{}, {})",
                threshold, rules[0].lower
            )));
        }

        for pair in rules.windows(2) {
            match pair[0].upper {
                None => {
                    return Err(SplitLogError::routing(format!(
                        "unbounded rule starting at {} overlaps rule starting at {}",
                        pair[0].lower, pair[1].lower
                    )))
                }
                Some(upper) if upper < pair[1].lower => {
                    return Err(SplitLogError::routing(format!(
                        "gap between {} and {}",
                        upper, pair[1].lower
                    )))
                }
                Some(upper) if upper > pair[1].lower => {
                    return Err(SplitLogError::routing(format!(
                        "rules overlap at [{}, {})",
                        pair[1].lower, upper
                    )))
                }
                Some(_) => {}
            }
        }

        if let Some(last) = rules.last() {
            if let Some(upper) = last.upper {
                return Err(SplitLogError::routing(format!(
                    "no rule covers severities from {} upwards",
                    upper
                )));
            }
        }

        Ok(Self { threshold, rules })
    }

    /// 两段式路由：`[threshold, partition)` → Low，`[partition, ∞)` → High
    ///
    /// 分界不高于阈值时所有通过阈值的事件都进入 High。
    pub fn partitioned(threshold: Severity, partition: Severity) -> Self {
        let rules = if partition <= threshold {
            vec![RoutingRule::new(threshold, None, SinkRole::High)]
        } else {
            vec![
                RoutingRule::new(threshold, Some(partition), SinkRole::Low),
                RoutingRule::new(partition, None, SinkRole::High),
            ]
        };
        Self { threshold, rules }
    }

    /// 决定事件的去向；低于阈值时返回 `None`
    pub fn route(&self, severity: Severity) -> Option<SinkRole> {
        if severity < self.threshold {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.contains(severity))
            .map(|rule| rule.sink)
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }
}
