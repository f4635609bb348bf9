//! Risk classification over redaction events.
//!
//! The tier is a pure function of the event multiset:
//!
//! | Condition                          | Tier       |
//! |------------------------------------|------------|
//! | any critical-severity event        | `critical` |
//! | else any high-severity event       | `high`     |
//! | else one or more events            | `medium`   |
//! | no events                          | `low`      |
//!
//! There is no "low with findings" state: a single detection of any kind
//! warrants review.
//!
//! [`risk_score`] is the finer 0-100 figure shown on dashboards: the mean
//! per-event weight of the detected categories.

mod clarity;
pub mod controls;

pub use clarity::clarity_score;
pub use controls::{control_tags, map_controls, MappedControl};

use crate::catalog::{Category, Severity};
use crate::redact::RedactionEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Risk tier of a prompt
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier for a set of events
pub fn risk_level(events: &[RedactionEvent]) -> RiskLevel {
    let highest = events.iter().map(|e| e.severity).max();
    match highest {
        None => RiskLevel::Low,
        Some(Severity::Critical) => RiskLevel::Critical,
        Some(Severity::High) => RiskLevel::High,
        Some(Severity::Medium) | Some(Severity::Low) => RiskLevel::Medium,
    }
}

/// Weight of one event in [`risk_score`]
pub fn score_weight(category: Category) -> u32 {
    match category {
        Category::Ssn => 100,
        Category::CreditCard => 95,
        Category::ApiKey => 90,
        Category::Credential => 85,
        Category::Confidential => 80,
        Category::Email => 60,
        Category::Phone => 55,
        Category::Name => 40,
        Category::IpAddress => 30,
        _ => 20,
    }
}

/// Mean event weight, rounded half up and capped at 100. No events score 0.
pub fn risk_score(events: &[RedactionEvent]) -> u8 {
    if events.is_empty() {
        return 0;
    }
    let total: u32 = events.iter().map(|e| score_weight(e.category)).sum();
    let count = events.len() as u32;
    let mean = (total + count / 2) / count;
    mean.min(100) as u8
}

/// Tier and compliance-control tags for a set of events
pub fn classify(events: &[RedactionEvent]) -> (RiskLevel, BTreeSet<String>) {
    (risk_level(events), control_tags(events))
}
