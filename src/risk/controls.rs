//! Compliance-control mapping.
//!
//! Two lookups live here. [`control_tags`] turns detected categories into a
//! stable set of control tags. [`map_controls`] matches keyword triggers
//! against the redacted prompt and returns control records with a
//! justification and a suggested fix.

use super::RiskLevel;
use crate::catalog::Category;
use crate::redact::RedactionEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Data-protection controls added whenever personal data is present
pub const BASE_PERSONAL_DATA_TAGS: &[&str] = &["GDPR.Art.6", "NIST.SC-28"];

/// Tags specific to one category
fn category_tags(category: Category) -> &'static [&'static str] {
    match category {
        Category::Email => &["CAN-SPAM.3"],
        Category::CreditCard => &["PCI-DSS.3.4"],
        Category::Health => &["HIPAA.164.514"],
        Category::ApiKey | Category::Credential => &["NIST.IA-5"],
        Category::BankAccount | Category::RoutingNumber | Category::Financial => &["NIST.AC-3"],
        Category::Confidential | Category::ExportControl | Category::Whistleblower => {
            &["OWASP.LLM06"]
        }
        Category::JailbreakPattern => &["OWASP.LLM01"],
        _ => &[],
    }
}

/// Control tags for a set of events, sorted and without duplicates
pub fn control_tags(events: &[RedactionEvent]) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    if events.iter().any(|e| e.category.is_personal_data()) {
        tags.extend(BASE_PERSONAL_DATA_TAGS.iter().map(|t| t.to_string()));
    }
    for event in events {
        tags.extend(category_tags(event.category).iter().map(|t| t.to_string()));
    }

    tags
}

/// A control matched by a keyword trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedControl {
    pub control_id: String,
    pub justification: String,
    pub suggested_fix: String,
    pub source_rule_id: String,
}

type CustomMatch = fn(&str, RiskLevel) -> bool;

struct ControlTrigger {
    id: &'static str,
    keywords: &'static [&'static str],
    /// Trigger only fires at or above this tier
    min_risk: Option<RiskLevel>,
    custom_match: Option<CustomMatch>,
    control_ids: &'static [&'static str],
    justification: &'static str,
    suggested_fix: &'static str,
}

fn injection_override(prompt: &str, risk: RiskLevel) -> bool {
    risk >= RiskLevel::High
        && ["ignore", "override", "disregard"]
            .iter()
            .any(|w| prompt.contains(w))
}

fn is_low_risk(_prompt: &str, risk: RiskLevel) -> bool {
    risk == RiskLevel::Low
}

fn seeks_certainty(prompt: &str, risk: RiskLevel) -> bool {
    risk > RiskLevel::Low
        && ["guarantee", "100%", "certain"]
            .iter()
            .any(|w| prompt.contains(w))
}

const CONTROL_TRIGGERS: &[ControlTrigger] = &[
    ControlTrigger {
        id: "NIST-PII-Extraction",
        keywords: &["extract email", "find ssn", "get all names", "pull all addresses"],
        min_risk: Some(RiskLevel::Medium),
        custom_match: None,
        control_ids: &["SC-28", "RA-5", "PII"],
        justification: "Attempting to extract personally identifiable information triggers \
                        NIST SC-28 (protection of information at rest) and RA-5 \
                        (vulnerability monitoring).",
        suggested_fix: "Ensure appropriate authorization and data minimization. Prefer \
                        aggregated or anonymized data and mask PII in outputs.",
    },
    ControlTrigger {
        id: "OWASP-Prompt-Injection",
        keywords: &["ignore previous instructions", "ignore all previous instructions", "act as"],
        min_risk: None,
        custom_match: Some(injection_override),
        control_ids: &["LLM01: Prompt Injection"],
        justification: "Keywords or prompt structure suggest an attempt to subvert the \
                        model's original instructions (OWASP LLM01).",
        suggested_fix: "Validate and sanitize input. Keep trusted instructions separate from \
                        untrusted input and monitor for anomalous model behavior.",
    },
    ControlTrigger {
        id: "NIST-Financial-Data",
        keywords: &["financial data", "credit card", "bank account", "trading strategy"],
        min_risk: None,
        custom_match: None,
        control_ids: &["SC-28", "AC-3", "SI-4"],
        justification: "Prompts involving financial data require access enforcement (AC-3), \
                        information protection (SC-28) and system monitoring (SI-4).",
        suggested_fix: "Verify authorization for financial data. Tokenize sensitive numbers \
                        and log all access.",
    },
    ControlTrigger {
        id: "General-Low-Risk-Review",
        keywords: &[],
        min_risk: None,
        custom_match: Some(is_low_risk),
        control_ids: &["CM-2"],
        justification: "Low-risk prompts are reviewed against the baseline configuration and \
                        acceptable use policy.",
        suggested_fix: "None required. Ensure the prompt matches intended use.",
    },
    ControlTrigger {
        id: "OWASP-Data-Leakage-1",
        keywords: &["internal report", "confidential document", "proprietary algorithm"],
        min_risk: Some(RiskLevel::Medium),
        custom_match: None,
        control_ids: &["LLM06: Sensitive Information Disclosure"],
        justification: "The prompt handles sensitive or proprietary information, risking \
                        disclosure (OWASP LLM06).",
        suggested_fix: "Verify data classification, filter outputs and make sure the provider \
                        does not retain inputs.",
    },
    ControlTrigger {
        id: "NIST-RA-Uncertainty",
        keywords: &["predict stock market", "guarantee outcome", "will this work for sure"],
        min_risk: Some(RiskLevel::Medium),
        custom_match: Some(seeks_certainty),
        control_ids: &["RA-3", "RA-10"],
        justification: "Prompts seeking guarantees from model output relate to risk \
                        assessment (RA-3) and threat hunting (RA-10).",
        suggested_fix: "Frame responses as suggestions, not guarantees, and keep a human in \
                        the loop for critical decisions.",
    },
];

/// Keyword-triggered controls for a redacted prompt, first match per control id
pub fn map_controls(redacted_prompt: &str, risk: RiskLevel) -> Vec<MappedControl> {
    let prompt = redacted_prompt.to_lowercase();
    let mut seen = BTreeSet::new();
    let mut mapped = Vec::new();

    for trigger in CONTROL_TRIGGERS {
        if trigger.min_risk.is_some_and(|min| risk < min) {
            continue;
        }
        let keyword_hit = trigger.keywords.iter().any(|k| prompt.contains(k));
        let custom_hit = trigger.custom_match.is_some_and(|f| f(&prompt, risk));
        if !keyword_hit && !custom_hit {
            continue;
        }

        for control_id in trigger.control_ids {
            if seen.insert(*control_id) {
                mapped.push(MappedControl {
                    control_id: control_id.to_string(),
                    justification: trigger.justification.to_string(),
                    suggested_fix: trigger.suggested_fix.to_string(),
                    source_rule_id: trigger.id.to_string(),
                });
            }
        }
    }

    mapped
}
