//! Pipeline orchestrator
//!
//! Runs the independent passes over one prompt: extraction and redaction,
//! optimization of the original text, and risk classification of the
//! redaction events. Every pass is pure, so a single [`Pipeline`] can be
//! shared across any number of concurrent callers.

use crate::catalog::PatternCatalog;
use crate::config::{OptimizerConfig, PromptGuardConfig};
use crate::error::Result;
use crate::optimize::Optimizer;
use crate::redact::{detector_names, redact, Redaction, RedactionEvent};
use crate::risk::{self, MappedControl, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub redacted_text: String,
    pub optimized_text: String,
    pub risk_level: RiskLevel,
    pub control_tags: BTreeSet<String>,
    /// Ordered by start offset
    pub events: Vec<RedactionEvent>,
}

impl PipelineResult {
    /// Distinct detector names, in order of first appearance
    pub fn pii_detected(&self) -> Vec<String> {
        detector_names(&self.events)
    }
}

/// Response of [`Pipeline::analyze`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub redacted_prompt: String,
    pub optimized_prompt: String,
    pub risk_level: RiskLevel,
    /// Mean category weight of the findings, 0-100
    pub risk_score: u8,
    pub clarity_score: u8,
    pub control_tags: Vec<String>,
    /// Detector names only, never matched values
    pub pii_detected: Vec<String>,
    #[serde(default)]
    pub mapped_controls: Vec<MappedControl>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Detection, redaction, optimization and classification, built once
#[derive(Debug, Clone)]
pub struct Pipeline {
    catalog: Arc<PatternCatalog>,
    optimizer: Optimizer,
}

impl Pipeline {
    /// Build from configuration. Invalid custom detectors fail here.
    pub fn new(config: &PromptGuardConfig) -> Result<Self> {
        let catalog = Arc::new(PatternCatalog::from_config(&config.detection)?);
        Self::with_catalog(catalog, &config.optimizer)
    }

    /// Build around an existing catalog
    pub fn with_catalog(catalog: Arc<PatternCatalog>, optimizer: &OptimizerConfig) -> Result<Self> {
        let optimizer = Optimizer::new(Arc::clone(&catalog), optimizer)?;
        tracing::debug!(detectors = catalog.len(), "Pipeline ready");
        Ok(Self { catalog, optimizer })
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    /// Extract and redact
    pub fn redact(&self, text: &str) -> Redaction {
        let spans = self.catalog.extract_spans(text);
        redact(text, &spans)
    }

    /// Optimize the original text
    pub fn optimize(&self, text: &str) -> String {
        self.optimizer.optimize(text)
    }

    /// Run every pass over one prompt
    pub fn run(&self, prompt: &str) -> PipelineResult {
        let Redaction { text, events } = self.redact(prompt);
        let optimized_text = self.optimizer.optimize(prompt);
        let (risk_level, control_tags) = risk::classify(&events);

        tracing::debug!(
            findings = events.len(),
            risk = %risk_level,
            tags = control_tags.len(),
            "Prompt processed"
        );

        PipelineResult {
            redacted_text: text,
            optimized_text,
            risk_level,
            control_tags,
            events,
        }
    }

    /// Caller-facing analysis of one prompt
    pub fn analyze(&self, prompt: &str) -> AnalyzeResponse {
        let result = self.run(prompt);
        let pii_detected = result.pii_detected();
        let mapped_controls = risk::map_controls(&result.redacted_text, result.risk_level);

        tracing::info!(
            findings = result.events.len(),
            risk = %result.risk_level,
            controls = mapped_controls.len(),
            "Prompt analyzed"
        );

        AnalyzeResponse {
            risk_score: risk::risk_score(&result.events),
            clarity_score: risk::clarity_score(prompt),
            suggestions: self.optimizer.suggestions(prompt),
            pii_detected,
            mapped_controls,
            control_tags: result.control_tags.into_iter().collect(),
            redacted_prompt: result.redacted_text,
            optimized_prompt: result.optimized_text,
            risk_level: result.risk_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Severity};
    use crate::config::CustomDetectorConfig;

    fn pipeline() -> Pipeline {
        Pipeline::new(&PromptGuardConfig::default()).unwrap()
    }

    #[test]
    fn test_email_and_ssn_scenario() {
        let response = pipeline().analyze("Email me at john@company.com, SSN 123-45-6789");

        assert_eq!(response.pii_detected, vec!["email", "ssn"]);
        assert_eq!(response.risk_level, RiskLevel::Critical);
        assert_eq!(response.risk_score, 80);
        assert!(response.redacted_prompt.contains("[REDACTED_EMAIL]"));
        assert!(response.redacted_prompt.contains("[REDACTED_SSN]"));
        assert!(!response.redacted_prompt.contains("john@company.com"));
        assert!(!response.redacted_prompt.contains("123-45-6789"));
        assert!(response.control_tags.contains(&"GDPR.Art.6".to_string()));
        assert!(response.control_tags.contains(&"CAN-SPAM.3".to_string()));
        assert!(!response.optimized_prompt.contains("john@company.com"));
    }

    #[test]
    fn test_empty_prompt() {
        let response = pipeline().analyze("");
        assert_eq!(response.risk_level, RiskLevel::Low);
        assert_eq!(response.risk_score, 0);
        assert!(response.pii_detected.is_empty());
        assert!(response.control_tags.is_empty());
        assert_eq!(response.redacted_prompt, "");
        assert_eq!(response.optimized_prompt, "");
        assert_eq!(response.clarity_score, 50);
    }

    #[test]
    fn test_clean_prompt_is_low() {
        let result = pipeline().run("What is the boiling point of water at sea level?");
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.events.is_empty());
        assert!(result.control_tags.is_empty());
        assert_eq!(
            result.redacted_text,
            "What is the boiling point of water at sea level?"
        );
    }

    #[test]
    fn test_card_claims_phone_like_run() {
        let result = pipeline().run("Charge card 4111 1111 1111 1111 today");
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].category, Category::CreditCard);
        assert_eq!(result.redacted_text, "Charge card [REDACTED_CREDIT_CARD] today");
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.control_tags.contains("PCI-DSS.3.4"));
    }

    #[test]
    fn test_events_ordered_by_start() {
        let result = pipeline().run(
            "SSN 123-45-6789 then jane@example.org then 10.0.0.12 then 555-867-5309",
        );
        assert!(result.events.len() >= 4);
        assert!(result.events.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let p = pipeline();
        let first = p.run("Reach me at jane@example.org or 555-867-5309");
        let second = p.run(&first.redacted_text);
        assert!(second.events.is_empty());
        assert_eq!(second.redacted_text, first.redacted_text);
    }

    #[test]
    fn test_pii_detected_is_deduplicated() {
        let response = pipeline().analyze("cc a@example.com and b@example.com");
        assert_eq!(response.pii_detected, vec!["email"]);
    }

    #[test]
    fn test_custom_detector_from_config() {
        let mut config = PromptGuardConfig::default();
        config.detection.custom.push(CustomDetectorConfig {
            name: "project_code".to_string(),
            pattern: r"\bPRJ-\d{4}\b".to_string(),
            severity: Severity::High,
            description: "Internal project code".to_string(),
        });

        let response = Pipeline::new(&config).unwrap().analyze("Status of PRJ-1234?");
        assert_eq!(response.pii_detected, vec!["project_code"]);
        assert_eq!(response.risk_level, RiskLevel::High);
        assert!(response.redacted_prompt.contains("[REDACTED_PROJECT_CODE]"));
    }

    #[test]
    fn test_disabled_category() {
        let mut config = PromptGuardConfig::default();
        config.detection.disabled.push(Category::Email);
        let response = Pipeline::new(&config).unwrap().analyze("mail ops@example.com");
        assert!(response.pii_detected.is_empty());
        assert_eq!(response.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_analyze_response_shape() {
        let response = pipeline().analyze("Please help me email jane@example.org?");
        let json = serde_json::to_value(&response).unwrap();
        for field in [
            "redacted_prompt",
            "optimized_prompt",
            "risk_level",
            "risk_score",
            "clarity_score",
            "control_tags",
            "pii_detected",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["risk_level"], "medium");
        assert!(!json.to_string().contains("jane@example.org"));
    }

    #[test]
    fn test_shared_across_threads() {
        let p = Arc::new(pipeline());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || p.run(&format!("user{}@example.com", i)).risk_level)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), RiskLevel::Medium);
        }
    }
}
