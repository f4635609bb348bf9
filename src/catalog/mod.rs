//! Detector catalog for sensitive prompt content.
//!
//! The catalog is an ordered list of [`Detector`]s. Each detector carries an
//! explicit `rank`; overlap resolution in [`crate::extract`] lets the lower
//! rank claim contested characters, so specific categories (API keys, card
//! numbers, SSNs) are ranked ahead of generic ones (phones, addresses,
//! names). The catalog is built once at startup and shared read-only.

mod builtin;
pub mod validate;

use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use builtin::builtin_detectors;

/// Rank assigned to the first custom detector; built-ins stay below it.
pub const CUSTOM_RANK_BASE: u16 = 1000;

/// Shape of every placeholder the redactor emits
pub const PLACEHOLDER_PATTERN: &str = r"\[REDACTED_[A-Z0-9_]+\]";

/// Category of sensitive content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ApiKey,
    Credential,
    CreditCard,
    Ssn,
    ExportControl,
    Whistleblower,
    InternalUrl,
    BankAccount,
    RoutingNumber,
    GovernmentId,
    Health,
    Financial,
    Confidential,
    Email,
    IpAddress,
    DeviceId,
    Phone,
    JailbreakPattern,
    Address,
    Name,
    /// User-defined detector from configuration
    Custom,
}

impl Category {
    /// Every built-in category, in catalog rank order
    pub const BUILTIN: [Category; 20] = [
        Self::ApiKey,
        Self::Credential,
        Self::CreditCard,
        Self::Ssn,
        Self::ExportControl,
        Self::Whistleblower,
        Self::InternalUrl,
        Self::BankAccount,
        Self::RoutingNumber,
        Self::GovernmentId,
        Self::Health,
        Self::Financial,
        Self::Confidential,
        Self::Email,
        Self::IpAddress,
        Self::DeviceId,
        Self::Phone,
        Self::JailbreakPattern,
        Self::Address,
        Self::Name,
    ];

    /// Snake-case name, as used on the wire and in `pii_detected`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::Credential => "credential",
            Self::CreditCard => "credit_card",
            Self::Ssn => "ssn",
            Self::ExportControl => "export_control",
            Self::Whistleblower => "whistleblower",
            Self::InternalUrl => "internal_url",
            Self::BankAccount => "bank_account",
            Self::RoutingNumber => "routing_number",
            Self::GovernmentId => "government_id",
            Self::Health => "health",
            Self::Financial => "financial",
            Self::Confidential => "confidential",
            Self::Email => "email",
            Self::IpAddress => "ip_address",
            Self::DeviceId => "device_id",
            Self::Phone => "phone",
            Self::JailbreakPattern => "jailbreak_pattern",
            Self::Address => "address",
            Self::Name => "name",
            Self::Custom => "custom",
        }
    }

    /// Severity tier of a match in this category.
    ///
    /// Critical and high tiers drive the risk classifier directly; every
    /// other category is medium.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::Ssn
            | Self::CreditCard
            | Self::ApiKey
            | Self::Credential
            | Self::ExportControl
            | Self::Whistleblower => Severity::Critical,
            Self::BankAccount
            | Self::RoutingNumber
            | Self::GovernmentId
            | Self::Health
            | Self::InternalUrl
            | Self::Confidential
            | Self::Financial => Severity::High,
            _ => Severity::Medium,
        }
    }

    /// Whether a match identifies or describes a person
    pub fn is_personal_data(&self) -> bool {
        !matches!(
            self,
            Self::ApiKey
                | Self::Credential
                | Self::ExportControl
                | Self::InternalUrl
                | Self::Confidential
                | Self::JailbreakPattern
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a single detection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Post-match check; a candidate failing it is discarded
pub type Validator = fn(&str) -> bool;

/// Declarative description of a detector, compiled by [`Detector::compile`]
#[derive(Debug, Clone)]
pub struct DetectorSpec {
    /// Detector name (defaults to the category name for built-ins)
    pub name: String,
    /// Category reported for matches
    pub category: Category,
    /// Severity reported for matches
    pub severity: Severity,
    /// Position in the precedence order, lower wins
    pub rank: u16,
    /// Regex source. A named group `value` narrows the span to that group
    /// when it participates in the match.
    pub pattern: String,
    /// Optional validator applied to the span text
    pub validator: Option<Validator>,
    /// Human-readable description
    pub description: String,
}

/// A compiled detector
#[derive(Debug, Clone)]
pub struct Detector {
    name: String,
    category: Category,
    severity: Severity,
    rank: u16,
    pattern: Regex,
    has_value_group: bool,
    validator: Option<Validator>,
    label: String,
    description: String,
}

impl Detector {
    /// Compile a detector spec
    pub fn compile(spec: DetectorSpec) -> Result<Self> {
        let pattern = Regex::new(&spec.pattern).map_err(|e| {
            Error::Catalog(format!(
                "Invalid regex pattern for detector '{}': {}",
                spec.name, e
            ))
        })?;
        let has_value_group = pattern.capture_names().any(|n| n == Some("value"));
        let label = placeholder_for(&spec.name);

        Ok(Self {
            name: spec.name,
            category: spec.category,
            severity: spec.severity,
            rank: spec.rank,
            pattern,
            has_value_group,
            validator: spec.validator,
            label,
            description: spec.description,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn rank(&self) -> u16 {
        self.rank
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub(crate) fn has_value_group(&self) -> bool {
        self.has_value_group
    }

    /// Run the validator, if any, over a candidate's text
    pub fn accepts(&self, candidate: &str) -> bool {
        self.validator.map_or(true, |validate| validate(candidate))
    }

    /// Canonical placeholder for a match, e.g. `[REDACTED_EMAIL]`.
    ///
    /// The label depends only on the detector, never on the matched text,
    /// so repeated matches collapse to the same token.
    pub fn replace(&self, _matched: &str) -> &str {
        &self.label
    }

    /// The placeholder token for this detector
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Build `[REDACTED_<NAME>]`, normalizing the name to `[A-Z0-9_]`.
fn placeholder_for(name: &str) -> String {
    let tag: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("[REDACTED_{}]", tag)
}

/// Ordered, immutable detector catalog
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    detectors: Vec<Detector>,
    placeholder: Regex,
}

impl PatternCatalog {
    /// Build a catalog from specs, ordering detectors by rank.
    ///
    /// Ranks must be unique so that precedence never depends on the order
    /// specs were supplied in.
    pub fn new(specs: Vec<DetectorSpec>) -> Result<Self> {
        let mut detectors = specs
            .into_iter()
            .map(Detector::compile)
            .collect::<Result<Vec<_>>>()?;
        detectors.sort_by_key(|d| d.rank);

        if let Some(pair) = detectors.windows(2).find(|w| w[0].rank == w[1].rank) {
            return Err(Error::Catalog(format!(
                "Detectors '{}' and '{}' share rank {}",
                pair[0].name, pair[1].name, pair[0].rank
            )));
        }

        let placeholder = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| Error::Internal(format!("Invalid placeholder pattern: {}", e)))?;

        Ok(Self {
            detectors,
            placeholder,
        })
    }

    /// The built-in catalog with no customization
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_detectors())
    }

    /// Built-in catalog minus disabled categories, plus custom detectors
    pub fn from_config(config: &DetectionConfig) -> Result<Self> {
        let mut specs: Vec<DetectorSpec> = builtin_detectors()
            .into_iter()
            .filter(|spec| !config.disabled.contains(&spec.category))
            .collect();

        for (i, custom) in config.custom.iter().enumerate() {
            if custom.name.trim().is_empty() {
                return Err(Error::Catalog(
                    "Custom detector name must not be empty".to_string(),
                ));
            }
            let rank = u16::try_from(i)
                .ok()
                .and_then(|i| CUSTOM_RANK_BASE.checked_add(i))
                .ok_or_else(|| Error::Catalog("Too many custom detectors".to_string()))?;
            specs.push(DetectorSpec {
                name: custom.name.clone(),
                category: Category::Custom,
                severity: custom.severity,
                rank,
                pattern: custom.pattern.clone(),
                validator: None,
                description: custom.description.clone(),
            });
        }

        let catalog = Self::new(specs)?;
        tracing::debug!(
            detectors = catalog.len(),
            custom = config.custom.len(),
            disabled = config.disabled.len(),
            "Pattern catalog built"
        );
        Ok(catalog)
    }

    /// Detectors in precedence order
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// Look up a detector by name
    pub fn get(&self, name: &str) -> Option<&Detector> {
        self.detectors.iter().find(|d| d.name == name)
    }

    /// Matcher for placeholder tokens already present in a text
    pub(crate) fn placeholder(&self) -> &Regex {
        &self.placeholder
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
