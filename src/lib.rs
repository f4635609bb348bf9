//! PromptGuard - sensitive-content screening for LLM prompts
//!
//! PromptGuard inspects a prompt before it leaves the user's control. It
//! detects sensitive fragments, produces a redacted variant for logging and
//! review, rewrites the prompt into an optimized variant without those
//! fragments, assigns a risk tier with compliance-control tags, and keeps the
//! original only in encrypted form.
//!
//! ## Architecture
//!
//! ```text
//!                         prompt
//!                           │
//!          ┌────────────────┼─────────────────────┐
//!          │                │                     │
//! ┌────────▼────────┐ ┌─────▼──────────┐ ┌────────▼─────────┐
//! │  Span Extractor │ │   Optimizer    │ │ Envelope Cipher  │
//! │  (ranked        │ │  - prose for   │ │  - AES-256-GCM   │
//! │   catalog)      │ │    sensitive   │ │  - fresh 16B IV  │
//! └────────┬────────┘ │    fragments   │ │  - iv‖tag‖ct b64 │
//!          │          │  - phrase table│ └────────┬─────────┘
//! ┌────────▼────────┐ │  - role + task │          │
//! │    Redactor     │ └─────┬──────────┘     store / retrieve
//! │  [REDACTED_*]   │       │
//! └────────┬────────┘       │
//!          │ events         │
//! ┌────────▼────────┐       │
//! │ Risk Classifier │       │
//! │ + Control Tags  │       │
//! └────────┬────────┘       │
//!          └────────┬───────┘
//!            ┌──────▼──────┐
//!            │  Pipeline   │──► AnalyzeResponse
//!            └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Ranked detector catalog, built-in table and validators
//! - [`extract`]: Candidate spans and overlap resolution
//! - [`redact`]: Placeholder substitution and redaction events
//! - [`optimize`]: Prompt rewriting and improvement suggestions
//! - [`risk`]: Risk tiers, control tags, keyword-mapped controls, clarity
//! - [`crypto`]: Envelope encryption of stored prompts
//! - [`pipeline`]: Orchestration of the passes above
//! - [`api`]: HTTP surface
//! - [`config`]: Configuration management

pub mod api;
pub mod catalog;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod optimize;
pub mod pipeline;
pub mod redact;
pub mod risk;

pub use config::PromptGuardConfig;
pub use crypto::{EncryptedBlob, EncryptionKey, EnvelopeCipher};
pub use error::{Error, Result};
pub use pipeline::{AnalyzeResponse, Pipeline, PipelineResult};
pub use risk::RiskLevel;
