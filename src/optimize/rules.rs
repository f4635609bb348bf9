//! Rewrite tables for the optimizer.
//!
//! Everything the optimizer rewrites is listed here as data: phrase rules
//! (pattern → replacement) grouped by kind, and personas selected by
//! keyword. Tables are compiled once when the optimizer is built.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;

/// Kind of phrase a rule targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseKind {
    /// Politeness markers that carry no instruction
    Politeness,
    /// References to the assistant being an AI
    AiMetaReference,
    /// Vague nouns with a more specific substitute
    VagueNoun,
    /// Vague instructions with a more specific substitute
    VagueInstruction,
}

/// One entry of the phrase table
#[derive(Debug, Clone, Copy)]
pub struct PhraseRule {
    pub kind: PhraseKind,
    pub pattern: &'static str,
    pub replacement: &'static str,
}

/// Phrase rules, applied in order
pub const PHRASE_RULES: &[PhraseRule] = &[
    PhraseRule {
        kind: PhraseKind::Politeness,
        pattern: r"(?i)\b(?:please|kindly)\b,?[ \t]*",
        replacement: "",
    },
    PhraseRule {
        kind: PhraseKind::Politeness,
        pattern: r"(?i)\b(?:if you could|would you mind|could you possibly)\b,?[ \t]*",
        replacement: "",
    },
    PhraseRule {
        kind: PhraseKind::AiMetaReference,
        pattern: r"(?i)\b(?:as an ai(?: language model)?|as a language model|i understand that you are(?: an ai)?)\b,?[ \t]*",
        replacement: "",
    },
    PhraseRule {
        kind: PhraseKind::VagueNoun,
        pattern: r"(?i)\bthings\b",
        replacement: "items",
    },
    PhraseRule {
        kind: PhraseKind::VagueNoun,
        pattern: r"(?i)\bthing\b",
        replacement: "item",
    },
    PhraseRule {
        kind: PhraseKind::VagueNoun,
        pattern: r"(?i)\bstuff\b",
        replacement: "content",
    },
    PhraseRule {
        kind: PhraseKind::VagueInstruction,
        pattern: r"(?i)\bdo this\b",
        replacement: "complete this task",
    },
];

/// Kind of task a prompt describes, used to pick a persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Email,
    Code,
    Writing,
    Analysis,
    General,
}

/// A persona and the keywords that select it
#[derive(Debug, Clone, Copy)]
pub struct Persona {
    pub kind: TaskKind,
    pub triggers: &'static str,
    pub role: &'static str,
}

/// Personas in selection order; the first whose triggers match wins
pub const PERSONAS: &[Persona] = &[
    Persona {
        kind: TaskKind::Email,
        triggers: r"(?i)\b(?:e-?mails?|reply|respond to|newsletter|memo)\b",
        role: "You are a professional communication expert.",
    },
    Persona {
        kind: TaskKind::Code,
        triggers: r"(?i)\b(?:code|coding|program\w*|function|debug\w*|scripts?|refactor\w*|compile\w*|bugs?)\b",
        role: "You are an experienced software developer.",
    },
    Persona {
        kind: TaskKind::Writing,
        triggers: r"(?i)\b(?:write|writing|rewrite|draft\w*|essay|article|blog|proofread\w*)\b",
        role: "You are a professional writer.",
    },
    Persona {
        kind: TaskKind::Analysis,
        triggers: r"(?i)\b(?:analy[sz]\w*|evaluat\w*|assess\w*|compare|review\w*)\b",
        role: "You are an expert analyst.",
    },
];

/// Role used when no persona triggers match
pub const DEFAULT_ROLE: &str = "You are a helpful assistant.";

/// Existing framing that suppresses the role header
pub const FRAMING_PATTERN: &str = r"(?im)\byou are\b|^\s*task\s*:|\bact as\b";

/// Words showing the prompt already asks for structure
pub const STRUCTURE_PATTERN: &str =
    r"(?i)\b(?:steps?|step-by-step|structured?|format|clear|detailed|bullets?|numbered|sections?)\b";

/// Appended to long prompts that do not ask for structure
pub const STRUCTURE_INSTRUCTION: &str =
    "Structure your response clearly, using numbered steps or sections where helpful.";

/// A compiled phrase rule
#[derive(Debug, Clone)]
pub(crate) struct CompiledPhrase {
    pub kind: PhraseKind,
    pub pattern: Regex,
    pub replacement: &'static str,
}

/// A compiled persona
#[derive(Debug, Clone)]
pub(crate) struct CompiledPersona {
    pub kind: TaskKind,
    pub triggers: Regex,
    pub role: &'static str,
}

fn compile(pattern: &str, what: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Internal(format!("Invalid optimizer pattern for {}: {}", what, e)))
}

pub(crate) fn compile_phrases() -> Result<Vec<CompiledPhrase>> {
    PHRASE_RULES
        .iter()
        .map(|rule| {
            Ok(CompiledPhrase {
                kind: rule.kind,
                pattern: compile(rule.pattern, "phrase rule")?,
                replacement: rule.replacement,
            })
        })
        .collect()
}

pub(crate) fn compile_personas() -> Result<Vec<CompiledPersona>> {
    PERSONAS
        .iter()
        .map(|persona| {
            Ok(CompiledPersona {
                kind: persona.kind,
                triggers: compile(persona.triggers, "persona")?,
                role: persona.role,
            })
        })
        .collect()
}

pub(crate) fn compile_pattern(pattern: &str, what: &str) -> Result<Regex> {
    compile(pattern, what)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_compile() {
        assert_eq!(compile_phrases().unwrap().len(), PHRASE_RULES.len());
        assert_eq!(compile_personas().unwrap().len(), PERSONAS.len());
        assert!(Regex::new(FRAMING_PATTERN).is_ok());
        assert!(Regex::new(STRUCTURE_PATTERN).is_ok());
    }

    #[test]
    fn test_every_phrase_kind_is_used() {
        for kind in [
            PhraseKind::Politeness,
            PhraseKind::AiMetaReference,
            PhraseKind::VagueNoun,
            PhraseKind::VagueInstruction,
        ] {
            assert!(PHRASE_RULES.iter().any(|r| r.kind == kind));
        }
    }

    #[test]
    fn test_framing_pattern() {
        let re = Regex::new(FRAMING_PATTERN).unwrap();
        assert!(re.is_match("You are a tax advisor. Explain deductions."));
        assert!(re.is_match("Task: summarize the memo"));
        assert!(re.is_match("Act as a reviewer"));
        assert!(!re.is_match("summarize the memo"));
    }
}
