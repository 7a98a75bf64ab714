//! Prompt building and verdict parsing
//!
//! One prompt per hierarchy level. The model sees the transcript, the level
//! being decided and the numbered list of allowed labels, and must answer with
//! a single JSON object.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use triage_core::{HierarchyLevel, OracleRequest, OracleVerdict};
use unicode_segmentation::UnicodeSegmentation;

use crate::LlmError;

/// Transcripts longer than this are cut, keeping the beginning
pub const MAX_TRANSCRIPT_GRAPHEMES: usize = 6_000;
/// Confidence assumed when the model omits it
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

const SYSTEM_PROMPT: &str = "Você classifica atendimentos de uma empresa de pagamentos. \
Escolha exatamente uma opção da lista fornecida, copiando o texto da opção sem alterações. \
Responda somente com um objeto JSON no formato \
{\"choice\": \"<opção>\", \"confidence\": <número entre 0 e 1>, \"rationale\": \"<justificativa curta>\"}.";

/// Prompt for one constrained classification request
pub struct ClassificationPrompt;

impl ClassificationPrompt {
    /// Chat messages for a request
    pub fn build(request: &OracleRequest) -> Vec<Message> {
        vec![Message::system(SYSTEM_PROMPT), Message::user(Self::user_prompt(request))]
    }

    fn user_prompt(request: &OracleRequest) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Transcrição do atendimento:");
        let _ = writeln!(out, "\"\"\"");
        let _ = writeln!(out, "{}", truncate(&request.conversation_text, MAX_TRANSCRIPT_GRAPHEMES));
        let _ = writeln!(out, "\"\"\"");
        let _ = writeln!(out);
        let _ = writeln!(out, "Nível a classificar: {}", level_label(request.level));
        let _ = writeln!(out, "Opções válidas:");
        for (i, option) in request.valid_options.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, option);
        }

        if let Some(note) = &request.correction {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "A resposta anterior \"{}\" foi rejeitada: {}. Escolha uma das opções acima.",
                note.rejected_choice, note.reason
            );
        }
        out
    }
}

fn level_label(level: HierarchyLevel) -> &'static str {
    match level {
        HierarchyLevel::BusinessUnit => "unidade de negócio",
        HierarchyLevel::Product => "produto",
        HierarchyLevel::Motive => "motivo",
        HierarchyLevel::Submotive => "submotivo",
    }
}

fn truncate(text: &str, max_graphemes: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max_graphemes).collect();
    if graphemes.next().is_some() {
        format!("{head} [...]")
    } else {
        head
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    choice: String,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    rationale: String,
}

/// Parse the model's answer into a verdict
///
/// Accepts a JSON object embedded in surrounding prose or code fences. The
/// choice is mapped onto the matching option ignoring case and outer
/// whitespace; an unmatched choice is returned as-is for the caller to reject.
pub fn parse_verdict(response: &str, options: &[String]) -> Result<OracleVerdict, LlmError> {
    let json = extract_object(response)
        .ok_or_else(|| LlmError::InvalidResponse(format!("no JSON object in: {}", response.trim())))?;
    let raw: RawVerdict =
        serde_json::from_str(json).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    let choice = raw.choice.trim();
    let choice = options
        .iter()
        .find(|o| o.to_lowercase() == choice.to_lowercase())
        .map(String::as_str)
        .unwrap_or(choice);

    let confidence = raw
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(OracleVerdict::new(choice, confidence, raw.rationale.trim()))
}

/// Outermost `{ ... }` span
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
