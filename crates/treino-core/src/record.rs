//! The structured plan record produced by generation and consumed by
//! rendering.

use serde::{Deserialize, Serialize};

/// Result of the generation step.
///
/// Serialized with the snake_case names the model is asked to produce, so
/// a Generate response carries exactly the shape the model returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Plan body in the supported markdown subset.
    pub plano_markdown: String,
    /// Ordered warnings, possibly empty.
    pub avisos_importantes: Vec<String>,
    /// Free-form suggestions, possibly empty.
    pub sugestoes_adicionais: String,
}

/// Render payload. Every field defaults to empty; only the shape is
/// enforced.
///
/// Accepts the camelCase names as well as the snake_case names of
/// [`PlanRecord`], so a Generate response can be posted back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecordInput {
    #[serde(default, alias = "plano_markdown")]
    pub plano_markdown: Option<String>,
    #[serde(default, alias = "avisos_importantes")]
    pub avisos_importantes: Option<Vec<String>>,
    #[serde(default, alias = "sugestoes_adicionais")]
    pub sugestoes_adicionais: Option<String>,
}

impl From<PlanRecordInput> for PlanRecord {
    fn from(input: PlanRecordInput) -> Self {
        Self {
            plano_markdown: input.plano_markdown.unwrap_or_default(),
            avisos_importantes: input.avisos_importantes.unwrap_or_default(),
            sugestoes_adicionais: input.sugestoes_adicionais.unwrap_or_default(),
        }
    }
}

impl From<PlanRecord> for PlanRecordInput {
    fn from(record: PlanRecord) -> Self {
        Self {
            plano_markdown: Some(record.plano_markdown),
            avisos_importantes: Some(record.avisos_importantes),
            sugestoes_adicionais: Some(record.sugestoes_adicionais),
        }
    }
}
