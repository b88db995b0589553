//! Model capability seam: "given a prompt and a requested output shape,
//! return text".
//!
//! ```text
//! PlanService
//!     |
//!     v
//! Arc<dyn PlanModel> --generate(GenerationRequest)--> raw text
//!     |
//!     +-- GeminiModel (HTTP)
//!     +-- test substitutes returning canned text
//! ```

pub mod gemini;
pub mod trait_def;

pub use gemini::{GeminiConfig, GeminiModel};
pub use trait_def::PlanModel;

use serde_json::{Value, json};

/// Type of a single field in the requested output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    StringList,
}

/// One named field of the requested output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeField {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// The structured output the model is asked to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputShape {
    /// MIME type requested from the backend.
    pub mime_type: &'static str,
    /// Required top-level fields, in order.
    pub fields: &'static [ShapeField],
}

/// The three-field plan record contract.
pub const PLAN_RECORD_FIELDS: &[ShapeField] = &[
    ShapeField {
        name: "plano_markdown",
        kind: FieldKind::String,
    },
    ShapeField {
        name: "avisos_importantes",
        kind: FieldKind::StringList,
    },
    ShapeField {
        name: "sugestoes_adicionais",
        kind: FieldKind::String,
    },
];

impl OutputShape {
    /// A JSON object with exactly the plan record fields.
    pub fn plan_record() -> Self {
        Self {
            mime_type: "application/json",
            fields: PLAN_RECORD_FIELDS,
        }
    }

    /// Standard JSON Schema for this shape.
    pub fn json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for field in self.fields {
            let schema = match field.kind {
                FieldKind::String => json!({ "type": "string" }),
                FieldKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            };
            properties.insert(field.name.to_string(), schema);
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A single generation call: prompt text plus the requested output shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub shape: OutputShape,
}
