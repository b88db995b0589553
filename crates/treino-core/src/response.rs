//! Strict shape validation of the model's raw output.
//!
//! The text must be a single JSON object carrying the three plan record
//! keys with exactly the expected types. Nothing is coerced or repaired;
//! extra keys are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::PlanRecord;

/// The model violated the output-shape contract.
#[derive(Debug, Error)]
pub enum MalformedModelOutput {
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("model output is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },

    #[error("model output is missing required key {0:?}")]
    MissingField(&'static str),

    #[error("model output key {field:?} is a {found}, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Parse and validate the model's raw text as a [`PlanRecord`].
pub fn parse_model_output(raw: &str) -> Result<PlanRecord, MalformedModelOutput> {
    let value: Value = serde_json::from_str(raw)?;
    let object = match value {
        Value::Object(map) => map,
        other => {
            return Err(MalformedModelOutput::NotAnObject {
                found: json_kind(&other),
            });
        }
    };

    Ok(PlanRecord {
        plano_markdown: string_field(&object, "plano_markdown")?,
        avisos_importantes: string_list_field(&object, "avisos_importantes")?,
        sugestoes_adicionais: string_field(&object, "sugestoes_adicionais")?,
    })
}

fn get<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, MalformedModelOutput> {
    object
        .get(field)
        .ok_or(MalformedModelOutput::MissingField(field))
}

fn string_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<String, MalformedModelOutput> {
    match get(object, field)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(MalformedModelOutput::WrongType {
            field,
            expected: "string",
            found: json_kind(other),
        }),
    }
}

fn string_list_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, MalformedModelOutput> {
    let wrong = |found: &'static str| MalformedModelOutput::WrongType {
        field,
        expected: "array of strings",
        found,
    };

    let items = match get(object, field)? {
        Value::Array(items) => items,
        other => return Err(wrong(json_kind(other))),
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong(json_kind(other))),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
