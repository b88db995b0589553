//! Inbound user profile and its validated form.

use serde::{Deserialize, Serialize};

/// The profile as it arrives from a caller.
///
/// Every field is optional at the type level so that an absent key and an
/// explicit `null` both deserialize; [`UserProfile::validate`] enforces the
/// required ones.
///
/// Both the camelCase names and the older snake_case names
/// (`acesso_equipamentos`, `especificacao_treino`) are accepted. When a body
/// carries both spellings, the first non-blank value wins, camelCase first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProfileFields")]
pub struct UserProfile {
    /// Fitness goal (e.g. "hipertrofia").
    pub objetivo: Option<String>,
    /// Experience level (e.g. "iniciante").
    pub nivel: Option<String>,
    /// Equipment access (e.g. "casa, apenas halteres").
    #[serde(rename = "acessoEquipamentos")]
    pub acesso_equipamentos: Option<String>,
    /// Physical restrictions, if any.
    pub restricoes: Option<String>,
    /// Free-text specialization (e.g. "adaptado para basquete").
    pub especificacao: Option<String>,
}

/// Wire form of [`UserProfile`], with each spelling in its own slot.
#[derive(Deserialize)]
struct ProfileFields {
    #[serde(default)]
    objetivo: Option<String>,
    #[serde(default)]
    nivel: Option<String>,
    #[serde(default, rename = "acessoEquipamentos")]
    acesso_equipamentos: Option<String>,
    #[serde(default, rename = "acesso_equipamentos")]
    acesso_equipamentos_snake: Option<String>,
    #[serde(default)]
    restricoes: Option<String>,
    #[serde(default)]
    especificacao: Option<String>,
    #[serde(default)]
    especificacao_treino: Option<String>,
}

impl From<ProfileFields> for UserProfile {
    fn from(raw: ProfileFields) -> Self {
        Self {
            objetivo: raw.objetivo,
            nivel: raw.nivel,
            acesso_equipamentos: first_non_blank(
                raw.acesso_equipamentos,
                raw.acesso_equipamentos_snake,
            ),
            restricoes: raw.restricoes,
            especificacao: first_non_blank(raw.especificacao, raw.especificacao_treino),
        }
    }
}

fn first_non_blank(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    match primary {
        Some(v) if !v.trim().is_empty() => Some(v),
        other => fallback.or(other),
    }
}

/// The three fields a profile cannot go without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Objetivo,
    Nivel,
    AcessoEquipamentos,
}

impl RequiredField {
    /// Wire name of the field, as a caller would send it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Objetivo => "objetivo",
            Self::Nivel => "nivel",
            Self::AcessoEquipamentos => "acessoEquipamentos",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A profile whose required fields are known to be present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingProfile {
    pub objetivo: String,
    pub nivel: String,
    pub acesso_equipamentos: String,
    /// `None` is rendered as `null` in the prompt.
    pub restricoes: Option<String>,
    /// Defaults to the empty string.
    pub especificacao: String,
}

impl UserProfile {
    /// Check the required fields, in declaration order.
    ///
    /// A field that is absent, `null`, empty or whitespace-only is missing.
    /// Values are kept verbatim otherwise (no trimming).
    pub fn validate(self) -> Result<TrainingProfile, RequiredField> {
        let objetivo = required(self.objetivo, RequiredField::Objetivo)?;
        let nivel = required(self.nivel, RequiredField::Nivel)?;
        let acesso_equipamentos =
            required(self.acesso_equipamentos, RequiredField::AcessoEquipamentos)?;

        Ok(TrainingProfile {
            objetivo,
            nivel,
            acesso_equipamentos,
            restricoes: self.restricoes,
            especificacao: self.especificacao.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, field: RequiredField) -> Result<String, RequiredField> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(field),
    }
}
