//! Shared test utilities for treino integration tests.
//!
//! Provides substitute [`PlanModel`] backends that never touch the network
//! (canned text, canned failure) and record every request they receive,
//! plus sample profiles and model outputs.

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use treino_core::model::{GenerationRequest, PlanModel};
use treino_core::profile::UserProfile;

/// What a [`CannedModel`] answers with.
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Failure(String),
}

/// A model that always gives the same answer and remembers every prompt.
#[derive(Debug)]
pub struct CannedModel {
    reply: Reply,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl CannedModel {
    /// Answer every request with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Failure(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Copies of the requests received so far, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PlanModel for CannedModel {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests
            .lock()
            .map_err(|_| anyhow!("canned model lock poisoned"))?
            .push(request.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Failure(message) => Err(anyhow!("{message}")),
        }
    }
}

/// A well-formed model answer with all three fields populated.
pub fn sample_model_output() -> String {
    serde_json::json!({
        "plano_markdown": "## Segunda\n**Aquecimento:** 5 min de polichinelos\n- Agachamento com halteres: 3x12, descanso 60s\n- *Alongamento* final",
        "avisos_importantes": [
            "Consulte um profissional de saúde antes de começar.",
            "Interrompa o exercício se sentir dor."
        ],
        "sugestoes_adicionais": "Aumente a carga gradualmente e durma bem."
    })
    .to_string()
}

/// A typical beginner profile: all required fields present, no
/// restrictions, empty specialization.
pub fn sample_profile() -> UserProfile {
    UserProfile {
        objetivo: Some("hypertrophy".to_string()),
        nivel: Some("beginner".to_string()),
        acesso_equipamentos: Some("home, dumbbells only".to_string()),
        restricoes: None,
        especificacao: Some(String::new()),
    }
}
