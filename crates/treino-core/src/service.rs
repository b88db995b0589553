//! Request orchestration: the two entry operations of the core.
//!
//! - [`PlanService::generate_plan`]: validate profile -> build prompt ->
//!   one model call -> strict output validation.
//! - [`render_document`]: default the payload -> render on the blocking
//!   pool.
//!
//! Neither operation retries. Failures past input validation are flattened
//! into a message that keeps the full error chain.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::PlanModel;
use crate::profile::{RequiredField, UserProfile};
use crate::prompt::build_prompt;
use crate::record::{PlanRecord, PlanRecordInput};
use crate::render::{self, RenderedDocument};
use crate::response::parse_model_output;

/// Errors surfaced to callers of the core.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller left out a required profile field.
    #[error("missing required field: {0}")]
    MissingRequiredField(RequiredField),

    /// The model call failed or returned output of the wrong shape.
    #[error("plan generation failed: {0}")]
    UpstreamFailure(String),

    /// Document construction failed.
    #[error("plan rendering failed: {0}")]
    RenderFailure(String),
}

impl ServiceError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingRequiredField(_))
    }
}

/// Holds the model capability shared by every Generate call.
///
/// The service carries no mutable state; one instance can serve any number
/// of concurrent requests.
#[derive(Clone)]
pub struct PlanService {
    model: Arc<dyn PlanModel>,
}

impl PlanService {
    pub fn new(model: Arc<dyn PlanModel>) -> Self {
        Self { model }
    }

    /// Name of the underlying model backend.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Generate a plan for `profile`.
    ///
    /// Required fields are checked before anything else; a missing one
    /// returns immediately without calling the model.
    pub async fn generate_plan(&self, profile: UserProfile) -> Result<PlanRecord, ServiceError> {
        let profile = profile
            .validate()
            .map_err(ServiceError::MissingRequiredField)?;

        let request = build_prompt(&profile);
        debug!(
            model = self.model.name(),
            prompt_len = request.prompt.len(),
            "requesting plan from model"
        );

        let raw = self.model.generate(&request).await.map_err(|e| {
            let message = format!("{e:#}");
            warn!(model = self.model.name(), error = %message, "model call failed");
            ServiceError::UpstreamFailure(message)
        })?;

        parse_model_output(&raw).map_err(|e| {
            warn!(model = self.model.name(), error = %e, "model output rejected");
            ServiceError::UpstreamFailure(e.to_string())
        })
    }

    /// Render a plan payload. See [`render_document`].
    pub async fn render_plan(
        &self,
        input: PlanRecordInput,
    ) -> Result<RenderedDocument, ServiceError> {
        render_document(input).await
    }
}

/// Render a plan payload into a PDF on the blocking thread pool.
///
/// Missing fields default to empty. Any failure, including a panic inside
/// layout, comes back as [`ServiceError::RenderFailure`].
pub async fn render_document(input: PlanRecordInput) -> Result<RenderedDocument, ServiceError> {
    let record = PlanRecord::from(input);
    let joined = tokio::task::spawn_blocking(move || render::render_plan(&record)).await;

    match joined {
        Ok(Ok(doc)) => Ok(doc),
        Ok(Err(e)) => {
            warn!(error = %e, "plan rendering failed");
            Err(ServiceError::RenderFailure(e.to_string()))
        }
        Err(e) if e.is_panic() => {
            let message = panic_message(e.into_panic());
            warn!(error = %message, "plan rendering panicked");
            Err(ServiceError::RenderFailure(message))
        }
        Err(e) => Err(ServiceError::RenderFailure(e.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "renderer panicked".to_string()
    }
}
