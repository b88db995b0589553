//! Core of the workout plan service: prompt construction, model output
//! validation, PDF rendering and the two request operations tying them
//! together.

pub mod model;
pub mod profile;
pub mod prompt;
pub mod record;
pub mod render;
pub mod response;
pub mod service;

pub use model::{GeminiModel, GenerationRequest, OutputShape, PlanModel};
pub use profile::{RequiredField, TrainingProfile, UserProfile};
pub use record::{PlanRecord, PlanRecordInput};
pub use render::{RenderError, RenderedDocument, render_plan};
pub use response::{MalformedModelOutput, parse_model_output};
pub use service::{PlanService, ServiceError, render_document};
