//! The `PlanModel` trait -- the adapter interface for generative backends.
//!
//! The trait is object-safe so the service can hold an `Arc<dyn PlanModel>`
//! and tests can substitute a backend that returns canned text.

use anyhow::Result;
use async_trait::async_trait;

use super::GenerationRequest;

/// A generative text backend.
///
/// One call to [`PlanModel::generate`] is one blocking round-trip: no
/// streaming, no partial results and no retries. Implementations return the
/// raw response text and leave shape validation to the caller.
#[async_trait]
pub trait PlanModel: Send + Sync {
    /// Human-readable name for this backend (e.g. "gemini-2.5-flash").
    fn name(&self) -> &str;

    /// Send the prompt and requested shape, return the model's raw text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

// Compile-time assertion: PlanModel must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanModel) {}
};
