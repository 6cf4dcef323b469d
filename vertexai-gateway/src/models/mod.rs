//! Request and response shapes exchanged with API callers.

pub mod inference;

pub use inference::{HealthResponse, InferenceRequest, InferenceResponse};
