//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod form;
pub mod model;

pub use client::ReportingApi;
pub use error::{FieldErrors, ReportingError};
pub use form::{AlertForm, InstitutionForm, SubmissionForm, UploadForm};
pub use model::*;
