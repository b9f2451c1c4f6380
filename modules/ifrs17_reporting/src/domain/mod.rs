//! Domain layer - business logic and repository contracts

pub mod auth;
pub mod events;
pub mod parser;
pub mod quality;
pub mod repository;
pub mod service;
pub mod validation;

pub use auth::{Authenticator, Session};
pub use events::{EventPublisher, ReportingEvent, TracingEventPublisher};
pub use service::{Repositories, Service};
