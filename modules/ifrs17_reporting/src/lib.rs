//! IFRS 17 Reporting Module
//!
//! Regulatory reporting for insurance institutions: institution registry,
//! IFRS 17 submissions with file intake, per-currency financial metrics,
//! tabular parsing of uploaded files and data quality scoring.

// Public exports
pub mod contract;
pub use contract::{
    client::ReportingApi, error::ReportingError, Currency, DataQualityCheck, Institution,
    IntakeOutcome, MetricRecord, ParsedTable, QualityReport, Submission,
};

pub mod module;
pub use module::ReportingModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
