//! Native client trait for inter-module communication
//!
//! Other modules use this API to read reporting data and trigger intake or
//! scoring without going through HTTP.

use super::error::ReportingError;
use super::form::{InstitutionForm, UploadForm};
use super::model::{
    DataQualityCheck, Institution, InstitutionFilter, IntakeOutcome, MetricInput, MetricRecord,
    ParsedTable, Submission, SubmissionFilter,
};
use async_trait::async_trait;

/// Reporting API for inter-module communication
#[async_trait]
pub trait ReportingApi: Send + Sync {
    // ===== Institutions =====

    async fn create_institution(&self, form: InstitutionForm)
        -> Result<Institution, ReportingError>;

    async fn get_institution(&self, id: i32) -> Result<Institution, ReportingError>;

    async fn list_institutions(
        &self,
        filter: InstitutionFilter,
    ) -> Result<Vec<Institution>, ReportingError>;

    // ===== Submissions =====

    async fn get_submission(&self, id: i32) -> Result<Submission, ReportingError>;

    async fn list_submissions(
        &self,
        filter: SubmissionFilter,
    ) -> Result<Vec<Submission>, ReportingError>;

    /// Store an uploaded file, or report the submission it would duplicate
    async fn upload_submission(&self, form: UploadForm) -> Result<IntakeOutcome, ReportingError>;

    /// Parse the file attached to a submission into display rows
    async fn parse_submission_file(&self, submission_id: i32)
        -> Result<ParsedTable, ReportingError>;

    // ===== Metrics and quality =====

    /// Insert or replace a metric record by its natural key
    async fn upsert_metric(&self, input: MetricInput) -> Result<MetricRecord, ReportingError>;

    /// Recompute and persist the per-currency quality checks of an institution
    async fn validate_institution_data(
        &self,
        institution_id: i32,
    ) -> Result<Vec<DataQualityCheck>, ReportingError>;
}
