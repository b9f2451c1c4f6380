//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs and infra/files.rs

use crate::contract::{
    AlertInput, ComplianceAlert, Currency, DataKind, DataQualityCheck, Institution,
    InstitutionFilter, InstitutionInput, InstitutionStatus, MetricInput, MetricRecord,
    NewSubmission, QualityReport, Submission, SubmissionFilter, SubmissionInput,
    SubmissionStatus, User,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository for institutions
#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    async fn create(&self, input: &InstitutionInput) -> Result<Institution>;

    /// Overwrite all editable fields; `None` when the id is unknown
    async fn update(&self, id: i32, input: &InstitutionInput) -> Result<Option<Institution>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Institution>>;

    async fn list(&self, filter: &InstitutionFilter) -> Result<Vec<Institution>>;

    /// Institutions sharing the name, registration number or license number
    /// of `input`, other than `exclude_id`
    async fn find_clashes(
        &self,
        input: &InstitutionInput,
        exclude_id: Option<i32>,
    ) -> Result<Vec<Institution>>;

    /// Delete an institution and every record that belongs to it
    async fn delete_cascade(&self, id: i32) -> Result<bool>;

    async fn count(&self, status: Option<InstitutionStatus>) -> Result<u64>;
}

/// Repository for IFRS 17 submissions
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: &NewSubmission) -> Result<Submission>;

    /// Delete `replaced` and insert `submission` in one transaction
    async fn replace(&self, replaced: &[i32], submission: &NewSubmission) -> Result<Submission>;

    async fn update(&self, id: i32, input: &SubmissionInput) -> Result<Option<Submission>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Submission>>;

    /// Newest first
    async fn list(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>>;

    async fn find_by_institution_period(
        &self,
        institution_id: i32,
        reporting_period: NaiveDate,
    ) -> Result<Vec<Submission>>;

    /// Submissions whose reporting period falls in `[from, to]`
    async fn list_in_period_range(&self, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<Submission>>;

    async fn latest_reporting_period(&self, institution_id: i32) -> Result<Option<NaiveDate>>;

    async fn count_by_status(&self) -> Result<Vec<(SubmissionStatus, u64)>>;
}

/// Repository for per-currency financial metric records
#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Insert or replace the record with the same natural key
    async fn upsert(&self, input: &MetricInput) -> Result<MetricRecord>;

    async fn list_for_institution(&self, institution_id: i32) -> Result<Vec<MetricRecord>>;

    /// Whether at least one record of a per-currency `kind` exists
    async fn has_records(&self, institution_id: i32, kind: DataKind, currency: Currency)
        -> Result<bool>;
}

/// Repository for data quality checks
#[async_trait]
pub trait QualityCheckRepository: Send + Sync {
    /// Atomic insert-or-update keyed by (institution, period, report currency)
    async fn upsert(
        &self,
        institution_id: i32,
        reporting_period: NaiveDate,
        report: &QualityReport,
    ) -> Result<DataQualityCheck>;

    async fn list_for_institution(&self, institution_id: i32) -> Result<Vec<DataQualityCheck>>;

    async fn list_all(&self) -> Result<Vec<DataQualityCheck>>;

    async fn list_in_period_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DataQualityCheck>>;
}

/// Repository for compliance alerts
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn create(&self, input: &AlertInput) -> Result<ComplianceAlert>;

    async fn list_for_institution(
        &self,
        institution_id: i32,
        unresolved_only: bool,
    ) -> Result<Vec<ComplianceAlert>>;

    async fn resolve(&self, id: i32) -> Result<Option<ComplianceAlert>>;

    async fn count_unresolved(&self) -> Result<u64>;
}

/// Repository for login accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, username: &str) -> Result<Option<User>>;

    /// Create the account or replace its password hash
    async fn upsert(&self, username: &str, password_hash: &str) -> Result<User>;
}

/// Durable storage for uploaded submission files
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes under the period partition and return the relative path
    async fn save(&self, reporting_period: NaiveDate, filename: &str, content: &[u8])
        -> Result<String>;

    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Remove a stored file; a missing file is not an error
    async fn delete(&self, path: &str) -> Result<()>;

    /// Move a stored file to a temporary name so its own name can be reused.
    /// Returns the temporary path, or `None` when the file is already gone.
    async fn set_aside(&self, path: &str) -> Result<Option<String>>;

    /// Move a file set aside back to the path it came from
    async fn restore(&self, aside: &str, path: &str) -> Result<()>;
}
