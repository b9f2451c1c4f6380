//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    DataQualityCheck, Institution, InstitutionFilter, InstitutionForm, IntakeOutcome, MetricInput,
    MetricRecord, ParsedTable, ReportingApi, ReportingError, Submission, SubmissionFilter,
    UploadForm,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// Used by other modules in the same process without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ReportingApi for NativeClient {
    async fn create_institution(&self, form: InstitutionForm) -> Result<Institution, ReportingError> {
        self.service.create_institution(&form).await
    }

    async fn get_institution(&self, id: i32) -> Result<Institution, ReportingError> {
        self.service.get_institution(id).await
    }

    async fn list_institutions(
        &self,
        filter: InstitutionFilter,
    ) -> Result<Vec<Institution>, ReportingError> {
        self.service.list_institutions(&filter).await
    }

    async fn get_submission(&self, id: i32) -> Result<Submission, ReportingError> {
        self.service.get_submission(id).await
    }

    async fn list_submissions(
        &self,
        filter: SubmissionFilter,
    ) -> Result<Vec<Submission>, ReportingError> {
        self.service.list_submissions(&filter).await
    }

    async fn upload_submission(&self, form: UploadForm) -> Result<IntakeOutcome, ReportingError> {
        self.service.upload_submission(&form).await
    }

    async fn parse_submission_file(&self, submission_id: i32) -> Result<ParsedTable, ReportingError> {
        self.service.parse_submission_file(submission_id).await
    }

    async fn upsert_metric(&self, input: MetricInput) -> Result<MetricRecord, ReportingError> {
        self.service.upsert_metric(&input).await
    }

    async fn validate_institution_data(
        &self,
        institution_id: i32,
    ) -> Result<Vec<DataQualityCheck>, ReportingError> {
        self.service.validate_institution_data(institution_id).await
    }
}
