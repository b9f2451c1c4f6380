//! Raw form submissions
//!
//! Values exactly as posted by a client; the domain validation layer turns
//! them into typed inputs or field-level errors.

use super::model::UploadedFile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionForm {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub license_number: Option<String>,
    pub institution_type: Option<String>,
    pub status: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    pub institution: Option<String>,
    pub reporting_period: Option<String>,
    pub contractual_service_margin: Option<String>,
    pub risk_adjustment: Option<String>,
    pub loss_component: Option<String>,
    pub total_liabilities: Option<String>,
    pub equity_impact: Option<String>,
    pub profit_margin: Option<String>,
    pub solvency_ratio: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub institution: Option<String>,
    pub reporting_period: Option<String>,
    pub file_type: Option<String>,
    pub notes: Option<String>,
    pub confirm_override: bool,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub alert_type: Option<String>,
    pub severity: Option<String>,
}
