//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

// ===== Institution DTOs =====

/// Institution response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstitutionDto {
    pub id: i32,
    #[schema(example = "Old Mutual Zimbabwe")]
    pub name: String,
    pub registration_number: String,
    pub license_number: String,
    /// One of: life, non_life, composite, reinsurer, funeral
    #[schema(example = "life")]
    pub institution_type: String,
    /// One of: active, suspended, inactive
    #[schema(example = "active")]
    pub status: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Institution create/edit form, as posted
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InstitutionFormDto {
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

/// Query parameters for listing institutions
#[derive(Debug, Default, Deserialize)]
pub struct InstitutionListQuery {
    pub status: Option<String>,
    pub institution_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstitutionListResponse {
    pub items: Vec<InstitutionDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstitutionDetailDto {
    pub institution: InstitutionDto,
    pub recent_submissions: Vec<SubmissionDto>,
    pub open_alerts: Vec<AlertDto>,
}

/// Metric records grouped by currency plus stored quality checks
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstitutionDataDto {
    pub institution: InstitutionDto,
    pub metrics_by_currency: BTreeMap<String, Vec<MetricRecordDto>>,
    pub quality_checks: Vec<QualityCheckDto>,
}

// ===== Submission DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmissionDto {
    pub id: i32,
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    /// One of: draft, submitted, under_review, approved, rejected
    #[schema(example = "submitted")]
    pub status: String,
    /// Stored path relative to the upload root
    pub uploaded_file: Option<String>,
    pub original_filename: Option<String>,
    pub file_type: Option<String>,
    pub contractual_service_margin: Option<Decimal>,
    pub risk_adjustment: Option<Decimal>,
    pub loss_component: Option<Decimal>,
    pub total_liabilities: Option<Decimal>,
    pub equity_impact: Option<Decimal>,
    pub profit_margin: Option<Decimal>,
    pub solvency_ratio: Option<Decimal>,
    pub notes: String,
    pub submission_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission create/edit form, as posted
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmissionFormDto {
    /// Institution id
    pub institution: Option<String>,
    /// ISO-8601 date
    #[schema(example = "2024-03-31")]
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

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionListQuery {
    pub institution_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionListResponse {
    pub items: Vec<SubmissionDto>,
    pub total: usize,
}

/// 409 body returned when an upload collides with a stored file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DuplicateConflictResponse {
    pub conflict: bool,
    pub existing_submission_id: i32,
    pub existing_filename: String,
    pub institution_id: i32,
    pub institution_name: String,
    pub reporting_period: NaiveDate,
    pub message: String,
}

// ===== Parsed file DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParseResponse {
    pub success: bool,
    /// Row records keyed by column name
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
    pub total_rows: usize,
    pub displayed_rows: usize,
    pub truncated: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParseErrorResponse {
    pub success: bool,
    pub error: String,
}

// ===== Metric DTOs =====

/// Figures of a metric record, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricValuesDto {
    InsuranceRevenue {
        total_revenue: Decimal,
        #[serde(default)]
        service_performance_ratio: Option<Decimal>,
    },
    CsmProfitability {
        #[serde(default)]
        opening_csm: Option<Decimal>,
        closing_csm: Decimal,
        #[serde(default)]
        csm_profit_margin: Option<Decimal>,
        #[serde(default)]
        csm_roi: Option<Decimal>,
    },
    DiscountRates {
        total_discount_rate: Decimal,
        #[serde(default)]
        net_finance_result: Option<Decimal>,
    },
    ReinsuranceHeld {
        total_reinsurance_held: Decimal,
        #[serde(default)]
        risk_transfer_ratio: Option<Decimal>,
    },
    Ifrs4Transition {
        /// One of: not_started, in_progress, completed
        implementation_status: String,
        #[serde(default)]
        equity_impact: Option<Decimal>,
    },
    ContractGrouping {
        product_line: String,
        contract_type: String,
        /// One of: gmm, paa, vfa
        measurement_model: String,
        /// One of: onerous, no_significant_risk, remaining
        risk_profile: String,
        number_of_contracts: i32,
    },
}

/// Metric upsert request; the institution comes from the path
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MetricRequest {
    pub reporting_period: NaiveDate,
    /// ZWL or USD
    #[schema(example = "USD")]
    pub currency: String,
    #[serde(default)]
    pub notes: String,
    pub values: MetricValuesDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricRecordDto {
    pub id: i32,
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub currency: String,
    pub values: MetricValuesDto,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===== Data quality DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QualityCheckDto {
    pub id: i32,
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub currency: String,
    pub completeness_score: Decimal,
    pub accuracy_score: Decimal,
    pub consistency_score: Decimal,
    pub timeliness_score: Decimal,
    pub overall_quality_score: Decimal,
    pub data_governance_score: Decimal,
    pub control_effectiveness_score: Decimal,
    pub audit_trail_completeness: Decimal,
    pub regulatory_compliance_score: Decimal,
    pub exchange_rate_consistency: bool,
    pub currency_conversion_accuracy: Decimal,
    pub multi_currency_reconciliation: bool,
    pub missing_data_points: i32,
    pub anomalies_detected: i32,
    pub validation_errors: i32,
    pub critical_issues: i32,
    pub resolved_issues: i32,
    pub pending_issues: i32,
    pub remediation_plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyAverageDto {
    pub currency: String,
    /// Absent when no check exists for the currency
    pub average_overall_score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QualityReviewDto {
    pub checks: Vec<QualityCheckDto>,
    pub averages: Vec<CurrencyAverageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QualityRunSummaryDto {
    pub success: bool,
    pub message: String,
    pub checks_run: Vec<String>,
    pub issues_found: u32,
    pub critical_issues: u32,
    pub warnings: u32,
}

// ===== Overview DTOs =====

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodOverviewDto {
    pub year: i32,
    pub month: u32,
    pub submissions: Vec<SubmissionDto>,
    pub quality_checks: Vec<QualityCheckDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub institutions: u64,
    pub active_institutions: u64,
    pub submissions_by_status: BTreeMap<String, u64>,
    pub unresolved_alerts: u64,
}

// ===== Compliance alert DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlertDto {
    pub id: i32,
    pub institution_id: i32,
    pub title: String,
    pub description: String,
    pub alert_type: String,
    pub severity: String,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AlertFormDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub alert_type: Option<String>,
    pub severity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertListQuery {
    /// Only list alerts that are still open
    #[serde(default)]
    pub unresolved: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertListResponse {
    pub items: Vec<AlertDto>,
    pub total: usize,
}

// ===== Authentication DTOs =====

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}
