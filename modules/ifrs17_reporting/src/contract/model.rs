//! Contract models for the reporting module
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Error returned when a stored or submitted value names no known variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Closed set of values persisted and exchanged as fixed strings.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Reporting currency
    Currency {
        Zwl => "ZWL",
        Usd => "USD",
    }
}

string_enum! {
    /// Licensing status of an institution
    InstitutionStatus {
        Active => "active",
        Suspended => "suspended",
        Inactive => "inactive",
    }
}

string_enum! {
    /// Line of business an institution is licensed for
    InstitutionType {
        Life => "life",
        NonLife => "non_life",
        Composite => "composite",
        Reinsurer => "reinsurer",
        Funeral => "funeral",
    }
}

string_enum! {
    /// Review workflow status of a submission
    SubmissionStatus {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
    }
}

string_enum! {
    /// Declared format of an uploaded submission file
    FileType {
        Csv => "csv",
        Excel => "excel",
        Xbrl => "xbrl",
    }
}

string_enum! {
    AlertSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

string_enum! {
    AlertType {
        RegulatoryBreach => "regulatory_breach",
        Solvency => "solvency",
        DataQuality => "data_quality",
        LateSubmission => "late_submission",
        Other => "other",
    }
}

string_enum! {
    /// IFRS 4 to IFRS 17 transition progress
    ImplementationStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

string_enum! {
    /// IFRS 17 measurement model of a contract group
    MeasurementModel {
        Gmm => "gmm",
        Paa => "paa",
        Vfa => "vfa",
    }
}

string_enum! {
    /// Profitability bucket of a contract group at initial recognition
    RiskProfile {
        Onerous => "onerous",
        NoSignificantRisk => "no_significant_risk",
        Remaining => "remaining",
    }
}

string_enum! {
    /// Data kinds on the completeness checklist of the quality scorer
    DataKind {
        Submissions => "submissions",
        InsuranceRevenue => "insurance_revenue",
        CsmProfitability => "csm_profitability",
        DiscountRates => "discount_rates",
        ReinsuranceHeld => "reinsurance_held",
        Ifrs4Transition => "ifrs4_transition",
        ContractGrouping => "contract_grouping",
        ComplianceAlerts => "compliance_alerts",
    }
}

impl DataKind {
    /// Whether records of this kind carry a reporting currency
    pub fn is_per_currency(self) -> bool {
        !matches!(self, DataKind::Submissions | DataKind::ComplianceAlerts)
    }
}

// ===== Institutions =====

/// Registered insurance institution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub id: i32,
    pub name: String,
    pub registration_number: String,
    pub license_number: String,
    pub institution_type: InstitutionType,
    pub status: InstitutionStatus,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated institution fields for create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionInput {
    pub name: String,
    pub registration_number: String,
    pub license_number: String,
    pub institution_type: InstitutionType,
    pub status: InstitutionStatus,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

/// Equality filters for institution listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionFilter {
    pub status: Option<InstitutionStatus>,
    pub institution_type: Option<InstitutionType>,
}

// ===== Submissions =====

/// Headline IFRS 17 figures reported with a submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFinancials {
    pub contractual_service_margin: Option<Decimal>,
    pub risk_adjustment: Option<Decimal>,
    pub loss_component: Option<Decimal>,
    pub total_liabilities: Option<Decimal>,
    pub equity_impact: Option<Decimal>,
    pub profit_margin: Option<Decimal>,
    pub solvency_ratio: Option<Decimal>,
}

/// IFRS 17 submission for one institution and reporting period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: i32,
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub status: SubmissionStatus,
    /// Path of the stored file relative to the upload root
    pub uploaded_file: Option<String>,
    /// Filename as sent by the client
    pub original_filename: Option<String>,
    pub file_type: Option<FileType>,
    pub financials: SubmissionFinancials,
    pub notes: String,
    pub submission_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields of the submission create/edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionInput {
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub financials: SubmissionFinancials,
    pub notes: String,
    /// Status change requested by an edit; creation always starts as draft
    pub status: Option<SubmissionStatus>,
}

/// Row to insert into the submission store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub status: SubmissionStatus,
    pub uploaded_file: Option<String>,
    pub original_filename: Option<String>,
    pub file_type: Option<FileType>,
    pub financials: SubmissionFinancials,
    pub notes: String,
    pub submission_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub institution_id: Option<i32>,
    pub status: Option<SubmissionStatus>,
}

/// File part of an upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

/// Validated upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub file: UploadedFile,
    pub file_type: FileType,
    pub notes: String,
    pub confirm_override: bool,
}

/// Existing submission whose file collides with a new upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateConflict {
    pub existing_submission_id: i32,
    pub existing_filename: String,
    pub institution_id: i32,
    pub institution_name: String,
    pub reporting_period: NaiveDate,
}

/// Result of submission intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Submission stored; `replaced` lists the ids removed by an override
    Accepted {
        submission: Submission,
        replaced: Vec<i32>,
    },
    /// A matching file exists and override was not confirmed; nothing stored
    Duplicate(DuplicateConflict),
}

// ===== Metric records =====

/// Natural key shared by every per-currency metric record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricKey {
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub currency: Currency,
}

/// Domain-specific figures of a metric record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValues {
    InsuranceRevenue {
        total_revenue: Decimal,
        service_performance_ratio: Option<Decimal>,
    },
    CsmProfitability {
        opening_csm: Option<Decimal>,
        closing_csm: Decimal,
        csm_profit_margin: Option<Decimal>,
        csm_roi: Option<Decimal>,
    },
    DiscountRates {
        total_discount_rate: Decimal,
        net_finance_result: Option<Decimal>,
    },
    ReinsuranceHeld {
        total_reinsurance_held: Decimal,
        risk_transfer_ratio: Option<Decimal>,
    },
    Ifrs4Transition {
        implementation_status: ImplementationStatus,
        equity_impact: Option<Decimal>,
    },
    /// Contract groups are additionally keyed by product line and contract type
    ContractGrouping {
        product_line: String,
        contract_type: String,
        measurement_model: MeasurementModel,
        risk_profile: RiskProfile,
        number_of_contracts: i32,
    },
}

impl MetricValues {
    pub fn kind(&self) -> DataKind {
        match self {
            MetricValues::InsuranceRevenue { .. } => DataKind::InsuranceRevenue,
            MetricValues::CsmProfitability { .. } => DataKind::CsmProfitability,
            MetricValues::DiscountRates { .. } => DataKind::DiscountRates,
            MetricValues::ReinsuranceHeld { .. } => DataKind::ReinsuranceHeld,
            MetricValues::Ifrs4Transition { .. } => DataKind::Ifrs4Transition,
            MetricValues::ContractGrouping { .. } => DataKind::ContractGrouping,
        }
    }
}

/// Metric record to insert or replace by its natural key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricInput {
    pub key: MetricKey,
    pub values: MetricValues,
    pub notes: String,
}

/// Stored metric record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    pub id: i32,
    pub key: MetricKey,
    pub values: MetricValues,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MetricRecord {
    pub fn kind(&self) -> DataKind {
        self.values.kind()
    }
}

// ===== Data quality =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceScores {
    pub data_governance: Decimal,
    pub control_effectiveness: Decimal,
    pub audit_trail_completeness: Decimal,
    pub regulatory_compliance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyChecks {
    pub exchange_rate_consistency: bool,
    pub currency_conversion_accuracy: Decimal,
    pub multi_currency_reconciliation: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounters {
    pub missing_data_points: i32,
    pub anomalies_detected: i32,
    pub validation_errors: i32,
    pub critical_issues: i32,
    pub resolved_issues: i32,
    pub pending_issues: i32,
}

/// Scores computed for one institution in one currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    pub currency: Currency,
    pub completeness: Decimal,
    pub accuracy: Decimal,
    pub consistency: Decimal,
    pub timeliness: Decimal,
    pub overall: Decimal,
    pub governance: GovernanceScores,
    pub currency_checks: CurrencyChecks,
    pub issues: IssueCounters,
    pub remediation_plan: String,
}

/// Persisted quality report keyed by (institution, period, currency)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityCheck {
    pub id: i32,
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub report: QualityReport,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fixed summary returned by the batch quality-check trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityRunSummary {
    pub message: String,
    pub checks_run: Vec<String>,
    pub issues_found: u32,
    pub critical_issues: u32,
    pub warnings: u32,
}

// ===== Compliance alerts =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceAlert {
    pub id: i32,
    pub institution_id: i32,
    pub title: String,
    pub description: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertInput {
    pub institution_id: i32,
    pub title: String,
    pub description: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
}

// ===== Parsed files =====

/// Row records of an uploaded file, truncated for display
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub total_rows: usize,
    pub displayed_rows: usize,
    pub truncated: bool,
}

// ===== Read models =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionDetail {
    pub institution: Institution,
    pub recent_submissions: Vec<Submission>,
    pub open_alerts: Vec<ComplianceAlert>,
}

/// Everything recorded for an institution, as shown on its data page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionData {
    pub institution: Institution,
    pub metrics: Vec<MetricRecord>,
    pub quality_checks: Vec<DataQualityCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReview {
    pub checks: Vec<DataQualityCheck>,
    /// Mean overall score per currency; `None` when no check exists
    pub averages: Vec<(Currency, Option<Decimal>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOverview {
    pub year: i32,
    pub month: u32,
    pub submissions: Vec<Submission>,
    pub quality_checks: Vec<DataQualityCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub institutions: u64,
    pub active_institutions: u64,
    pub submissions_by_status: Vec<(SubmissionStatus, u64)>,
    pub unresolved_alerts: u64,
}

// ===== Users =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
