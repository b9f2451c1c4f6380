//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Enum columns are
//! stored as their string form and parsed back here.

use super::entity;
use crate::contract::{
    AlertInput, ComplianceAlert, CurrencyChecks, DataQualityCheck, GovernanceScores, Institution,
    InstitutionInput, IssueCounters, MetricKey, MetricRecord, MetricValues, NewSubmission,
    QualityReport, Submission, SubmissionFinancials, User,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

fn metric_key(institution_id: i32, reporting_period: NaiveDate, currency: &str) -> anyhow::Result<MetricKey> {
    Ok(MetricKey {
        institution_id,
        reporting_period,
        currency: currency.parse()?,
    })
}

fn metric_record(
    id: i32,
    key: MetricKey,
    values: MetricValues,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> MetricRecord {
    MetricRecord {
        id,
        key,
        values,
        notes,
        created_at,
        updated_at,
    }
}

// ===== Institution Conversions =====

impl TryFrom<entity::institution::Model> for Institution {
    type Error = anyhow::Error;

    fn try_from(entity: entity::institution::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            name: entity.name,
            registration_number: entity.registration_number,
            license_number: entity.license_number,
            institution_type: entity.institution_type.parse()?,
            status: entity.status.parse()?,
            contact_person: entity.contact_person,
            email: entity.email,
            phone: entity.phone,
            address: entity.address,
            city: entity.city,
            country: entity.country,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Editable columns of an institution; id and created_at are left unset
pub fn institution_active_model(
    input: &InstitutionInput,
    now: DateTime<Utc>,
) -> entity::institution::ActiveModel {
    entity::institution::ActiveModel {
        id: NotSet,
        name: Set(input.name.clone()),
        registration_number: Set(input.registration_number.clone()),
        license_number: Set(input.license_number.clone()),
        institution_type: Set(input.institution_type.as_str().to_string()),
        status: Set(input.status.as_str().to_string()),
        contact_person: Set(input.contact_person.clone()),
        email: Set(input.email.clone()),
        phone: Set(input.phone.clone()),
        address: Set(input.address.clone()),
        city: Set(input.city.clone()),
        country: Set(input.country.clone()),
        created_at: NotSet,
        updated_at: Set(now),
    }
}

// ===== Submission Conversions =====

impl TryFrom<entity::submission::Model> for Submission {
    type Error = anyhow::Error;

    fn try_from(entity: entity::submission::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            institution_id: entity.institution_id,
            reporting_period: entity.reporting_period,
            status: entity.status.parse()?,
            uploaded_file: entity.uploaded_file,
            original_filename: entity.original_filename,
            file_type: entity.file_type.map(|t| t.parse()).transpose()?,
            financials: SubmissionFinancials {
                contractual_service_margin: entity.contractual_service_margin,
                risk_adjustment: entity.risk_adjustment,
                loss_component: entity.loss_component,
                total_liabilities: entity.total_liabilities,
                equity_impact: entity.equity_impact,
                profit_margin: entity.profit_margin,
                solvency_ratio: entity.solvency_ratio,
            },
            notes: entity.notes,
            submission_date: entity.submission_date,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&NewSubmission> for entity::submission::ActiveModel {
    fn from(model: &NewSubmission) -> Self {
        let now = Utc::now();
        let f = &model.financials;
        Self {
            id: NotSet,
            institution_id: Set(model.institution_id),
            reporting_period: Set(model.reporting_period),
            status: Set(model.status.as_str().to_string()),
            uploaded_file: Set(model.uploaded_file.clone()),
            original_filename: Set(model.original_filename.clone()),
            file_type: Set(model.file_type.map(|t| t.as_str().to_string())),
            contractual_service_margin: Set(f.contractual_service_margin),
            risk_adjustment: Set(f.risk_adjustment),
            loss_component: Set(f.loss_component),
            total_liabilities: Set(f.total_liabilities),
            equity_impact: Set(f.equity_impact),
            profit_margin: Set(f.profit_margin),
            solvency_ratio: Set(f.solvency_ratio),
            notes: Set(model.notes.clone()),
            submission_date: Set(model.submission_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

// ===== Metric Conversions =====

impl TryFrom<entity::insurance_revenue::Model> for MetricRecord {
    type Error = anyhow::Error;

    fn try_from(e: entity::insurance_revenue::Model) -> Result<Self, Self::Error> {
        Ok(metric_record(
            e.id,
            metric_key(e.institution_id, e.reporting_period, &e.currency)?,
            MetricValues::InsuranceRevenue {
                total_revenue: e.total_revenue,
                service_performance_ratio: e.service_performance_ratio,
            },
            e.notes,
            e.created_at,
            e.updated_at,
        ))
    }
}

impl TryFrom<entity::csm_profitability::Model> for MetricRecord {
    type Error = anyhow::Error;

    fn try_from(e: entity::csm_profitability::Model) -> Result<Self, Self::Error> {
        Ok(metric_record(
            e.id,
            metric_key(e.institution_id, e.reporting_period, &e.currency)?,
            MetricValues::CsmProfitability {
                opening_csm: e.opening_csm,
                closing_csm: e.closing_csm,
                csm_profit_margin: e.csm_profit_margin,
                csm_roi: e.csm_roi,
            },
            e.notes,
            e.created_at,
            e.updated_at,
        ))
    }
}

impl TryFrom<entity::discount_rates::Model> for MetricRecord {
    type Error = anyhow::Error;

    fn try_from(e: entity::discount_rates::Model) -> Result<Self, Self::Error> {
        Ok(metric_record(
            e.id,
            metric_key(e.institution_id, e.reporting_period, &e.currency)?,
            MetricValues::DiscountRates {
                total_discount_rate: e.total_discount_rate,
                net_finance_result: e.net_finance_result,
            },
            e.notes,
            e.created_at,
            e.updated_at,
        ))
    }
}

impl TryFrom<entity::reinsurance_held::Model> for MetricRecord {
    type Error = anyhow::Error;

    fn try_from(e: entity::reinsurance_held::Model) -> Result<Self, Self::Error> {
        Ok(metric_record(
            e.id,
            metric_key(e.institution_id, e.reporting_period, &e.currency)?,
            MetricValues::ReinsuranceHeld {
                total_reinsurance_held: e.total_reinsurance_held,
                risk_transfer_ratio: e.risk_transfer_ratio,
            },
            e.notes,
            e.created_at,
            e.updated_at,
        ))
    }
}

impl TryFrom<entity::ifrs4_transition::Model> for MetricRecord {
    type Error = anyhow::Error;

    fn try_from(e: entity::ifrs4_transition::Model) -> Result<Self, Self::Error> {
        Ok(metric_record(
            e.id,
            metric_key(e.institution_id, e.reporting_period, &e.currency)?,
            MetricValues::Ifrs4Transition {
                implementation_status: e.implementation_status.parse()?,
                equity_impact: e.equity_impact,
            },
            e.notes,
            e.created_at,
            e.updated_at,
        ))
    }
}

impl TryFrom<entity::contract_grouping::Model> for MetricRecord {
    type Error = anyhow::Error;

    fn try_from(e: entity::contract_grouping::Model) -> Result<Self, Self::Error> {
        Ok(metric_record(
            e.id,
            metric_key(e.institution_id, e.reporting_period, &e.currency)?,
            MetricValues::ContractGrouping {
                product_line: e.product_line,
                contract_type: e.contract_type,
                measurement_model: e.measurement_model.parse()?,
                risk_profile: e.risk_profile.parse()?,
                number_of_contracts: e.number_of_contracts,
            },
            e.notes,
            e.created_at,
            e.updated_at,
        ))
    }
}

// ===== Data Quality Conversions =====

impl TryFrom<entity::data_quality_check::Model> for DataQualityCheck {
    type Error = anyhow::Error;

    fn try_from(e: entity::data_quality_check::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: e.id,
            institution_id: e.institution_id,
            reporting_period: e.reporting_period,
            report: QualityReport {
                currency: e.currency.parse()?,
                completeness: e.completeness_score,
                accuracy: e.accuracy_score,
                consistency: e.consistency_score,
                timeliness: e.timeliness_score,
                overall: e.overall_quality_score,
                governance: GovernanceScores {
                    data_governance: e.data_governance_score,
                    control_effectiveness: e.control_effectiveness_score,
                    audit_trail_completeness: e.audit_trail_completeness,
                    regulatory_compliance: e.regulatory_compliance_score,
                },
                currency_checks: CurrencyChecks {
                    exchange_rate_consistency: e.exchange_rate_consistency,
                    currency_conversion_accuracy: e.currency_conversion_accuracy,
                    multi_currency_reconciliation: e.multi_currency_reconciliation,
                },
                issues: IssueCounters {
                    missing_data_points: e.missing_data_points,
                    anomalies_detected: e.anomalies_detected,
                    validation_errors: e.validation_errors,
                    critical_issues: e.critical_issues,
                    resolved_issues: e.resolved_issues,
                    pending_issues: e.pending_issues,
                },
                remediation_plan: e.remediation_plan,
            },
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}

pub fn quality_check_active_model(
    institution_id: i32,
    reporting_period: NaiveDate,
    report: &QualityReport,
    now: DateTime<Utc>,
) -> entity::data_quality_check::ActiveModel {
    entity::data_quality_check::ActiveModel {
        id: NotSet,
        institution_id: Set(institution_id),
        reporting_period: Set(reporting_period),
        currency: Set(report.currency.as_str().to_string()),
        completeness_score: Set(report.completeness),
        accuracy_score: Set(report.accuracy),
        consistency_score: Set(report.consistency),
        timeliness_score: Set(report.timeliness),
        overall_quality_score: Set(report.overall),
        data_governance_score: Set(report.governance.data_governance),
        control_effectiveness_score: Set(report.governance.control_effectiveness),
        audit_trail_completeness: Set(report.governance.audit_trail_completeness),
        regulatory_compliance_score: Set(report.governance.regulatory_compliance),
        exchange_rate_consistency: Set(report.currency_checks.exchange_rate_consistency),
        currency_conversion_accuracy: Set(report.currency_checks.currency_conversion_accuracy),
        multi_currency_reconciliation: Set(report.currency_checks.multi_currency_reconciliation),
        missing_data_points: Set(report.issues.missing_data_points),
        anomalies_detected: Set(report.issues.anomalies_detected),
        validation_errors: Set(report.issues.validation_errors),
        critical_issues: Set(report.issues.critical_issues),
        resolved_issues: Set(report.issues.resolved_issues),
        pending_issues: Set(report.issues.pending_issues),
        remediation_plan: Set(report.remediation_plan.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

// ===== Alert and User Conversions =====

impl TryFrom<entity::compliance_alert::Model> for ComplianceAlert {
    type Error = anyhow::Error;

    fn try_from(e: entity::compliance_alert::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: e.id,
            institution_id: e.institution_id,
            title: e.title,
            description: e.description,
            alert_type: e.alert_type.parse()?,
            severity: e.severity.parse()?,
            is_resolved: e.is_resolved,
            resolved_at: e.resolved_at,
            created_at: e.created_at,
        })
    }
}

impl From<&AlertInput> for entity::compliance_alert::ActiveModel {
    fn from(input: &AlertInput) -> Self {
        Self {
            id: NotSet,
            institution_id: Set(input.institution_id),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            alert_type: Set(input.alert_type.as_str().to_string()),
            severity: Set(input.severity.as_str().to_string()),
            is_resolved: Set(false),
            resolved_at: Set(None),
            created_at: Set(Utc::now()),
        }
    }
}

impl From<entity::user::Model> for User {
    fn from(e: entity::user::Model) -> Self {
        Self {
            username: e.username,
            password_hash: e.password_hash,
            created_at: e.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{InstitutionStatus, SubmissionStatus};

    fn institution_model(status: &str) -> entity::institution::Model {
        entity::institution::Model {
            id: 1,
            name: "Zimnat Life".to_string(),
            registration_number: "REG-9".to_string(),
            license_number: "LIC-9".to_string(),
            institution_type: "life".to_string(),
            status: status.to_string(),
            contact_person: "R. Ncube".to_string(),
            email: "r.ncube@zimnat.co.zw".to_string(),
            phone: "0242".to_string(),
            address: String::new(),
            city: "Harare".to_string(),
            country: "Zimbabwe".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_institution_enum_columns_are_parsed() {
        let institution = Institution::try_from(institution_model("suspended")).unwrap();
        assert_eq!(institution.status, InstitutionStatus::Suspended);
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        let err = Institution::try_from(institution_model("dormant")).unwrap_err();
        assert!(err.to_string().contains("dormant"));
    }

    #[test]
    fn test_new_submission_active_model() {
        let new = NewSubmission {
            institution_id: 3,
            reporting_period: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            status: SubmissionStatus::Submitted,
            uploaded_file: Some("ifrs17_submissions/2024/06/h1.csv".to_string()),
            original_filename: Some("h1.csv".to_string()),
            file_type: Some(crate::contract::FileType::Csv),
            financials: SubmissionFinancials::default(),
            notes: String::new(),
            submission_date: None,
        };
        let active: entity::submission::ActiveModel = (&new).into();
        assert_eq!(active.status, Set("submitted".to_string()));
        assert_eq!(active.file_type, Set(Some("csv".to_string())));
        assert!(matches!(active.id, NotSet));
    }
}
