//! Conversions between REST DTOs and contract models

use super::dto::*;
use crate::contract::{
    self, Currency, FieldErrors, MetricInput, MetricKey, MetricValues, ReportingError,
};
use std::collections::BTreeMap;
use std::str::FromStr;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

// ===== Institutions =====

impl From<contract::Institution> for InstitutionDto {
    fn from(i: contract::Institution) -> Self {
        Self {
            id: i.id,
            name: i.name,
            registration_number: i.registration_number,
            license_number: i.license_number,
            institution_type: i.institution_type.to_string(),
            status: i.status.to_string(),
            contact_person: i.contact_person,
            email: i.email,
            phone: i.phone,
            address: i.address,
            city: i.city,
            country: i.country,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

impl From<InstitutionFormDto> for contract::InstitutionForm {
    fn from(f: InstitutionFormDto) -> Self {
        Self {
            name: f.name,
            registration_number: f.registration_number,
            license_number: f.license_number,
            institution_type: f.institution_type,
            status: f.status,
            contact_person: f.contact_person,
            email: f.email,
            phone: f.phone,
            address: f.address,
            city: f.city,
            country: f.country,
        }
    }
}

impl From<contract::InstitutionDetail> for InstitutionDetailDto {
    fn from(d: contract::InstitutionDetail) -> Self {
        Self {
            institution: d.institution.into(),
            recent_submissions: d.recent_submissions.into_iter().map(Into::into).collect(),
            open_alerts: d.open_alerts.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::InstitutionData> for InstitutionDataDto {
    fn from(d: contract::InstitutionData) -> Self {
        let mut metrics_by_currency: BTreeMap<String, Vec<MetricRecordDto>> = Currency::ALL
            .iter()
            .map(|c| (c.to_string(), Vec::new()))
            .collect();
        for record in d.metrics {
            metrics_by_currency
                .entry(record.key.currency.to_string())
                .or_default()
                .push(record.into());
        }
        Self {
            institution: d.institution.into(),
            metrics_by_currency,
            quality_checks: d.quality_checks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parse optional listing filters, reporting unknown values per field
pub fn institution_filter(
    query: InstitutionListQuery,
) -> Result<contract::InstitutionFilter, ReportingError> {
    let mut errors = FieldErrors::new();
    let status = parse_choice(&mut errors, "status", query.status.as_deref());
    let institution_type =
        parse_choice(&mut errors, "institution_type", query.institution_type.as_deref());
    errors.into_result()?;
    Ok(contract::InstitutionFilter {
        status,
        institution_type,
    })
}

// ===== Submissions =====

impl From<contract::Submission> for SubmissionDto {
    fn from(s: contract::Submission) -> Self {
        let f = s.financials;
        Self {
            id: s.id,
            institution_id: s.institution_id,
            reporting_period: s.reporting_period,
            status: s.status.to_string(),
            uploaded_file: s.uploaded_file,
            original_filename: s.original_filename,
            file_type: s.file_type.map(|t| t.to_string()),
            contractual_service_margin: f.contractual_service_margin,
            risk_adjustment: f.risk_adjustment,
            loss_component: f.loss_component,
            total_liabilities: f.total_liabilities,
            equity_impact: f.equity_impact,
            profit_margin: f.profit_margin,
            solvency_ratio: f.solvency_ratio,
            notes: s.notes,
            submission_date: s.submission_date,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<SubmissionFormDto> for contract::SubmissionForm {
    fn from(f: SubmissionFormDto) -> Self {
        Self {
            institution: f.institution,
            reporting_period: f.reporting_period,
            contractual_service_margin: f.contractual_service_margin,
            risk_adjustment: f.risk_adjustment,
            loss_component: f.loss_component,
            total_liabilities: f.total_liabilities,
            equity_impact: f.equity_impact,
            profit_margin: f.profit_margin,
            solvency_ratio: f.solvency_ratio,
            notes: f.notes,
            status: f.status,
        }
    }
}

pub fn submission_filter(
    query: SubmissionListQuery,
) -> Result<contract::SubmissionFilter, ReportingError> {
    let mut errors = FieldErrors::new();
    let status = parse_choice(&mut errors, "status", query.status.as_deref());
    errors.into_result()?;
    Ok(contract::SubmissionFilter {
        institution_id: query.institution_id,
        status,
    })
}

impl From<contract::DuplicateConflict> for DuplicateConflictResponse {
    fn from(c: contract::DuplicateConflict) -> Self {
        let message = format!(
            "A file named '{}' has already been submitted by {} for the reporting period {}. \
             Do you want to override the existing submission?",
            c.existing_filename, c.institution_name, c.reporting_period
        );
        Self {
            conflict: true,
            existing_submission_id: c.existing_submission_id,
            existing_filename: c.existing_filename,
            institution_id: c.institution_id,
            institution_name: c.institution_name,
            reporting_period: c.reporting_period,
            message,
        }
    }
}

impl From<contract::ParsedTable> for ParseResponse {
    fn from(t: contract::ParsedTable) -> Self {
        Self {
            success: true,
            data: t.rows,
            total_rows: t.total_rows,
            displayed_rows: t.displayed_rows,
            truncated: t.truncated,
            columns: t.columns,
        }
    }
}

// ===== Metrics =====

impl From<MetricValues> for MetricValuesDto {
    fn from(v: MetricValues) -> Self {
        match v {
            MetricValues::InsuranceRevenue {
                total_revenue,
                service_performance_ratio,
            } => Self::InsuranceRevenue {
                total_revenue,
                service_performance_ratio,
            },
            MetricValues::CsmProfitability {
                opening_csm,
                closing_csm,
                csm_profit_margin,
                csm_roi,
            } => Self::CsmProfitability {
                opening_csm,
                closing_csm,
                csm_profit_margin,
                csm_roi,
            },
            MetricValues::DiscountRates {
                total_discount_rate,
                net_finance_result,
            } => Self::DiscountRates {
                total_discount_rate,
                net_finance_result,
            },
            MetricValues::ReinsuranceHeld {
                total_reinsurance_held,
                risk_transfer_ratio,
            } => Self::ReinsuranceHeld {
                total_reinsurance_held,
                risk_transfer_ratio,
            },
            MetricValues::Ifrs4Transition {
                implementation_status,
                equity_impact,
            } => Self::Ifrs4Transition {
                implementation_status: implementation_status.to_string(),
                equity_impact,
            },
            MetricValues::ContractGrouping {
                product_line,
                contract_type,
                measurement_model,
                risk_profile,
                number_of_contracts,
            } => Self::ContractGrouping {
                product_line,
                contract_type,
                measurement_model: measurement_model.to_string(),
                risk_profile: risk_profile.to_string(),
                number_of_contracts,
            },
        }
    }
}

impl From<contract::MetricRecord> for MetricRecordDto {
    fn from(r: contract::MetricRecord) -> Self {
        Self {
            id: r.id,
            institution_id: r.key.institution_id,
            reporting_period: r.key.reporting_period,
            currency: r.key.currency.to_string(),
            values: r.values.into(),
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Build a metric upsert for the institution named in the path
pub fn metric_input(institution_id: i32, req: MetricRequest) -> Result<MetricInput, ReportingError> {
    let mut errors = FieldErrors::new();
    let currency: Option<Currency> = parse_choice(&mut errors, "currency", Some(&req.currency));

    let values = match req.values {
        MetricValuesDto::InsuranceRevenue {
            total_revenue,
            service_performance_ratio,
        } => Some(MetricValues::InsuranceRevenue {
            total_revenue,
            service_performance_ratio,
        }),
        MetricValuesDto::CsmProfitability {
            opening_csm,
            closing_csm,
            csm_profit_margin,
            csm_roi,
        } => Some(MetricValues::CsmProfitability {
            opening_csm,
            closing_csm,
            csm_profit_margin,
            csm_roi,
        }),
        MetricValuesDto::DiscountRates {
            total_discount_rate,
            net_finance_result,
        } => Some(MetricValues::DiscountRates {
            total_discount_rate,
            net_finance_result,
        }),
        MetricValuesDto::ReinsuranceHeld {
            total_reinsurance_held,
            risk_transfer_ratio,
        } => Some(MetricValues::ReinsuranceHeld {
            total_reinsurance_held,
            risk_transfer_ratio,
        }),
        MetricValuesDto::Ifrs4Transition {
            implementation_status,
            equity_impact,
        } => parse_choice(
            &mut errors,
            "implementation_status",
            Some(&implementation_status),
        )
        .map(|implementation_status| MetricValues::Ifrs4Transition {
            implementation_status,
            equity_impact,
        }),
        MetricValuesDto::ContractGrouping {
            product_line,
            contract_type,
            measurement_model,
            risk_profile,
            number_of_contracts,
        } => {
            let model = parse_choice(&mut errors, "measurement_model", Some(&measurement_model));
            let profile = parse_choice(&mut errors, "risk_profile", Some(&risk_profile));
            model.zip(profile).map(|(measurement_model, risk_profile)| {
                MetricValues::ContractGrouping {
                    product_line,
                    contract_type,
                    measurement_model,
                    risk_profile,
                    number_of_contracts,
                }
            })
        }
    };

    errors.into_result()?;
    match (currency, values) {
        (Some(currency), Some(values)) => Ok(MetricInput {
            key: MetricKey {
                institution_id,
                reporting_period: req.reporting_period,
                currency,
            },
            values,
            notes: req.notes,
        }),
        _ => Err(ReportingError::Internal),
    }
}

// ===== Data quality =====

impl From<contract::DataQualityCheck> for QualityCheckDto {
    fn from(c: contract::DataQualityCheck) -> Self {
        let r = c.report;
        Self {
            id: c.id,
            institution_id: c.institution_id,
            reporting_period: c.reporting_period,
            currency: r.currency.to_string(),
            completeness_score: r.completeness,
            accuracy_score: r.accuracy,
            consistency_score: r.consistency,
            timeliness_score: r.timeliness,
            overall_quality_score: r.overall,
            data_governance_score: r.governance.data_governance,
            control_effectiveness_score: r.governance.control_effectiveness,
            audit_trail_completeness: r.governance.audit_trail_completeness,
            regulatory_compliance_score: r.governance.regulatory_compliance,
            exchange_rate_consistency: r.currency_checks.exchange_rate_consistency,
            currency_conversion_accuracy: r.currency_checks.currency_conversion_accuracy,
            multi_currency_reconciliation: r.currency_checks.multi_currency_reconciliation,
            missing_data_points: r.issues.missing_data_points,
            anomalies_detected: r.issues.anomalies_detected,
            validation_errors: r.issues.validation_errors,
            critical_issues: r.issues.critical_issues,
            resolved_issues: r.issues.resolved_issues,
            pending_issues: r.issues.pending_issues,
            remediation_plan: r.remediation_plan,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<contract::QualityReview> for QualityReviewDto {
    fn from(r: contract::QualityReview) -> Self {
        Self {
            checks: r.checks.into_iter().map(Into::into).collect(),
            averages: r
                .averages
                .into_iter()
                .map(|(currency, average)| CurrencyAverageDto {
                    currency: currency.to_string(),
                    average_overall_score: average,
                })
                .collect(),
        }
    }
}

impl From<contract::QualityRunSummary> for QualityRunSummaryDto {
    fn from(s: contract::QualityRunSummary) -> Self {
        Self {
            success: true,
            message: s.message,
            checks_run: s.checks_run,
            issues_found: s.issues_found,
            critical_issues: s.critical_issues,
            warnings: s.warnings,
        }
    }
}

// ===== Overviews =====

impl From<contract::PeriodOverview> for PeriodOverviewDto {
    fn from(o: contract::PeriodOverview) -> Self {
        Self {
            year: o.year,
            month: o.month,
            submissions: o.submissions.into_iter().map(Into::into).collect(),
            quality_checks: o.quality_checks.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::DashboardSummary> for DashboardDto {
    fn from(d: contract::DashboardSummary) -> Self {
        Self {
            institutions: d.institutions,
            active_institutions: d.active_institutions,
            submissions_by_status: d
                .submissions_by_status
                .into_iter()
                .map(|(status, n)| (status.to_string(), n))
                .collect(),
            unresolved_alerts: d.unresolved_alerts,
        }
    }
}

// ===== Alerts =====

impl From<contract::ComplianceAlert> for AlertDto {
    fn from(a: contract::ComplianceAlert) -> Self {
        Self {
            id: a.id,
            institution_id: a.institution_id,
            title: a.title,
            description: a.description,
            alert_type: a.alert_type.to_string(),
            severity: a.severity.to_string(),
            is_resolved: a.is_resolved,
            resolved_at: a.resolved_at,
            created_at: a.created_at,
        }
    }
}

impl From<AlertFormDto> for contract::AlertForm {
    fn from(f: AlertFormDto) -> Self {
        Self {
            title: f.title,
            description: f.description,
            alert_type: f.alert_type,
            severity: f.severity,
        }
    }
}

/// Parse an optional enum value; an unknown value is recorded against `field`
fn parse_choice<T: FromStr>(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}
