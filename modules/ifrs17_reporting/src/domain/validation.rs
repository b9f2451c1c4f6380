//! Form validation for institutions, submissions, uploads and alerts
//!
//! Every check records a message against the offending field so callers can
//! show all problems at once instead of failing on the first.

use crate::contract::{
    AlertForm, AlertInput, FieldErrors, FileType, InstitutionForm, InstitutionInput,
    InstitutionStatus, MetricInput, MetricValues, ReportingError, SubmissionFinancials,
    SubmissionForm, SubmissionInput, UploadForm, UploadRequest,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

const REQUIRED: &str = "This field is required.";

/// Upload extensions accepted by intake
pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "xbrl"];

#[allow(clippy::expect_used)]
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

/// Fixed-point precision of a decimal form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub max_digits: u32,
    pub decimal_places: u32,
}

/// Financial amounts
pub const AMOUNT: DecimalSpec = DecimalSpec {
    max_digits: 15,
    decimal_places: 2,
};

/// Percentages and ratios
pub const RATIO: DecimalSpec = DecimalSpec {
    max_digits: 5,
    decimal_places: 2,
};

/// Check a decimal against its column precision
pub fn check_decimal(value: Decimal, spec: DecimalSpec) -> Result<(), String> {
    let normalized = value.normalize();
    let decimals = normalized.scale();
    let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let digits = mantissa_digits.max(decimals);
    let whole_digits = digits.saturating_sub(decimals);

    if digits > spec.max_digits {
        return Err(format!(
            "Ensure that there are no more than {} digits in total.",
            spec.max_digits
        ));
    }
    if decimals > spec.decimal_places {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            spec.decimal_places
        ));
    }
    if whole_digits > spec.max_digits - spec.decimal_places {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            spec.max_digits - spec.decimal_places
        ));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Strip any client-side directory components from an uploaded filename
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches('.');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Lower-cased extension of a filename, without the dot
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(errors: &mut FieldErrors, field: &str, value: &Option<String>, max_len: usize) -> String {
    match trimmed(value) {
        Some(v) => {
            check_length(errors, field, v, max_len);
            v.to_string()
        }
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
    }
}

fn optional_text(errors: &mut FieldErrors, field: &str, value: &Option<String>, max_len: usize) -> String {
    let v = trimmed(value).unwrap_or_default();
    check_length(errors, field, v, max_len);
    v.to_string()
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    let len = value.chars().count();
    if len > max_len {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max_len, len
            ),
        );
    }
}

fn choice<T: FromStr>(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<T> {
    match trimmed(value) {
        Some(v) => match v.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(
                    field,
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        v
                    ),
                );
                None
            }
        },
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

fn date(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<NaiveDate> {
    match trimmed(value) {
        Some(v) => match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                errors.add(field, "Enter a valid date.");
                None
            }
        },
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

fn id(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<i32> {
    match trimmed(value) {
        Some(v) => match v.parse::<i32>() {
            Ok(parsed) if parsed > 0 => Some(parsed),
            _ => {
                errors.add(
                    field,
                    "Select a valid choice. That choice is not one of the available choices.",
                );
                None
            }
        },
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

fn optional_decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<String>,
    spec: DecimalSpec,
) -> Option<Decimal> {
    let raw = trimmed(value)?;
    match Decimal::from_str(raw) {
        Ok(d) => match check_decimal(d, spec) {
            Ok(()) => Some(d),
            Err(message) => {
                errors.add(field, message);
                None
            }
        },
        Err(_) => {
            errors.add(field, "Enter a number.");
            None
        }
    }
}

/// Validate the institution create/edit form
pub fn validate_institution(form: &InstitutionForm) -> Result<InstitutionInput, ReportingError> {
    let mut errors = FieldErrors::new();

    let name = required_text(&mut errors, "name", &form.name, 200);
    let registration_number =
        required_text(&mut errors, "registration_number", &form.registration_number, 50);
    let license_number = required_text(&mut errors, "license_number", &form.license_number, 50);
    let institution_type = choice(&mut errors, "institution_type", &form.institution_type);
    let status = if trimmed(&form.status).is_none() {
        Some(InstitutionStatus::Active)
    } else {
        choice(&mut errors, "status", &form.status)
    };
    let contact_person = required_text(&mut errors, "contact_person", &form.contact_person, 100);
    let email = required_text(&mut errors, "email", &form.email, 254);
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    let phone = required_text(&mut errors, "phone", &form.phone, 20);
    let address = optional_text(&mut errors, "address", &form.address, 1000);
    let city = optional_text(&mut errors, "city", &form.city, 100);
    let country = optional_text(&mut errors, "country", &form.country, 100);

    errors.into_result()?;

    match (institution_type, status) {
        (Some(institution_type), Some(status)) => Ok(InstitutionInput {
            name,
            registration_number,
            license_number,
            institution_type,
            status,
            contact_person,
            email,
            phone,
            address,
            city,
            country: if country.is_empty() {
                "Zimbabwe".to_string()
            } else {
                country
            },
        }),
        _ => Err(ReportingError::Internal),
    }
}

/// Validate the submission create/edit form
pub fn validate_submission(form: &SubmissionForm) -> Result<SubmissionInput, ReportingError> {
    let mut errors = FieldErrors::new();

    let institution_id = id(&mut errors, "institution", &form.institution);
    let reporting_period = date(&mut errors, "reporting_period", &form.reporting_period);
    let financials = SubmissionFinancials {
        contractual_service_margin: optional_decimal(
            &mut errors,
            "contractual_service_margin",
            &form.contractual_service_margin,
            AMOUNT,
        ),
        risk_adjustment: optional_decimal(&mut errors, "risk_adjustment", &form.risk_adjustment, AMOUNT),
        loss_component: optional_decimal(&mut errors, "loss_component", &form.loss_component, AMOUNT),
        total_liabilities: optional_decimal(
            &mut errors,
            "total_liabilities",
            &form.total_liabilities,
            AMOUNT,
        ),
        equity_impact: optional_decimal(&mut errors, "equity_impact", &form.equity_impact, AMOUNT),
        profit_margin: optional_decimal(&mut errors, "profit_margin", &form.profit_margin, RATIO),
        solvency_ratio: optional_decimal(&mut errors, "solvency_ratio", &form.solvency_ratio, RATIO),
    };
    let notes = optional_text(&mut errors, "notes", &form.notes, 10_000);
    let status = if trimmed(&form.status).is_some() {
        choice(&mut errors, "status", &form.status)
    } else {
        None
    };

    errors.into_result()?;

    match (institution_id, reporting_period) {
        (Some(institution_id), Some(reporting_period)) => Ok(SubmissionInput {
            institution_id,
            reporting_period,
            financials,
            notes,
            status,
        }),
        _ => Err(ReportingError::Internal),
    }
}

/// Validate the upload form; institution existence is checked by the service
pub fn validate_upload(form: &UploadForm) -> Result<UploadRequest, ReportingError> {
    let mut errors = FieldErrors::new();

    let institution_id = id(&mut errors, "institution", &form.institution);
    let reporting_period = date(&mut errors, "reporting_period", &form.reporting_period);
    let file_type: Option<FileType> = choice(&mut errors, "file_type", &form.file_type);
    let notes = optional_text(&mut errors, "notes", &form.notes, 10_000);

    let file = match &form.file {
        None => {
            errors.add("uploaded_file", REQUIRED);
            None
        }
        Some(file) => match sanitize_filename(&file.filename) {
            None => {
                errors.add("uploaded_file", "No file was submitted.");
                None
            }
            Some(_) if file.content.is_empty() => {
                errors.add("uploaded_file", "The submitted file is empty.");
                None
            }
            Some(filename) => match extension_of(&filename) {
                Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => {
                    Some(crate::contract::UploadedFile {
                        filename,
                        content: file.content.clone(),
                    })
                }
                _ => {
                    errors.add(
                        "uploaded_file",
                        format!(
                            "File extension is not allowed. Allowed extensions are: {}.",
                            ACCEPTED_EXTENSIONS.join(", ")
                        ),
                    );
                    None
                }
            },
        },
    };

    errors.into_result()?;

    match (institution_id, reporting_period, file_type, file) {
        (Some(institution_id), Some(reporting_period), Some(file_type), Some(file)) => {
            Ok(UploadRequest {
                institution_id,
                reporting_period,
                file,
                file_type,
                notes,
                confirm_override: form.confirm_override,
            })
        }
        _ => Err(ReportingError::Internal),
    }
}

/// Validate the compliance alert form
pub fn validate_alert(institution_id: i32, form: &AlertForm) -> Result<AlertInput, ReportingError> {
    let mut errors = FieldErrors::new();

    let title = required_text(&mut errors, "title", &form.title, 200);
    let description = required_text(&mut errors, "description", &form.description, 10_000);
    let alert_type = choice(&mut errors, "alert_type", &form.alert_type);
    let severity = choice(&mut errors, "severity", &form.severity);

    errors.into_result()?;

    match (alert_type, severity) {
        (Some(alert_type), Some(severity)) => Ok(AlertInput {
            institution_id,
            title,
            description,
            alert_type,
            severity,
        }),
        _ => Err(ReportingError::Internal),
    }
}

fn check_amount(errors: &mut FieldErrors, field: &str, value: Option<Decimal>, spec: DecimalSpec) {
    if let Some(v) = value {
        if let Err(message) = check_decimal(v, spec) {
            errors.add(field, message);
        }
    }
}

/// Validate the precision and text fields of a metric record
pub fn validate_metric(input: &MetricInput) -> Result<(), ReportingError> {
    let mut errors = FieldErrors::new();
    let errs = &mut errors;

    match &input.values {
        MetricValues::InsuranceRevenue {
            total_revenue,
            service_performance_ratio,
        } => {
            check_amount(errs, "total_revenue", Some(*total_revenue), AMOUNT);
            check_amount(errs, "service_performance_ratio", *service_performance_ratio, RATIO);
        }
        MetricValues::CsmProfitability {
            opening_csm,
            closing_csm,
            csm_profit_margin,
            csm_roi,
        } => {
            check_amount(errs, "opening_csm", *opening_csm, AMOUNT);
            check_amount(errs, "closing_csm", Some(*closing_csm), AMOUNT);
            check_amount(errs, "csm_profit_margin", *csm_profit_margin, RATIO);
            check_amount(errs, "csm_roi", *csm_roi, RATIO);
        }
        MetricValues::DiscountRates {
            total_discount_rate,
            net_finance_result,
        } => {
            check_amount(errs, "total_discount_rate", Some(*total_discount_rate), RATIO);
            check_amount(errs, "net_finance_result", *net_finance_result, AMOUNT);
        }
        MetricValues::ReinsuranceHeld {
            total_reinsurance_held,
            risk_transfer_ratio,
        } => {
            check_amount(errs, "total_reinsurance_held", Some(*total_reinsurance_held), AMOUNT);
            check_amount(errs, "risk_transfer_ratio", *risk_transfer_ratio, RATIO);
        }
        MetricValues::Ifrs4Transition { equity_impact, .. } => {
            check_amount(errs, "equity_impact", *equity_impact, AMOUNT);
        }
        MetricValues::ContractGrouping {
            product_line,
            contract_type,
            number_of_contracts,
            ..
        } => {
            for (field, value) in [("product_line", product_line), ("contract_type", contract_type)] {
                if value.trim().is_empty() {
                    errs.add(field, REQUIRED);
                } else {
                    check_length(errs, field, value, 100);
                }
            }
            if *number_of_contracts < 0 {
                errs.add(
                    "number_of_contracts",
                    "Ensure this value is greater than or equal to 0.",
                );
            }
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{InstitutionType, SubmissionStatus, UploadedFile};
    use bytes::Bytes;

    fn institution_form() -> InstitutionForm {
        InstitutionForm {
            name: Some("Old Mutual Life".to_string()),
            registration_number: Some("REG-001".to_string()),
            license_number: Some("LIC-001".to_string()),
            institution_type: Some("life".to_string()),
            status: Some("active".to_string()),
            contact_person: Some("T. Moyo".to_string()),
            email: Some("compliance@oldmutual.co.zw".to_string()),
            phone: Some("+263 242 700 000".to_string()),
            address: None,
            city: Some("Harare".to_string()),
            country: None,
        }
    }

    fn validation_errors(result: Result<impl std::fmt::Debug, ReportingError>) -> FieldErrors {
        match result {
            Err(ReportingError::Validation(errors)) => errors,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_decimal_amount_limits() {
        assert!(check_decimal(Decimal::from_str("1234567890123.45").unwrap(), AMOUNT).is_ok());
        assert!(check_decimal(Decimal::from_str("-0.05").unwrap(), AMOUNT).is_ok());
        assert!(check_decimal(Decimal::from_str("12.50").unwrap(), AMOUNT).is_ok());
        assert!(check_decimal(Decimal::from_str("1.234").unwrap(), AMOUNT).is_err());
        assert!(check_decimal(Decimal::from_str("12345678901234").unwrap(), AMOUNT).is_err());
    }

    #[test]
    fn test_check_decimal_ratio_limits() {
        assert!(check_decimal(Decimal::from_str("999.99").unwrap(), RATIO).is_ok());
        assert!(check_decimal(Decimal::from_str("100").unwrap(), RATIO).is_ok());
        let err = check_decimal(Decimal::from_str("1000").unwrap(), RATIO).unwrap_err();
        assert!(err.contains("before the decimal point"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("ops@ipec.co.zw"));
        assert!(!is_valid_email("ops@"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email("ops@localhost"));
    }

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("C:\\reports\\q1.csv").as_deref(), Some("q1.csv"));
        assert_eq!(sanitize_filename("  "), None);
        assert_eq!(sanitize_filename("dir/"), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Q1.CSV").as_deref(), Some("csv"));
        assert_eq!(extension_of("report.v2.xlsx").as_deref(), Some("xlsx"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".csv"), None);
    }

    #[test]
    fn test_valid_institution_form() {
        let input = validate_institution(&institution_form()).unwrap();
        assert_eq!(input.institution_type, InstitutionType::Life);
        assert_eq!(input.status, InstitutionStatus::Active);
        assert_eq!(input.country, "Zimbabwe");
    }

    #[test]
    fn test_institution_form_reports_every_bad_field() {
        let mut form = institution_form();
        form.name = None;
        form.email = Some("broken".to_string());
        form.institution_type = Some("bank".to_string());
        form.registration_number = Some("R".repeat(51));

        let errors = validation_errors(validate_institution(&form));
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("institution_type"));
        assert!(errors.contains("registration_number"));
        assert!(!errors.contains("license_number"));
    }

    #[test]
    fn test_submission_form_precision() {
        let form = SubmissionForm {
            institution: Some("3".to_string()),
            reporting_period: Some("2024-03-31".to_string()),
            contractual_service_margin: Some("1500000.25".to_string()),
            solvency_ratio: Some("1234.5".to_string()),
            profit_margin: Some("abc".to_string()),
            ..Default::default()
        };
        let errors = validation_errors(validate_submission(&form));
        assert!(errors.contains("solvency_ratio"));
        assert_eq!(errors.get("profit_margin").unwrap(), ["Enter a number."]);
        assert!(!errors.contains("contractual_service_margin"));
    }

    #[test]
    fn test_submission_form_status_is_optional() {
        let form = SubmissionForm {
            institution: Some("3".to_string()),
            reporting_period: Some("2024-03-31".to_string()),
            status: Some("under_review".to_string()),
            ..Default::default()
        };
        let input = validate_submission(&form).unwrap();
        assert_eq!(input.status, Some(SubmissionStatus::UnderReview));
        assert_eq!(input.financials, SubmissionFinancials::default());
    }

    #[test]
    fn test_upload_requires_every_field() {
        let errors = validation_errors(validate_upload(&UploadForm::default()));
        for field in ["institution", "reporting_period", "file_type", "uploaded_file"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_upload_rejects_unknown_extension_and_empty_file() {
        let mut form = UploadForm {
            institution: Some("1".to_string()),
            reporting_period: Some("2024-01-31".to_string()),
            file_type: Some("csv".to_string()),
            file: Some(UploadedFile {
                filename: "statement.pdf".to_string(),
                content: Bytes::from_static(b"%PDF"),
            }),
            ..Default::default()
        };
        let errors = validation_errors(validate_upload(&form));
        assert!(errors.contains("uploaded_file"));

        form.file = Some(UploadedFile {
            filename: "q1.csv".to_string(),
            content: Bytes::new(),
        });
        let errors = validation_errors(validate_upload(&form));
        assert_eq!(
            errors.get("uploaded_file").unwrap(),
            ["The submitted file is empty."]
        );
    }

    #[test]
    fn test_upload_sanitizes_filename() {
        let form = UploadForm {
            institution: Some("1".to_string()),
            reporting_period: Some("2024-01-31".to_string()),
            file_type: Some("excel".to_string()),
            file: Some(UploadedFile {
                filename: "../secret/Q1.XLSX".to_string(),
                content: Bytes::from_static(b"PK"),
            }),
            ..Default::default()
        };
        let request = validate_upload(&form).unwrap();
        assert_eq!(request.file.filename, "Q1.XLSX");
        assert_eq!(request.file_type, FileType::Excel);
        assert!(!request.confirm_override);
    }
}
