//! Domain service - business logic orchestration

use super::events::{EventPublisher, ReportingEvent};
use super::parser::{parse_table, TableFormat};
use super::quality::{InstitutionSnapshot, QualityScorer};
use super::repository::{
    AlertRepository, FileStore, InstitutionRepository, MetricsRepository, QualityCheckRepository,
    SubmissionRepository,
};
use super::validation;
use crate::config::{Config, DuplicateMatch};
use crate::contract::{
    AlertForm, ComplianceAlert, Currency, DashboardSummary, DataKind, DataQualityCheck,
    DuplicateConflict, FieldErrors, Institution, InstitutionData, InstitutionDetail,
    InstitutionFilter, InstitutionForm, InstitutionInput, InstitutionStatus, IntakeOutcome,
    MetricInput, MetricRecord, NewSubmission, ParsedTable, PeriodOverview, QualityReview,
    QualityRunSummary, ReportingError, Submission, SubmissionFilter, SubmissionFinancials,
    SubmissionForm, SubmissionStatus, UploadForm, UploadRequest,
};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Number of submissions shown on the institution detail view
const RECENT_SUBMISSIONS: usize = 5;

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Intake lock key (institution, reporting period)
type IntakeKey = (i32, NaiveDate);

/// Storage dependencies of the service
pub struct Repositories {
    pub institutions: Arc<dyn InstitutionRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub metrics: Arc<dyn MetricsRepository>,
    pub quality_checks: Arc<dyn QualityCheckRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pub files: Arc<dyn FileStore>,
}

/// Domain service for IFRS 17 reporting
pub struct Service {
    institutions: Arc<dyn InstitutionRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    metrics: Arc<dyn MetricsRepository>,
    quality_checks: Arc<dyn QualityCheckRepository>,
    alerts: Arc<dyn AlertRepository>,
    files: Arc<dyn FileStore>,
    event_publisher: Arc<dyn EventPublisher>,
    scorer: QualityScorer,
    config: Config,
    /// Serializes intake per (institution, period)
    intake_locks: DashMap<IntakeKey, Arc<Mutex<()>>>,
}

/// Log a storage failure and hide it behind `Internal`
fn internal(context: &'static str) -> impl Fn(anyhow::Error) -> ReportingError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        ReportingError::Internal
    }
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, event_publisher: Arc<dyn EventPublisher>, config: Config) -> Self {
        Self {
            institutions: repos.institutions,
            submissions: repos.submissions,
            metrics: repos.metrics,
            quality_checks: repos.quality_checks,
            alerts: repos.alerts,
            files: repos.files,
            event_publisher,
            scorer: QualityScorer::placeholder(config.completeness_checklist),
            config,
            intake_locks: DashMap::new(),
        }
    }

    /// Replace the default placeholder scorer
    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of (institution, period) keys with an intake in flight
    pub fn active_intakes(&self) -> usize {
        self.intake_locks.len()
    }

    async fn publish(&self, event: ReportingEvent) {
        if let Err(e) = self.event_publisher.publish(event).await {
            tracing::warn!(error = %e, "Failed to publish reporting event");
        }
    }

    // ===== Institution Operations =====

    pub async fn create_institution(&self, form: &InstitutionForm) -> Result<Institution, ReportingError> {
        let input = validation::validate_institution(form)?;
        self.check_unique(&input, None).await?;

        let institution = self
            .institutions
            .create(&input)
            .await
            .map_err(internal("Failed to create institution"))?;
        tracing::info!(institution_id = institution.id, name = %institution.name, "Institution created");
        Ok(institution)
    }

    pub async fn update_institution(
        &self,
        id: i32,
        form: &InstitutionForm,
    ) -> Result<Institution, ReportingError> {
        let input = validation::validate_institution(form)?;
        self.get_institution(id).await?;
        self.check_unique(&input, Some(id)).await?;

        self.institutions
            .update(id, &input)
            .await
            .map_err(internal("Failed to update institution"))?
            .ok_or_else(|| ReportingError::not_found("institution", id))
    }

    /// Name, registration number and license number are each unique
    async fn check_unique(
        &self,
        input: &InstitutionInput,
        exclude_id: Option<i32>,
    ) -> Result<(), ReportingError> {
        let clashes = self
            .institutions
            .find_clashes(input, exclude_id)
            .await
            .map_err(internal("Failed to check institution uniqueness"))?;

        let mut errors = FieldErrors::new();
        if clashes.iter().any(|c| c.name == input.name) {
            errors.add("name", "Institution with this Name already exists.");
        }
        if clashes
            .iter()
            .any(|c| c.registration_number == input.registration_number)
        {
            errors.add(
                "registration_number",
                "Institution with this Registration number already exists.",
            );
        }
        if clashes.iter().any(|c| c.license_number == input.license_number) {
            errors.add(
                "license_number",
                "Institution with this License number already exists.",
            );
        }
        errors.into_result()
    }

    pub async fn get_institution(&self, id: i32) -> Result<Institution, ReportingError> {
        self.institutions
            .find_by_id(id)
            .await
            .map_err(internal("Failed to load institution"))?
            .ok_or_else(|| ReportingError::not_found("institution", id))
    }

    pub async fn list_institutions(
        &self,
        filter: &InstitutionFilter,
    ) -> Result<Vec<Institution>, ReportingError> {
        self.institutions
            .list(filter)
            .await
            .map_err(internal("Failed to list institutions"))
    }

    pub async fn institution_detail(&self, id: i32) -> Result<InstitutionDetail, ReportingError> {
        let institution = self.get_institution(id).await?;
        let mut recent_submissions = self
            .list_submissions(&SubmissionFilter {
                institution_id: Some(id),
                status: None,
            })
            .await?;
        recent_submissions.truncate(RECENT_SUBMISSIONS);
        let open_alerts = self.list_alerts(id, true).await?;

        Ok(InstitutionDetail {
            institution,
            recent_submissions,
            open_alerts,
        })
    }

    /// Delete an institution, its records and its stored files
    pub async fn delete_institution(&self, id: i32) -> Result<(), ReportingError> {
        let submissions = self
            .list_submissions(&SubmissionFilter {
                institution_id: Some(id),
                status: None,
            })
            .await?;

        let deleted = self
            .institutions
            .delete_cascade(id)
            .await
            .map_err(internal("Failed to delete institution"))?;
        if !deleted {
            return Err(ReportingError::not_found("institution", id));
        }

        for path in submissions.iter().filter_map(|s| s.uploaded_file.as_deref()) {
            self.remove_file(path).await;
        }
        tracing::info!(institution_id = id, submissions = submissions.len(), "Institution deleted");
        Ok(())
    }

    async fn remove_file(&self, path: &str) {
        if let Err(e) = self.files.delete(path).await {
            tracing::warn!(error = %e, path = %path, "Failed to remove stored file");
        }
    }

    async fn restore_files(&self, set_aside: &[(String, String)]) {
        for (aside, path) in set_aside {
            if let Err(e) = self.files.restore(aside, path).await {
                tracing::error!(error = %e, path = %path, aside = %aside, "Failed to restore replaced file");
            }
        }
    }

    // ===== Submission Operations =====

    /// Create a draft submission from the metrics form
    pub async fn create_submission(&self, form: &SubmissionForm) -> Result<Submission, ReportingError> {
        let input = validation::validate_submission(form)?;
        self.require_institution_field(input.institution_id).await?;

        let new = NewSubmission {
            institution_id: input.institution_id,
            reporting_period: input.reporting_period,
            status: SubmissionStatus::Draft,
            uploaded_file: None,
            original_filename: None,
            file_type: None,
            financials: input.financials,
            notes: input.notes,
            submission_date: None,
        };
        self.submissions
            .create(&new)
            .await
            .map_err(internal("Failed to create submission"))
    }

    pub async fn update_submission(
        &self,
        id: i32,
        form: &SubmissionForm,
    ) -> Result<Submission, ReportingError> {
        let input = validation::validate_submission(form)?;
        self.get_submission(id).await?;
        self.require_institution_field(input.institution_id).await?;

        self.submissions
            .update(id, &input)
            .await
            .map_err(internal("Failed to update submission"))?
            .ok_or_else(|| ReportingError::not_found("submission", id))
    }

    /// Resolve a form's institution reference, reporting a field error when unknown
    async fn require_institution_field(&self, id: i32) -> Result<Institution, ReportingError> {
        self.institutions
            .find_by_id(id)
            .await
            .map_err(internal("Failed to load institution"))?
            .ok_or_else(|| ReportingError::invalid("institution", INVALID_CHOICE))
    }

    pub async fn get_submission(&self, id: i32) -> Result<Submission, ReportingError> {
        self.submissions
            .find_by_id(id)
            .await
            .map_err(internal("Failed to load submission"))?
            .ok_or_else(|| ReportingError::not_found("submission", id))
    }

    pub async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, ReportingError> {
        self.submissions
            .list(filter)
            .await
            .map_err(internal("Failed to list submissions"))
    }

    // ===== Submission Intake =====

    /// Store an uploaded submission file.
    ///
    /// A filename matching an existing submission for the same institution and
    /// period yields [`IntakeOutcome::Duplicate`] unless override is confirmed,
    /// in which case every matching submission is replaced.
    pub async fn upload_submission(&self, form: &UploadForm) -> Result<IntakeOutcome, ReportingError> {
        let request = validation::validate_upload(form)?;
        let institution = self.require_institution_field(request.institution_id).await?;
        if institution.status != InstitutionStatus::Active {
            return Err(ReportingError::invalid(
                "institution",
                format!("Institution '{}' is not active.", institution.name),
            ));
        }

        let key = (request.institution_id, request.reporting_period);
        let lock = self
            .intake_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let outcome = {
            let _guard = lock.lock().await;
            self.intake_locked(&institution, request).await
        };
        drop(lock);
        self.intake_locks
            .remove_if(&key, |_, l| Arc::strong_count(l) == 1);
        outcome
    }

    async fn intake_locked(
        &self,
        institution: &Institution,
        request: UploadRequest,
    ) -> Result<IntakeOutcome, ReportingError> {
        let filename = request.file.filename.clone();
        let existing = self
            .submissions
            .find_by_institution_period(request.institution_id, request.reporting_period)
            .await
            .map_err(internal("Failed to look up existing submissions"))?;
        let matches: Vec<&Submission> = existing
            .iter()
            .filter(|s| self.filename_matches(s, &filename))
            .collect();

        if let Some(first) = matches.first() {
            if !request.confirm_override {
                let conflict = DuplicateConflict {
                    existing_submission_id: first.id,
                    existing_filename: display_filename(first),
                    institution_id: institution.id,
                    institution_name: institution.name.clone(),
                    reporting_period: request.reporting_period,
                };
                tracing::info!(
                    institution_id = institution.id,
                    existing_submission_id = first.id,
                    filename = %filename,
                    "Duplicate upload awaiting confirmation"
                );
                self.publish(ReportingEvent::duplicate(&conflict, &filename)).await;
                return Ok(IntakeOutcome::Duplicate(conflict));
            }
        }

        // Replaced files give up their names before the new file is written
        let mut set_aside = Vec::new();
        for path in matches.iter().filter_map(|s| s.uploaded_file.as_deref()) {
            match self.files.set_aside(path).await {
                Ok(Some(aside)) => set_aside.push((aside, path.to_string())),
                Ok(None) => {}
                Err(e) => {
                    self.restore_files(&set_aside).await;
                    return Err(internal("Failed to set aside replaced file")(e));
                }
            }
        }

        let stored_path = match self
            .files
            .save(request.reporting_period, &filename, &request.file.content)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                self.restore_files(&set_aside).await;
                return Err(internal("Failed to store uploaded file")(e));
            }
        };

        let new = NewSubmission {
            institution_id: request.institution_id,
            reporting_period: request.reporting_period,
            status: SubmissionStatus::Submitted,
            uploaded_file: Some(stored_path.clone()),
            original_filename: Some(filename),
            file_type: Some(request.file_type),
            financials: SubmissionFinancials::default(),
            notes: request.notes,
            submission_date: Some(Utc::now()),
        };

        let replaced: Vec<i32> = matches.iter().map(|s| s.id).collect();
        let stored = if replaced.is_empty() {
            self.submissions.create(&new).await
        } else {
            self.submissions.replace(&replaced, &new).await
        };
        let submission = match stored {
            Ok(submission) => submission,
            Err(e) => {
                self.remove_file(&stored_path).await;
                self.restore_files(&set_aside).await;
                return Err(internal("Failed to record submission")(e));
            }
        };

        for (aside, _) in &set_aside {
            self.remove_file(aside).await;
        }

        tracing::info!(
            submission_id = submission.id,
            institution_id = submission.institution_id,
            reporting_period = %submission.reporting_period,
            replaced = ?replaced,
            "Submission accepted"
        );
        self.publish(ReportingEvent::accepted(&submission, &replaced)).await;
        Ok(IntakeOutcome::Accepted {
            submission,
            replaced,
        })
    }

    /// Both modes fold case with Unicode lowercasing
    fn filename_matches(&self, existing: &Submission, filename: &str) -> bool {
        let filename = filename.to_lowercase();
        match self.config.duplicate_match {
            DuplicateMatch::Exact => display_filename(existing).to_lowercase() == filename,
            DuplicateMatch::Substring => existing
                .uploaded_file
                .as_deref()
                .map(|path| path.to_lowercase().contains(&filename))
                .unwrap_or(false),
        }
    }

    // ===== Tabular Parser =====

    /// Parse the file attached to a submission into display rows
    pub async fn parse_submission_file(&self, submission_id: i32) -> Result<ParsedTable, ReportingError> {
        let submission = self.get_submission(submission_id).await?;
        let path = submission.uploaded_file.ok_or_else(|| {
            ReportingError::invalid("uploaded_file", "No file is attached to this submission.")
        })?;
        TableFormat::from_filename(&path)?;

        let content = self.files.read(&path).await.map_err(|e| {
            tracing::warn!(error = %e, path = %path, "Stored file could not be read");
            ReportingError::Parse {
                message: format!("{:#}", e),
            }
        })?;

        let limit = self.config.display_row_limit;
        tokio::task::spawn_blocking(move || parse_table(&path, &content, limit))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Parser task failed");
                ReportingError::Internal
            })?
    }

    // ===== Metrics and Quality =====

    /// Insert or replace a metric record by its natural key
    pub async fn upsert_metric(&self, input: &MetricInput) -> Result<MetricRecord, ReportingError> {
        validation::validate_metric(input)?;
        self.get_institution(input.key.institution_id).await?;

        self.metrics
            .upsert(input)
            .await
            .map_err(internal("Failed to upsert metric record"))
    }

    /// Recompute and persist the per-currency quality checks of an institution
    pub async fn validate_institution_data(
        &self,
        institution_id: i32,
    ) -> Result<Vec<DataQualityCheck>, ReportingError> {
        let institution = self.get_institution(institution_id).await?;
        let latest = self
            .submissions
            .latest_reporting_period(institution_id)
            .await
            .map_err(internal("Failed to load latest reporting period"))?;
        let reporting_period = latest.unwrap_or_else(|| Utc::now().date_naive());
        let snapshot = InstitutionSnapshot {
            institution_id,
            status: institution.status,
            latest_reporting_period: latest,
        };

        let probed = self.scorer.probed_kinds();
        let has_alerts = if probed.contains(&DataKind::ComplianceAlerts) {
            !self
                .alerts
                .list_for_institution(institution_id, false)
                .await
                .map_err(internal("Failed to load compliance alerts"))?
                .is_empty()
        } else {
            false
        };

        let mut checks = Vec::with_capacity(Currency::ALL.len());
        for &currency in Currency::ALL {
            let mut present = Vec::new();
            for &kind in probed {
                let found = match kind {
                    DataKind::Submissions => latest.is_some(),
                    DataKind::ComplianceAlerts => has_alerts,
                    _ => self
                        .metrics
                        .has_records(institution_id, kind, currency)
                        .await
                        .map_err(internal("Failed to probe metric records"))?,
                };
                if found {
                    present.push(kind);
                }
            }

            let report = self.scorer.score(&snapshot, currency, &present);
            let check = self
                .quality_checks
                .upsert(institution_id, reporting_period, &report)
                .await
                .map_err(internal("Failed to store quality check"))?;
            tracing::debug!(
                institution_id,
                currency = %currency,
                overall = %check.report.overall,
                "Quality check stored"
            );
            self.publish(ReportingEvent::quality(institution_id, reporting_period, &report))
                .await;
            checks.push(check);
        }

        tracing::info!(institution_id, reporting_period = %reporting_period, "Quality checks recomputed");
        Ok(checks)
    }

    /// Batch trigger; reports a fixed summary
    pub fn run_data_quality_checks(&self) -> QualityRunSummary {
        QualityRunSummary {
            message: "Data quality checks completed successfully".to_string(),
            checks_run: [
                "Completeness check",
                "Accuracy validation",
                "Consistency check",
                "Timeliness check",
                "Currency reconciliation",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            issues_found: 3,
            critical_issues: 0,
            warnings: 3,
        }
    }

    pub async fn institution_data(&self, institution_id: i32) -> Result<InstitutionData, ReportingError> {
        let institution = self.get_institution(institution_id).await?;
        let metrics = self
            .metrics
            .list_for_institution(institution_id)
            .await
            .map_err(internal("Failed to list metric records"))?;
        let quality_checks = self
            .quality_checks
            .list_for_institution(institution_id)
            .await
            .map_err(internal("Failed to list quality checks"))?;

        Ok(InstitutionData {
            institution,
            metrics,
            quality_checks,
        })
    }

    pub async fn data_quality_review(&self) -> Result<QualityReview, ReportingError> {
        let checks = self
            .quality_checks
            .list_all()
            .await
            .map_err(internal("Failed to list quality checks"))?;
        let averages = Currency::ALL
            .iter()
            .map(|&currency| (currency, average_overall(&checks, currency)))
            .collect();
        Ok(QualityReview { checks, averages })
    }

    pub async fn reporting_period_overview(
        &self,
        year: i32,
        month: u32,
    ) -> Result<PeriodOverview, ReportingError> {
        let (from, to) = month_bounds(year, month)?;
        let submissions = self
            .submissions
            .list_in_period_range(from, to)
            .await
            .map_err(internal("Failed to list submissions for period"))?;
        let quality_checks = self
            .quality_checks
            .list_in_period_range(from, to)
            .await
            .map_err(internal("Failed to list quality checks for period"))?;

        Ok(PeriodOverview {
            year,
            month,
            submissions,
            quality_checks,
        })
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, ReportingError> {
        let institutions = self
            .institutions
            .count(None)
            .await
            .map_err(internal("Failed to count institutions"))?;
        let active_institutions = self
            .institutions
            .count(Some(InstitutionStatus::Active))
            .await
            .map_err(internal("Failed to count institutions"))?;
        let counted = self
            .submissions
            .count_by_status()
            .await
            .map_err(internal("Failed to count submissions"))?;
        let submissions_by_status = SubmissionStatus::ALL
            .iter()
            .map(|&status| {
                let n = counted
                    .iter()
                    .find(|(s, _)| *s == status)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (status, n)
            })
            .collect();
        let unresolved_alerts = self
            .alerts
            .count_unresolved()
            .await
            .map_err(internal("Failed to count alerts"))?;

        Ok(DashboardSummary {
            institutions,
            active_institutions,
            submissions_by_status,
            unresolved_alerts,
        })
    }

    // ===== Compliance Alerts =====

    pub async fn raise_alert(
        &self,
        institution_id: i32,
        form: &AlertForm,
    ) -> Result<ComplianceAlert, ReportingError> {
        let input = validation::validate_alert(institution_id, form)?;
        self.get_institution(institution_id).await?;

        let alert = self
            .alerts
            .create(&input)
            .await
            .map_err(internal("Failed to create compliance alert"))?;
        tracing::info!(
            alert_id = alert.id,
            institution_id,
            severity = %alert.severity,
            "Compliance alert raised"
        );
        Ok(alert)
    }

    pub async fn list_alerts(
        &self,
        institution_id: i32,
        unresolved_only: bool,
    ) -> Result<Vec<ComplianceAlert>, ReportingError> {
        self.get_institution(institution_id).await?;
        self.alerts
            .list_for_institution(institution_id, unresolved_only)
            .await
            .map_err(internal("Failed to list compliance alerts"))
    }

    pub async fn resolve_alert(&self, id: i32) -> Result<ComplianceAlert, ReportingError> {
        self.alerts
            .resolve(id)
            .await
            .map_err(internal("Failed to resolve compliance alert"))?
            .ok_or_else(|| ReportingError::not_found("alert", id))
    }
}

/// Client-side filename of a submission, falling back to the stored name
fn display_filename(submission: &Submission) -> String {
    submission
        .original_filename
        .clone()
        .or_else(|| {
            submission
                .uploaded_file
                .as_deref()
                .and_then(|p| p.rsplit('/').next())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

fn average_overall(checks: &[DataQualityCheck], currency: Currency) -> Option<Decimal> {
    let scores: Vec<Decimal> = checks
        .iter()
        .filter(|c| c.report.currency == currency)
        .map(|c| c.report.overall)
        .collect();
    if scores.is_empty() {
        return None;
    }
    let total: Decimal = scores.iter().sum();
    Some((total / Decimal::from(scores.len() as u64)).round_dp(2))
}

/// First and last day of a calendar month
fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ReportingError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ReportingError::invalid("month", "Enter a valid month."))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let to = next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ReportingError::invalid("year", "Enter a valid year."))?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let (from, to) = month_bounds(2024, 2).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, to) = month_bounds(2023, 12).unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        assert!(matches!(
            month_bounds(2024, 13),
            Err(ReportingError::Validation(_))
        ));
    }

    #[test]
    fn test_average_overall_without_checks() {
        assert_eq!(average_overall(&[], Currency::Usd), None);
    }
}
