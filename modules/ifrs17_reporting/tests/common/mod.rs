//! Common test utilities: in-memory repositories and form builders

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use ifrs17_reporting::config::Config;
use ifrs17_reporting::contract::*;
use ifrs17_reporting::domain::repository::{
    AlertRepository, InstitutionRepository, MetricsRepository, QualityCheckRepository,
    SubmissionRepository, UserRepository,
};
use ifrs17_reporting::domain::quality::QualityScorer;
use ifrs17_reporting::domain::{EventPublisher, Repositories, ReportingEvent, Service};
use ifrs17_reporting::infra::files::LocalFileStore;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===== Form builders =====

pub fn institution_form(name: &str, registration: &str, license: &str) -> InstitutionForm {
    InstitutionForm {
        name: Some(name.to_string()),
        registration_number: Some(registration.to_string()),
        license_number: Some(license.to_string()),
        institution_type: Some("life".to_string()),
        status: None,
        contact_person: Some("Tendai Moyo".to_string()),
        email: Some("compliance@example.co.zw".to_string()),
        phone: Some("+263 242 123456".to_string()),
        address: Some("1 Samora Machel Ave".to_string()),
        city: Some("Harare".to_string()),
        country: None,
    }
}

pub fn upload_form(
    institution_id: i32,
    period: NaiveDate,
    filename: &str,
    content: &str,
    confirm_override: bool,
) -> UploadForm {
    UploadForm {
        institution: Some(institution_id.to_string()),
        reporting_period: Some(period.to_string()),
        file_type: Some("csv".to_string()),
        notes: None,
        confirm_override,
        file: Some(UploadedFile {
            filename: filename.to_string(),
            content: Bytes::from(content.to_string()),
        }),
    }
}

/// CSV with a header and `rows` numbered data rows
pub fn csv_with_rows(rows: usize) -> String {
    let mut out = String::from("line,currency,amount\n");
    for i in 1..=rows {
        out.push_str(&format!("{},USD,{}.50\n", i, i * 100));
    }
    out
}

// ===== In-memory repositories =====

#[derive(Default)]
struct State {
    next_id: i32,
    institutions: BTreeMap<i32, Institution>,
    submissions: BTreeMap<i32, Submission>,
    metrics: BTreeMap<i32, MetricRecord>,
    checks: BTreeMap<i32, DataQualityCheck>,
    alerts: BTreeMap<i32, ComplianceAlert>,
    users: HashMap<String, User>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Every repository trait over one shared in-memory state
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    alert_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn submission_count(&self) -> usize {
        self.state.read().submissions.len()
    }

    /// Number of alert list lookups served so far
    pub fn alert_query_count(&self) -> usize {
        self.alert_queries.load(Ordering::SeqCst)
    }

    pub fn quality_check_count(&self) -> usize {
        self.state.read().checks.len()
    }

    /// Print verbose information about stored submissions
    pub fn print_submissions(&self, context: &str) {
        let state = self.state.read();
        println!("\n========== Submissions: {} ==========", context);
        for s in state.submissions.values() {
            println!(
                "  #{} inst={} period={} status={} file={:?}",
                s.id, s.institution_id, s.reporting_period, s.status, s.uploaded_file
            );
        }
    }
}

fn metric_key_matches(a: &MetricRecord, input: &MetricInput) -> bool {
    if a.key != input.key || a.kind() != input.values.kind() {
        return false;
    }
    match (&a.values, &input.values) {
        (
            MetricValues::ContractGrouping {
                product_line: pa,
                contract_type: ta,
                ..
            },
            MetricValues::ContractGrouping {
                product_line: pb,
                contract_type: tb,
                ..
            },
        ) => pa == pb && ta == tb,
        _ => true,
    }
}

fn submission_from(id: i32, new: &NewSubmission) -> Submission {
    let now = Utc::now();
    Submission {
        id,
        institution_id: new.institution_id,
        reporting_period: new.reporting_period,
        status: new.status,
        uploaded_file: new.uploaded_file.clone(),
        original_filename: new.original_filename.clone(),
        file_type: new.file_type,
        financials: new.financials.clone(),
        notes: new.notes.clone(),
        submission_date: new.submission_date,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl InstitutionRepository for MemoryStore {
    async fn create(&self, input: &InstitutionInput) -> anyhow::Result<Institution> {
        let mut state = self.state.write();
        let id = state.next_id();
        let now = Utc::now();
        let institution = Institution {
            id,
            name: input.name.clone(),
            registration_number: input.registration_number.clone(),
            license_number: input.license_number.clone(),
            institution_type: input.institution_type,
            status: input.status,
            contact_person: input.contact_person.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            city: input.city.clone(),
            country: input.country.clone(),
            created_at: now,
            updated_at: now,
        };
        state.institutions.insert(id, institution.clone());
        Ok(institution)
    }

    async fn update(&self, id: i32, input: &InstitutionInput) -> anyhow::Result<Option<Institution>> {
        let mut state = self.state.write();
        Ok(state.institutions.get_mut(&id).map(|i| {
            i.name = input.name.clone();
            i.registration_number = input.registration_number.clone();
            i.license_number = input.license_number.clone();
            i.institution_type = input.institution_type;
            i.status = input.status;
            i.contact_person = input.contact_person.clone();
            i.email = input.email.clone();
            i.phone = input.phone.clone();
            i.address = input.address.clone();
            i.city = input.city.clone();
            i.country = input.country.clone();
            i.updated_at = Utc::now();
            i.clone()
        }))
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Institution>> {
        Ok(self.state.read().institutions.get(&id).cloned())
    }

    async fn list(&self, filter: &InstitutionFilter) -> anyhow::Result<Vec<Institution>> {
        let mut items: Vec<Institution> = self
            .state
            .read()
            .institutions
            .values()
            .filter(|i| filter.status.map_or(true, |s| i.status == s))
            .filter(|i| filter.institution_type.map_or(true, |t| i.institution_type == t))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_clashes(
        &self,
        input: &InstitutionInput,
        exclude_id: Option<i32>,
    ) -> anyhow::Result<Vec<Institution>> {
        Ok(self
            .state
            .read()
            .institutions
            .values()
            .filter(|i| Some(i.id) != exclude_id)
            .filter(|i| {
                i.name == input.name
                    || i.registration_number == input.registration_number
                    || i.license_number == input.license_number
            })
            .cloned()
            .collect())
    }

    async fn delete_cascade(&self, id: i32) -> anyhow::Result<bool> {
        let mut state = self.state.write();
        if state.institutions.remove(&id).is_none() {
            return Ok(false);
        }
        state.submissions.retain(|_, s| s.institution_id != id);
        state.metrics.retain(|_, m| m.key.institution_id != id);
        state.checks.retain(|_, c| c.institution_id != id);
        state.alerts.retain(|_, a| a.institution_id != id);
        Ok(true)
    }

    async fn count(&self, status: Option<InstitutionStatus>) -> anyhow::Result<u64> {
        Ok(self
            .state
            .read()
            .institutions
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .count() as u64)
    }
}

#[async_trait]
impl SubmissionRepository for MemoryStore {
    async fn create(&self, submission: &NewSubmission) -> anyhow::Result<Submission> {
        let mut state = self.state.write();
        let id = state.next_id();
        let stored = submission_from(id, submission);
        state.submissions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn replace(&self, replaced: &[i32], submission: &NewSubmission) -> anyhow::Result<Submission> {
        let mut state = self.state.write();
        for id in replaced {
            state.submissions.remove(id);
        }
        let id = state.next_id();
        let stored = submission_from(id, submission);
        state.submissions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i32, input: &SubmissionInput) -> anyhow::Result<Option<Submission>> {
        let mut state = self.state.write();
        Ok(state.submissions.get_mut(&id).map(|s| {
            s.institution_id = input.institution_id;
            s.reporting_period = input.reporting_period;
            s.financials = input.financials.clone();
            s.notes = input.notes.clone();
            if let Some(status) = input.status {
                s.status = status;
            }
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Submission>> {
        Ok(self.state.read().submissions.get(&id).cloned())
    }

    async fn list(&self, filter: &SubmissionFilter) -> anyhow::Result<Vec<Submission>> {
        let mut items: Vec<Submission> = self
            .state
            .read()
            .submissions
            .values()
            .filter(|s| filter.institution_id.map_or(true, |id| s.institution_id == id))
            .filter(|s| filter.status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }

    async fn find_by_institution_period(
        &self,
        institution_id: i32,
        reporting_period: NaiveDate,
    ) -> anyhow::Result<Vec<Submission>> {
        Ok(self
            .state
            .read()
            .submissions
            .values()
            .filter(|s| s.institution_id == institution_id && s.reporting_period == reporting_period)
            .cloned()
            .collect())
    }

    async fn list_in_period_range(&self, from: NaiveDate, to: NaiveDate) -> anyhow::Result<Vec<Submission>> {
        Ok(self
            .state
            .read()
            .submissions
            .values()
            .filter(|s| s.reporting_period >= from && s.reporting_period <= to)
            .cloned()
            .collect())
    }

    async fn latest_reporting_period(&self, institution_id: i32) -> anyhow::Result<Option<NaiveDate>> {
        Ok(self
            .state
            .read()
            .submissions
            .values()
            .filter(|s| s.institution_id == institution_id)
            .map(|s| s.reporting_period)
            .max())
    }

    async fn count_by_status(&self) -> anyhow::Result<Vec<(SubmissionStatus, u64)>> {
        let state = self.state.read();
        let mut counts: BTreeMap<SubmissionStatus, u64> = BTreeMap::new();
        for s in state.submissions.values() {
            *counts.entry(s.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[async_trait]
impl MetricsRepository for MemoryStore {
    async fn upsert(&self, input: &MetricInput) -> anyhow::Result<MetricRecord> {
        let mut state = self.state.write();
        let now = Utc::now();
        let existing = state
            .metrics
            .values()
            .find(|m| metric_key_matches(m, input))
            .map(|m| (m.id, m.created_at));
        let (id, created_at) = match existing {
            Some(found) => found,
            None => (state.next_id(), now),
        };
        let record = MetricRecord {
            id,
            key: input.key,
            values: input.values.clone(),
            notes: input.notes.clone(),
            created_at,
            updated_at: now,
        };
        state.metrics.insert(id, record.clone());
        Ok(record)
    }

    async fn list_for_institution(&self, institution_id: i32) -> anyhow::Result<Vec<MetricRecord>> {
        Ok(self
            .state
            .read()
            .metrics
            .values()
            .filter(|m| m.key.institution_id == institution_id)
            .cloned()
            .collect())
    }

    async fn has_records(
        &self,
        institution_id: i32,
        kind: DataKind,
        currency: Currency,
    ) -> anyhow::Result<bool> {
        if !kind.is_per_currency() {
            anyhow::bail!("{} records carry no currency", kind);
        }
        Ok(self.state.read().metrics.values().any(|m| {
            m.key.institution_id == institution_id && m.key.currency == currency && m.kind() == kind
        }))
    }
}

#[async_trait]
impl QualityCheckRepository for MemoryStore {
    async fn upsert(
        &self,
        institution_id: i32,
        reporting_period: NaiveDate,
        report: &QualityReport,
    ) -> anyhow::Result<DataQualityCheck> {
        let mut state = self.state.write();
        let now = Utc::now();
        let existing = state
            .checks
            .values()
            .find(|c| {
                c.institution_id == institution_id
                    && c.reporting_period == reporting_period
                    && c.report.currency == report.currency
            })
            .map(|c| (c.id, c.created_at));
        let (id, created_at) = match existing {
            Some(found) => found,
            None => (state.next_id(), now),
        };
        let check = DataQualityCheck {
            id,
            institution_id,
            reporting_period,
            report: report.clone(),
            created_at,
            updated_at: now,
        };
        state.checks.insert(id, check.clone());
        Ok(check)
    }

    async fn list_for_institution(&self, institution_id: i32) -> anyhow::Result<Vec<DataQualityCheck>> {
        Ok(self
            .state
            .read()
            .checks
            .values()
            .filter(|c| c.institution_id == institution_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<DataQualityCheck>> {
        Ok(self.state.read().checks.values().cloned().collect())
    }

    async fn list_in_period_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<DataQualityCheck>> {
        Ok(self
            .state
            .read()
            .checks
            .values()
            .filter(|c| c.reporting_period >= from && c.reporting_period <= to)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AlertRepository for MemoryStore {
    async fn create(&self, input: &AlertInput) -> anyhow::Result<ComplianceAlert> {
        let mut state = self.state.write();
        let id = state.next_id();
        let alert = ComplianceAlert {
            id,
            institution_id: input.institution_id,
            title: input.title.clone(),
            description: input.description.clone(),
            alert_type: input.alert_type,
            severity: input.severity,
            is_resolved: false,
            resolved_at: None,
            created_at: Utc::now(),
        };
        state.alerts.insert(id, alert.clone());
        Ok(alert)
    }

    async fn list_for_institution(
        &self,
        institution_id: i32,
        unresolved_only: bool,
    ) -> anyhow::Result<Vec<ComplianceAlert>> {
        self.alert_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .state
            .read()
            .alerts
            .values()
            .filter(|a| a.institution_id == institution_id && (!unresolved_only || !a.is_resolved))
            .cloned()
            .collect())
    }

    async fn resolve(&self, id: i32) -> anyhow::Result<Option<ComplianceAlert>> {
        let mut state = self.state.write();
        Ok(state.alerts.get_mut(&id).map(|a| {
            a.is_resolved = true;
            a.resolved_at = Some(Utc::now());
            a.clone()
        }))
    }

    async fn count_unresolved(&self) -> anyhow::Result<u64> {
        Ok(self.state.read().alerts.values().filter(|a| !a.is_resolved).count() as u64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self.state.read().users.get(username).cloned())
    }

    async fn upsert(&self, username: &str, password_hash: &str) -> anyhow::Result<User> {
        let user = User {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.state.write().users.insert(username.to_string(), user.clone());
        Ok(user)
    }
}

// ===== Events =====

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ReportingEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ReportingEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: ReportingEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

// ===== Harness =====

/// Service over in-memory repositories and a temporary upload directory
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub events: Arc<RecordingPublisher>,
    pub service: Arc<Service>,
    pub uploads: TempDir,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self::build(config, None)
    }

    /// Harness whose service scores with `scorer` instead of the placeholder
    pub fn with_scorer(config: Config, scorer: QualityScorer) -> Self {
        Self::build(config, Some(scorer))
    }

    fn build(config: Config, scorer: Option<QualityScorer>) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let events = Arc::new(RecordingPublisher::default());
        let config = Config {
            upload_root: uploads.path().to_path_buf(),
            ..config
        };
        let repos = Repositories {
            institutions: store.clone(),
            submissions: store.clone(),
            metrics: store.clone(),
            quality_checks: store.clone(),
            alerts: store.clone(),
            files: Arc::new(LocalFileStore::new(uploads.path())),
        };
        let mut service = Service::new(repos, events.clone(), config);
        if let Some(scorer) = scorer {
            service = service.with_scorer(scorer);
        }
        let service = Arc::new(service);
        Self {
            store,
            events,
            service,
            uploads,
        }
    }

    pub async fn institution(&self, name: &str, registration: &str, license: &str) -> Institution {
        self.service
            .create_institution(&institution_form(name, registration, license))
            .await
            .unwrap()
    }

    /// Upload and expect the file to be accepted
    pub async fn accept(&self, form: UploadForm) -> Submission {
        match self.service.upload_submission(&form).await.unwrap() {
            IntakeOutcome::Accepted { submission, .. } => submission,
            IntakeOutcome::Duplicate(conflict) => panic!("unexpected conflict: {:?}", conflict),
        }
    }
}
