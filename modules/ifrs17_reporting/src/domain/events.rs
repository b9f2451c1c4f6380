/// Domain events for the reporting module
///
/// Events form the audit trail of intake and scoring:
/// - Submission accepted (with any submissions replaced by an override)
/// - Duplicate upload rejected pending confirmation
/// - Quality checks recomputed for an institution
use crate::contract::{DuplicateConflict, QualityReport, Submission};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Domain event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ReportingEvent {
    SubmissionAccepted(SubmissionAcceptedEvent),
    DuplicateRejected(DuplicateRejectedEvent),
    QualityRecomputed(QualityRecomputedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAcceptedEvent {
    pub submission_id: i32,
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub filename: Option<String>,
    /// Submissions deleted by a confirmed override
    pub replaced: Vec<i32>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRejectedEvent {
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub existing_submission_id: i32,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecomputedEvent {
    pub institution_id: i32,
    pub reporting_period: NaiveDate,
    pub currency: String,
    pub overall_score: String,
    pub missing_data_points: i32,
    pub timestamp: DateTime<Utc>,
}

impl ReportingEvent {
    pub fn accepted(submission: &Submission, replaced: &[i32]) -> Self {
        Self::SubmissionAccepted(SubmissionAcceptedEvent {
            submission_id: submission.id,
            institution_id: submission.institution_id,
            reporting_period: submission.reporting_period,
            filename: submission.original_filename.clone(),
            replaced: replaced.to_vec(),
            timestamp: Utc::now(),
        })
    }

    pub fn duplicate(conflict: &DuplicateConflict, filename: &str) -> Self {
        Self::DuplicateRejected(DuplicateRejectedEvent {
            institution_id: conflict.institution_id,
            reporting_period: conflict.reporting_period,
            existing_submission_id: conflict.existing_submission_id,
            filename: filename.to_string(),
            timestamp: Utc::now(),
        })
    }

    pub fn quality(institution_id: i32, reporting_period: NaiveDate, report: &QualityReport) -> Self {
        Self::QualityRecomputed(QualityRecomputedEvent {
            institution_id,
            reporting_period,
            currency: report.currency.to_string(),
            overall_score: report.overall.to_string(),
            missing_data_points: report.issues.missing_data_points,
            timestamp: Utc::now(),
        })
    }
}

/// Event publisher trait for the audit trail
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: ReportingEvent) -> anyhow::Result<()>;
}

/// Writes each event as a structured `tracing` record on the `audit` target
pub struct TracingEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: ReportingEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(target: "audit", event = %payload, "reporting event");
        Ok(())
    }
}
