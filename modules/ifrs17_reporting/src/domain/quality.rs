//! Data quality scoring
//!
//! Pure computation: given what is known about an institution and which
//! checklist data kinds have records in a currency, produce a
//! [`QualityReport`]. Storage and HTTP are handled by the service.

use crate::config::CompletenessChecklist;
use crate::contract::{
    Currency, CurrencyChecks, DataKind, GovernanceScores, InstitutionStatus, IssueCounters,
    QualityReport,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Kinds probed when the checklist runs in legacy mode
pub const LEGACY_PROBED: &[DataKind] = &[
    DataKind::Submissions,
    DataKind::InsuranceRevenue,
    DataKind::CsmProfitability,
];

/// Size of the completeness checklist; the denominator in every mode
pub fn checklist_len() -> usize {
    DataKind::ALL.len()
}

/// Facts about the institution being scored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionSnapshot {
    pub institution_id: i32,
    pub status: InstitutionStatus,
    pub latest_reporting_period: Option<NaiveDate>,
}

/// One scoring dimension, `(institution, currency) -> [0, 100]`
pub trait DimensionScorer: Send + Sync {
    fn score(&self, snapshot: &InstitutionSnapshot, currency: Currency) -> Decimal;
}

/// Scorer that always returns the same value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedScore(pub Decimal);

impl DimensionScorer for FixedScore {
    fn score(&self, _snapshot: &InstitutionSnapshot, _currency: Currency) -> Decimal {
        self.0
    }
}

/// Per-currency quality scorer
pub struct QualityScorer {
    checklist: CompletenessChecklist,
    accuracy: Box<dyn DimensionScorer>,
    consistency: Box<dyn DimensionScorer>,
    timeliness: Box<dyn DimensionScorer>,
}

impl QualityScorer {
    /// Scorer with the fixed placeholder dimensions (95, 92, 88)
    pub fn placeholder(checklist: CompletenessChecklist) -> Self {
        Self {
            checklist,
            accuracy: Box::new(FixedScore(Decimal::new(9500, 2))),
            consistency: Box::new(FixedScore(Decimal::new(9200, 2))),
            timeliness: Box::new(FixedScore(Decimal::new(8800, 2))),
        }
    }

    pub fn with_accuracy(mut self, scorer: impl DimensionScorer + 'static) -> Self {
        self.accuracy = Box::new(scorer);
        self
    }

    pub fn with_consistency(mut self, scorer: impl DimensionScorer + 'static) -> Self {
        self.consistency = Box::new(scorer);
        self
    }

    pub fn with_timeliness(mut self, scorer: impl DimensionScorer + 'static) -> Self {
        self.timeliness = Box::new(scorer);
        self
    }

    /// Data kinds whose presence is actually looked up
    pub fn probed_kinds(&self) -> &'static [DataKind] {
        match self.checklist {
            CompletenessChecklist::Legacy => LEGACY_PROBED,
            CompletenessChecklist::Full => DataKind::ALL,
        }
    }

    /// Score one currency. `present` lists the kinds with at least one record;
    /// kinds outside [`Self::probed_kinds`] are ignored.
    pub fn score(
        &self,
        snapshot: &InstitutionSnapshot,
        currency: Currency,
        present: &[DataKind],
    ) -> QualityReport {
        let probed = self.probed_kinds();
        let mut found: Vec<DataKind> = present
            .iter()
            .copied()
            .filter(|kind| probed.contains(kind))
            .collect();
        found.sort();
        found.dedup();

        let total = checklist_len();
        let actual = found.len();
        let completeness =
            (Decimal::from(actual as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64))
                .round_dp(2);

        let accuracy = clamp_score(self.accuracy.score(snapshot, currency));
        let consistency = clamp_score(self.consistency.score(snapshot, currency));
        let timeliness = clamp_score(self.timeliness.score(snapshot, currency));
        let overall =
            ((completeness + accuracy + consistency + timeliness) / Decimal::from(4)).round_dp(2);

        let missing = (total - actual) as i32;
        let anomalies = 0;
        let issues = IssueCounters {
            missing_data_points: missing,
            anomalies_detected: anomalies,
            validation_errors: 0,
            critical_issues: 0,
            resolved_issues: 0,
            pending_issues: missing + anomalies,
        };

        QualityReport {
            currency,
            completeness,
            accuracy,
            consistency,
            timeliness,
            overall,
            governance: GovernanceScores {
                data_governance: Decimal::new(9000, 2),
                control_effectiveness: Decimal::new(8500, 2),
                audit_trail_completeness: Decimal::new(9200, 2),
                regulatory_compliance: Decimal::new(8800, 2),
            },
            currency_checks: CurrencyChecks {
                exchange_rate_consistency: true,
                currency_conversion_accuracy: Decimal::new(9800, 2),
                multi_currency_reconciliation: true,
            },
            issues,
            remediation_plan: remediation_plan(currency, &issues),
        }
    }
}

fn clamp_score(score: Decimal) -> Decimal {
    score.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED).round_dp(2)
}

/// Remediation text built from the missing-data and anomaly counters
pub fn remediation_plan(currency: Currency, issues: &IssueCounters) -> String {
    let mut steps = Vec::new();
    if issues.missing_data_points > 0 {
        steps.push(format!(
            "Collect and submit {} missing data point(s) for {} reporting.",
            issues.missing_data_points, currency
        ));
    }
    if issues.anomalies_detected > 0 {
        steps.push(format!(
            "Investigate and resolve {} detected anomaly(ies) in {} figures.",
            issues.anomalies_detected, currency
        ));
    }
    if steps.is_empty() {
        format!("No remediation required for {} data.", currency)
    } else {
        steps.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn snapshot() -> InstitutionSnapshot {
        InstitutionSnapshot {
            institution_id: 7,
            status: InstitutionStatus::Active,
            latest_reporting_period: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_no_records_gives_zero_completeness() {
        let scorer = QualityScorer::placeholder(CompletenessChecklist::Legacy);
        let report = scorer.score(&snapshot(), Currency::Usd, &[]);

        assert_eq!(report.completeness, Decimal::ZERO);
        assert_eq!(report.issues.missing_data_points, 8);
        assert_eq!(report.issues.pending_issues, 8);
        assert_eq!(report.overall, dec("68.75"));
        assert!(report.remediation_plan.contains("8 missing data point(s) for USD"));
    }

    #[test]
    fn test_legacy_mode_ignores_unprobed_kinds() {
        let scorer = QualityScorer::placeholder(CompletenessChecklist::Legacy);
        let present = [
            DataKind::Submissions,
            DataKind::InsuranceRevenue,
            DataKind::DiscountRates,
            DataKind::ContractGrouping,
        ];
        let report = scorer.score(&snapshot(), Currency::Zwl, &present);

        assert_eq!(report.completeness, dec("25"));
        assert_eq!(report.issues.missing_data_points, 6);
    }

    #[test]
    fn test_full_mode_counts_every_kind() {
        let scorer = QualityScorer::placeholder(CompletenessChecklist::Full);
        let report = scorer.score(&snapshot(), Currency::Zwl, DataKind::ALL);

        assert_eq!(report.completeness, dec("100"));
        assert_eq!(report.issues.missing_data_points, 0);
        assert_eq!(report.overall, dec("93.75"));
        assert_eq!(report.remediation_plan, "No remediation required for ZWL data.");
    }

    #[test]
    fn test_duplicate_presence_is_counted_once() {
        let scorer = QualityScorer::placeholder(CompletenessChecklist::Full);
        let present = [DataKind::CsmProfitability, DataKind::CsmProfitability];
        let report = scorer.score(&snapshot(), Currency::Usd, &present);

        assert_eq!(report.completeness, dec("12.5"));
        assert_eq!(report.issues.missing_data_points, 7);
    }

    #[test]
    fn test_pluggable_dimensions_replace_placeholders() {
        struct ByCurrency;
        impl DimensionScorer for ByCurrency {
            fn score(&self, _snapshot: &InstitutionSnapshot, currency: Currency) -> Decimal {
                match currency {
                    Currency::Usd => Decimal::from(100),
                    Currency::Zwl => Decimal::from(150),
                }
            }
        }

        let scorer = QualityScorer::placeholder(CompletenessChecklist::Legacy)
            .with_accuracy(ByCurrency)
            .with_timeliness(FixedScore(Decimal::from(-5)));

        let usd = scorer.score(&snapshot(), Currency::Usd, &[]);
        assert_eq!(usd.accuracy, dec("100"));
        assert_eq!(usd.timeliness, Decimal::ZERO);

        let zwl = scorer.score(&snapshot(), Currency::Zwl, &[]);
        assert_eq!(zwl.accuracy, dec("100"), "scores are clamped to 100");
        assert_eq!(zwl.consistency, dec("92"));
    }

    #[test]
    fn test_remediation_plan_mentions_anomalies() {
        let issues = IssueCounters {
            anomalies_detected: 2,
            ..Default::default()
        };
        let plan = remediation_plan(Currency::Usd, &issues);
        assert_eq!(plan, "Investigate and resolve 2 detected anomaly(ies) in USD figures.");
    }
}
