//! SeaORM repositories against a migrated SQLite file

mod common;

use common::{date, print_test_header};
use ifrs17_reporting::contract::*;
use ifrs17_reporting::domain::quality::{InstitutionSnapshot, QualityScorer};
use ifrs17_reporting::domain::repository::{
    AlertRepository, InstitutionRepository, MetricsRepository, QualityCheckRepository,
    SubmissionRepository, UserRepository,
};
use ifrs17_reporting::infra::storage::migrations::Migrator;
use ifrs17_reporting::infra::storage::repositories::*;
use ifrs17_reporting::config::CompletenessChecklist;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tempfile::TempDir;

struct Db {
    conn: Arc<DatabaseConnection>,
    _dir: TempDir,
}

async fn migrated_db() -> Db {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("ifrs17.db").display());
    let conn = Database::connect(&url).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    Db {
        conn: Arc::new(conn),
        _dir: dir,
    }
}

fn institution_input(name: &str, registration: &str, license: &str) -> InstitutionInput {
    InstitutionInput {
        name: name.to_string(),
        registration_number: registration.to_string(),
        license_number: license.to_string(),
        institution_type: InstitutionType::Composite,
        status: InstitutionStatus::Active,
        contact_person: "Rudo Chikore".to_string(),
        email: "rudo@example.co.zw".to_string(),
        phone: "+263 77 000 0000".to_string(),
        address: String::new(),
        city: "Harare".to_string(),
        country: "Zimbabwe".to_string(),
    }
}

fn new_submission(institution_id: i32, period: chrono::NaiveDate, file: &str) -> NewSubmission {
    NewSubmission {
        institution_id,
        reporting_period: period,
        status: SubmissionStatus::Submitted,
        uploaded_file: Some(format!("ifrs17_submissions/2024/01/{}", file)),
        original_filename: Some(file.to_string()),
        file_type: Some(FileType::Csv),
        financials: SubmissionFinancials {
            contractual_service_margin: Some(Decimal::new(1_250_000_00, 2)),
            solvency_ratio: Some(Decimal::new(145_50, 2)),
            ..SubmissionFinancials::default()
        },
        notes: String::new(),
        submission_date: Some(chrono::Utc::now()),
    }
}

#[tokio::test]
async fn test_institution_round_trip_and_clashes() {
    print_test_header(
        "test_institution_round_trip_and_clashes",
        &["Institutions persist, filter and report unique-field clashes"],
    );
    let db = migrated_db().await;
    let repo = SeaOrmInstitutionRepository::new(db.conn.clone());

    let a = repo.create(&institution_input("Inst A", "REG-1", "LIC-1")).await.unwrap();
    let mut suspended = institution_input("Inst B", "REG-2", "LIC-2");
    suspended.status = InstitutionStatus::Suspended;
    repo.create(&suspended).await.unwrap();

    assert_eq!(repo.find_by_id(a.id).await.unwrap().unwrap().name, "Inst A");
    assert_eq!(repo.count(None).await.unwrap(), 2);
    assert_eq!(repo.count(Some(InstitutionStatus::Active)).await.unwrap(), 1);

    let active = repo
        .list(&InstitutionFilter {
            status: Some(InstitutionStatus::Active),
            institution_type: None,
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    let clashes = repo
        .find_clashes(&institution_input("Other", "REG-2", "LIC-9"), None)
        .await
        .unwrap();
    assert_eq!(clashes.len(), 1);
    assert_eq!(clashes[0].registration_number, "REG-2");

    let own = repo
        .find_clashes(&institution_input("Inst A", "REG-1", "LIC-1"), Some(a.id))
        .await
        .unwrap();
    assert!(own.is_empty());
}

#[tokio::test]
async fn test_submission_replace_is_transactional_swap() {
    print_test_header(
        "test_submission_replace_is_transactional_swap",
        &["Replace deletes the matched rows and inserts the new one"],
    );
    let db = migrated_db().await;
    let institutions = SeaOrmInstitutionRepository::new(db.conn.clone());
    let submissions = SeaOrmSubmissionRepository::new(db.conn.clone());
    let inst = institutions
        .create(&institution_input("Inst A", "REG-1", "LIC-1"))
        .await
        .unwrap();
    let period = date(2024, 1, 31);

    let first = submissions
        .create(&new_submission(inst.id, period, "q1.csv"))
        .await
        .unwrap();
    assert_eq!(
        first.financials.solvency_ratio,
        Some(Decimal::new(145_50, 2))
    );

    let second = submissions
        .replace(&[first.id], &new_submission(inst.id, period, "q1.csv"))
        .await
        .unwrap();

    let stored = submissions
        .find_by_institution_period(inst.id, period)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, second.id);
    assert!(submissions.find_by_id(first.id).await.unwrap().is_none());
    assert_eq!(
        submissions.latest_reporting_period(inst.id).await.unwrap(),
        Some(period)
    );

    let counts = submissions.count_by_status().await.unwrap();
    assert!(counts.contains(&(SubmissionStatus::Submitted, 1)));
}

#[tokio::test]
async fn test_metric_upsert_by_natural_key() {
    print_test_header(
        "test_metric_upsert_by_natural_key",
        &[
            "Upserting the same key updates in place",
            "Contract groups are also keyed by product line and contract type",
        ],
    );
    let db = migrated_db().await;
    let institutions = SeaOrmInstitutionRepository::new(db.conn.clone());
    let metrics = SeaOrmMetricsRepository::new(db.conn.clone());
    let inst = institutions
        .create(&institution_input("Inst A", "REG-1", "LIC-1"))
        .await
        .unwrap();
    let key = MetricKey {
        institution_id: inst.id,
        reporting_period: date(2024, 3, 31),
        currency: Currency::Usd,
    };

    let revenue = |amount: i64| MetricInput {
        key,
        values: MetricValues::InsuranceRevenue {
            total_revenue: Decimal::new(amount, 2),
            service_performance_ratio: Some(Decimal::new(80_25, 2)),
        },
        notes: "quarterly".to_string(),
    };
    let first = metrics.upsert(&revenue(500_00)).await.unwrap();
    let second = metrics.upsert(&revenue(750_00)).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.values, revenue(750_00).values);

    let group = |product_line: &str| MetricInput {
        key,
        values: MetricValues::ContractGrouping {
            product_line: product_line.to_string(),
            contract_type: "individual".to_string(),
            measurement_model: MeasurementModel::Paa,
            risk_profile: RiskProfile::Remaining,
            number_of_contracts: 120,
        },
        notes: String::new(),
    };
    metrics.upsert(&group("Funeral")).await.unwrap();
    metrics.upsert(&group("Motor")).await.unwrap();
    metrics.upsert(&group("Motor")).await.unwrap();

    let records = metrics.list_for_institution(inst.id).await.unwrap();
    assert_eq!(records.len(), 3);
    assert!(metrics
        .has_records(inst.id, DataKind::ContractGrouping, Currency::Usd)
        .await
        .unwrap());
    assert!(!metrics
        .has_records(inst.id, DataKind::ContractGrouping, Currency::Zwl)
        .await
        .unwrap());
    assert!(!metrics
        .has_records(inst.id, DataKind::DiscountRates, Currency::Usd)
        .await
        .unwrap());
    assert!(metrics
        .has_records(inst.id, DataKind::Submissions, Currency::Usd)
        .await
        .is_err());
}

#[tokio::test]
async fn test_quality_check_upsert_keeps_one_row_per_currency() {
    print_test_header(
        "test_quality_check_upsert_keeps_one_row_per_currency",
        &["(institution, period, currency) identifies a quality check"],
    );
    let db = migrated_db().await;
    let institutions = SeaOrmInstitutionRepository::new(db.conn.clone());
    let checks = SeaOrmQualityCheckRepository::new(db.conn.clone());
    let inst = institutions
        .create(&institution_input("Inst A", "REG-1", "LIC-1"))
        .await
        .unwrap();
    let period = date(2024, 3, 31);
    let scorer = QualityScorer::placeholder(CompletenessChecklist::Legacy);
    let snapshot = InstitutionSnapshot {
        institution_id: inst.id,
        status: InstitutionStatus::Active,
        latest_reporting_period: Some(period),
    };

    for present in [vec![], vec![DataKind::Submissions]] {
        for &currency in Currency::ALL {
            let report = scorer.score(&snapshot, currency, &present);
            checks.upsert(inst.id, period, &report).await.unwrap();
        }
    }

    let stored = checks.list_for_institution(inst.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored
        .iter()
        .all(|c| c.report.completeness == Decimal::new(12_50, 2)));
    assert!(stored.iter().all(|c| c.report.issues.missing_data_points == 7));

    let in_march = checks
        .list_in_period_range(date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert_eq!(in_march.len(), 2);
    assert_eq!(checks.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_cascade_removes_owned_rows() {
    print_test_header(
        "test_delete_cascade_removes_owned_rows",
        &["Deleting an institution removes submissions, metrics, checks and alerts"],
    );
    let db = migrated_db().await;
    let institutions = SeaOrmInstitutionRepository::new(db.conn.clone());
    let submissions = SeaOrmSubmissionRepository::new(db.conn.clone());
    let metrics = SeaOrmMetricsRepository::new(db.conn.clone());
    let alerts = SeaOrmAlertRepository::new(db.conn.clone());
    let a = institutions
        .create(&institution_input("Inst A", "REG-1", "LIC-1"))
        .await
        .unwrap();
    let b = institutions
        .create(&institution_input("Inst B", "REG-2", "LIC-2"))
        .await
        .unwrap();
    let period = date(2024, 1, 31);

    submissions.create(&new_submission(a.id, period, "a.csv")).await.unwrap();
    submissions.create(&new_submission(b.id, period, "b.csv")).await.unwrap();
    metrics
        .upsert(&MetricInput {
            key: MetricKey {
                institution_id: a.id,
                reporting_period: period,
                currency: Currency::Zwl,
            },
            values: MetricValues::DiscountRates {
                total_discount_rate: Decimal::new(12_75, 2),
                net_finance_result: None,
            },
            notes: String::new(),
        })
        .await
        .unwrap();
    alerts
        .create(&AlertInput {
            institution_id: a.id,
            title: "Late".to_string(),
            description: "Overdue".to_string(),
            alert_type: AlertType::LateSubmission,
            severity: AlertSeverity::Low,
        })
        .await
        .unwrap();

    assert!(institutions.delete_cascade(a.id).await.unwrap());
    assert!(!institutions.delete_cascade(a.id).await.unwrap());

    let remaining = submissions
        .list(&SubmissionFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].institution_id, b.id);
    assert!(metrics.list_for_institution(a.id).await.unwrap().is_empty());
    assert_eq!(alerts.count_unresolved().await.unwrap(), 0);
}

#[tokio::test]
async fn test_alert_resolution_and_users() {
    let db = migrated_db().await;
    let institutions = SeaOrmInstitutionRepository::new(db.conn.clone());
    let alerts = SeaOrmAlertRepository::new(db.conn.clone());
    let users = SeaOrmUserRepository::new(db.conn.clone());
    let inst = institutions
        .create(&institution_input("Inst A", "REG-1", "LIC-1"))
        .await
        .unwrap();

    let alert = alerts
        .create(&AlertInput {
            institution_id: inst.id,
            title: "Solvency".to_string(),
            description: "Below 100%".to_string(),
            alert_type: AlertType::Solvency,
            severity: AlertSeverity::Critical,
        })
        .await
        .unwrap();
    assert!(!alert.is_resolved);

    let resolved = alerts.resolve(alert.id).await.unwrap().unwrap();
    assert!(resolved.is_resolved);
    assert!(resolved.resolved_at.is_some());
    assert!(alerts.resolve(alert.id + 100).await.unwrap().is_none());
    assert!(alerts
        .list_for_institution(inst.id, true)
        .await
        .unwrap()
        .is_empty());

    users.upsert("admin", "hash-1").await.unwrap();
    users.upsert("admin", "hash-2").await.unwrap();
    assert_eq!(users.find("admin").await.unwrap().unwrap().password_hash, "hash-2");
    assert!(users.find("nobody").await.unwrap().is_none());
}
