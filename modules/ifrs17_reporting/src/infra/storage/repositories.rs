//! SeaORM repository implementations

use crate::contract::{
    AlertInput, ComplianceAlert, Currency, DataKind, DataQualityCheck, Institution,
    InstitutionFilter, InstitutionInput, InstitutionStatus, MetricInput, MetricKey, MetricRecord,
    MetricValues, NewSubmission, QualityReport, Submission, SubmissionFilter, SubmissionInput,
    SubmissionStatus, User,
};
use crate::domain::repository::{
    AlertRepository, InstitutionRepository, MetricsRepository, QualityCheckRepository,
    SubmissionRepository, UserRepository,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;

use super::entity;
use super::mapper;

fn convert_all<M, T>(models: Vec<M>) -> Result<Vec<T>>
where
    T: TryFrom<M, Error = anyhow::Error>,
{
    models.into_iter().map(T::try_from).collect()
}

// ===== Institution Repository =====

pub struct SeaOrmInstitutionRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmInstitutionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InstitutionRepository for SeaOrmInstitutionRepository {
    async fn create(&self, input: &InstitutionInput) -> Result<Institution> {
        let now = Utc::now();
        let mut active = mapper::institution_active_model(input, now);
        active.created_at = Set(now);

        let result = entity::institution::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;

        result.try_into()
    }

    async fn update(&self, id: i32, input: &InstitutionInput) -> Result<Option<Institution>> {
        let existing = entity::institution::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut active = mapper::institution_active_model(input, Utc::now());
        active.id = Set(id);
        let result = entity::institution::Entity::update(active)
            .exec(&*self.db)
            .await?;

        Ok(Some(result.try_into()?))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Institution>> {
        let result = entity::institution::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;

        result.map(Institution::try_from).transpose()
    }

    async fn list(&self, filter: &InstitutionFilter) -> Result<Vec<Institution>> {
        let mut query = entity::institution::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(entity::institution::Column::Status.eq(status.as_str()));
        }
        if let Some(institution_type) = filter.institution_type {
            query = query
                .filter(entity::institution::Column::InstitutionType.eq(institution_type.as_str()));
        }

        let results = query
            .order_by_asc(entity::institution::Column::Name)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn find_clashes(
        &self,
        input: &InstitutionInput,
        exclude_id: Option<i32>,
    ) -> Result<Vec<Institution>> {
        use entity::institution::Column;

        let mut query = entity::institution::Entity::find().filter(
            Condition::any()
                .add(Column::Name.eq(input.name.as_str()))
                .add(Column::RegistrationNumber.eq(input.registration_number.as_str()))
                .add(Column::LicenseNumber.eq(input.license_number.as_str())),
        );
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }

        convert_all(query.all(&*self.db).await?)
    }

    async fn delete_cascade(&self, id: i32) -> Result<bool> {
        let txn = self.db.begin().await?;

        let exists = entity::institution::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            txn.rollback().await?;
            return Ok(false);
        }

        delete_owned_rows(&txn, id).await?;
        entity::institution::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn count(&self, status: Option<InstitutionStatus>) -> Result<u64> {
        let mut query = entity::institution::Entity::find();
        if let Some(status) = status {
            query = query.filter(entity::institution::Column::Status.eq(status.as_str()));
        }
        Ok(query.count(&*self.db).await?)
    }
}

/// Remove every row owned by an institution; the foreign keys cascade too,
/// but SQLite only honours them when the pragma is on.
async fn delete_owned_rows<C: ConnectionTrait>(conn: &C, institution_id: i32) -> Result<()> {
    macro_rules! delete_for {
        ($($module:ident),+) => {
            $(
                entity::$module::Entity::delete_many()
                    .filter(entity::$module::Column::InstitutionId.eq(institution_id))
                    .exec(conn)
                    .await?;
            )+
        };
    }

    delete_for!(
        submission,
        insurance_revenue,
        csm_profitability,
        discount_rates,
        reinsurance_held,
        ifrs4_transition,
        contract_grouping,
        data_quality_check,
        compliance_alert
    );
    Ok(())
}

// ===== Submission Repository =====

pub struct SeaOrmSubmissionRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSubmissionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubmissionRepository for SeaOrmSubmissionRepository {
    async fn create(&self, submission: &NewSubmission) -> Result<Submission> {
        let active: entity::submission::ActiveModel = submission.into();
        let result = entity::submission::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;

        result.try_into()
    }

    async fn replace(&self, replaced: &[i32], submission: &NewSubmission) -> Result<Submission> {
        let txn = self.db.begin().await?;

        entity::submission::Entity::delete_many()
            .filter(entity::submission::Column::Id.is_in(replaced.iter().copied()))
            .exec(&txn)
            .await?;

        let active: entity::submission::ActiveModel = submission.into();
        let result = entity::submission::Entity::insert(active)
            .exec_with_returning(&txn)
            .await?;

        txn.commit().await?;
        result.try_into()
    }

    async fn update(&self, id: i32, input: &SubmissionInput) -> Result<Option<Submission>> {
        let Some(existing) = entity::submission::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };

        let f = &input.financials;
        let mut active: entity::submission::ActiveModel = existing.into();
        active.institution_id = Set(input.institution_id);
        active.reporting_period = Set(input.reporting_period);
        active.contractual_service_margin = Set(f.contractual_service_margin);
        active.risk_adjustment = Set(f.risk_adjustment);
        active.loss_component = Set(f.loss_component);
        active.total_liabilities = Set(f.total_liabilities);
        active.equity_impact = Set(f.equity_impact);
        active.profit_margin = Set(f.profit_margin);
        active.solvency_ratio = Set(f.solvency_ratio);
        active.notes = Set(input.notes.clone());
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(Utc::now());

        let result = entity::submission::Entity::update(active)
            .exec(&*self.db)
            .await?;
        Ok(Some(result.try_into()?))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Submission>> {
        let result = entity::submission::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;

        result.map(Submission::try_from).transpose()
    }

    async fn list(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>> {
        let mut query = entity::submission::Entity::find();
        if let Some(institution_id) = filter.institution_id {
            query = query.filter(entity::submission::Column::InstitutionId.eq(institution_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(entity::submission::Column::Status.eq(status.as_str()));
        }

        let results = query
            .order_by_desc(entity::submission::Column::CreatedAt)
            .order_by_desc(entity::submission::Column::Id)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn find_by_institution_period(
        &self,
        institution_id: i32,
        reporting_period: NaiveDate,
    ) -> Result<Vec<Submission>> {
        let results = entity::submission::Entity::find()
            .filter(entity::submission::Column::InstitutionId.eq(institution_id))
            .filter(entity::submission::Column::ReportingPeriod.eq(reporting_period))
            .order_by_asc(entity::submission::Column::Id)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn list_in_period_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Submission>> {
        let results = entity::submission::Entity::find()
            .filter(entity::submission::Column::ReportingPeriod.between(from, to))
            .order_by_asc(entity::submission::Column::ReportingPeriod)
            .order_by_asc(entity::submission::Column::Id)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn latest_reporting_period(&self, institution_id: i32) -> Result<Option<NaiveDate>> {
        let latest = entity::submission::Entity::find()
            .filter(entity::submission::Column::InstitutionId.eq(institution_id))
            .order_by_desc(entity::submission::Column::ReportingPeriod)
            .one(&*self.db)
            .await?;

        Ok(latest.map(|s| s.reporting_period))
    }

    async fn count_by_status(&self) -> Result<Vec<(SubmissionStatus, u64)>> {
        let mut counts = Vec::with_capacity(SubmissionStatus::ALL.len());
        for &status in SubmissionStatus::ALL {
            let n = entity::submission::Entity::find()
                .filter(entity::submission::Column::Status.eq(status.as_str()))
                .count(&*self.db)
                .await?;
            counts.push((status, n));
        }
        Ok(counts)
    }
}

// ===== Metrics Repository =====

pub struct SeaOrmMetricsRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMetricsRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Rows of a per-currency table matching a metric key
macro_rules! by_key {
    ($module:ident, $key:expr) => {
        entity::$module::Entity::find()
            .filter(entity::$module::Column::InstitutionId.eq($key.institution_id))
            .filter(entity::$module::Column::ReportingPeriod.eq($key.reporting_period))
            .filter(entity::$module::Column::Currency.eq($key.currency.as_str()))
    };
}

/// Insert-or-update on the natural key, then read the stored row back
macro_rules! upsert_by_key {
    ($db:expr, $module:ident, $active:expr, [$($key_col:ident),+], [$($col:ident),+]) => {{
        use entity::$module::Column;
        entity::$module::Entity::insert($active)
            .on_conflict(
                OnConflict::columns([$(Column::$key_col),+])
                    .update_columns([$(Column::$col),+, Column::Notes, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning($db)
            .await?;
    }};
}

fn missing_after_upsert(kind: DataKind, key: &MetricKey) -> anyhow::Error {
    anyhow!(
        "{} record for institution {} ({}, {}) missing after upsert",
        kind,
        key.institution_id,
        key.reporting_period,
        key.currency
    )
}

#[async_trait]
impl MetricsRepository for SeaOrmMetricsRepository {
    async fn upsert(&self, input: &MetricInput) -> Result<MetricRecord> {
        let db = &*self.db;
        let key = &input.key;
        let kind = input.values.kind();
        let now = Utc::now();
        let currency = key.currency.as_str().to_string();
        let notes = input.notes.clone();

        match &input.values {
            MetricValues::InsuranceRevenue {
                total_revenue,
                service_performance_ratio,
            } => {
                let active = entity::insurance_revenue::ActiveModel {
                    institution_id: Set(key.institution_id),
                    reporting_period: Set(key.reporting_period),
                    currency: Set(currency),
                    total_revenue: Set(*total_revenue),
                    service_performance_ratio: Set(*service_performance_ratio),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                upsert_by_key!(
                    db,
                    insurance_revenue,
                    active,
                    [InstitutionId, ReportingPeriod, Currency],
                    [TotalRevenue, ServicePerformanceRatio]
                );
                by_key!(insurance_revenue, key)
                    .one(db)
                    .await?
                    .ok_or_else(|| missing_after_upsert(kind, key))?
                    .try_into()
            }
            MetricValues::CsmProfitability {
                opening_csm,
                closing_csm,
                csm_profit_margin,
                csm_roi,
            } => {
                let active = entity::csm_profitability::ActiveModel {
                    institution_id: Set(key.institution_id),
                    reporting_period: Set(key.reporting_period),
                    currency: Set(currency),
                    opening_csm: Set(*opening_csm),
                    closing_csm: Set(*closing_csm),
                    csm_profit_margin: Set(*csm_profit_margin),
                    csm_roi: Set(*csm_roi),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                upsert_by_key!(
                    db,
                    csm_profitability,
                    active,
                    [InstitutionId, ReportingPeriod, Currency],
                    [OpeningCsm, ClosingCsm, CsmProfitMargin, CsmRoi]
                );
                by_key!(csm_profitability, key)
                    .one(db)
                    .await?
                    .ok_or_else(|| missing_after_upsert(kind, key))?
                    .try_into()
            }
            MetricValues::DiscountRates {
                total_discount_rate,
                net_finance_result,
            } => {
                let active = entity::discount_rates::ActiveModel {
                    institution_id: Set(key.institution_id),
                    reporting_period: Set(key.reporting_period),
                    currency: Set(currency),
                    total_discount_rate: Set(*total_discount_rate),
                    net_finance_result: Set(*net_finance_result),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                upsert_by_key!(
                    db,
                    discount_rates,
                    active,
                    [InstitutionId, ReportingPeriod, Currency],
                    [TotalDiscountRate, NetFinanceResult]
                );
                by_key!(discount_rates, key)
                    .one(db)
                    .await?
                    .ok_or_else(|| missing_after_upsert(kind, key))?
                    .try_into()
            }
            MetricValues::ReinsuranceHeld {
                total_reinsurance_held,
                risk_transfer_ratio,
            } => {
                let active = entity::reinsurance_held::ActiveModel {
                    institution_id: Set(key.institution_id),
                    reporting_period: Set(key.reporting_period),
                    currency: Set(currency),
                    total_reinsurance_held: Set(*total_reinsurance_held),
                    risk_transfer_ratio: Set(*risk_transfer_ratio),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                upsert_by_key!(
                    db,
                    reinsurance_held,
                    active,
                    [InstitutionId, ReportingPeriod, Currency],
                    [TotalReinsuranceHeld, RiskTransferRatio]
                );
                by_key!(reinsurance_held, key)
                    .one(db)
                    .await?
                    .ok_or_else(|| missing_after_upsert(kind, key))?
                    .try_into()
            }
            MetricValues::Ifrs4Transition {
                implementation_status,
                equity_impact,
            } => {
                let active = entity::ifrs4_transition::ActiveModel {
                    institution_id: Set(key.institution_id),
                    reporting_period: Set(key.reporting_period),
                    currency: Set(currency),
                    implementation_status: Set(implementation_status.as_str().to_string()),
                    equity_impact: Set(*equity_impact),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                upsert_by_key!(
                    db,
                    ifrs4_transition,
                    active,
                    [InstitutionId, ReportingPeriod, Currency],
                    [ImplementationStatus, EquityImpact]
                );
                by_key!(ifrs4_transition, key)
                    .one(db)
                    .await?
                    .ok_or_else(|| missing_after_upsert(kind, key))?
                    .try_into()
            }
            MetricValues::ContractGrouping {
                product_line,
                contract_type,
                measurement_model,
                risk_profile,
                number_of_contracts,
            } => {
                let active = entity::contract_grouping::ActiveModel {
                    institution_id: Set(key.institution_id),
                    reporting_period: Set(key.reporting_period),
                    currency: Set(currency),
                    product_line: Set(product_line.clone()),
                    contract_type: Set(contract_type.clone()),
                    measurement_model: Set(measurement_model.as_str().to_string()),
                    risk_profile: Set(risk_profile.as_str().to_string()),
                    number_of_contracts: Set(*number_of_contracts),
                    notes: Set(notes),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                upsert_by_key!(
                    db,
                    contract_grouping,
                    active,
                    [InstitutionId, ReportingPeriod, Currency, ProductLine, ContractType],
                    [MeasurementModel, RiskProfile, NumberOfContracts]
                );
                by_key!(contract_grouping, key)
                    .filter(entity::contract_grouping::Column::ProductLine.eq(product_line.as_str()))
                    .filter(entity::contract_grouping::Column::ContractType.eq(contract_type.as_str()))
                    .one(db)
                    .await?
                    .ok_or_else(|| missing_after_upsert(kind, key))?
                    .try_into()
            }
        }
    }

    async fn list_for_institution(&self, institution_id: i32) -> Result<Vec<MetricRecord>> {
        let db = &*self.db;

        macro_rules! rows_for {
            ($module:ident) => {
                convert_all::<_, MetricRecord>(
                    entity::$module::Entity::find()
                        .filter(entity::$module::Column::InstitutionId.eq(institution_id))
                        .all(db)
                        .await?,
                )?
            };
        }

        let mut records = Vec::new();
        records.extend(rows_for!(insurance_revenue));
        records.extend(rows_for!(csm_profitability));
        records.extend(rows_for!(discount_rates));
        records.extend(rows_for!(reinsurance_held));
        records.extend(rows_for!(ifrs4_transition));
        records.extend(rows_for!(contract_grouping));

        records.sort_by(|a, b| {
            b.key
                .reporting_period
                .cmp(&a.key.reporting_period)
                .then(a.key.currency.cmp(&b.key.currency))
                .then(a.kind().cmp(&b.kind()))
                .then(a.id.cmp(&b.id))
        });
        Ok(records)
    }

    async fn has_records(&self, institution_id: i32, kind: DataKind, currency: Currency) -> Result<bool> {
        let db = &*self.db;

        macro_rules! exists_for {
            ($module:ident) => {
                entity::$module::Entity::find()
                    .filter(entity::$module::Column::InstitutionId.eq(institution_id))
                    .filter(entity::$module::Column::Currency.eq(currency.as_str()))
                    .count(db)
                    .await?
                    > 0
            };
        }

        let found = match kind {
            DataKind::InsuranceRevenue => exists_for!(insurance_revenue),
            DataKind::CsmProfitability => exists_for!(csm_profitability),
            DataKind::DiscountRates => exists_for!(discount_rates),
            DataKind::ReinsuranceHeld => exists_for!(reinsurance_held),
            DataKind::Ifrs4Transition => exists_for!(ifrs4_transition),
            DataKind::ContractGrouping => exists_for!(contract_grouping),
            DataKind::Submissions | DataKind::ComplianceAlerts => {
                return Err(anyhow!("{} records carry no currency", kind));
            }
        };
        Ok(found)
    }
}

// ===== Quality Check Repository =====

pub struct SeaOrmQualityCheckRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmQualityCheckRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QualityCheckRepository for SeaOrmQualityCheckRepository {
    async fn upsert(
        &self,
        institution_id: i32,
        reporting_period: NaiveDate,
        report: &QualityReport,
    ) -> Result<DataQualityCheck> {
        use entity::data_quality_check::Column;

        let active =
            mapper::quality_check_active_model(institution_id, reporting_period, report, Utc::now());
        entity::data_quality_check::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([Column::InstitutionId, Column::ReportingPeriod, Column::Currency])
                    .update_columns([
                        Column::CompletenessScore,
                        Column::AccuracyScore,
                        Column::ConsistencyScore,
                        Column::TimelinessScore,
                        Column::OverallQualityScore,
                        Column::DataGovernanceScore,
                        Column::ControlEffectivenessScore,
                        Column::AuditTrailCompleteness,
                        Column::RegulatoryComplianceScore,
                        Column::ExchangeRateConsistency,
                        Column::CurrencyConversionAccuracy,
                        Column::MultiCurrencyReconciliation,
                        Column::MissingDataPoints,
                        Column::AnomaliesDetected,
                        Column::ValidationErrors,
                        Column::CriticalIssues,
                        Column::ResolvedIssues,
                        Column::PendingIssues,
                        Column::RemediationPlan,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        let stored = entity::data_quality_check::Entity::find()
            .filter(Column::InstitutionId.eq(institution_id))
            .filter(Column::ReportingPeriod.eq(reporting_period))
            .filter(Column::Currency.eq(report.currency.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                anyhow!(
                    "quality check for institution {} ({}, {}) missing after upsert",
                    institution_id,
                    reporting_period,
                    report.currency
                )
            })?;

        stored.try_into()
    }

    async fn list_for_institution(&self, institution_id: i32) -> Result<Vec<DataQualityCheck>> {
        let results = entity::data_quality_check::Entity::find()
            .filter(entity::data_quality_check::Column::InstitutionId.eq(institution_id))
            .order_by_desc(entity::data_quality_check::Column::ReportingPeriod)
            .order_by_asc(entity::data_quality_check::Column::Currency)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn list_all(&self) -> Result<Vec<DataQualityCheck>> {
        let results = entity::data_quality_check::Entity::find()
            .order_by_desc(entity::data_quality_check::Column::UpdatedAt)
            .order_by_asc(entity::data_quality_check::Column::Id)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn list_in_period_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DataQualityCheck>> {
        let results = entity::data_quality_check::Entity::find()
            .filter(entity::data_quality_check::Column::ReportingPeriod.between(from, to))
            .order_by_asc(entity::data_quality_check::Column::InstitutionId)
            .order_by_asc(entity::data_quality_check::Column::Currency)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }
}

// ===== Alert Repository =====

pub struct SeaOrmAlertRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAlertRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AlertRepository for SeaOrmAlertRepository {
    async fn create(&self, input: &AlertInput) -> Result<ComplianceAlert> {
        let active: entity::compliance_alert::ActiveModel = input.into();
        let result = entity::compliance_alert::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;

        result.try_into()
    }

    async fn list_for_institution(
        &self,
        institution_id: i32,
        unresolved_only: bool,
    ) -> Result<Vec<ComplianceAlert>> {
        let mut query = entity::compliance_alert::Entity::find()
            .filter(entity::compliance_alert::Column::InstitutionId.eq(institution_id));
        if unresolved_only {
            query = query.filter(entity::compliance_alert::Column::IsResolved.eq(false));
        }

        let results = query
            .order_by_desc(entity::compliance_alert::Column::CreatedAt)
            .order_by_desc(entity::compliance_alert::Column::Id)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn resolve(&self, id: i32) -> Result<Option<ComplianceAlert>> {
        let Some(existing) = entity::compliance_alert::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };
        if existing.is_resolved {
            return Ok(Some(existing.try_into()?));
        }

        let mut active: entity::compliance_alert::ActiveModel = existing.into();
        active.is_resolved = Set(true);
        active.resolved_at = Set(Some(Utc::now()));
        let result = entity::compliance_alert::Entity::update(active)
            .exec(&*self.db)
            .await?;

        Ok(Some(result.try_into()?))
    }

    async fn count_unresolved(&self) -> Result<u64> {
        Ok(entity::compliance_alert::Entity::find()
            .filter(entity::compliance_alert::Column::IsResolved.eq(false))
            .count(&*self.db)
            .await?)
    }
}

// ===== User Repository =====

pub struct SeaOrmUserRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find(&self, username: &str) -> Result<Option<User>> {
        let result = entity::user::Entity::find_by_id(username.to_string())
            .one(&*self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn upsert(&self, username: &str, password_hash: &str) -> Result<User> {
        let active = entity::user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(Utc::now()),
        };
        entity::user::Entity::insert(active)
            .on_conflict(
                OnConflict::column(entity::user::Column::Username)
                    .update_column(entity::user::Column::PasswordHash)
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        self.find(username)
            .await?
            .ok_or_else(|| anyhow!("user {} missing after upsert", username))
    }
}
