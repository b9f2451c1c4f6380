use sea_orm::entity::prelude::*;

/// Data quality checks table entity, one row per institution, period and currency
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "data_quality_checks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub institution_id: i32,
    pub reporting_period: Date,
    pub currency: String,

    // Quality dimensions
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub completeness_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub accuracy_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub consistency_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub timeliness_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub overall_quality_score: Decimal,

    // Governance
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub data_governance_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub control_effectiveness_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub audit_trail_completeness: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub regulatory_compliance_score: Decimal,

    // Currency checks
    pub exchange_rate_consistency: bool,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub currency_conversion_accuracy: Decimal,
    pub multi_currency_reconciliation: bool,

    // Issue counters
    pub missing_data_points: i32,
    pub anomalies_detected: i32,
    pub validation_errors: i32,
    pub critical_issues: i32,
    pub resolved_issues: i32,
    pub pending_issues: i32,

    #[sea_orm(column_type = "Text")]
    pub remediation_plan: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::institution::Entity",
        from = "Column::InstitutionId",
        to = "super::institution::Column::Id",
        on_delete = "Cascade"
    )]
    Institution,
}

impl Related<super::institution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
