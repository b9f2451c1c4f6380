use sea_orm::entity::prelude::*;

/// IFRS 4 to IFRS 17 transition status per currency
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ifrs4_transition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub institution_id: i32,
    pub reporting_period: Date,

    /// ZWL | USD
    pub currency: String,

    /// not_started | in_progress | completed
    pub implementation_status: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub equity_impact: Option<Decimal>,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
