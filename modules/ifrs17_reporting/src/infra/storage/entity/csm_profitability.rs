use sea_orm::entity::prelude::*;

/// Contractual service margin profitability per currency
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "csm_profitability")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub institution_id: i32,
    pub reporting_period: Date,

    /// ZWL | USD
    pub currency: String,

    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub opening_csm: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub closing_csm: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub csm_profit_margin: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub csm_roi: Option<Decimal>,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
