use sea_orm::entity::prelude::*;

/// Contract groups per currency, product line and contract type
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "contract_grouping")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub institution_id: i32,
    pub reporting_period: Date,

    /// ZWL | USD
    pub currency: String,

    pub product_line: String,
    pub contract_type: String,
    /// gmm | paa | vfa
    pub measurement_model: String,
    /// onerous | no_significant_risk | remaining
    pub risk_profile: String,
    pub number_of_contracts: i32,

    #[sea_orm(column_type = "Text")]
    pub notes: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
