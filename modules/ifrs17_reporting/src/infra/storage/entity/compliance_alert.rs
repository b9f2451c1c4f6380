use sea_orm::entity::prelude::*;

/// Compliance alerts table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "compliance_alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub institution_id: i32,
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub alert_type: String,
    pub severity: String,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
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
