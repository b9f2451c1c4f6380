use sea_orm::entity::prelude::*;

/// Insurance institutions table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "institutions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(unique)]
    pub registration_number: String,

    #[sea_orm(unique)]
    pub license_number: String,

    /// life | non_life | composite | reinsurer | funeral
    pub institution_type: String,

    /// active | suspended | inactive
    pub status: String,

    pub contact_person: String,
    pub email: String,
    pub phone: String,

    #[sea_orm(column_type = "Text")]
    pub address: String,

    pub city: String,
    pub country: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submission::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::compliance_alert::Entity")]
    ComplianceAlerts,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::compliance_alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComplianceAlerts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
