use sea_orm::entity::prelude::*;

/// clusters表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clusters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    /// 管理员kubeconfig原文
    #[sea_orm(column_type = "Text")]
    pub kubeconfig: String,

    #[sea_orm(column_type = "String(Some(512))")]
    pub server: String,

    #[sea_orm(column_type = "String(Some(255))")]
    pub storage_class: String,

    pub created_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dev_space::Entity")]
    DevSpace,
}

impl Related<super::dev_space::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DevSpace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
