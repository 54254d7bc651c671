use sea_orm::entity::prelude::*;

/// users表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    #[sea_orm(column_type = "String(Some(255))")]
    pub email: String,

    /// 为空时使用默认名称
    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub sa_name: Option<String>,

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
