//! 课业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "classworks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub instructions: Option<String>,
    pub kind: String,
    pub points: f64,
    pub deadline: Option<i64>,
    pub scheduled: bool,
    pub publish_at: Option<i64>,
    pub active: bool,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::section_assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::section_assignments::Column::Id"
    )]
    SectionAssignment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::section_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SectionAssignment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_classwork(self) -> crate::models::classworks::entities::Classwork {
        use crate::models::classworks::entities::{Classwork, ClassworkKind};
        use chrono::{DateTime, Utc};

        Classwork {
            id: self.id,
            assignment_id: self.assignment_id,
            title: self.title,
            instructions: self.instructions,
            kind: self
                .kind
                .parse::<ClassworkKind>()
                .unwrap_or(ClassworkKind::Assignment),
            points: self.points,
            deadline: self
                .deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            scheduled: self.scheduled,
            publish_at: self
                .publish_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            active: self.active,
            created_by: self.created_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
