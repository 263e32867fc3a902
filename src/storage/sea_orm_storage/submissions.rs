//! 提交存储操作

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::SeaOrmStorage;
use crate::entity::submissions::{Column, Entity as Submissions};
use crate::entity::users::Entity as Users;
use crate::errors::{EduNotifyError, Result};
use crate::models::submissions::entities::SubmissionStatus;
use crate::models::users::entities::User;

impl SeaOrmStorage {
    /// 列出课业的未提交学生
    ///
    /// 截止提醒的受众：status = not_submitted 的提交记录对应的学生。
    pub async fn list_unsubmitted_students_impl(&self, classwork_id: i64) -> Result<Vec<User>> {
        let rows = Submissions::find()
            .filter(Column::ClassworkId.eq(classwork_id))
            .filter(Column::Status.eq(SubmissionStatus::NOT_SUBMITTED))
            .find_also_related(Users)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询未提交学生失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, user)| user)
            .map(|m| m.into_user())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;

    #[tokio::test]
    async fn test_unsubmitted_students_filters_by_status() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", "t1@school.edu", "teacher").await;
        let course = seed_course(&storage, "MATH101", "Algebra").await;
        let section = seed_section(&storage, "A").await;
        let assignment = seed_assignment(&storage, teacher, course, section).await;
        let classwork = seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some(chrono::Utc::now().timestamp() + 3600),
                scheduled: false,
                publish_at: None,
                active: true,
            },
        )
        .await;

        let pending = seed_user(&storage, "student1", "s1@school.edu", "student").await;
        let done = seed_user(&storage, "student2", "s2@school.edu", "student").await;
        seed_submission(&storage, classwork, pending, "not_submitted").await;
        seed_submission(&storage, classwork, done, "submitted").await;

        let students = storage
            .list_unsubmitted_students_impl(classwork)
            .await
            .unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, pending);
    }
}
