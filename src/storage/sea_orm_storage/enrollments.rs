//! 选课与授课分配存储操作

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::SeaOrmStorage;
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::section_assignments::Entity as SectionAssignments;
use crate::entity::{courses::Entity as Courses, sections::Entity as Sections, users::Entity as Users};
use crate::errors::{EduNotifyError, Result};
use crate::models::sections::entities::AssignmentContext;
use crate::models::users::entities::User;

impl SeaOrmStorage {
    /// 加载授课分配上下文（分配 + 课程 + 班级 + 教师）
    ///
    /// 任何一环缺失都返回 None，由调用方按数据错误处理。
    pub async fn get_assignment_context_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Option<AssignmentContext>> {
        let Some(assignment) = SectionAssignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询授课分配失败: {e}")))?
        else {
            return Ok(None);
        };

        let course = Courses::find_by_id(assignment.course_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询课程失败: {e}")))?;
        let section = Sections::find_by_id(assignment.section_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询班级失败: {e}")))?;
        let teacher = Users::find_by_id(assignment.teacher_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询教师失败: {e}")))?;

        match (course, section, teacher) {
            (Some(course), Some(section), Some(teacher)) => Ok(Some(AssignmentContext {
                assignment_id: assignment.id,
                semester: assignment.semester,
                course: course.into_course(),
                section: section.into_section(),
                teacher: teacher.into_user(),
            })),
            _ => {
                debug!(
                    "Assignment {} has dangling course/section/teacher reference",
                    assignment_id
                );
                Ok(None)
            }
        }
    }

    /// 列出 (课程, 班级) 的在读学生
    pub async fn list_enrolled_students_impl(
        &self,
        course_id: i64,
        section_id: i64,
    ) -> Result<Vec<User>> {
        let rows = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::SectionId.eq(section_id))
            .find_also_related(Users)
            .order_by_asc(EnrollmentColumn::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询选课学生失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, user)| user)
            .map(|m| m.into_user())
            .collect())
    }
}
