use serde::{Deserialize, Serialize};

use crate::models::users::entities::User;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub title: String,
}

// 班级分组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
}

/// 授课分配上下文
///
/// 一次通知分发需要的完整环境：分配记录本身、课程、班级和授课教师。
/// Storage 层联表加载；任何一环缺失都视为数据错误（上下文不存在）。
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentContext {
    pub assignment_id: i64,
    pub semester: String,
    pub course: Course,
    pub section: Section,
    pub teacher: User,
}
