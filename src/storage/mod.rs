use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::errors::Result;
use crate::models::{
    classworks::entities::Classwork,
    notifications::entities::{Announcement, Material, NotificationKind},
    sections::entities::AssignmentContext,
    users::entities::User,
};

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户查询方法
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 课业查询方法
    // 通过ID获取课业
    async fn get_classwork_by_id(&self, classwork_id: i64) -> Result<Option<Classwork>>;
    // 定时发布检查：active 且 scheduled 且 publish_at <= now
    async fn list_scheduled_ready_classworks(&self, now: DateTime<Utc>) -> Result<Vec<Classwork>>;
    // 截止提醒检查：deadline 落在 (now, now+window]，排除尚未到发布时间的定时课业
    async fn list_due_soon_classworks(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<Classwork>>;

    /// 受众解析方法
    // 加载授课分配上下文（分配 + 课程 + 班级 + 教师）
    async fn get_assignment_context(
        &self,
        assignment_id: i64,
    ) -> Result<Option<AssignmentContext>>;
    // 列出 (课程, 班级) 的在读学生
    async fn list_enrolled_students(&self, course_id: i64, section_id: i64) -> Result<Vec<User>>;
    // 列出课业的未提交学生
    async fn list_unsubmitted_students(&self, classwork_id: i64) -> Result<Vec<User>>;

    /// 课件/公告查询方法
    async fn get_material_by_id(&self, material_id: i64) -> Result<Option<Material>>;
    async fn get_announcement_by_id(&self, announcement_id: i64) -> Result<Option<Announcement>>;

    /// 通知发送记录方法
    // 记录一次发送；已存在时返回 false（幂等保护）
    async fn mark_notified(
        &self,
        kind: NotificationKind,
        entity_id: i64,
        recipient_id: i64,
    ) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
