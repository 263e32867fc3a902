//! 公告存储操作

use sea_orm::EntityTrait;

use super::SeaOrmStorage;
use crate::entity::announcements::Entity as Announcements;
use crate::errors::{EduNotifyError, Result};
use crate::models::notifications::entities::Announcement;

impl SeaOrmStorage {
    /// 通过 ID 获取公告
    pub async fn get_announcement_by_id_impl(
        &self,
        announcement_id: i64,
    ) -> Result<Option<Announcement>> {
        let result = Announcements::find_by_id(announcement_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询公告失败: {e}")))?;

        Ok(result.map(|m| m.into_announcement()))
    }
}
