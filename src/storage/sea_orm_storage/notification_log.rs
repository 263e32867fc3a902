//! 通知发送记录存储操作

use sea_orm::sea_query::OnConflict;
use sea_orm::{DbErr, EntityTrait, Set};

use super::SeaOrmStorage;
use crate::entity::notification_log::{ActiveModel, Column, Entity as NotificationLog};
use crate::errors::{EduNotifyError, Result};
use crate::models::notifications::entities::NotificationKind;

impl SeaOrmStorage {
    /// 记录一次通知发送
    ///
    /// 唯一索引 (kind, entity_id, recipient_id) 做幂等保护：
    /// 首次插入返回 true，已存在返回 false。并发写入时后到者
    /// 观察到冲突并跳过，不需要额外的事务边界。
    pub async fn mark_notified_impl(
        &self,
        kind: NotificationKind,
        entity_id: i64,
        recipient_id: i64,
    ) -> Result<bool> {
        let model = ActiveModel {
            kind: Set(kind.to_string()),
            entity_id: Set(entity_id),
            recipient_id: Set(recipient_id),
            sent_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let insert = NotificationLog::insert(model).on_conflict(
            OnConflict::columns([Column::Kind, Column::EntityId, Column::RecipientId])
                .do_nothing()
                .to_owned(),
        );

        match insert.exec(&self.db).await {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(EduNotifyError::database_operation(format!(
                "写入通知记录失败: {e}"
            ))),
        }
    }
}
