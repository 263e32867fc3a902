//! 课业存储操作
//!
//! 两个检查器的候选查询都在这里。查询是纯时间谓词，不持久化任何
//! 抑制状态：同一数据上重复调用返回相同候选集，去重由
//! notification_log 在分发层完成。

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};

use super::SeaOrmStorage;
use crate::entity::classworks::{Column, Entity as Classworks};
use crate::errors::{EduNotifyError, Result};
use crate::models::classworks::entities::Classwork;

impl SeaOrmStorage {
    /// 通过 ID 获取课业
    pub async fn get_classwork_by_id_impl(&self, classwork_id: i64) -> Result<Option<Classwork>> {
        let result = Classworks::find_by_id(classwork_id)
            .one(&self.db)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("查询课业失败: {e}")))?;

        Ok(result.map(|m| m.into_classwork()))
    }

    /// 定时发布候选：active 且 scheduled 且 publish_at <= now
    pub async fn list_scheduled_ready_classworks_impl(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Classwork>> {
        let results = Classworks::find()
            .filter(Column::Active.eq(true))
            .filter(Column::Scheduled.eq(true))
            .filter(Column::PublishAt.lte(now.timestamp()))
            .order_by_asc(Column::PublishAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                EduNotifyError::database_operation(format!("查询定时发布课业失败: {e}"))
            })?;

        Ok(results.into_iter().map(|m| m.into_classwork()).collect())
    }

    /// 截止提醒候选：deadline 落在 (now, now+window] 区间
    ///
    /// 下界严格、上界闭合；排除发布时间还没到的定时课业。
    pub async fn list_due_soon_classworks_impl(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<Classwork>> {
        let now_ts = now.timestamp();
        let until_ts = now_ts + window.num_seconds();

        let results = Classworks::find()
            .filter(Column::Active.eq(true))
            .filter(Column::Deadline.gt(now_ts))
            .filter(Column::Deadline.lte(until_ts))
            .filter(
                Condition::any()
                    .add(Column::Scheduled.eq(false))
                    .add(Column::PublishAt.lte(now_ts)),
            )
            .order_by_asc(Column::Deadline)
            .all(&self.db)
            .await
            .map_err(|e| {
                EduNotifyError::database_operation(format!("查询临近截止课业失败: {e}"))
            })?;

        Ok(results.into_iter().map(|m| m.into_classwork()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use chrono::{Duration, Utc};

    async fn fixture() -> (super::SeaOrmStorage, i64, i64) {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", "t1@school.edu", "teacher").await;
        let course = seed_course(&storage, "MATH101", "Algebra").await;
        let section = seed_section(&storage, "A").await;
        let assignment = seed_assignment(&storage, teacher, course, section).await;
        (storage, assignment, teacher)
    }

    #[tokio::test]
    async fn test_scheduled_ready_includes_past_publish_time() {
        let (storage, assignment, teacher) = fixture().await;
        let now = Utc::now();

        let ready = seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: None,
                scheduled: true,
                publish_at: Some((now - Duration::minutes(5)).timestamp()),
                active: true,
            },
        )
        .await;
        // 发布时间在未来，不应入选
        seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: None,
                scheduled: true,
                publish_at: Some((now + Duration::minutes(5)).timestamp()),
                active: true,
            },
        )
        .await;
        // 非 active，不应入选
        seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: None,
                scheduled: true,
                publish_at: Some((now - Duration::minutes(5)).timestamp()),
                active: false,
            },
        )
        .await;

        let candidates = storage
            .list_scheduled_ready_classworks_impl(now)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, ready);
    }

    #[tokio::test]
    async fn test_scheduled_ready_is_stable_across_invocations() {
        let (storage, assignment, teacher) = fixture().await;
        let now = Utc::now();

        seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: None,
                scheduled: true,
                publish_at: Some((now - Duration::hours(1)).timestamp()),
                active: true,
            },
        )
        .await;

        // 查询不持久化抑制状态：数据不变时每次调用候选集相同
        let first = storage
            .list_scheduled_ready_classworks_impl(now)
            .await
            .unwrap();
        let second = storage
            .list_scheduled_ready_classworks_impl(now)
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(
            first.iter().map(|c| c.id).collect::<Vec<_>>(),
            second.iter().map(|c| c.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_due_soon_window_bounds() {
        let (storage, assignment, teacher) = fixture().await;
        let now = Utc::now();
        let window = Duration::hours(24);

        // deadline 正好等于 now：严格下界，不入选
        seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some(now.timestamp()),
                scheduled: false,
                publish_at: None,
                active: true,
            },
        )
        .await;
        // deadline 在窗口内
        let inside = seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some((now + Duration::hours(20)).timestamp()),
                scheduled: false,
                publish_at: None,
                active: true,
            },
        )
        .await;
        // deadline 正好在 now+24h：闭合上界，入选
        let boundary = seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some((now + Duration::hours(24)).timestamp()),
                scheduled: false,
                publish_at: None,
                active: true,
            },
        )
        .await;
        // now+24h+1s：超出窗口
        seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some((now + Duration::hours(24) + Duration::seconds(1)).timestamp()),
                scheduled: false,
                publish_at: None,
                active: true,
            },
        )
        .await;

        let candidates = storage
            .list_due_soon_classworks_impl(now, window)
            .await
            .unwrap();
        let ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![inside, boundary]);
    }

    #[tokio::test]
    async fn test_due_soon_excludes_future_scheduled() {
        let (storage, assignment, teacher) = fixture().await;
        let now = Utc::now();

        // 截止在窗口内，但发布时间还没到
        seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some((now + Duration::hours(12)).timestamp()),
                scheduled: true,
                publish_at: Some((now + Duration::hours(2)).timestamp()),
                active: true,
            },
        )
        .await;
        // 定时课业但已到发布时间，应入选
        let published = seed_classwork(
            &storage,
            ClassworkSeed {
                assignment_id: assignment,
                created_by: teacher,
                deadline: Some((now + Duration::hours(12)).timestamp()),
                scheduled: true,
                publish_at: Some((now - Duration::hours(2)).timestamp()),
                active: true,
            },
        )
        .await;

        let candidates = storage
            .list_due_soon_classworks_impl(now, Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, published);
    }
}
