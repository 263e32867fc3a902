//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod announcements;
mod classworks;
mod enrollments;
mod materials;
mod notification_log;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{EduNotifyError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| EduNotifyError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EduNotifyError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EduNotifyError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EduNotifyError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EduNotifyError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use chrono::{DateTime, Utc};

use crate::models::{
    classworks::entities::Classwork,
    notifications::entities::{Announcement, Material, NotificationKind},
    sections::entities::AssignmentContext,
    users::entities::User,
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 课业模块
    async fn get_classwork_by_id(&self, classwork_id: i64) -> Result<Option<Classwork>> {
        self.get_classwork_by_id_impl(classwork_id).await
    }

    async fn list_scheduled_ready_classworks(&self, now: DateTime<Utc>) -> Result<Vec<Classwork>> {
        self.list_scheduled_ready_classworks_impl(now).await
    }

    async fn list_due_soon_classworks(
        &self,
        now: DateTime<Utc>,
        window: chrono::Duration,
    ) -> Result<Vec<Classwork>> {
        self.list_due_soon_classworks_impl(now, window).await
    }

    // 受众模块
    async fn get_assignment_context(
        &self,
        assignment_id: i64,
    ) -> Result<Option<AssignmentContext>> {
        self.get_assignment_context_impl(assignment_id).await
    }

    async fn list_enrolled_students(&self, course_id: i64, section_id: i64) -> Result<Vec<User>> {
        self.list_enrolled_students_impl(course_id, section_id).await
    }

    async fn list_unsubmitted_students(&self, classwork_id: i64) -> Result<Vec<User>> {
        self.list_unsubmitted_students_impl(classwork_id).await
    }

    // 课件/公告模块
    async fn get_material_by_id(&self, material_id: i64) -> Result<Option<Material>> {
        self.get_material_by_id_impl(material_id).await
    }

    async fn get_announcement_by_id(&self, announcement_id: i64) -> Result<Option<Announcement>> {
        self.get_announcement_by_id_impl(announcement_id).await
    }

    // 通知记录模块
    async fn mark_notified(
        &self,
        kind: NotificationKind,
        entity_id: i64,
        recipient_id: i64,
    ) -> Result<bool> {
        self.mark_notified_impl(kind, entity_id, recipient_id).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! 测试辅助：内存 SQLite + 完整迁移 + 数据填充

    use super::*;
    use crate::entity::prelude::*;
    use sea_orm::{ActiveModelTrait, Set};

    pub async fn memory_storage() -> SeaOrmStorage {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        // 内存库必须限制为单连接：池里每个连接都是独立的 :memory: 库
        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Failed to parse in-memory SQLite URL");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opt)
            .await
            .expect("Failed to open in-memory SQLite");
        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        SeaOrmStorage { db }
    }

    pub async fn seed_user(
        storage: &SeaOrmStorage,
        username: &str,
        email: &str,
        role: &str,
    ) -> i64 {
        let now = chrono::Utc::now().timestamp();
        let model = UserActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            role: Set(role.to_string()),
            display_name: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed user").id
    }

    pub async fn seed_course(storage: &SeaOrmStorage, code: &str, title: &str) -> i64 {
        let model = CourseActiveModel {
            code: Set(code.to_string()),
            title: Set(title.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed course").id
    }

    pub async fn seed_section(storage: &SeaOrmStorage, name: &str) -> i64 {
        let model = SectionActiveModel {
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed section").id
    }

    pub async fn seed_assignment(
        storage: &SeaOrmStorage,
        teacher_id: i64,
        course_id: i64,
        section_id: i64,
    ) -> i64 {
        let model = SectionAssignmentActiveModel {
            teacher_id: Set(teacher_id),
            course_id: Set(course_id),
            section_id: Set(section_id),
            semester: Set("2026-1".to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed assignment").id
    }

    pub async fn seed_enrollment(
        storage: &SeaOrmStorage,
        student_id: i64,
        course_id: i64,
        section_id: i64,
    ) {
        let model = EnrollmentActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            section_id: Set(section_id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed enrollment");
    }

    pub struct ClassworkSeed {
        pub assignment_id: i64,
        pub created_by: i64,
        pub deadline: Option<i64>,
        pub scheduled: bool,
        pub publish_at: Option<i64>,
        pub active: bool,
    }

    pub async fn seed_classwork(storage: &SeaOrmStorage, seed: ClassworkSeed) -> i64 {
        let now = chrono::Utc::now().timestamp();
        let model = ClassworkActiveModel {
            assignment_id: Set(seed.assignment_id),
            title: Set("Worksheet".to_string()),
            instructions: Set(None),
            kind: Set("assignment".to_string()),
            points: Set(100.0),
            deadline: Set(seed.deadline),
            scheduled: Set(seed.scheduled),
            publish_at: Set(seed.publish_at),
            active: Set(seed.active),
            created_by: Set(seed.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed classwork").id
    }

    pub async fn seed_submission(
        storage: &SeaOrmStorage,
        classwork_id: i64,
        student_id: i64,
        status: &str,
    ) {
        let model = SubmissionActiveModel {
            classwork_id: Set(classwork_id),
            student_id: Set(student_id),
            status: Set(status.to_string()),
            submitted_at: Set(None),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed submission");
    }

    pub async fn seed_material(storage: &SeaOrmStorage, assignment_id: i64, posted_by: i64) -> i64 {
        let model = MaterialActiveModel {
            assignment_id: Set(assignment_id),
            title: Set("Lecture slides".to_string()),
            description: Set(Some("Week 3 slides".to_string())),
            posted_by: Set(posted_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        model.insert(&storage.db).await.expect("seed material").id
    }

    pub async fn seed_announcement(
        storage: &SeaOrmStorage,
        assignment_id: i64,
        author_id: i64,
    ) -> i64 {
        let model = AnnouncementActiveModel {
            assignment_id: Set(assignment_id),
            title: Set("No class Friday".to_string()),
            body: Set("Campus event, no meeting this Friday.".to_string()),
            author_id: Set(author_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        model
            .insert(&storage.db)
            .await
            .expect("seed announcement")
            .id
    }
}
