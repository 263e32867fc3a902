use serde::{Deserialize, Serialize};

// 通知事件类型
//
// 同一 (kind, entity_id, recipient_id) 只发送一次，见 notification_log。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MaterialPosted,    // 课件发布
    AnnouncementPosted, // 公告发布
    ClassworkPosted,   // 课业发布
    TeacherAssigned,   // 教师分配
    DueSoon,           // 截止提醒
}

impl NotificationKind {
    pub const MATERIAL_POSTED: &'static str = "material_posted";
    pub const ANNOUNCEMENT_POSTED: &'static str = "announcement_posted";
    pub const CLASSWORK_POSTED: &'static str = "classwork_posted";
    pub const TEACHER_ASSIGNED: &'static str = "teacher_assigned";
    pub const DUE_SOON: &'static str = "due_soon";
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<NotificationKind>()
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::MaterialPosted => write!(f, "{}", Self::MATERIAL_POSTED),
            NotificationKind::AnnouncementPosted => write!(f, "{}", Self::ANNOUNCEMENT_POSTED),
            NotificationKind::ClassworkPosted => write!(f, "{}", Self::CLASSWORK_POSTED),
            NotificationKind::TeacherAssigned => write!(f, "{}", Self::TEACHER_ASSIGNED),
            NotificationKind::DueSoon => write!(f, "{}", Self::DUE_SOON),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "material_posted" => Ok(NotificationKind::MaterialPosted),
            "announcement_posted" => Ok(NotificationKind::AnnouncementPosted),
            "classwork_posted" => Ok(NotificationKind::ClassworkPosted),
            "teacher_assigned" => Ok(NotificationKind::TeacherAssigned),
            "due_soon" => Ok(NotificationKind::DueSoon),
            _ => Err(format!("Invalid notification kind: {s}")),
        }
    }
}

// 课件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub assignment_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub posted_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 公告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub assignment_id: i64,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
