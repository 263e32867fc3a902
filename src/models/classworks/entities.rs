use serde::{Deserialize, Serialize};

// 课业类型
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ClassworkKind {
    Assignment, // 作业
    Quiz,       // 测验
    Activity,   // 课堂活动
    Project,    // 项目
    Exam,       // 考试
}

impl ClassworkKind {
    pub const ASSIGNMENT: &'static str = "assignment";
    pub const QUIZ: &'static str = "quiz";
    pub const ACTIVITY: &'static str = "activity";
    pub const PROJECT: &'static str = "project";
    pub const EXAM: &'static str = "exam";

    /// 邮件模板里的展示名
    pub fn label(&self) -> &'static str {
        match self {
            ClassworkKind::Assignment => "Assignment",
            ClassworkKind::Quiz => "Quiz",
            ClassworkKind::Activity => "Activity",
            ClassworkKind::Project => "Project",
            ClassworkKind::Exam => "Exam",
        }
    }
}

impl<'de> Deserialize<'de> for ClassworkKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<ClassworkKind>().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for ClassworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassworkKind::Assignment => write!(f, "{}", ClassworkKind::ASSIGNMENT),
            ClassworkKind::Quiz => write!(f, "{}", ClassworkKind::QUIZ),
            ClassworkKind::Activity => write!(f, "{}", ClassworkKind::ACTIVITY),
            ClassworkKind::Project => write!(f, "{}", ClassworkKind::PROJECT),
            ClassworkKind::Exam => write!(f, "{}", ClassworkKind::EXAM),
        }
    }
}

impl std::str::FromStr for ClassworkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assignment" => Ok(ClassworkKind::Assignment),
            "quiz" => Ok(ClassworkKind::Quiz),
            "activity" => Ok(ClassworkKind::Activity),
            "project" => Ok(ClassworkKind::Project),
            "exam" => Ok(ClassworkKind::Exam),
            _ => Err(format!("Invalid classwork kind: {s}")),
        }
    }
}

// 课业实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classwork {
    pub id: i64,
    // 所属授课分配 ID
    pub assignment_id: i64,
    pub title: String,
    pub instructions: Option<String>,
    pub kind: ClassworkKind,
    pub points: f64,
    // 截止时间
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    // 定时发布标记与发布时间
    pub scheduled: bool,
    pub publish_at: Option<chrono::DateTime<chrono::Utc>>,
    pub active: bool,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Classwork {
    /// 课业在给定时刻是否已发布
    ///
    /// Published = active 且（未定时发布，或发布时间已到）。
    /// Scheduled 到 Published 由时间谓词推导，不落库。
    pub fn is_published(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.active && (!self.scheduled || self.publish_at.is_some_and(|at| at <= now))
    }
}
