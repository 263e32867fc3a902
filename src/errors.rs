//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_edunotify_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EduNotifyError {
            $($variant(String),)*
        }

        impl EduNotifyError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EduNotifyError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EduNotifyError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EduNotifyError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EduNotifyError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EduNotifyError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_edunotify_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    MailConfig("E004", "Mail Configuration Error"),
    MailTransport("E005", "Mail Transport Error"),
    MailQueue("E006", "Mail Queue Error"),
    NotFound("E007", "Resource Not Found"),
    Validation("E008", "Validation Error"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    SweepInProgress("E011", "Sweep Already In Progress"),
}

impl EduNotifyError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for EduNotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EduNotifyError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EduNotifyError {
    fn from(err: sea_orm::DbErr) -> Self {
        EduNotifyError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for EduNotifyError {
    fn from(err: serde_json::Error) -> Self {
        EduNotifyError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EduNotifyError {
    fn from(err: chrono::ParseError) -> Self {
        EduNotifyError::DateParse(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for EduNotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        EduNotifyError::MailTransport(err.to_string())
    }
}

impl From<lettre::error::Error> for EduNotifyError {
    fn from(err: lettre::error::Error) -> Self {
        EduNotifyError::MailTransport(err.to_string())
    }
}

impl From<lettre::address::AddressError> for EduNotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        EduNotifyError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EduNotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EduNotifyError::database_config("test").code(), "E001");
        assert_eq!(EduNotifyError::mail_config("test").code(), "E004");
        assert_eq!(EduNotifyError::not_found("test").code(), "E007");
        assert_eq!(EduNotifyError::sweep_in_progress("test").code(), "E011");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EduNotifyError::mail_transport("test").error_type(),
            "Mail Transport Error"
        );
        assert_eq!(
            EduNotifyError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = EduNotifyError::mail_config("SMTP host is not set");
        assert_eq!(err.message(), "SMTP host is not set");
    }

    #[test]
    fn test_format_simple() {
        let err = EduNotifyError::mail_queue("queue closed");
        let formatted = err.format_simple();
        assert!(formatted.contains("Mail Queue Error"));
        assert!(formatted.contains("queue closed"));
    }
}
