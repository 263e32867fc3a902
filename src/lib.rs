//! EduNotify - 教学管理平台通知服务
//!
//! 基于 Actix Web 构建的课业发布与截止提醒通知后端。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `mailer`: 邮件投递（SMTP 传输 + 有界队列）
//! - `models`: 数据模型定义
//! - `routes`: API 路由层（手动触发/状态查询）
//! - `runtime`: 运行时生命周期管理（调度器）
//! - `services`: 业务逻辑层（通知分发、定时扫描）
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod mailer;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
