//! 通知邮件模板
//!
//! 每个事件类型一个模板函数，输出一封完整的 HTML 邮件。

use chrono::{DateTime, Utc};

use super::OutboundEmail;
use crate::models::classworks::entities::Classwork;
use crate::models::notifications::entities::{Announcement, Material};
use crate::models::sections::entities::AssignmentContext;
use crate::models::users::entities::User;

fn format_deadline(deadline: Option<DateTime<Utc>>) -> String {
    match deadline {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "No deadline".to_string(),
    }
}

fn footer(ctx: &AssignmentContext) -> String {
    format!(
        "<p style=\"color:#888;font-size:12px\">{} {} &middot; Section {} &middot; {}</p>",
        ctx.course.code, ctx.course.title, ctx.section.name, ctx.semester
    )
}

/// 课业发布通知
pub fn classwork_posted(
    ctx: &AssignmentContext,
    classwork: &Classwork,
    recipient: &User,
) -> OutboundEmail {
    let subject = format!(
        "[{}] New {}: {}",
        ctx.course.code,
        classwork.kind.label(),
        classwork.title
    );
    let html_body = format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>{} posted a new {} in <b>{}</b>.</p>\
         <table>\
         <tr><td>Title</td><td><b>{}</b></td></tr>\
         <tr><td>Type</td><td>{}</td></tr>\
         <tr><td>Points</td><td>{}</td></tr>\
         <tr><td>Deadline</td><td>{}</td></tr>\
         </table>\
         {}\
         </body></html>",
        recipient.recipient_name(),
        ctx.teacher.recipient_name(),
        classwork.kind.label(),
        ctx.course.title,
        classwork.title,
        classwork.kind.label(),
        classwork.points,
        format_deadline(classwork.deadline),
        footer(ctx),
    );

    OutboundEmail {
        to: recipient.email.clone(),
        subject,
        html_body,
    }
}

/// 截止提醒通知
pub fn due_soon(ctx: &AssignmentContext, classwork: &Classwork, recipient: &User) -> OutboundEmail {
    let subject = format!(
        "[{}] Due soon: {}",
        ctx.course.code, classwork.title
    );
    let html_body = format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>You have not submitted <b>{}</b> ({}) in <b>{}</b> yet.</p>\
         <p>Deadline: <b>{}</b> &middot; Points: {}</p>\
         <p>Please submit before the deadline.</p>\
         {}\
         </body></html>",
        recipient.recipient_name(),
        classwork.title,
        classwork.kind.label(),
        ctx.course.title,
        format_deadline(classwork.deadline),
        classwork.points,
        footer(ctx),
    );

    OutboundEmail {
        to: recipient.email.clone(),
        subject,
        html_body,
    }
}

/// 课件发布通知
pub fn material_posted(
    ctx: &AssignmentContext,
    material: &Material,
    recipient: &User,
) -> OutboundEmail {
    let subject = format!("[{}] New material: {}", ctx.course.code, material.title);
    let description = material.description.as_deref().unwrap_or("");
    let html_body = format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>{} shared new material in <b>{}</b>: <b>{}</b></p>\
         <p>{}</p>\
         {}\
         </body></html>",
        recipient.recipient_name(),
        ctx.teacher.recipient_name(),
        ctx.course.title,
        material.title,
        description,
        footer(ctx),
    );

    OutboundEmail {
        to: recipient.email.clone(),
        subject,
        html_body,
    }
}

/// 公告通知
pub fn announcement_posted(
    ctx: &AssignmentContext,
    announcement: &Announcement,
    recipient: &User,
) -> OutboundEmail {
    let subject = format!(
        "[{}] Announcement: {}",
        ctx.course.code, announcement.title
    );
    let html_body = format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>New announcement in <b>{}</b>:</p>\
         <p><b>{}</b></p>\
         <p>{}</p>\
         {}\
         </body></html>",
        recipient.recipient_name(),
        ctx.course.title,
        announcement.title,
        announcement.body,
        footer(ctx),
    );

    OutboundEmail {
        to: recipient.email.clone(),
        subject,
        html_body,
    }
}

/// 教师分配通知
pub fn teacher_assigned(ctx: &AssignmentContext, recipient: &User) -> OutboundEmail {
    let subject = format!(
        "[{}] Your teacher for {} ({})",
        ctx.course.code, ctx.course.title, ctx.semester
    );
    let html_body = format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p><b>{}</b> has been assigned as your teacher for <b>{}</b>, Section {} ({}).</p>\
         {}\
         </body></html>",
        recipient.recipient_name(),
        ctx.teacher.recipient_name(),
        ctx.course.title,
        ctx.section.name,
        ctx.semester,
        footer(ctx),
    );

    OutboundEmail {
        to: recipient.email.clone(),
        subject,
        html_body,
    }
}
