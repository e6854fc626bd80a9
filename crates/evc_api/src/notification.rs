use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use evc_core::Notification;
use evc_core::time::RelativeTime;
use evc_engine::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    #[serde(flatten)]
    pub notification: Notification,
    /// "5 мин назад" and the like
    pub received: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationEntry>,
    pub unread_count: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub unread_count: usize,
}

pub async fn list_notifications(State(engine): State<Arc<Engine>>) -> Json<NotificationsResponse> {
    let now = Utc::now();
    let (notifications, unread_count) = engine.notifications();
    let notifications = notifications
        .into_iter()
        .map(|notification| NotificationEntry {
            received: RelativeTime::between(notification.timestamp, now).to_string(),
            notification,
        })
        .collect();
    Json(NotificationsResponse {
        notifications,
        unread_count,
    })
}

pub async fn mark_read(
    State(engine): State<Arc<Engine>>,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<UnreadResponse>> {
    let unread_count = engine.mark_notification_read(&notification_id)?;
    Ok(Json(UnreadResponse { unread_count }))
}

pub async fn mark_all_read(State(engine): State<Arc<Engine>>) -> ApiResult<StatusCode> {
    engine.mark_all_notifications_read()?;
    Ok(StatusCode::NO_CONTENT)
}
