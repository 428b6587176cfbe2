//! Dashboard: meetings grouped by day plus topic insights

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use oneonone_core::{
    frequent_topics, group_meetings_by_day, topic_frequency, MeetingGroup, MeetingSummary,
    TopicChart, TopicInsight, DEFAULT_CHART_MONTHS, DEFAULT_WINDOW_DAYS,
};
use serde::Serialize;

use crate::db::User;
use crate::http::error::ApiError;
use crate::http::extractors::RequireUser;
use crate::http::server::AppState;

/// Dashboard view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub user: User,
    pub meeting_groups: Vec<MeetingGroup>,
    pub frequent_topics: Vec<TopicInsight>,
    pub topic_frequency: TopicChart,
}

/// GET /dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<DashboardView>, ApiError> {
    let user = state.store.get_user(user_id).await?;

    let meetings = state.store.list_meetings_for_author(user.id).await?;
    let summaries = meetings.into_iter().map(|m| MeetingSummary {
        id: m.meeting.id,
        title: m.meeting.title,
        date: m.meeting.date,
        discussion_point_count: m.talking_point_count,
    });
    let meeting_groups = group_meetings_by_day(summaries, &state.timezone);

    let mentions = state.store.tag_mentions(user.id).await?;
    let now = Utc::now();

    Ok(Json(DashboardView {
        user,
        meeting_groups,
        frequent_topics: frequent_topics(&mentions, &now, Duration::days(DEFAULT_WINDOW_DAYS)),
        topic_frequency: topic_frequency(&mentions, &now, DEFAULT_CHART_MONTHS),
    }))
}

/// Dashboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}
