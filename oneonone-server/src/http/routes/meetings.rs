//! Meeting endpoints
//!
//! - Overview table of upcoming or past meetings
//! - Creation form and its invitee candidates
//! - Detail view with talking points
//! - Add-talking-point form

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use chrono::{DateTime, Utc};
use oneonone_core::{format_relative, is_upcoming};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{DbError, Meeting, NewMeeting, NewTalkingPoint, Tag, TalkingPointSummary, User};
use crate::http::error::ApiError;
use crate::http::extractors::{path_id, MaybeUser, RequireUser};
use crate::http::forms::{
    FormErrors, MeetingErrors, MeetingForm, TalkingPointErrors, TalkingPointForm,
    INVITEE_NOT_FOUND, USER_ID_INVALID,
};
use crate::http::server::AppState;

/// Which side of now the overview lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum When {
    #[default]
    Upcoming,
    Past,
}

#[derive(Debug, Default, Deserialize)]
pub struct OverviewParams {
    #[serde(default)]
    pub when: When,
}

/// One row of the overview table
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewRow {
    pub id: Uuid,
    pub title: String,
    pub attendee: String,
    pub date: DateTime<Utc>,
    pub talking_point_count: i64,
    pub relative: String,
}

/// Meeting detail view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingView {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub attendee: User,
    pub talking_point_info: Vec<TalkingPointSummary>,
}

/// GET /meeting?when=upcoming|past
async fn overview(
    State(state): State<Arc<AppState>>,
    RequireUser(user_id): RequireUser,
    Query(params): Query<OverviewParams>,
) -> Result<Json<Vec<OverviewRow>>, ApiError> {
    let now = Utc::now();
    let meetings = state.store.list_meetings_for_author(user_id).await?;

    let mut rows: Vec<OverviewRow> = meetings
        .into_iter()
        .filter(|m| is_upcoming(&m.meeting.date, &now) == (params.when == When::Upcoming))
        .map(|m| OverviewRow {
            relative: format_relative(&m.meeting.date, &now),
            id: m.meeting.id,
            title: m.meeting.title,
            attendee: m.invitee.full_name(),
            date: m.meeting.date,
            talking_point_count: m.talking_point_count,
        })
        .collect();

    // Most recent first when looking back
    if params.when == When::Past {
        rows.reverse();
    }

    Ok(Json(rows))
}

/// GET /meeting/new - people who can be invited
async fn new_meeting_form(
    State(state): State<Arc<AppState>>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let author = state.store.get_user(user_id).await?;
    let invitees: Vec<User> = state
        .store
        .list_users(author.organisation_id)
        .await?
        .into_iter()
        .filter(|u| u.id != author.id)
        .collect();

    Ok(Json(serde_json::json!({ "invitees": invitees })))
}

/// POST /meeting/new
async fn create_meeting(
    State(state): State<Arc<AppState>>,
    RequireUser(user_id): RequireUser,
    Form(form): Form<MeetingForm>,
) -> Result<Response, ApiError> {
    let valid = match form.validate(&state.timezone) {
        Ok(valid) => valid,
        Err(errors) => return Ok(FormErrors::new(errors).into_response()),
    };

    let created = state
        .store
        .create_meeting(NewMeeting {
            title: valid.title,
            date: valid.date,
            author_id: user_id,
            invitee_id: valid.invitee_id,
        })
        .await;

    match created {
        Ok(meeting) => {
            tracing::info!(meeting_id = %meeting.id, author_id = %user_id, "meeting created");
            Ok(Redirect::to(&format!("/meeting/{}", meeting.id)).into_response())
        }
        Err(DbError::NotFound {
            resource: "invitee", ..
        }) => Ok(FormErrors::new(MeetingErrors::invitee(INVITEE_NOT_FOUND)).into_response()),
        Err(e) => Err(e.into()),
    }
}

/// GET /meeting/{id}
async fn meeting_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MeetingView>, ApiError> {
    let meeting = state.store.get_meeting(path_id("meeting", &id)?).await?;
    let attendee = state.store.get_user(meeting.invitee_id).await?;
    let talking_point_info = state.store.list_talking_points(meeting.id).await?;

    Ok(Json(MeetingView {
        id: meeting.id,
        title: meeting.title,
        date: meeting.date,
        attendee,
        talking_point_info,
    }))
}

/// Add-talking-point form data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditView {
    pub meeting: Meeting,
    pub available_tags: Vec<Tag>,
}

/// GET /meeting/{id}/edit
async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EditView>, ApiError> {
    let meeting = state.store.get_meeting(path_id("meeting", &id)?).await?;
    let available_tags = state.store.list_tags().await?;

    Ok(Json(EditView {
        meeting,
        available_tags,
    }))
}

/// POST /meeting/{id}/edit - add a talking point with its tags
async fn add_talking_point(
    State(state): State<Arc<AppState>>,
    MaybeUser(user_id): MaybeUser,
    Path(id): Path<String>,
    Form(form): Form<TalkingPointForm>,
) -> Result<Response, ApiError> {
    let valid = match form.validate(user_id, &id) {
        Ok(valid) => valid,
        Err(errors) => return Ok(FormErrors::new(errors).into_response()),
    };
    let meeting_id = valid.meeting_id;

    let created = state
        .store
        .create_talking_point(NewTalkingPoint {
            title: valid.title,
            user_id: valid.user_id,
            meeting_id,
            tag_ids: valid.tag_ids,
        })
        .await;

    match created {
        Ok(tp) => {
            tracing::info!(
                talking_point_id = %tp.id,
                %meeting_id,
                tags = tp.tags.len(),
                "talking point added"
            );
            Ok(Redirect::to(&format!("/meeting/{meeting_id}")).into_response())
        }
        Err(DbError::NotFound { resource: "tag", .. }) => {
            Ok(FormErrors::new(TalkingPointErrors::tags()).into_response())
        }
        Err(DbError::NotFound { resource: "user", .. }) => Ok(FormErrors::new(TalkingPointErrors {
            user_id: Some(USER_ID_INVALID),
            ..TalkingPointErrors::default()
        })
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Meeting routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meeting", get(overview))
        .route("/meeting/new", get(new_meeting_form).post(create_meeting))
        .route("/meeting/{id}", get(meeting_detail))
        .route("/meeting/{id}/edit", get(edit_form).post(add_talking_point))
}
