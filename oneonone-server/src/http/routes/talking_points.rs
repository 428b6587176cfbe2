//! Talking point thread: comments and tag assignment
//!
//! One POST endpoint multiplexes three actions by form field:
//! `deleteComment=<id>`, `handleTag=<id>`, or `comment=<text>`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use chrono::Utc;
use oneonone_core::format_relative;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::{CommentWithUser, DbError, NewComment, Tag, TalkingPointDetail};
use crate::http::error::ApiError;
use crate::http::extractors::{path_id, MaybeUser};
use crate::http::forms::{comment_not_created, ThreadAction, ThreadForm};
use crate::http::server::AppState;

/// Comment with its author and a relative timestamp
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: CommentWithUser,
    pub posted: String,
}

/// Thread view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadView {
    pub talking_point: TalkingPointDetail,
    pub comments: Vec<CommentView>,
    pub available_tags: Vec<Tag>,
}

/// Load a talking point and check it belongs to the meeting in the path.
async fn talking_point_in_meeting(
    state: &AppState,
    meeting_id: Uuid,
    talking_point_id: Uuid,
) -> Result<TalkingPointDetail, ApiError> {
    let detail = state.store.get_talking_point(talking_point_id).await?;
    if detail.talking_point.meeting_id != meeting_id {
        return Err(ApiError::not_found("talking point", talking_point_id));
    }
    Ok(detail)
}

/// GET /meeting/{id}/talking-point/{tp_id}
async fn thread(
    State(state): State<Arc<AppState>>,
    Path((meeting_id, tp_id)): Path<(String, String)>,
) -> Result<Json<ThreadView>, ApiError> {
    let meeting_id = path_id("meeting", &meeting_id)?;
    let tp_id = path_id("talking point", &tp_id)?;

    let talking_point = talking_point_in_meeting(&state, meeting_id, tp_id).await?;
    let now = Utc::now();
    let comments = state
        .store
        .list_comments(tp_id)
        .await?
        .into_iter()
        .map(|c| CommentView {
            posted: format_relative(&c.comment.created_at, &now),
            comment: c,
        })
        .collect();
    let available_tags = state.store.list_tags().await?;

    Ok(Json(ThreadView {
        talking_point,
        comments,
        available_tags,
    }))
}

fn done(status: StatusCode) -> Response {
    (
        status,
        Json(json!({
            "errors": null,
            "status": status.as_u16(),
            "values": { "comment": null },
        })),
    )
        .into_response()
}

/// POST /meeting/{id}/talking-point/{tp_id}
async fn thread_action(
    State(state): State<Arc<AppState>>,
    MaybeUser(user_id): MaybeUser,
    Path((meeting_id, tp_id)): Path<(String, String)>,
    Form(form): Form<ThreadForm>,
) -> Result<Response, ApiError> {
    let meeting_id = path_id("meeting", &meeting_id)?;
    let values = form.values();
    let valid = match form.validate(user_id, &tp_id) {
        Ok(valid) => valid,
        Err(rejected) => return Ok(rejected.into_response()),
    };
    let tp_id = valid.talking_point_id;

    talking_point_in_meeting(&state, meeting_id, tp_id).await?;

    match valid.action {
        ThreadAction::DeleteComment(raw) => {
            let comment_id = path_id("comment", &raw)?;
            state.store.delete_comment(tp_id, comment_id).await?;
            tracing::info!(%comment_id, talking_point_id = %tp_id, "comment deleted");
            Ok(done(StatusCode::OK))
        }
        ThreadAction::ToggleTag(raw) => {
            let tag_id = path_id("tag", &raw)?;
            let outcome = state.store.toggle_tag(tp_id, tag_id).await?;
            tracing::info!(%tag_id, talking_point_id = %tp_id, ?outcome, "tag toggled");
            Ok(done(StatusCode::OK))
        }
        ThreadAction::Comment(content) => {
            let created = state
                .store
                .create_comment(NewComment {
                    content,
                    user_id: valid.user_id,
                    talking_point_id: tp_id,
                })
                .await;

            match created {
                Ok(comment) => {
                    tracing::info!(
                        comment_id = %comment.id,
                        talking_point_id = %tp_id,
                        "comment added"
                    );
                    Ok(done(StatusCode::CREATED))
                }
                Err(e @ DbError::NotFound { .. }) => Err(e.into()),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        talking_point_id = %tp_id,
                        "failed to create comment"
                    );
                    Ok(comment_not_created(values))
                }
            }
        }
    }
}

/// Talking point routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/meeting/{id}/talking-point/{tp_id}",
        get(thread).post(thread_action),
    )
}

#[cfg(test)]
mod tests {
    use crate::http::forms::{
        COMMENT_NOT_CREATED, COMMENT_REQUIRED, TALKING_POINT_UNAVAILABLE, USER_UNAVAILABLE,
    };
    use crate::http::routes::test_support::{app, app_with_failing_comments};
    use crate::store::Store;
    use axum::http::StatusCode;
    use uuid::Uuid;

    #[tokio::test]
    async fn add_comment_then_view_thread() {
        let app = app();
        let ada = app.user("Ada").await;
        let bob = app.user("Bob").await;
        let meeting = app.meeting(&ada, &bob, "2023-02-10").await;
        let tp = app.talking_point(&ada, &meeting, &[]).await;
        let uri = format!("/meeting/{}/talking-point/{}", meeting.id, tp.id);

        let res = app.post_form(&uri, Some(bob.id), "comment=Sounds%20good").await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert!(res.body["errors"].is_null());
        assert!(res.body["values"]["comment"].is_null());

        let res = app.get(&uri, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["talkingPoint"]["title"], "Career growth");
        assert_eq!(res.body["talkingPoint"]["user"]["firstName"], "Ada");
        let comments = res.body["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["content"], "Sounds good");
        assert_eq!(comments[0]["user"]["firstName"], "Bob");
        assert_eq!(comments[0]["posted"], "less than a minute ago");
    }

    #[tokio::test]
    async fn comment_field_errors_echo_values() {
        let app = app();
        let ada = app.user("Ada").await;
        let bob = app.user("Bob").await;
        let meeting = app.meeting(&ada, &bob, "2023-02-10").await;
        let tp = app.talking_point(&ada, &meeting, &[]).await;
        let uri = format!("/meeting/{}/talking-point/{}", meeting.id, tp.id);

        let res = app.post_form(&uri, Some(ada.id), "comment=").await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["errors"]["comment"], COMMENT_REQUIRED);
        assert_eq!(res.body["values"]["comment"], "");

        let res = app.post_form(&uri, None, "comment=hello").await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["errors"]["user"], USER_UNAVAILABLE);
        assert_eq!(res.body["values"]["comment"], "hello");

        let bad = format!("/meeting/{}/talking-point/nope", meeting.id);
        let res = app.post_form(&bad, Some(ada.id), "comment=hello").await;
        assert_eq!(res.body["errors"]["talkingPointId"], TALKING_POINT_UNAVAILABLE);
    }

    #[tokio::test]
    async fn delete_comment_keeps_siblings() {
        let app = app();
        let ada = app.user("Ada").await;
        let bob = app.user("Bob").await;
        let meeting = app.meeting(&ada, &bob, "2023-02-10").await;
        let tp = app.talking_point(&ada, &meeting, &[]).await;
        let uri = format!("/meeting/{}/talking-point/{}", meeting.id, tp.id);

        for text in ["one", "two", "three"] {
            app.post_form(&uri, Some(ada.id), &format!("comment={text}")).await;
        }
        let before = app.store.list_comments(tp.id).await.unwrap();
        let doomed = before[1].comment.id;

        let res = app
            .post_form(&uri, Some(ada.id), &format!("deleteComment={doomed}"))
            .await;
        assert_eq!(res.status, StatusCode::OK);

        let after: Vec<String> = app
            .store
            .list_comments(tp.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.comment.content)
            .collect();
        assert_eq!(after, vec!["one", "three"]);

        // Already gone
        let res = app
            .post_form(&uri, Some(ada.id), &format!("deleteComment={doomed}"))
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handle_tag_toggles() {
        let app = app();
        let ada = app.user("Ada").await;
        let bob = app.user("Bob").await;
        let meeting = app.meeting(&ada, &bob, "2023-02-10").await;
        let tp = app.talking_point(&ada, &meeting, &[]).await;
        let career = app.tag("career").await;
        let uri = format!("/meeting/{}/talking-point/{}", meeting.id, tp.id);
        let body = format!("handleTag={}", career.id);

        let res = app.post_form(&uri, Some(ada.id), &body).await;
        assert_eq!(res.status, StatusCode::OK);
        let tags = app.store.get_talking_point(tp.id).await.unwrap().tags;
        assert_eq!(tags, vec![career.clone()]);

        app.post_form(&uri, Some(ada.id), &body).await;
        assert!(app.store.get_talking_point(tp.id).await.unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn talking_point_from_other_meeting_is_404() {
        let app = app();
        let ada = app.user("Ada").await;
        let bob = app.user("Bob").await;
        let first = app.meeting(&ada, &bob, "2023-02-10").await;
        let second = app.meeting(&ada, &bob, "2023-02-11").await;
        let tp = app.talking_point(&ada, &first, &[]).await;

        let uri = format!("/meeting/{}/talking-point/{}", second.id, tp.id);
        assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);

        let uri = format!("/meeting/{}/talking-point/{}", first.id, Uuid::new_v4());
        let res = app.post_form(&uri, Some(ada.id), "comment=hello").await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn storage_failure_returns_server_error_payload() {
        let app = app_with_failing_comments();
        let ada = app.user("Ada").await;
        let bob = app.user("Bob").await;
        let meeting = app.meeting(&ada, &bob, "2023-02-10").await;
        let tp = app.talking_point(&ada, &meeting, &[]).await;
        let uri = format!("/meeting/{}/talking-point/{}", meeting.id, tp.id);

        let res = app.post_form(&uri, Some(bob.id), "comment=Sounds%20good").await;

        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body["status"], 500);
        assert_eq!(res.body["errors"]["server"], COMMENT_NOT_CREATED);
        assert!(res.body["errors"]["comment"].is_null());
        assert!(res.body["errors"]["user"].is_null());
        assert!(res.body["errors"]["talkingPointId"].is_null());
        assert_eq!(res.body["values"]["comment"], "Sounds good");
        assert!(app.store.list_comments(tp.id).await.unwrap().is_empty());
    }
}
