//! Organisation and tag administration (JSON API)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::{NewOrganisation, NewTag, Organisation, Tag};
use crate::http::error::ApiError;
use crate::http::extractors::{path_id, RequireUser};
use crate::http::server::AppState;
use crate::models::{DisplayName, Email, HexColor};

/// Create organisation request
#[derive(Deserialize)]
pub struct CreateOrganisationRequest {
    pub name: String,
    pub email: String,
}

/// Create tag request
#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

/// POST /api/organisations
async fn create_organisation(
    State(state): State<Arc<AppState>>,
    RequireUser(_): RequireUser,
    Json(req): Json<CreateOrganisationRequest>,
) -> Result<(StatusCode, Json<Organisation>), ApiError> {
    let name = DisplayName::new("name", &req.name)?;
    let email = Email::new(&req.email)?;

    let org = state
        .store
        .create_organisation(NewOrganisation { name, email })
        .await?;
    tracing::info!(organisation_id = %org.id, "organisation created");

    Ok((StatusCode::CREATED, Json(org)))
}

/// GET /api/organisations/{id}
async fn get_organisation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Organisation>, ApiError> {
    let org = state
        .store
        .get_organisation(path_id("organisation", &id)?)
        .await?;
    Ok(Json(org))
}

/// POST /api/organisations/{id}/tags
async fn create_tag(
    State(state): State<Arc<AppState>>,
    RequireUser(_): RequireUser,
    Path(id): Path<String>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let organisation_id = path_id("organisation", &id)?;
    let name = DisplayName::new("name", &req.name)?;
    let color = HexColor::new(&req.color)?;

    let tag = state
        .store
        .create_tag(NewTag {
            name,
            color,
            organisation_id,
        })
        .await?;
    tracing::info!(tag_id = %tag.id, %organisation_id, name = %tag.name, "tag created");

    Ok((StatusCode::CREATED, Json(tag)))
}

/// GET /api/tags
async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.store.list_tags().await?))
}

/// Organisation and tag routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/organisations", post(create_organisation))
        .route("/api/organisations/{id}", get(get_organisation))
        .route("/api/organisations/{id}/tags", post(create_tag))
        .route("/api/tags", get(list_tags))
}

#[cfg(test)]
mod tests {
    use crate::http::routes::test_support::app;
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn create_organisation_and_tags() {
        let app = app();
        let ada = app.user("Ada").await;

        let res = app
            .post_json(
                "/api/organisations",
                Some(ada.id),
                json!({ "name": "Acme", "email": "People@Acme.test" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["email"], "people@acme.test");
        let org_id = res.body["id"].as_str().unwrap().to_string();

        let res = app.get(&format!("/api/organisations/{org_id}"), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["name"], "Acme");

        let uri = format!("/api/organisations/{org_id}/tags");
        for name in ["workload", "progression"] {
            let res = app
                .post_json(&uri, Some(ada.id), json!({ "name": name, "color": "#F59E0B" }))
                .await;
            assert_eq!(res.status, StatusCode::CREATED);
            assert_eq!(res.body["color"], "#f59e0b");
        }

        let res = app.get("/api/tags", None).await;
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["progression", "workload"]);
    }

    #[tokio::test]
    async fn duplicate_tag_name_is_409() {
        let app = app();
        let ada = app.user("Ada").await;
        let existing = app.tag("team").await;

        let res = app
            .post_json(
                &format!("/api/organisations/{}/tags", existing.organisation_id),
                Some(ada.id),
                json!({ "name": "team", "color": "#000000" }),
            )
            .await;

        assert_eq!(res.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn tag_for_unknown_organisation_is_404() {
        let app = app();
        let ada = app.user("Ada").await;

        let res = app
            .post_json(
                &format!("/api/organisations/{}/tags", Uuid::new_v4()),
                Some(ada.id),
                json!({ "name": "team", "color": "#000000" }),
            )
            .await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_color_is_400() {
        let app = app();
        let ada = app.user("Ada").await;
        let existing = app.tag("team").await;

        let res = app
            .post_json(
                &format!("/api/organisations/{}/tags", existing.organisation_id),
                Some(ada.id),
                json!({ "name": "pride", "color": "purple" }),
            )
            .await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "validation_error");
    }

    #[tokio::test]
    async fn writes_require_user() {
        let app = app();
        let res = app
            .post_json(
                "/api/organisations",
                None,
                json!({ "name": "Acme", "email": "a@acme.test" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }
}
