//! Registration endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::{Form, Router};

use crate::db::{DbError, NewUser};
use crate::http::error::ApiError;
use crate::http::forms::{FormErrors, JoinErrors, JoinForm, EMAIL_TAKEN};
use crate::http::server::AppState;
use crate::models::{HexColor, Role};

/// POST /join - register a user, then follow `redirectTo`
async fn join(
    State(state): State<Arc<AppState>>,
    Form(form): Form<JoinForm>,
) -> Result<Response, ApiError> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return Ok(FormErrors::new(errors).into_response()),
    };

    if state.store.find_user_by_email(&valid.email).await?.is_some() {
        return Ok(FormErrors::new(JoinErrors::email(EMAIL_TAKEN)).into_response());
    }

    // argon2 is CPU bound, run it on the blocking pool
    let password = valid.password;
    let password_hash = tokio::task::spawn_blocking(move || password.hash())
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("hashing task failed: {e}"),
        })?
        .map_err(|e| ApiError::Internal {
            message: format!("password hashing failed: {e}"),
        })?;

    let color = HexColor::for_user(valid.email.as_str());
    let created = state
        .store
        .create_user(NewUser {
            email: valid.email,
            first_name: valid.first_name,
            last_name: valid.last_name,
            password_hash,
            color,
            role: Role::default(),
            organisation_id: None,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Ok(Redirect::to(&valid.redirect_to).into_response())
        }
        // Lost a race with another registration for the same address
        Err(DbError::Conflict { .. }) => {
            Ok(FormErrors::new(JoinErrors::email(EMAIL_TAKEN)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Registration routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/join", post(join))
}
