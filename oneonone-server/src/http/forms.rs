//! Form inputs and their field errors
//!
//! Each form deserializes into a struct of optional strings and validates
//! into either a typed input or a fixed-shape error object with exactly
//! one non-null field. Checks run in a fixed order and stop at the first
//! failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::{
    CommentContent, DisplayName, Email, MeetingDate, Password, Title, ValidationError,
};

pub const EMAIL_INVALID: &str = "Email is invalid";
pub const EMAIL_TAKEN: &str = "A user already exists with this email";
pub const FIRST_NAME_REQUIRED: &str = "First name is required";
pub const LAST_NAME_REQUIRED: &str = "Last name is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password is too short";
pub const PASSWORD_TOO_LONG: &str = "Password is too long";

pub const TITLE_REQUIRED: &str = "Title is required";
pub const DATE_REQUIRED: &str = "Date is required";
pub const DATE_INVALID: &str = "Date is invalid";
pub const INVITEE_REQUIRED: &str = "Invitee is required";
pub const INVITEE_INVALID: &str = "Invitee is invalid";
pub const INVITEE_NOT_FOUND: &str = "Invitee not found";

pub const TALKING_POINT_REQUIRED: &str = "You need to add a talking point";
pub const USER_ID_INVALID: &str = "User ID invalid";
pub const MEETING_ID_INVALID: &str = "Meeting ID invalid";
pub const TAGS_INVALID: &str = "Tags are invalid";

pub const COMMENT_REQUIRED: &str = "Add comment";
pub const USER_UNAVAILABLE: &str = "Unable to fetch user, please ensure you're logged in";
pub const TALKING_POINT_UNAVAILABLE: &str = "Unable to fetch talking point, please try again";
pub const COMMENT_NOT_CREATED: &str = "Sorry, we couldn't create the comment";

type Message = Option<&'static str>;

/// 400 response carrying field errors and, for some forms, echoed values
#[derive(Debug)]
pub struct FormErrors<E> {
    pub errors: E,
    pub values: Option<serde_json::Value>,
}

impl<E> FormErrors<E> {
    pub fn new(errors: E) -> Self {
        Self {
            errors,
            values: None,
        }
    }
}

impl<E: Serialize> IntoResponse for FormErrors<E> {
    fn into_response(self) -> Response {
        tracing::warn!(errors = %json!(&self.errors), "form rejected");

        let body = match self.values {
            Some(values) => json!({ "errors": self.errors, "values": values }),
            None => json!({ "errors": self.errors }),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// POST /join form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinErrors {
    pub email: Message,
    pub password: Message,
    pub first_name: Message,
    pub last_name: Message,
}

impl JoinErrors {
    pub fn email(msg: &'static str) -> Self {
        Self {
            email: Some(msg),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct ValidJoin {
    pub email: Email,
    pub password: Password,
    pub first_name: DisplayName,
    pub last_name: DisplayName,
    pub redirect_to: String,
}

impl JoinForm {
    pub fn validate(self) -> Result<ValidJoin, JoinErrors> {
        let email = self
            .email
            .as_deref()
            .and_then(|e| Email::new(e).ok())
            .ok_or_else(|| JoinErrors::email(EMAIL_INVALID))?;

        let first_name = self
            .first_name
            .as_deref()
            .and_then(|n| DisplayName::new("firstName", n).ok())
            .ok_or_else(|| JoinErrors {
                first_name: Some(FIRST_NAME_REQUIRED),
                ..JoinErrors::default()
            })?;

        let last_name = self
            .last_name
            .as_deref()
            .and_then(|n| DisplayName::new("lastName", n).ok())
            .ok_or_else(|| JoinErrors {
                last_name: Some(LAST_NAME_REQUIRED),
                ..JoinErrors::default()
            })?;

        let password = Password::new(self.password.as_deref().unwrap_or_default()).map_err(|e| {
            let msg = match e {
                ValidationError::TooShort { .. } => PASSWORD_TOO_SHORT,
                ValidationError::TooLong { .. } => PASSWORD_TOO_LONG,
                _ => PASSWORD_REQUIRED,
            };
            JoinErrors {
                password: Some(msg),
                ..JoinErrors::default()
            }
        })?;

        Ok(ValidJoin {
            email,
            password,
            first_name,
            last_name,
            redirect_to: safe_redirect(self.redirect_to.as_deref(), "/"),
        })
    }
}

/// Only same-site absolute paths are followed.
pub fn safe_redirect(to: Option<&str>, default: &str) -> String {
    match to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => default.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// New meeting
// ---------------------------------------------------------------------------

/// POST /meeting/new form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingForm {
    pub title: Option<String>,
    pub date: Option<String>,
    pub invitee_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingErrors {
    pub title: Message,
    pub date: Message,
    pub invitee_id: Message,
}

impl MeetingErrors {
    pub fn invitee(msg: &'static str) -> Self {
        Self {
            invitee_id: Some(msg),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct ValidMeeting {
    pub title: Title,
    pub date: MeetingDate,
    pub invitee_id: Uuid,
}

impl MeetingForm {
    /// Dates without an offset are read in `tz`.
    pub fn validate(self, tz: &Tz) -> Result<ValidMeeting, MeetingErrors> {
        let title = Title::new(self.title.as_deref().unwrap_or_default()).map_err(|_| {
            MeetingErrors {
                title: Some(TITLE_REQUIRED),
                ..MeetingErrors::default()
            }
        })?;

        let date = MeetingDate::parse(self.date.as_deref().unwrap_or_default(), tz).map_err(|e| {
            let msg = match e {
                ValidationError::Empty { .. } => DATE_REQUIRED,
                _ => DATE_INVALID,
            };
            MeetingErrors {
                date: Some(msg),
                ..MeetingErrors::default()
            }
        })?;

        let raw = non_empty(&self.invitee_id)
            .map(str::trim)
            .ok_or_else(|| MeetingErrors::invitee(INVITEE_REQUIRED))?;
        let invitee_id =
            Uuid::parse_str(raw).map_err(|_| MeetingErrors::invitee(INVITEE_INVALID))?;

        Ok(ValidMeeting {
            title,
            date,
            invitee_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Add talking point
// ---------------------------------------------------------------------------

/// POST /meeting/{id}/edit form; `tags` is a comma separated id list
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkingPointForm {
    pub talking_point: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkingPointErrors {
    pub talking_point: Message,
    pub user_id: Message,
    pub meeting_id: Message,
    pub tags: Message,
}

impl TalkingPointErrors {
    pub fn tags() -> Self {
        Self {
            tags: Some(TAGS_INVALID),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct ValidTalkingPoint {
    pub title: Title,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub tag_ids: Vec<Uuid>,
}

impl TalkingPointForm {
    pub fn validate(
        self,
        user_id: Option<Uuid>,
        meeting_id: &str,
    ) -> Result<ValidTalkingPoint, TalkingPointErrors> {
        let user_id = user_id.ok_or_else(|| TalkingPointErrors {
            user_id: Some(USER_ID_INVALID),
            ..TalkingPointErrors::default()
        })?;

        let meeting_id = Uuid::parse_str(meeting_id).map_err(|_| TalkingPointErrors {
            meeting_id: Some(MEETING_ID_INVALID),
            ..TalkingPointErrors::default()
        })?;

        let title = Title::new(self.talking_point.as_deref().unwrap_or_default()).map_err(|_| {
            TalkingPointErrors {
                talking_point: Some(TALKING_POINT_REQUIRED),
                ..TalkingPointErrors::default()
            }
        })?;

        let tag_ids = parse_tag_ids(self.tags.as_deref().unwrap_or_default())
            .ok_or_else(TalkingPointErrors::tags)?;

        Ok(ValidTalkingPoint {
            title,
            user_id,
            meeting_id,
            tag_ids,
        })
    }
}

/// Parse `a,b,c` into ids, skipping blanks and duplicates. `None` if any
/// entry is not a UUID.
fn parse_tag_ids(raw: &str) -> Option<Vec<Uuid>> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = Uuid::parse_str(part).ok()?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Some(ids)
}

// ---------------------------------------------------------------------------
// Talking point thread
// ---------------------------------------------------------------------------

/// POST /meeting/{id}/talking-point/{tpId} form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadForm {
    pub delete_comment: Option<String>,
    pub handle_tag: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentErrors {
    pub comment: Message,
    pub user: Message,
    pub talking_point_id: Message,
}

/// What a thread submission asks for
#[derive(Debug)]
pub enum ThreadAction {
    DeleteComment(String),
    ToggleTag(String),
    Comment(CommentContent),
}

/// Validated thread submission
#[derive(Debug)]
pub struct ValidThread {
    pub user_id: Uuid,
    pub talking_point_id: Uuid,
    pub action: ThreadAction,
}

impl ThreadForm {
    /// Echoed back with comment errors so the client can refill the box.
    pub fn values(&self) -> serde_json::Value {
        json!({ "comment": self.comment })
    }

    pub fn validate(
        self,
        user_id: Option<Uuid>,
        talking_point_id: &str,
    ) -> Result<ValidThread, FormErrors<CommentErrors>> {
        let values = self.values();
        let reject = |errors: CommentErrors| FormErrors {
            errors,
            values: Some(values.clone()),
        };

        let action = if let Some(id) = non_empty(&self.delete_comment) {
            ThreadAction::DeleteComment(id.to_owned())
        } else if let Some(id) = non_empty(&self.handle_tag) {
            ThreadAction::ToggleTag(id.to_owned())
        } else {
            let content = CommentContent::new(self.comment.as_deref().unwrap_or_default())
                .map_err(|_| {
                    reject(CommentErrors {
                        comment: Some(COMMENT_REQUIRED),
                        ..CommentErrors::default()
                    })
                })?;
            ThreadAction::Comment(content)
        };

        let user_id = user_id.ok_or_else(|| {
            reject(CommentErrors {
                user: Some(USER_UNAVAILABLE),
                ..CommentErrors::default()
            })
        })?;

        let talking_point_id = Uuid::parse_str(talking_point_id).map_err(|_| {
            reject(CommentErrors {
                talking_point_id: Some(TALKING_POINT_UNAVAILABLE),
                ..CommentErrors::default()
            })
        })?;

        Ok(ValidThread {
            user_id,
            talking_point_id,
            action,
        })
    }
}

/// 500 payload when a comment could not be stored
pub fn comment_not_created(values: serde_json::Value) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "errors": {
                "server": COMMENT_NOT_CREATED,
                "comment": null,
                "user": null,
                "talkingPointId": null,
            },
            "values": values,
            "status": 500,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(email: &str, password: &str, first: &str, last: &str) -> JoinForm {
        JoinForm {
            email: Some(email.into()),
            password: Some(password.into()),
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            redirect_to: None,
        }
    }

    fn non_null(errors: &impl Serialize) -> Vec<String> {
        let value = serde_json::to_value(errors).unwrap();
        value
            .as_object()
            .unwrap()
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k.clone())
            .collect()
    }

    #[test]
    fn valid_join() {
        let valid = join("Ada@Example.com", "correct horse", "Ada", "Lovelace")
            .validate()
            .unwrap();
        assert_eq!(valid.email.as_str(), "ada@example.com");
        assert_eq!(valid.redirect_to, "/");
    }

    #[test]
    fn join_reports_exactly_one_field() {
        let cases = [
            (join("nope", "", "", ""), "email", EMAIL_INVALID),
            (join("a@b.co", "", "", ""), "firstName", FIRST_NAME_REQUIRED),
            (join("a@b.co", "", "Ada", ""), "lastName", LAST_NAME_REQUIRED),
            (join("a@b.co", "", "Ada", "L"), "password", PASSWORD_REQUIRED),
            (join("a@b.co", "short", "Ada", "L"), "password", PASSWORD_TOO_SHORT),
            (join("a@b.co", &"p".repeat(257), "Ada", "L"), "password", PASSWORD_TOO_LONG),
        ];

        for (form, field, message) in cases {
            let errors = form.validate().unwrap_err();
            assert_eq!(non_null(&errors), vec![field.to_string()]);
            let value = serde_json::to_value(&errors).unwrap();
            assert_eq!(value[field], message);
        }
    }

    #[test]
    fn short_password_rejected_with_other_fields_valid() {
        let errors = join("a@b.co", "1234567", "Ada", "Lovelace")
            .validate()
            .unwrap_err();
        assert_eq!(errors.password, Some(PASSWORD_TOO_SHORT));
    }

    #[test]
    fn missing_join_fields_are_errors_not_panics() {
        let errors = JoinForm::default().validate().unwrap_err();
        assert_eq!(errors, JoinErrors::email(EMAIL_INVALID));
    }

    #[test]
    fn safe_redirect_rejects_other_hosts() {
        assert_eq!(safe_redirect(Some("/dashboard"), "/"), "/dashboard");
        assert_eq!(safe_redirect(Some("//evil.test"), "/"), "/");
        assert_eq!(safe_redirect(Some("https://evil.test"), "/"), "/");
        assert_eq!(safe_redirect(None, "/"), "/");
    }

    #[test]
    fn meeting_checks_in_order() {
        let tz = chrono_tz::UTC;
        let invitee = Uuid::new_v4().to_string();

        let form = |title: &str, date: &str, invitee: &str| MeetingForm {
            title: Some(title.into()),
            date: Some(date.into()),
            invitee_id: Some(invitee.into()),
        };

        assert_eq!(
            form("", "", "").validate(&tz).unwrap_err().title,
            Some(TITLE_REQUIRED)
        );
        assert_eq!(
            form("Weekly", "", "").validate(&tz).unwrap_err().date,
            Some(DATE_REQUIRED)
        );
        assert_eq!(
            form("Weekly", "next tuesday", "").validate(&tz).unwrap_err().date,
            Some(DATE_INVALID)
        );
        assert_eq!(
            form("Weekly", "2023-02-10T09:00", "").validate(&tz).unwrap_err(),
            MeetingErrors::invitee(INVITEE_REQUIRED)
        );
        assert_eq!(
            form("Weekly", "2023-02-10T09:00", "bob").validate(&tz).unwrap_err(),
            MeetingErrors::invitee(INVITEE_INVALID)
        );
        assert!(form("Weekly", "2023-02-10T09:00", &invitee).validate(&tz).is_ok());
    }

    #[test]
    fn talking_point_checks_user_then_meeting_then_title() {
        let meeting = Uuid::new_v4().to_string();
        let user = Some(Uuid::new_v4());
        let form = |tp: &str, tags: &str| TalkingPointForm {
            talking_point: Some(tp.into()),
            tags: Some(tags.into()),
        };

        assert_eq!(
            form("", "").validate(None, "x").unwrap_err().user_id,
            Some(USER_ID_INVALID)
        );
        assert_eq!(
            form("", "").validate(user, "x").unwrap_err().meeting_id,
            Some(MEETING_ID_INVALID)
        );
        assert_eq!(
            form("", "").validate(user, &meeting).unwrap_err().talking_point,
            Some(TALKING_POINT_REQUIRED)
        );
        assert_eq!(
            form("Career", "abc").validate(user, &meeting).unwrap_err(),
            TalkingPointErrors::tags()
        );
    }

    #[test]
    fn tag_ids_are_split_and_deduplicated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{a}, {b},,{a}");
        assert_eq!(parse_tag_ids(&raw), Some(vec![a, b]));
        assert_eq!(parse_tag_ids(""), Some(vec![]));
    }

    #[test]
    fn empty_comment_echoes_values() {
        let form = ThreadForm {
            comment: Some(String::new()),
            ..ThreadForm::default()
        };
        let rejected = form
            .validate(Some(Uuid::new_v4()), &Uuid::new_v4().to_string())
            .unwrap_err();
        assert_eq!(rejected.errors.comment, Some(COMMENT_REQUIRED));
        assert_eq!(rejected.values, Some(json!({ "comment": "" })));
    }

    #[test]
    fn comment_needs_user_before_talking_point() {
        let form = ThreadForm {
            comment: Some("hello".into()),
            ..ThreadForm::default()
        };
        let rejected = form.validate(None, "bad").unwrap_err();
        assert_eq!(rejected.errors.user, Some(USER_UNAVAILABLE));
        assert!(rejected.errors.talking_point_id.is_none());
    }

    #[test]
    fn delete_takes_precedence() {
        let form = ThreadForm {
            delete_comment: Some("c1".into()),
            handle_tag: Some("t1".into()),
            comment: None,
        };
        let valid = form
            .validate(Some(Uuid::new_v4()), &Uuid::new_v4().to_string())
            .unwrap();
        assert!(matches!(valid.action, ThreadAction::DeleteComment(ref id) if id == "c1"));
    }

    #[test]
    fn long_values_are_only_checked_for_presence() {
        let first = "A".repeat(65);
        let valid = join("ada@example.com", "correct horse", &first, &"L".repeat(300))
            .validate()
            .unwrap();
        assert_eq!(valid.first_name.as_str(), first);

        let title = "T".repeat(257);
        let meeting = MeetingForm {
            title: Some(title.clone()),
            date: Some("2023-02-10".into()),
            invitee_id: Some(Uuid::new_v4().to_string()),
        }
        .validate(&chrono_tz::UTC)
        .unwrap();
        assert_eq!(meeting.title.as_str(), title);

        let tp = TalkingPointForm {
            talking_point: Some(title.clone()),
            tags: None,
        }
        .validate(Some(Uuid::new_v4()), &Uuid::new_v4().to_string())
        .unwrap();
        assert_eq!(tp.title.as_str(), title);

        let comment = "c".repeat(70_000);
        let thread = ThreadForm {
            comment: Some(comment.clone()),
            ..ThreadForm::default()
        }
        .validate(Some(Uuid::new_v4()), &Uuid::new_v4().to_string())
        .unwrap();
        assert!(matches!(thread.action, ThreadAction::Comment(ref c) if c.as_str() == comment));
    }
}
