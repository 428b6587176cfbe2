//! Persistence gateway
//!
//! Handlers talk to an injected `Arc<dyn Store>`:
//! - `PgStore` delegates to the sqlx repositories
//! - `MemoryStore` keeps tables in process (tests, `serve --in-memory`)

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use oneonone_core::TagMention;
use uuid::Uuid;

use crate::db::{
    Comment, CommentWithUser, DbError, Meeting, MeetingWithInvitee, NewComment, NewMeeting,
    NewOrganisation, NewTag, NewTalkingPoint, NewUser, Organisation, Tag, TagToggle,
    TalkingPointDetail, TalkingPointSummary, User,
};
use crate::models::Email;

/// Reads and writes for every entity the handlers touch.
///
/// Writes spanning more than one table are all-or-nothing.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_organisation(&self, new: NewOrganisation) -> Result<Organisation, DbError>;
    async fn get_organisation(&self, id: Uuid) -> Result<Organisation, DbError>;

    /// Create the user and its password row.
    async fn create_user(&self, new: NewUser) -> Result<User, DbError>;
    async fn get_user(&self, id: Uuid) -> Result<User, DbError>;
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, DbError>;
    async fn list_users(&self, organisation_id: Option<Uuid>) -> Result<Vec<User>, DbError>;

    async fn create_meeting(&self, new: NewMeeting) -> Result<Meeting, DbError>;
    async fn get_meeting(&self, id: Uuid) -> Result<Meeting, DbError>;
    /// Meetings authored by the user, earliest date first.
    async fn list_meetings_for_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<MeetingWithInvitee>, DbError>;

    /// Create the talking point and link its tags.
    async fn create_talking_point(
        &self,
        new: NewTalkingPoint,
    ) -> Result<TalkingPointSummary, DbError>;
    async fn get_talking_point(&self, id: Uuid) -> Result<TalkingPointDetail, DbError>;
    /// Talking points of a meeting, oldest first.
    async fn list_talking_points(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<TalkingPointSummary>, DbError>;
    async fn toggle_tag(&self, talking_point_id: Uuid, tag_id: Uuid)
        -> Result<TagToggle, DbError>;

    async fn create_comment(&self, new: NewComment) -> Result<Comment, DbError>;
    /// Comments with authors, oldest first.
    async fn list_comments(&self, talking_point_id: Uuid)
        -> Result<Vec<CommentWithUser>, DbError>;
    async fn delete_comment(&self, talking_point_id: Uuid, comment_id: Uuid)
        -> Result<(), DbError>;

    async fn create_tag(&self, new: NewTag) -> Result<Tag, DbError>;
    async fn list_tags(&self) -> Result<Vec<Tag>, DbError>;
    /// Tag links on talking points of meetings the user takes part in.
    async fn tag_mentions(&self, user_id: Uuid) -> Result<Vec<TagMention>, DbError>;
}
