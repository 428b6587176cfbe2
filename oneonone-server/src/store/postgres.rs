//! Postgres-backed store

use async_trait::async_trait;
use oneonone_core::TagMention;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::db::{
    Comment, CommentRepo, CommentWithUser, DbError, Meeting, MeetingRepo, MeetingWithInvitee,
    NewComment, NewMeeting, NewOrganisation, NewTag, NewTalkingPoint, NewUser, Organisation,
    OrganisationRepo, Tag, TagRepo, TagToggle, TalkingPointDetail, TalkingPointRepo,
    TalkingPointSummary, User, UserRepo,
};
use crate::models::Email;

/// Store backed by a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_organisation(&self, new: NewOrganisation) -> Result<Organisation, DbError> {
        OrganisationRepo::new(&self.pool).create(new).await
    }

    async fn get_organisation(&self, id: Uuid) -> Result<Organisation, DbError> {
        OrganisationRepo::new(&self.pool).get(id).await
    }

    async fn create_user(&self, new: NewUser) -> Result<User, DbError> {
        UserRepo::new(&self.pool).create(new).await
    }

    async fn get_user(&self, id: Uuid) -> Result<User, DbError> {
        UserRepo::new(&self.pool).get(id).await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, DbError> {
        UserRepo::new(&self.pool).find_by_email(email).await
    }

    async fn list_users(&self, organisation_id: Option<Uuid>) -> Result<Vec<User>, DbError> {
        UserRepo::new(&self.pool).list(organisation_id).await
    }

    async fn create_meeting(&self, new: NewMeeting) -> Result<Meeting, DbError> {
        MeetingRepo::new(&self.pool).create(new).await
    }

    async fn get_meeting(&self, id: Uuid) -> Result<Meeting, DbError> {
        MeetingRepo::new(&self.pool).get(id).await
    }

    async fn list_meetings_for_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<MeetingWithInvitee>, DbError> {
        MeetingRepo::new(&self.pool).list_for_author(author_id).await
    }

    async fn create_talking_point(
        &self,
        new: NewTalkingPoint,
    ) -> Result<TalkingPointSummary, DbError> {
        TalkingPointRepo::new(&self.pool).create(new).await
    }

    async fn get_talking_point(&self, id: Uuid) -> Result<TalkingPointDetail, DbError> {
        TalkingPointRepo::new(&self.pool).get_detail(id).await
    }

    async fn list_talking_points(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<TalkingPointSummary>, DbError> {
        TalkingPointRepo::new(&self.pool)
            .list_for_meeting(meeting_id)
            .await
    }

    async fn toggle_tag(
        &self,
        talking_point_id: Uuid,
        tag_id: Uuid,
    ) -> Result<TagToggle, DbError> {
        TalkingPointRepo::new(&self.pool)
            .toggle_tag(talking_point_id, tag_id)
            .await
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, DbError> {
        CommentRepo::new(&self.pool).create(new).await
    }

    async fn list_comments(
        &self,
        talking_point_id: Uuid,
    ) -> Result<Vec<CommentWithUser>, DbError> {
        CommentRepo::new(&self.pool)
            .list_for_talking_point(talking_point_id)
            .await
    }

    async fn delete_comment(
        &self,
        talking_point_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DbError> {
        CommentRepo::new(&self.pool)
            .delete(talking_point_id, comment_id)
            .await
    }

    async fn create_tag(&self, new: NewTag) -> Result<Tag, DbError> {
        TagRepo::new(&self.pool).create(new).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DbError> {
        TagRepo::new(&self.pool).list().await
    }

    async fn tag_mentions(&self, user_id: Uuid) -> Result<Vec<TagMention>, DbError> {
        TagRepo::new(&self.pool).mentions_for_user(user_id).await
    }
}
