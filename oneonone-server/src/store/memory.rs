//! In-process store
//!
//! Tables live behind one `RwLock`; every write takes the write lock for
//! its whole duration, so multi-table writes are atomic. Uniqueness and
//! reference checks mirror the Postgres constraints.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use oneonone_core::TagMention;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::db::{
    Comment, CommentWithUser, DbError, Meeting, MeetingWithInvitee, NewComment, NewMeeting,
    NewOrganisation, NewTag, NewTalkingPoint, NewUser, Organisation, Tag, TagToggle,
    TalkingPoint, TalkingPointDetail, TalkingPointSummary, User,
};
use crate::models::Email;

#[derive(Default)]
struct Tables {
    organisations: Vec<Organisation>,
    users: Vec<User>,
    passwords: HashMap<Uuid, String>,
    meetings: Vec<Meeting>,
    talking_points: Vec<TalkingPoint>,
    comments: Vec<Comment>,
    tags: Vec<Tag>,
    /// (talking_point_id, tag_id)
    talking_point_tags: Vec<(Uuid, Uuid)>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn tag(&self, id: Uuid) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    fn tags_of(&self, talking_point_id: Uuid) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .talking_point_tags
            .iter()
            .filter(|(tp, _)| *tp == talking_point_id)
            .filter_map(|(_, tag)| self.tag(*tag).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn summary(&self, tp: &TalkingPoint) -> TalkingPointSummary {
        let comments: Vec<&Comment> = self
            .comments
            .iter()
            .filter(|c| c.talking_point_id == tp.id)
            .collect();

        TalkingPointSummary {
            id: tp.id,
            title: tp.title.clone(),
            meeting_id: tp.meeting_id,
            user_id: tp.user_id,
            created_at: tp.created_at,
            comment_count: oneonone_core::count_projection(&comments),
            tags: self.tags_of(tp.id),
        }
    }
}

/// Store keeping every table in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored password hash for a user, if any.
    pub async fn password_hash(&self, user_id: Uuid) -> Option<String> {
        self.tables.read().await.passwords.get(&user_id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_organisation(&self, new: NewOrganisation) -> Result<Organisation, DbError> {
        let org = Organisation {
            id: Uuid::new_v4(),
            name: new.name.into_string(),
            email: new.email.into_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.organisations.push(org.clone());
        Ok(org)
    }

    async fn get_organisation(&self, id: Uuid) -> Result<Organisation, DbError> {
        self.tables
            .read()
            .await
            .organisations
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| DbError::not_found("organisation", id))
    }

    async fn create_user(&self, new: NewUser) -> Result<User, DbError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == new.email.as_str()) {
            return Err(DbError::Conflict {
                resource: "user",
                field: "email",
            });
        }
        if let Some(org_id) = new.organisation_id {
            if !tables.organisations.iter().any(|o| o.id == org_id) {
                return Err(DbError::not_found("organisation", org_id));
            }
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new.email.into_string(),
            first_name: new.first_name.into_string(),
            last_name: new.last_name.into_string(),
            color: new.color.into_string(),
            role: new.role,
            organisation_id: new.organisation_id,
            created_at: Utc::now(),
        };
        tables.passwords.insert(user.id, new.password_hash);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, DbError> {
        self.tables
            .read()
            .await
            .user(id)
            .cloned()
            .ok_or_else(|| DbError::not_found("user", id))
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, DbError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email.as_str())
            .cloned())
    }

    async fn list_users(&self, organisation_id: Option<Uuid>) -> Result<Vec<User>, DbError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| organisation_id.is_none() || u.organisation_id == organisation_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            (&a.first_name, &a.last_name).cmp(&(&b.first_name, &b.last_name))
        });
        Ok(users)
    }

    async fn create_meeting(&self, new: NewMeeting) -> Result<Meeting, DbError> {
        let mut tables = self.tables.write().await;

        if tables.user(new.author_id).is_none() {
            return Err(DbError::not_found("user", new.author_id));
        }
        if tables.user(new.invitee_id).is_none() {
            return Err(DbError::not_found("invitee", new.invitee_id));
        }

        let meeting = Meeting {
            id: Uuid::new_v4(),
            title: new.title.into_string(),
            date: new.date.as_utc(),
            author_id: new.author_id,
            invitee_id: new.invitee_id,
            created_at: Utc::now(),
        };
        tables.meetings.push(meeting.clone());
        Ok(meeting)
    }

    async fn get_meeting(&self, id: Uuid) -> Result<Meeting, DbError> {
        self.tables
            .read()
            .await
            .meetings
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| DbError::not_found("meeting", id))
    }

    async fn list_meetings_for_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<MeetingWithInvitee>, DbError> {
        let tables = self.tables.read().await;

        let mut meetings: Vec<MeetingWithInvitee> = tables
            .meetings
            .iter()
            .filter(|m| m.author_id == author_id)
            .filter_map(|m| {
                let invitee = tables.user(m.invitee_id)?.clone();
                let points: Vec<&TalkingPoint> = tables
                    .talking_points
                    .iter()
                    .filter(|tp| tp.meeting_id == m.id)
                    .collect();
                Some(MeetingWithInvitee {
                    meeting: m.clone(),
                    invitee,
                    talking_point_count: oneonone_core::count_projection(&points),
                })
            })
            .collect();

        // Stable sort keeps insertion order for equal dates
        meetings.sort_by_key(|m| m.meeting.date);
        Ok(meetings)
    }

    async fn create_talking_point(
        &self,
        new: NewTalkingPoint,
    ) -> Result<TalkingPointSummary, DbError> {
        let mut tables = self.tables.write().await;

        if !tables.meetings.iter().any(|m| m.id == new.meeting_id) {
            return Err(DbError::not_found("meeting", new.meeting_id));
        }
        if tables.user(new.user_id).is_none() {
            return Err(DbError::not_found("user", new.user_id));
        }
        if let Some(missing) = new.tag_ids.iter().find(|id| tables.tag(**id).is_none()) {
            return Err(DbError::not_found("tag", missing));
        }

        let tp = TalkingPoint {
            id: Uuid::new_v4(),
            title: new.title.into_string(),
            user_id: new.user_id,
            meeting_id: new.meeting_id,
            created_at: Utc::now(),
        };

        for tag_id in new.tag_ids {
            if !tables.talking_point_tags.contains(&(tp.id, tag_id)) {
                tables.talking_point_tags.push((tp.id, tag_id));
            }
        }
        tables.talking_points.push(tp.clone());

        Ok(tables.summary(&tp))
    }

    async fn get_talking_point(&self, id: Uuid) -> Result<TalkingPointDetail, DbError> {
        let tables = self.tables.read().await;

        let talking_point = tables
            .talking_points
            .iter()
            .find(|tp| tp.id == id)
            .cloned()
            .ok_or_else(|| DbError::not_found("talking point", id))?;
        let user = tables
            .user(talking_point.user_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("user", talking_point.user_id))?;
        let tags = tables.tags_of(id);

        Ok(TalkingPointDetail {
            talking_point,
            user,
            tags,
        })
    }

    async fn list_talking_points(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<TalkingPointSummary>, DbError> {
        let tables = self.tables.read().await;

        let mut points: Vec<TalkingPointSummary> = tables
            .talking_points
            .iter()
            .filter(|tp| tp.meeting_id == meeting_id)
            .map(|tp| tables.summary(tp))
            .collect();
        points.sort_by_key(|tp| tp.created_at);
        Ok(points)
    }

    async fn toggle_tag(
        &self,
        talking_point_id: Uuid,
        tag_id: Uuid,
    ) -> Result<TagToggle, DbError> {
        let mut tables = self.tables.write().await;

        if !tables.talking_points.iter().any(|tp| tp.id == talking_point_id) {
            return Err(DbError::not_found("talking point", talking_point_id));
        }
        if tables.tag(tag_id).is_none() {
            return Err(DbError::not_found("tag", tag_id));
        }

        let link = (talking_point_id, tag_id);
        if let Some(pos) = tables.talking_point_tags.iter().position(|l| *l == link) {
            tables.talking_point_tags.remove(pos);
            Ok(TagToggle::Removed)
        } else {
            tables.talking_point_tags.push(link);
            Ok(TagToggle::Added)
        }
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, DbError> {
        let mut tables = self.tables.write().await;

        if !tables
            .talking_points
            .iter()
            .any(|tp| tp.id == new.talking_point_id)
        {
            return Err(DbError::not_found("talking point", new.talking_point_id));
        }
        if tables.user(new.user_id).is_none() {
            return Err(DbError::not_found("user", new.user_id));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            content: new.content.into_string(),
            user_id: new.user_id,
            talking_point_id: new.talking_point_id,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(
        &self,
        talking_point_id: Uuid,
    ) -> Result<Vec<CommentWithUser>, DbError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<CommentWithUser> = tables
            .comments
            .iter()
            .filter(|c| c.talking_point_id == talking_point_id)
            .filter_map(|c| {
                Some(CommentWithUser {
                    comment: c.clone(),
                    user: tables.user(c.user_id)?.clone(),
                })
            })
            .collect();
        comments.sort_by_key(|c| c.comment.created_at);
        Ok(comments)
    }

    async fn delete_comment(
        &self,
        talking_point_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;

        let pos = tables
            .comments
            .iter()
            .position(|c| c.id == comment_id && c.talking_point_id == talking_point_id)
            .ok_or_else(|| DbError::not_found("comment", comment_id))?;
        tables.comments.remove(pos);
        Ok(())
    }

    async fn create_tag(&self, new: NewTag) -> Result<Tag, DbError> {
        let mut tables = self.tables.write().await;

        if !tables
            .organisations
            .iter()
            .any(|o| o.id == new.organisation_id)
        {
            return Err(DbError::not_found("organisation", new.organisation_id));
        }
        if tables.tags.iter().any(|t| t.name == new.name.as_str()) {
            return Err(DbError::Conflict {
                resource: "tag",
                field: "name",
            });
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            name: new.name.into_string(),
            color: new.color.into_string(),
            organisation_id: new.organisation_id,
            created_at: Utc::now(),
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DbError> {
        let mut tags = self.tables.read().await.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn tag_mentions(&self, user_id: Uuid) -> Result<Vec<TagMention>, DbError> {
        let tables = self.tables.read().await;

        let mut mentions: Vec<TagMention> = tables
            .talking_point_tags
            .iter()
            .filter_map(|(tp_id, tag_id)| {
                let tp = tables.talking_points.iter().find(|tp| tp.id == *tp_id)?;
                let meeting = tables.meetings.iter().find(|m| m.id == tp.meeting_id)?;
                if meeting.author_id != user_id && meeting.invitee_id != user_id {
                    return None;
                }
                let tag = tables.tag(*tag_id)?;
                Some(TagMention {
                    tag_id: tag.id,
                    name: tag.name.clone(),
                    color: tag.color.clone(),
                    mentioned_at: tp.created_at,
                })
            })
            .collect();
        mentions.sort_by_key(|m| m.mentioned_at);
        Ok(mentions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommentContent, DisplayName, HexColor, MeetingDate, Role, Title};

    async fn user(store: &MemoryStore, email: &str) -> User {
        store
            .create_user(NewUser {
                email: Email::new(email).unwrap(),
                first_name: DisplayName::new("firstName", "Test").unwrap(),
                last_name: DisplayName::new("lastName", email).unwrap(),
                password_hash: "hash".into(),
                color: HexColor::for_user(email),
                role: Role::Employee,
                organisation_id: None,
            })
            .await
            .unwrap()
    }

    async fn meeting(store: &MemoryStore, author: Uuid, invitee: Uuid, date: &str) -> Meeting {
        store
            .create_meeting(NewMeeting {
                title: Title::new("Weekly").unwrap(),
                date: MeetingDate::parse(date, &chrono_tz::UTC).unwrap(),
                author_id: author,
                invitee_id: invitee,
            })
            .await
            .unwrap()
    }

    async fn tag(store: &MemoryStore, name: &str) -> Tag {
        let org = store
            .create_organisation(NewOrganisation {
                name: DisplayName::new("name", "Acme").unwrap(),
                email: Email::new("ops@acme.test").unwrap(),
            })
            .await
            .unwrap();
        store
            .create_tag(NewTag {
                name: DisplayName::new("name", name).unwrap(),
                color: HexColor::new("#336699").unwrap(),
                organisation_id: org.id,
            })
            .await
            .unwrap()
    }

    async fn talking_point(
        store: &MemoryStore,
        user_id: Uuid,
        meeting_id: Uuid,
        tag_ids: Vec<Uuid>,
    ) -> Result<TalkingPointSummary, DbError> {
        store
            .create_talking_point(NewTalkingPoint {
                title: Title::new("Career growth").unwrap(),
                user_id,
                meeting_id,
                tag_ids,
            })
            .await
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;

        let err = store
            .create_user(NewUser {
                email: Email::new("ADA@example.com").unwrap(),
                first_name: DisplayName::new("firstName", "Ada").unwrap(),
                last_name: DisplayName::new("lastName", "Again").unwrap(),
                password_hash: "hash".into(),
                color: HexColor::for_user("ada@example.com"),
                role: Role::Employee,
                organisation_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Conflict { field: "email", .. }));
        assert_eq!(store.list_users(None).await.unwrap(), vec![ada]);
    }

    #[tokio::test]
    async fn create_user_stores_password() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;

        assert_eq!(store.password_hash(ada.id).await.as_deref(), Some("hash"));
    }

    #[tokio::test]
    async fn meeting_requires_known_invitee() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;

        let err = store
            .create_meeting(NewMeeting {
                title: Title::new("Weekly").unwrap(),
                date: MeetingDate::parse("2023-02-10", &chrono_tz::UTC).unwrap(),
                author_id: ada.id,
                invitee_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "invitee", .. }));
    }

    #[tokio::test]
    async fn meetings_listed_by_date_with_counts() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;

        let later = meeting(&store, ada.id, bob.id, "2023-02-20").await;
        let earlier = meeting(&store, ada.id, bob.id, "2023-02-10").await;
        meeting(&store, bob.id, ada.id, "2023-02-01").await;

        talking_point(&store, ada.id, earlier.id, vec![]).await.unwrap();
        talking_point(&store, ada.id, earlier.id, vec![]).await.unwrap();

        let listed = store.list_meetings_for_author(ada.id).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|m| m.meeting.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
        assert_eq!(listed[0].talking_point_count, 2);
        assert_eq!(listed[1].talking_point_count, 0);
        assert_eq!(listed[0].invitee.id, bob.id);
    }

    #[tokio::test]
    async fn unknown_tag_creates_nothing() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;
        let m = meeting(&store, ada.id, bob.id, "2023-02-10").await;
        let known = tag(&store, "career").await;

        let err = talking_point(&store, ada.id, m.id, vec![known.id, Uuid::new_v4()])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "tag", .. }));
        assert!(store.list_talking_points(m.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn talking_point_without_tags_has_empty_tags() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;
        let m = meeting(&store, ada.id, bob.id, "2023-02-10").await;

        let tp = talking_point(&store, ada.id, m.id, vec![]).await.unwrap();

        assert!(tp.tags.is_empty());
        assert_eq!(tp.comment_count, 0);
    }

    #[tokio::test]
    async fn toggle_twice_removes_tag() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;
        let m = meeting(&store, ada.id, bob.id, "2023-02-10").await;
        let career = tag(&store, "career").await;
        let tp = talking_point(&store, ada.id, m.id, vec![]).await.unwrap();

        assert_eq!(store.toggle_tag(tp.id, career.id).await.unwrap(), TagToggle::Added);
        assert_eq!(store.get_talking_point(tp.id).await.unwrap().tags, vec![career.clone()]);

        assert_eq!(store.toggle_tag(tp.id, career.id).await.unwrap(), TagToggle::Removed);
        assert!(store.get_talking_point(tp.id).await.unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn comment_reports_missing_talking_point_then_user() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;
        let m = meeting(&store, ada.id, bob.id, "2023-02-10").await;
        let tp = talking_point(&store, ada.id, m.id, vec![]).await.unwrap();

        let comment = |user_id, talking_point_id| NewComment {
            content: CommentContent::new("hello").unwrap(),
            user_id,
            talking_point_id,
        };

        let err = store
            .create_comment(comment(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "talking point", .. }));

        let err = store
            .create_comment(comment(Uuid::new_v4(), tp.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "user", .. }));
        assert!(store.list_comments(tp.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_comment_leaves_siblings() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;
        let m = meeting(&store, ada.id, bob.id, "2023-02-10").await;
        let tp = talking_point(&store, ada.id, m.id, vec![]).await.unwrap();

        let mut ids = Vec::new();
        for text in ["one", "two", "three"] {
            let c = store
                .create_comment(NewComment {
                    content: CommentContent::new(text).unwrap(),
                    user_id: bob.id,
                    talking_point_id: tp.id,
                })
                .await
                .unwrap();
            ids.push(c.id);
        }

        store.delete_comment(tp.id, ids[1]).await.unwrap();

        let left: Vec<Uuid> = store
            .list_comments(tp.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.comment.id)
            .collect();
        assert_eq!(left, vec![ids[0], ids[2]]);

        let err = store.delete_comment(tp.id, ids[1]).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "comment", .. }));
    }

    #[tokio::test]
    async fn duplicate_tag_name_is_conflict() {
        let store = MemoryStore::new();
        let career = tag(&store, "career").await;

        let err = store
            .create_tag(NewTag {
                name: DisplayName::new("name", "career").unwrap(),
                color: HexColor::new("#000").unwrap(),
                organisation_id: career.organisation_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Conflict { resource: "tag", .. }));
    }

    #[tokio::test]
    async fn mentions_cover_both_participants() {
        let store = MemoryStore::new();
        let ada = user(&store, "ada@example.com").await;
        let bob = user(&store, "bob@example.com").await;
        let carol = user(&store, "carol@example.com").await;
        let m = meeting(&store, ada.id, bob.id, "2023-02-10").await;
        let career = tag(&store, "career").await;
        talking_point(&store, ada.id, m.id, vec![career.id]).await.unwrap();

        assert_eq!(store.tag_mentions(ada.id).await.unwrap().len(), 1);
        assert_eq!(store.tag_mentions(bob.id).await.unwrap().len(), 1);
        assert!(store.tag_mentions(carol.id).await.unwrap().is_empty());
    }
}
