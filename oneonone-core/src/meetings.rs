//! Meeting view models and the group-by-day fold used by the dashboard.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Calendar-day key format shared by grouping and display
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A meeting reduced to what the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSummary {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub discussion_point_count: i64,
}

/// Meetings sharing one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingGroup {
    pub date: String,
    pub meetings: Vec<MeetingSummary>,
}

/// Calendar-day key of an instant as seen in `tz`.
pub fn calendar_day<Z: TimeZone>(instant: &DateTime<Utc>, tz: &Z) -> String
where
    Z::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format(DAY_FORMAT).to_string()
}

/// Fold an ordered sequence of meetings into per-day groups.
///
/// A meeting joins the group whose day key matches exactly; otherwise a
/// new group is appended. Groups and members keep encounter order, so
/// callers sort before grouping.
pub fn group_meetings_by_day<I, Z>(meetings: I, tz: &Z) -> Vec<MeetingGroup>
where
    I: IntoIterator<Item = MeetingSummary>,
    Z: TimeZone,
    Z::Offset: std::fmt::Display,
{
    let mut groups: Vec<MeetingGroup> = Vec::new();

    for meeting in meetings {
        let day = calendar_day(&meeting.date, tz);
        match groups.iter_mut().find(|g| g.date == day) {
            Some(group) => group.meetings.push(meeting),
            None => groups.push(MeetingGroup {
                date: day,
                meetings: vec![meeting],
            }),
        }
    }

    groups
}

/// Replace a loaded collection with its cardinality.
pub fn count_projection<T>(items: &[T]) -> i64 {
    items.len() as i64
}

/// Whether a meeting is still ahead of `now`
pub fn is_upcoming(date: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    date >= now
}
