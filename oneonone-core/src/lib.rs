//! oneonone-core: pure logic shared by the server and CLI
//!
//! - View-model aggregation for meetings (group-by-day, count projection)
//! - Relative-time formatting
//! - Topic insights over tag mentions
//! - Configuration loading

pub mod config;
pub mod distance;
pub mod error;
pub mod insights;
pub mod meetings;

pub use config::AppConfig;
pub use distance::{format_distance, format_relative};
pub use error::{CoreError, Result};
pub use insights::{
    frequent_topics, topic_frequency, TagMention, TopicChart, TopicInsight, TopicSeries,
    DEFAULT_CHART_MONTHS, DEFAULT_WINDOW_DAYS,
};
pub use meetings::{
    calendar_day, count_projection, group_meetings_by_day, is_upcoming, MeetingGroup,
    MeetingSummary,
};
