//! Topic insights for the dashboard: which tags come up, and how often
//! over the last few months.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Window used by the "frequent topics" panel
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Number of months plotted by the frequency chart
pub const DEFAULT_CHART_MONTHS: u32 = 4;

/// One tag attached to one talking point, dated by the talking point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMention {
    pub tag_id: Uuid,
    pub name: String,
    pub color: String,
    pub mentioned_at: DateTime<Utc>,
}

/// Mention count for one tag in the current window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInsight {
    pub tag_id: Uuid,
    pub name: String,
    pub color: String,
    pub mentions: i64,
    pub trending_up: bool,
}

/// One line of the frequency chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSeries {
    pub label: String,
    pub color: String,
    pub data: Vec<i64>,
}

/// Chart payload: month labels and a series per tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicChart {
    pub labels: Vec<String>,
    pub datasets: Vec<TopicSeries>,
}

/// Count mentions per tag within `window` before `now`, comparing with
/// the window before that to decide the trend.
///
/// Tags with no mention in the current window are left out. Sorted by
/// mentions descending, then name.
pub fn frequent_topics(
    mentions: &[TagMention],
    now: &DateTime<Utc>,
    window: Duration,
) -> Vec<TopicInsight> {
    let current_start = *now - window;
    let previous_start = current_start - window;

    // tag_id -> (name, color, current, previous)
    let mut counts: BTreeMap<Uuid, (&str, &str, i64, i64)> = BTreeMap::new();

    for m in mentions {
        if m.mentioned_at > *now || m.mentioned_at <= previous_start {
            continue;
        }
        let entry = counts
            .entry(m.tag_id)
            .or_insert((m.name.as_str(), m.color.as_str(), 0, 0));
        if m.mentioned_at > current_start {
            entry.2 += 1;
        } else {
            entry.3 += 1;
        }
    }

    let mut insights: Vec<TopicInsight> = counts
        .into_iter()
        .filter(|(_, (_, _, current, _))| *current > 0)
        .map(|(tag_id, (name, color, current, previous))| TopicInsight {
            tag_id,
            name: name.to_string(),
            color: color.to_string(),
            mentions: current,
            trending_up: current >= previous,
        })
        .collect();

    insights.sort_by(|a, b| b.mentions.cmp(&a.mentions).then_with(|| a.name.cmp(&b.name)));
    insights
}

/// Monthly mention counts per tag for the `months` calendar months
/// ending with the month containing `now`.
pub fn topic_frequency(mentions: &[TagMention], now: &DateTime<Utc>, months: u32) -> TopicChart {
    let months = months.max(1);
    let current_month = first_of_month(now.date_naive());
    let first_month = current_month
        .checked_sub_months(Months::new(months - 1))
        .unwrap_or(current_month);

    let month_starts: Vec<NaiveDate> = (0..months)
        .filter_map(|i| first_month.checked_add_months(Months::new(i)))
        .collect();

    let labels = month_starts
        .iter()
        .map(|d| d.format("%b").to_string())
        .collect();

    // name -> (color, counts); BTreeMap keeps datasets sorted by name
    let mut series: BTreeMap<&str, (&str, Vec<i64>)> = BTreeMap::new();

    for m in mentions {
        let month = first_of_month(m.mentioned_at.date_naive());
        let Some(slot) = month_starts.iter().position(|start| *start == month) else {
            continue;
        };
        let entry = series
            .entry(m.name.as_str())
            .or_insert_with(|| (m.color.as_str(), vec![0; month_starts.len()]));
        entry.1[slot] += 1;
    }

    let datasets = series
        .into_iter()
        .map(|(label, (color, data))| TopicSeries {
            label: label.to_string(),
            color: color.to_string(),
            data,
        })
        .collect();

    TopicChart { labels, datasets }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
