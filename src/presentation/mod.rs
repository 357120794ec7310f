//! Raw touchpoint values to the tokens the dashboard table renders.
//!
//! Every lookup is total: unknown input falls through to a documented default.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::store::ActivityEvent;

pub const DEFAULT_CHANNEL: &str = "Default";
pub const DEFAULT_COLOR: &str = "gray";
pub const UNKNOWN_TEAM: (&str, &str) = ("UNKNOWN", DEFAULT_COLOR);

const CHANNEL_COLORS: &[(&str, &str)] = &[
    ("Meeting", "purple"),
    ("Event", "purple"),
    ("Event With Webinar", "purple"),
    ("Default", "gray"),
    ("Email", "gray"),
    ("Bulk Marketing Email", "gray"),
    ("Chatbot", "yellow"),
    ("Direct Email", "blue"),
];

// Checked in order; the first fragment contained in the team id wins.
const TEAM_TOKENS: &[(&str, &str, &str)] = &[
    ("marketing", "MARKETING", "red"),
    ("sales", "SALES", "blue"),
    ("sdr", "SDR", "green"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCell {
    pub name: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCell {
    pub text: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamCell {
    pub labels: Vec<&'static str>,
    pub colors: Vec<&'static str>,
}

/// One row of the latest-touchpoints table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: usize,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: String,
    pub activity: String,
    pub people: String,
    #[serde(rename = "additionalPeople")]
    pub additional_people: usize,
    pub channel: ChannelCell,
    pub status: StatusCell,
    pub team: TeamCell,
}

pub fn channel_color(channel: &str) -> &'static str {
    CHANNEL_COLORS
        .iter()
        .find(|(name, _)| *name == channel)
        .map_or(DEFAULT_COLOR, |(_, color)| color)
}

pub fn status_icon(channel: &str, status: &str) -> &'static str {
    let normalized = status.trim().to_uppercase();
    match channel {
        "Direct Email" if normalized == "REPLIED" => "replied",
        "Direct Email" => "sent",
        "Chatbot" => "chatted",
        _ if normalized.contains("BOOK") => "booked",
        _ => "conversation",
    }
}

pub fn team_token(team_id: &str) -> (&'static str, &'static str) {
    let id = team_id.to_lowercase();
    TEAM_TOKENS
        .iter()
        .find(|(fragment, _, _)| id.contains(fragment))
        .map_or(UNKNOWN_TEAM, |(_, label, color)| (*label, *color))
}

pub fn team_cell(team_ids: &[String]) -> TeamCell {
    let (labels, colors) = if team_ids.is_empty() {
        (vec![UNKNOWN_TEAM.0], vec![UNKNOWN_TEAM.1])
    } else {
        team_ids.iter().map(|id| team_token(id)).unzip()
    };
    TeamCell { labels, colors }
}

/// Reads `involved_team_ids`. Anything other than an array yields no ids; non-string
/// members are rendered with their JSON text so they still map to UNKNOWN.
pub fn team_ids_from_json(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            log::warn!("Ignoring malformed involved_team_ids: {other}");
            Vec::new()
        }
    }
}

pub fn event_type(direction: Option<&str>) -> EventType {
    match direction {
        Some(d) if d.trim().eq_ignore_ascii_case("IN") => EventType::Incoming,
        _ => EventType::Outgoing,
    }
}

/// `Dec 1, 2023`
pub fn format_display_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

pub fn channel_cell(channel: Option<&str>) -> ChannelCell {
    let name = channel
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CHANNEL)
        .to_string();
    let color = channel_color(&name);
    ChannelCell { name, color }
}

pub fn table_row(
    position: usize,
    event: &ActivityEvent,
    primary_person: String,
    additional_people: usize,
) -> TableRow {
    let channel = channel_cell(event.channel.as_deref());
    let status_text = event.status.clone().unwrap_or_default();
    let icon = status_icon(&channel.name, &status_text);

    TableRow {
        id: position,
        event_type: event_type(event.direction.as_deref()),
        date: format_display_date(event.timestamp),
        activity: event.activity.clone().unwrap_or_default(),
        people: primary_person,
        additional_people,
        channel,
        status: StatusCell {
            text: status_text,
            icon,
        },
        team: team_cell(&team_ids_from_json(&event.involved_team_ids)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::sample_event;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_channel_colors() {
        assert_eq!(channel_color("Meeting"), "purple");
        assert_eq!(channel_color("Event"), "purple");
        assert_eq!(channel_color("Event With Webinar"), "purple");
        assert_eq!(channel_color("Default"), "gray");
        assert_eq!(channel_color("Email"), "gray");
        assert_eq!(channel_color("Bulk Marketing Email"), "gray");
        assert_eq!(channel_color("Chatbot"), "yellow");
        assert_eq!(channel_color("Direct Email"), "blue");
        assert_eq!(channel_color("Carrier Pigeon"), "gray");
        assert_eq!(channel_color("meeting"), "gray");
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(status_icon("Direct Email", " replied "), "replied");
        assert_eq!(status_icon("Direct Email", "Opened"), "sent");
        assert_eq!(status_icon("Direct Email", "Booked"), "sent");
        assert_eq!(status_icon("Chatbot", "Booked"), "chatted");
        assert_eq!(status_icon("Meeting", "Meeting Booked"), "booked");
        assert_eq!(status_icon("Email", "rebooking"), "booked");
        assert_eq!(status_icon("Email", "Replied"), "conversation");
        assert_eq!(status_icon("Default", ""), "conversation");
    }

    #[test]
    fn test_team_tokens() {
        assert_eq!(team_token("team_marketing"), ("MARKETING", "red"));
        assert_eq!(team_token("TEAM_SALES_EMEA"), ("SALES", "blue"));
        assert_eq!(team_token("team_sdr"), ("SDR", "green"));
        assert_eq!(team_token("team_support"), ("UNKNOWN", "gray"));
        assert_eq!(team_token(""), ("UNKNOWN", "gray"));
    }

    #[test]
    fn test_empty_team_list_yields_single_unknown() {
        let cell = team_cell(&[]);
        assert_eq!(cell.labels, vec!["UNKNOWN"]);
        assert_eq!(cell.colors, vec!["gray"]);

        let cell = team_cell(&["team_sdr".to_string(), "x".to_string()]);
        assert_eq!(cell.labels, vec!["SDR", "UNKNOWN"]);
        assert_eq!(cell.colors, vec!["green", "gray"]);
    }

    #[test]
    fn test_team_ids_from_json_tolerates_bad_shapes() {
        assert_eq!(
            team_ids_from_json(&json!(["team_sales", 7])),
            vec!["team_sales".to_string(), "7".to_string()]
        );
        assert!(team_ids_from_json(&json!(null)).is_empty());
        assert!(team_ids_from_json(&json!({"team": "sales"})).is_empty());
    }

    #[test]
    fn test_event_type() {
        assert_eq!(event_type(Some("IN")), EventType::Incoming);
        assert_eq!(event_type(Some("in")), EventType::Incoming);
        assert_eq!(event_type(Some("OUT")), EventType::Outgoing);
        assert_eq!(event_type(Some("inbound")), EventType::Outgoing);
        assert_eq!(event_type(None), EventType::Outgoing);
    }

    #[test]
    fn test_display_date_has_no_padding() {
        let ts = Utc.with_ymd_and_hms(2023, 12, 1, 9, 30, 0).unwrap();
        assert_eq!(format_display_date(ts), "Dec 1, 2023");
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(format_display_date(ts), "Feb 29, 2024");
    }

    #[test]
    fn test_table_row_defaults() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let mut event = sample_event(9, "org", "acct", ts);
        event.channel = None;
        event.status = None;
        event.activity = None;
        event.direction = Some("IN".to_string());
        event.involved_team_ids = json!("not-a-list");

        let row = table_row(1, &event, "Unknown Person".to_string(), 0);
        assert_eq!(row.channel.name, "Default");
        assert_eq!(row.channel.color, "gray");
        assert_eq!(row.status.text, "");
        assert_eq!(row.status.icon, "conversation");
        assert_eq!(row.event_type, EventType::Incoming);
        assert_eq!(row.team.labels, vec!["UNKNOWN"]);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "incoming");
        assert_eq!(json["date"], "Jan 5, 2024");
        assert_eq!(json["additionalPeople"], 0);
    }
}
