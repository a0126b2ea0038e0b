use anyhow::{Context, Result};
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::fetch;

const EVENTS_URL: &str = "https://economic-calendar.tradingview.com/events";
const ORIGIN: &str = "https://www.tradingview.com";
const COUNTRIES: &str = "CN,FR,DE,JP,GB,US,EU,NL";
const DISPLAY_TZ: Tz = chrono_tz::CET;

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    result: Vec<Event>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Event {
    pub date: Option<String>,
    pub title: Option<String>,
    pub country: Option<String>,
    pub actual: Option<Value>,
    pub forecast: Option<Value>,
    pub previous: Option<Value>,
}

/// First and last second of the UTC day containing `now`.
pub fn day_range(now: DateTime<Utc>) -> (String, String) {
    let day = now.date_naive();
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    (
        format!("{}Z", day.and_time(NaiveTime::MIN).format("%Y-%m-%dT%H:%M:%S")),
        format!("{}Z", day.and_time(end).format("%Y-%m-%dT%H:%M:%S")),
    )
}

pub async fn fetch_events(client: &Client, now: DateTime<Utc>) -> Result<Vec<Event>> {
    let (from, to) = day_range(now);
    let request = client
        .get(EVENTS_URL)
        .query(&[("from", from.as_str()), ("to", to.as_str()), ("countries", COUNTRIES)])
        .header("Origin", ORIGIN);
    let body: EventsResponse = fetch::json(request)
        .await
        .context("Failed to fetch economic calendar")?;
    Ok(body.result)
}

/// Console line for one event; `None` for events without a usable date or title.
pub fn format_event(event: &Event, tz: Tz) -> Option<String> {
    let (date, title) = (event.date.as_deref()?, event.title.as_deref()?);
    let when = match DateTime::parse_from_rfc3339(date) {
        Ok(dt) => dt.with_timezone(&tz),
        Err(e) => {
            warn!("Skipping event {:?}: bad date {:?} ({})", title, date, e);
            return None;
        }
    };

    Some(format!(
        "{} <{}>  {} | Actual: {} | Forecast: {} | Previous: {}",
        when.format("%m-%d %H:%M:%S"),
        event.country.as_deref().unwrap_or("N/A"),
        title,
        show(&event.actual),
        show(&event.forecast),
        show(&event.previous),
    ))
}

fn show(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub async fn run_cycle(client: &Client) -> Result<()> {
    let events = fetch_events(client, Utc::now()).await?;
    info!("{} calendar events today", events.len());
    for line in events.iter().filter_map(|e| format_event(e, DISPLAY_TZ)) {
        println!("{}", line);
    }
    Ok(())
}
