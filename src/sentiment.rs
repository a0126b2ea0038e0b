use anyhow::{Context, Result};
use colored::{Color, Colorize};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::{calendar, fetch};

const FEAR_GREED_URL: &str = "https://production.dataviz.cnn.io/index/fearandgreed/graphdata";

#[derive(Debug, Deserialize)]
struct GraphData {
    #[serde(default)]
    fear_and_greed: Option<IndexNow>,
}

#[derive(Debug, Deserialize)]
struct IndexNow {
    score: Option<f64>,
    rating: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub score: f64,
    pub rating: String,
}

/// `None` when the feed answered but left out the score or the rating.
pub async fn fetch_reading(client: &Client) -> Result<Option<Reading>> {
    let data: GraphData = fetch::json(client.get(FEAR_GREED_URL))
        .await
        .context("Failed to fetch Fear & Greed index")?;
    Ok(reading(data))
}

fn reading(data: GraphData) -> Option<Reading> {
    let now = data.fear_and_greed?;
    Some(Reading {
        score: now.score?,
        rating: now.rating?,
    })
}

fn rating_color(rating: &str) -> Option<Color> {
    match rating {
        "extreme fear" => Some(Color::BrightRed),
        "fear" => Some(Color::BrightYellow),
        "neutral" => Some(Color::BrightWhite),
        "greed" => Some(Color::BrightCyan),
        "extreme greed" => Some(Color::BrightBlue),
        _ => None,
    }
}

pub fn render(reading: &Reading) -> Vec<String> {
    let paint = |text: String| match rating_color(&reading.rating) {
        Some(color) => text.color(color).to_string(),
        None => text,
    };
    vec![
        format!("Fear Score: {}", paint(format!("{:.2}", reading.score))),
        format!("Rating: {}", paint(reading.rating.clone())),
    ]
}

/// One refresh: the index, then today's calendar.
pub async fn run_cycle(client: &Client) -> Result<()> {
    match fetch_reading(client).await {
        Ok(Some(reading)) => {
            for line in render(&reading) {
                println!("{}", line);
            }
            println!("-----------------------------");
        }
        Ok(None) => println!("Error: Unable to find fear score or rating in the data."),
        Err(e) => {
            warn!("{:#}", e);
            println!("Failed to fetch the Fear & Greed index: {:#}", e);
        }
    }

    calendar::run_cycle(client).await
}
