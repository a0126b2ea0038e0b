use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::fetch;
use crate::parser::{self, ConsoleLine, ParsedPage};

pub const RATINGS_URL: &str = "https://hosting.briefing.com/fidelity/Calendars/UpgradesDowngrades.htm";

/// Fetch the calendar page and print it, as trace lines or as JSON.
pub async fn run_cycle(client: &Client, url: &str, as_json: bool) -> Result<()> {
    info!("Fetching ratings calendar: {}", url);
    let html = fetch::text(client.get(url))
        .await
        .context("Failed to fetch ratings page")?;

    let page = parser::parse_page(&html)?;
    if page.report.data.is_empty() {
        warn!("No section headers found on {}", url);
    } else {
        let count: usize = page.report.data.0.iter().map(|s| s.items.len()).sum();
        let names: Vec<&str> = page.report.data.names().collect();
        info!("Parsed {} records in sections: {}", count, names.join(", "));
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&page.report)?);
    } else {
        print_page(&page);
    }
    Ok(())
}

fn print_page(page: &ParsedPage) {
    for line in console_text(page) {
        println!("{}", line);
    }
}

/// Banners and trace lines in page order, then the update date.
fn console_text(page: &ParsedPage) -> Vec<String> {
    let mut out = Vec::with_capacity(page.console.len() + 1);
    let mut section = "";
    for line in &page.console {
        match line {
            ConsoleLine::Banner(name) => {
                section = name.as_str();
                out.push(section_banner(name));
            }
            ConsoleLine::Trace(trace) => {
                debug!(section, ticker = %trace.ticker, class = trace.role.class(), "record");
                out.push(trace.to_string());
            }
        }
    }

    if let Some(date) = &page.report.update_date {
        out.push(format!("\nUpdate Date: {}\n", date));
    }
    out
}

fn section_banner(name: &str) -> String {
    format!("-------------{}---------------", name)
}
