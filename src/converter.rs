use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::fetch;

/// ES futures trade at this multiple of the SPX cash index.
pub const ES_SPX_RATIO: f64 = 1.0041126541414127;

const BID_URL: &str = "https://blackbull.com/wp-json/bbm/get_bid/";
const BID_SYMBOL: &str = "US500.f";
const REFERER: &str =
    "https://blackbull.com/en/trading/instruments/futures/indices-futures/us500-spx500-future/";
const SEC_CH_UA: &str = r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#;

#[derive(Debug, Clone, Copy)]
pub struct PriceConverter {
    ratio: f64,
}

impl Default for PriceConverter {
    fn default() -> Self {
        Self::new(ES_SPX_RATIO)
    }
}

impl PriceConverter {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn es_to_spx(&self, es: f64) -> f64 {
        round2(es / self.ratio)
    }

    pub fn spx_to_es(&self, spx: f64) -> f64 {
        round2(spx * self.ratio)
    }
}

/// Two decimals, halves to the even digit.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Current ES bid (the feed's `sell` side).
pub async fn fetch_es_price(client: &Client) -> Result<f64> {
    let request = client
        .get(BID_URL)
        .query(&[("action", "bid"), ("symbol", BID_SYMBOL)])
        .header("referer", REFERER)
        .header("sec-ch-ua", SEC_CH_UA);
    let body: Value = fetch::json(request)
        .await
        .context("Failed to fetch ES price")?;
    parse_bid(&body)
}

/// The feed sends `sell` as a number or as a numeric string.
fn parse_bid(body: &Value) -> Result<f64> {
    match body.get("sell") {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| anyhow!("sell price out of range: {}", n)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .with_context(|| format!("sell price is not a number: {:?}", s)),
        Some(other) => Err(anyhow!("unexpected sell price: {}", other)),
        None => Err(anyhow!("no sell price in response")),
    }
}

/// Prices always print with a fractional part (`5600.0`, not `5600`).
pub fn format_conversion(from: &str, value: f64, to: &str, converted: f64) -> String {
    format!("{}: {:?} → {}: {}", from, value, to, format!("{:?}", converted).red())
}

/// `convert` subcommand: offline when a price is given, live otherwise.
pub async fn run(client: &Client, es: Option<f64>, spx: Option<f64>) -> Result<()> {
    let converter = PriceConverter::default();

    let line = match (es, spx) {
        (Some(es), _) => format_conversion("ES", es, "SPX", converter.es_to_spx(es)),
        (None, Some(spx)) => format_conversion("SPX", spx, "ES", converter.spx_to_es(spx)),
        (None, None) => {
            let es = fetch_es_price(client).await?;
            info!("Live ES bid: {}", es);
            format_conversion("ES", es, "SPX", converter.es_to_spx(es))
        }
    };
    println!("{}", line);
    Ok(())
}
