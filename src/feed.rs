//! # Price feed (market-data boundary)
//!
//! The engine consumes daily closes as `(date, price)` pairs and does not
//! know the feed's protocol. `StooqFeed` pulls the free daily CSV export;
//! `FixtureFeed` serves canned closes for tests and offline runs.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Daily closes within `[start, end]` inclusive. Sampling is the
    /// feed's own (weekends/holidays missing); the merger owns filling.
    async fn daily_closes(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>>;

    fn name(&self) -> &'static str;
}

/// Stooq daily CSV: `Date,Open,High,Low,Close,...` rows, newest-last.
pub struct StooqFeed {
    http: reqwest::Client,
    symbol: String,
}

impl StooqFeed {
    pub fn new(symbol: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("dovetail-terminal/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            http,
            symbol: symbol.to_ascii_lowercase(),
        }
    }

    fn url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "https://stooq.com/q/d/l/?s={}&d1={}&d2={}&i=d",
            self.symbol,
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        )
    }
}

#[async_trait]
impl PriceFeed for StooqFeed {
    async fn daily_closes(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>> {
        let body = self
            .http
            .get(self.url(start, end))
            .send()
            .await
            .context("price feed request")?
            .text()
            .await
            .context("price feed body")?;
        let closes = parse_daily_csv(&body)?;
        Ok(closes
            .into_iter()
            .filter(|(d, _)| *d >= start && *d <= end)
            .collect())
    }

    fn name(&self) -> &'static str {
        "stooq"
    }
}

/// Parse the daily CSV export. Unparseable rows are skipped; an export
/// with no usable row at all is an error, not an empty success.
pub fn parse_daily_csv(body: &str) -> Result<BTreeMap<NaiveDate, f64>> {
    let mut out = BTreeMap::new();
    for line in body.lines().skip(1) {
        let mut fields = line.split(',');
        let date = fields.next().unwrap_or_default();
        let close = fields.nth(3).unwrap_or_default(); // Open,High,Low skipped
        let date = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => continue,
        };
        let close: f64 = match close.parse() {
            Ok(p) => p,
            Err(_) => continue,
        };
        if close.is_finite() {
            out.insert(date, close);
        }
    }
    if out.is_empty() {
        return Err(anyhow!("price feed returned no parsable rows"));
    }
    Ok(out)
}

/// Canned closes for tests/offline runs.
#[derive(Debug, Clone, Default)]
pub struct FixtureFeed {
    pub closes: BTreeMap<NaiveDate, f64>,
}

#[async_trait]
impl PriceFeed for FixtureFeed {
    async fn daily_closes(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>> {
        Ok(self
            .closes
            .range(start..=end)
            .map(|(&d, &p)| (d, p))
            .collect())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
