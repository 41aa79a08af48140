use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::types::{TranscriptEvent, TranscriptProvider};

use super::rss::{fetch_feed, parse_press_feed};

/// Federal Reserve monetary-policy press feed.
pub const FED_PRESS_FEED_URL: &str =
    "https://www.federalreserve.gov/feeds/press_monetary.xml";

pub struct FedPressProvider {
    mode: Mode,
}

enum Mode {
    // Own copy of the fixture so tests don't need 'static strings.
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl FedPressProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn default_http() -> Self {
        Self::from_url(FED_PRESS_FEED_URL)
    }
}

#[async_trait]
impl TranscriptProvider for FedPressProvider {
    async fn fetch_latest(&self) -> Result<Vec<TranscriptEvent>> {
        match &self.mode {
            Mode::Fixture(s) => parse_press_feed("Fed", s),
            Mode::Http { url, client } => {
                let body = fetch_feed(client, url).await?;
                parse_press_feed("Fed", &body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Fed"
    }
}
