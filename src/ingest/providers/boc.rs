use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::types::{TranscriptEvent, TranscriptProvider};

use super::rss::{fetch_feed, parse_press_feed};

/// Bank of Canada press-release feed.
pub const BOC_PRESS_FEED_URL: &str =
    "https://www.bankofcanada.ca/content_type/press-releases/feed/";

pub struct BocPressProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl BocPressProvider {
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
        Self::from_url(BOC_PRESS_FEED_URL)
    }
}

#[async_trait]
impl TranscriptProvider for BocPressProvider {
    async fn fetch_latest(&self) -> Result<Vec<TranscriptEvent>> {
        match &self.mode {
            Mode::Fixture(s) => parse_press_feed("BoC", s),
            Mode::Http { url, client } => {
                let body = fetch_feed(client, url).await?;
                parse_press_feed("BoC", &body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "BoC"
    }
}
