//! Shared RSS plumbing for the press-release providers.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::types::TranscriptEvent;
use crate::ingest::{clean_text, is_policy_title};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_date(ts: &str) -> Option<NaiveDate> {
    let dt = OffsetDateTime::parse(ts, &Rfc2822).ok()?;
    let d = dt.to_offset(UtcOffset::UTC).date();
    NaiveDate::from_ymd_opt(d.year(), u8::from(d.month()) as u32, d.day() as u32)
}

/// Parse one press feed into transcript events for `bank`. Items whose
/// title fails the policy gate, or that lack a link or parseable date,
/// are dropped here; length and duplicate filtering happen later in the
/// pipeline.
pub(super) fn parse_press_feed(bank: &'static str, xml: &str) -> Result<Vec<TranscriptEvent>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).with_context(|| format!("parsing {bank} press feed"))?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = it.title.as_deref().unwrap_or_default();
        if !is_policy_title(title) {
            continue;
        }
        let url = match it.link {
            Some(u) if !u.trim().is_empty() => u,
            _ => continue,
        };
        let published_on = match it.pub_date.as_deref().and_then(parse_rfc2822_date) {
            Some(d) => d,
            None => continue,
        };

        let text_raw = format!(
            "{}. {}",
            title,
            it.description.as_deref().unwrap_or_default()
        );
        let text = clean_text(&text_raw);
        if text.is_empty() {
            continue;
        }

        out.push(TranscriptEvent {
            bank: bank.to_string(),
            published_on,
            url,
            text,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_transcripts_total").increment(out.len() as u64);
    Ok(out)
}

pub(super) async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .text()
        .await
        .context("press feed body")
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_dates_reduce_to_utc_calendar_dates() {
        let d = parse_rfc2822_date("Wed, 31 Jan 2024 23:30:00 -0500").unwrap();
        // 23:30 EST is already Feb 1 in UTC; publish dates are UTC dates.
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert!(parse_rfc2822_date("yesterday-ish").is_none());
    }
}
