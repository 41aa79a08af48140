// tests/providers_fed.rs
//
// Fixture-driven tests for the Fed press-feed provider: policy-title
// gating, date reduction, and text assembly.

use chrono::NaiveDate;

use dovetail_terminal::ingest::providers::fed::FedPressProvider;
use dovetail_terminal::ingest::types::TranscriptProvider;

const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Press Releases - Monetary Policy</title>
    <item>
      <title>Federal Reserve issues FOMC statement</title>
      <link>https://www.federalreserve.gov/newsevents/pressreleases/monetary20240131a.htm</link>
      <pubDate>Wed, 31 Jan 2024 19:00:00 +0000</pubDate>
      <description>The Committee decided to maintain the target range for the federal funds rate at 5-1/4 to 5-1/2 percent. Recent indicators suggest that economic activity has been expanding at a solid pace.</description>
    </item>
    <item>
      <title>Federal Reserve Board announces museum exhibit</title>
      <link>https://www.federalreserve.gov/newsevents/pressreleases/other20240130a.htm</link>
      <pubDate>Tue, 30 Jan 2024 15:00:00 +0000</pubDate>
      <description>Unrelated announcement.</description>
    </item>
    <item>
      <title>FOMC statement with no usable date</title>
      <link>https://www.federalreserve.gov/newsevents/pressreleases/monetary-undated.htm</link>
      <pubDate>sometime soon</pubDate>
      <description>Would otherwise pass the gate.</description>
    </item>
  </channel>
</rss>"#;

#[tokio::test]
async fn fixture_feed_keeps_only_dated_policy_items() {
    let provider = FedPressProvider::from_fixture_str(FIXTURE);
    let events = provider.fetch_latest().await.unwrap();

    assert_eq!(events.len(), 1, "museum item and undated item are dropped");
    let ev = &events[0];
    assert_eq!(ev.bank, "Fed");
    assert_eq!(
        ev.published_on,
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    );
    assert!(ev.url.ends_with("monetary20240131a.htm"));
    assert!(ev.text.starts_with("Federal Reserve issues FOMC statement."));
    assert!(ev.text.contains("maintain the target range"));
}

#[tokio::test]
async fn malformed_xml_is_an_error_not_empty() {
    let provider = FedPressProvider::from_fixture_str("<rss><channel><item></rss>");
    assert!(provider.fetch_latest().await.is_err());
}

#[tokio::test]
async fn provider_reports_its_name() {
    let provider = FedPressProvider::from_fixture_str(FIXTURE);
    assert_eq!(provider.name(), "Fed");
}
