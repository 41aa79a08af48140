// src/ingest/mod.rs
pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::ingest::types::{TranscriptEvent, TranscriptProvider};
use crate::store::TranscriptStore;

/// Statements shorter than this after cleanup carry no classifiable
/// content and are discarded.
pub const MIN_TEXT_LEN: usize = 200;

/// Similarity above which two same-bank texts count as the same statement
/// republished under a different URL.
const NEAR_DUP_THRESHOLD: f64 = 0.92;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_transcripts_total",
            "Transcripts parsed from providers."
        );
        describe_counter!(
            "ingest_stored_total",
            "Transcripts stored after cleanup + dedup."
        );
        describe_counter!(
            "ingest_skipped_total",
            "Transcripts dropped (too short, duplicate URL, near-duplicate text)."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

/// Normalize statement text: decode entities, strip markup and control
/// characters, straighten typographic quotes, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Control characters and zero-width junk → space
    out = out
        .chars()
        .map(|c| {
            if c.is_control() || c == '\u{a0}' || c == '\u{200b}' {
                ' '
            } else {
                c
            }
        })
        .collect();

    // 4) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 5) Collapse dash/underscore runs left by markup separators
    static RE_RUNS: OnceCell<regex::Regex> = OnceCell::new();
    let re_runs = RE_RUNS.get_or_init(|| regex::Regex::new(r"[-–—_*#]{2,}").unwrap());
    out = re_runs.replace_all(&out, " ").to_string();

    // 6) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Gate on the release title: only rate/policy statements pass.
pub fn is_policy_title(title: &str) -> bool {
    let t = title.to_ascii_lowercase();
    ["interest rate", "monetary policy", "statement", "policy rate"]
        .iter()
        .any(|k| t.contains(k))
}

/// True when `text` is a near-duplicate of any same-bank text already
/// stored. Press offices republish statements under fresh URLs; URL dedup
/// alone would double-count the date.
pub fn is_near_duplicate(bank: &str, text: &str, existing: &[(String, String)]) -> bool {
    existing
        .iter()
        .filter(|(b, _)| b == bank)
        .any(|(_, t)| strsim::normalized_levenshtein(t, text) >= NEAR_DUP_THRESHOLD)
}

/// Outcome counts for one ingest run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    pub stored: usize,
    pub skipped_short: usize,
    pub skipped_duplicate: usize,
}

/// Run ingest once: fetch every provider, clean, filter, dedup, store.
/// Provider failures are logged and counted, never fatal to the run.
pub async fn run_once(
    providers: &[Box<dyn TranscriptProvider>],
    store: &dyn TranscriptStore,
) -> anyhow::Result<IngestOutcome> {
    ensure_metrics_described();

    // Providers already count parsed items into ingest_transcripts_total.
    let mut raw: Vec<TranscriptEvent> = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => raw.append(&mut v),
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    let mut outcome = IngestOutcome::default();
    let mut existing = store.transcript_texts().await?;

    for ev in raw {
        let text = clean_text(&ev.text);
        if text.len() < MIN_TEXT_LEN {
            outcome.skipped_short += 1;
            continue;
        }
        if is_near_duplicate(&ev.bank, &text, &existing) {
            outcome.skipped_duplicate += 1;
            continue;
        }
        match store
            .insert_transcript(&ev.bank, ev.published_on, &ev.url, &text)
            .await?
        {
            Some(_) => {
                existing.push((ev.bank.clone(), text));
                outcome.stored += 1;
            }
            None => outcome.skipped_duplicate += 1, // URL already present
        }
    }

    counter!("ingest_stored_total").increment(outcome.stored as u64);
    counter!("ingest_skipped_total")
        .increment((outcome.skipped_short + outcome.skipped_duplicate) as u64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_markup_and_collapses_ws() {
        let s = "  <p>Rates&nbsp;held.</p>\u{200b}  Growth “solid” --- steady.  ";
        let out = clean_text(s);
        assert_eq!(out, "Rates held. Growth \"solid\" steady.");
    }

    #[test]
    fn clean_text_drops_control_characters() {
        let s = "Rates\x07 held\x1f steady";
        assert_eq!(clean_text(s), "Rates held steady");
    }

    #[test]
    fn policy_title_gate() {
        assert!(is_policy_title("Bank of Canada maintains policy rate"));
        assert!(is_policy_title("FOMC statement"));
        assert!(is_policy_title("Interest rate announcement"));
        assert!(!is_policy_title("Annual museum exhibit opens"));
    }

    #[test]
    fn near_duplicate_detects_republished_statement() {
        let stored = vec![(
            "Fed".to_string(),
            "The Committee decided to maintain the target range for the federal funds rate."
                .to_string(),
        )];
        let near =
            "The Committee decided to maintain the target range for the federal funds rate!";
        let fresh = "The Committee decided to raise the target range by 25 basis points given persistent inflation pressure.";
        assert!(is_near_duplicate("Fed", near, &stored));
        assert!(!is_near_duplicate("Fed", fresh, &stored));
        // Same text from another bank is not a duplicate.
        assert!(!is_near_duplicate("BoC", near, &stored));
    }
}
