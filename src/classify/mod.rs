//! Classifier boundary: provider abstraction + file cache + daily budget.
//!
//! The engine consumes the classifier as a black box that turns one
//! statement's text into sentence/topic/score/weight/reasoning records, or
//! an explicit failure. Retry/backoff is the orchestrator's business; this
//! module never retries.

pub mod openai;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::sentiment::{SentenceScore, Topic};

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Trait object used by the batch job and tests.
#[async_trait]
pub trait ToneClassifier: Send + Sync {
    /// Classify one statement into sentence scores. Zero sentences is a
    /// valid answer; a failure is explicit, never an empty default.
    async fn classify(&self, text: &str) -> Result<Vec<SentenceScore>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn ToneClassifier>;

/// Config loaded from `config/classifier.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub enabled: bool,
    /// "openai" (case-insensitive); anything else builds a disabled client.
    pub provider: Option<String>,
    /// Optional per-day real-call budget; defaults to 20 if absent.
    pub daily_limit: Option<u32>,
    /// Model override for the provider.
    pub model: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: None,
            daily_limit: Some(20),
            model: None,
        }
    }
}

/// Load config from `config/classifier.json`; defaults on any failure.
pub fn load_classifier_config() -> ClassifierConfig {
    let path = Path::new("config/classifier.json");
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ClassifierConfig::default(),
    }
}

/// Factory: build a classifier according to config and environment.
///
/// * If `CLASSIFY_TEST_MODE=mock`, returns a deterministic mock.
/// * Else if `config.enabled == false`, returns a disabled client.
/// * Else builds the real provider wrapped with caching + daily budget.
pub fn build_classifier(config: &ClassifierConfig) -> DynClassifier {
    if std::env::var("CLASSIFY_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockClassifier::default());
    }

    if !config.enabled {
        return Arc::new(DisabledClassifier);
    }

    match config
        .provider
        .as_deref()
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("openai") => {
            let provider = openai::OpenAiProvider::new(config.model.as_deref());
            Arc::new(CachingClassifier::new(
                provider,
                default_cache_dir(),
                config.daily_limit.unwrap_or(20),
            ))
        }
        _ => Arc::new(DisabledClassifier),
    }
}

// ------------------------------------------------------------
// Provider abstraction
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call. Separated so the caching
/// wrapper serves production and tests alike.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    async fn fetch(&self, text: &str) -> Result<Vec<SentenceScore>>;
    fn name(&self) -> &'static str;
}

/// Always fails; used when classification is switched off.
pub struct DisabledClassifier;

#[async_trait]
impl ToneClassifier for DisabledClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<SentenceScore>> {
        Err(anyhow!("classifier disabled"))
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic classifier for tests and local runs. Scores lean mildly
/// hawkish so downstream series have shape.
#[derive(Clone)]
pub struct MockClassifier {
    pub fixed: Vec<SentenceScore>,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self {
            fixed: vec![
                SentenceScore {
                    text: "The committee judges that further tightening may be appropriate.".into(),
                    topic: Topic::Guidance,
                    score: 0.45,
                    weight: 1.0,
                    reasoning: "clear stance, active verb (mock)".into(),
                },
                SentenceScore {
                    text: "This statement reflects the committee's mandate.".into(),
                    topic: Topic::Boilerplate,
                    score: 0.0,
                    weight: 0.0,
                    reasoning: "boilerplate (mock)".into(),
                },
            ],
        }
    }
}

#[async_trait]
impl ToneClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<SentenceScore>> {
        Ok(self.fixed.clone())
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching wrapper (file cache + daily budget)
// ------------------------------------------------------------

/// Counter state is guarded by a `Mutex` to keep it simple and safe.
pub struct CachingClassifier<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> CachingClassifier<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        let _ = fs::create_dir_all(&cache_dir);
        let counter = Mutex::new(load_daily_counter(&cache_dir).unwrap_or_default());
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    async fn classify_impl(&self, text: &str) -> Result<Vec<SentenceScore>> {
        // 1) Cache lookup first; hits never touch the budget, so repeated
        //    batch runs over the same transcripts stay free.
        let key = cache_key(text);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            return Ok(hit);
        }

        // 2) Daily budget.
        {
            let mut g = self.counter.lock().expect("poisoned counter");
            if g.is_expired() {
                g.reset_to_today();
                let _ = save_daily_counter(&self.cache_dir, &g);
            }
            if g.count >= self.daily_limit_max {
                return Err(anyhow!(
                    "daily classifier budget exhausted ({})",
                    self.daily_limit_max
                ));
            }
        }

        // 3) Real call; increment only on success.
        let fresh = self.inner.fetch(text).await?;
        let _ = write_cache_file(&self.cache_dir, &key, &fresh);
        let mut g = self.counter.lock().expect("poisoned counter");
        g.count = g.count.saturating_add(1);
        let _ = save_daily_counter(&self.cache_dir, &g);
        Ok(fresh)
    }
}

#[async_trait]
impl<P: Provider> ToneClassifier for CachingClassifier<P> {
    async fn classify(&self, text: &str) -> Result<Vec<SentenceScore>> {
        self.classify_impl(text).await
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/classifier")
}

fn cache_key(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    // 16 hex chars is plenty for a filename key.
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<Vec<SentenceScore>> {
    let s = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&s).ok()
}

fn write_cache_file(dir: &Path, key: &str, value: &[SentenceScore]) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}
