//! OpenAI provider for sentence-level stance classification.
//! Requires `OPENAI_API_KEY`; a missing key fails loudly rather than
//! returning a plausible-looking empty batch.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::sentiment::SentenceScore;

use super::Provider;

const SYSTEM_PROMPT: &str = "You are a high-precision macro sentiment engine. \
You do not use rounded numbers, you provide justified scores. \
Respond with a JSON object: {\"sentences\": [{\"text\", \"topic\", \"score\", \"weight\", \"reasoning\"}]}.";

pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// `model_override`: pass Some("gpt-4o-mini") to override; defaults to
    /// gpt-4o-mini.
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("dovetail-terminal/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or("gpt-4o-mini").to_string();
        Self {
            http,
            api_key,
            model,
        }
    }

    fn user_prompt(text: &str) -> String {
        format!(
            "Analyze this central bank paragraph sentence-by-sentence as a Senior Macro Quant.\n\
             \n\
             1. Assign weights:\n\
             - 1.0: Interest Rate Guidance & Inflation (Critical)\n\
             - 0.7: Employment & GDP Growth (Important)\n\
             - 0.4: Global Risks / External Factors (Secondary)\n\
             - 0.0: Boilerplate\n\
             \n\
             2. Assign score: a float between -1.0 (dovish) and 1.0 (hawkish).\n\
             Use this intensity scale:\n\
             - ±0.1 to 0.3: Subtle lean. Cautious modality (\"noted\", \"monitored\", \"appears\").\n\
             - ±0.4 to 0.6: Clear stance. Active verbs (\"expects\", \"indicates\", \"projected\").\n\
             - ±0.7 to 0.9: Aggressive signal. Urgent adjectives (\"essential\", \"robust\", \"deteriorating\").\n\
             \n\
             3. Before scoring, identify directionality, modality, and adverb intensity in `reasoning`.\n\
             Topic must be one of: Inflation, Growth, Employment, Guidance, Boilerplate.\n\
             \n\
             Paragraph: {text}"
        )
    }
}

/// Shape of the JSON object the model is instructed to return.
#[derive(Debug, Deserialize)]
struct ParagraphAnalysis {
    sentences: Vec<SentenceScore>,
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn fetch(&self, text: &str) -> Result<Vec<SentenceScore>> {
        if self.api_key.is_empty() {
            return Err(anyhow!("OPENAI_API_KEY not set"));
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Format<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            response_format: Format<'a>,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let user = Self::user_prompt(text);
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.2,
            response_format: Format { kind: "json_object" },
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("classifier request")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("classifier returned {status}"));
        }

        let body: Resp = resp.json().await.context("classifier response body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        parse_paragraph(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Strict parse of the model's JSON content. Unknown topics or missing
/// fields are malformed records, not something to paper over.
pub fn parse_paragraph(content: &str) -> Result<Vec<SentenceScore>> {
    let parsed: ParagraphAnalysis =
        serde_json::from_str(content).context("parsing classifier JSON content")?;
    Ok(parsed.sentences)
}
