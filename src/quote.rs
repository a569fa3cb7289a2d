//! Decorative level-up quotes
//!
//! A generative-text call supplies a short encouragement line when a level is
//! cleared. The public entry point [`fetch_encouragement_quote`] never fails:
//! a missing key, network error or odd reply all degrade to a canned line.

use std::future::Future;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown before the first level is cleared
pub const INITIAL_QUOTE: &str = "Ready for adventure!";

/// Used when the model answers with nothing
pub const DEFAULT_QUOTE: &str = "The Magic of Friendship is always with you!";

/// Picked at random when the service is unavailable
pub const FALLBACK_QUOTES: [&str; 5] = [
    "The Magic of Friendship is always with you!",
    "Friendship is magic!",
    "You got this, friend!",
    "Keep shining bright!",
    "Magic awaits the curious!",
];

const PROMPT: &str = "Generate a short, enthusiastic, one-sentence magic or friendship quote \
inspired by Twilight Sparkle from My Little Pony to encourage a player in an arcade game. \
Keep it under 15 words.";

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Quote service preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    /// Off means always use the fallback lines
    pub enabled: bool,
    /// Base URL of the models API
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gemini-3-flash-preview".to_string(),
            temperature: 0.8,
            top_p: 0.9,
        }
    }
}

/// Why a quote could not be generated
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote service disabled")]
    Disabled,
    #[error("no API key configured")]
    MissingApiKey,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service answered with HTTP {0}")]
    Status(u16),
    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that can produce a quote
pub trait QuoteSource {
    fn generate(&self) -> impl Future<Output = Result<String, QuoteError>>;
}

/// Fetch a quote, falling back to a canned line on any failure.
///
/// An empty reply yields [`DEFAULT_QUOTE`]; errors yield a random entry from
/// [`FALLBACK_QUOTES`].
pub async fn fetch_encouragement_quote<S: QuoteSource, R: Rng>(source: &S, rng: &mut R) -> String {
    match source.generate().await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                DEFAULT_QUOTE.to_string()
            } else {
                text.to_string()
            }
        }
        Err(QuoteError::Disabled | QuoteError::MissingApiKey) => fallback_quote(rng).to_string(),
        Err(e) => {
            log::warn!("Quote service error: {}", e);
            fallback_quote(rng).to_string()
        }
    }
}

/// Uniformly random canned line
pub fn fallback_quote(rng: &mut impl Rng) -> &'static str {
    FALLBACK_QUOTES[rng.random_range(0..FALLBACK_QUOTES.len())]
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: [Content; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    settings: QuoteSettings,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, settings: QuoteSettings) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self { api_key, settings }
    }

    /// Key from the build (wasm32) or the process environment (native)
    pub fn from_env(settings: QuoteSettings) -> Self {
        #[cfg(target_arch = "wasm32")]
        let key = option_env!("GEMINI_API_KEY").map(str::to_string);
        #[cfg(not(target_arch = "wasm32"))]
        let key = std::env::var("GEMINI_API_KEY").ok();
        Self::new(key, settings)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request URL including the key
    pub fn endpoint(&self) -> Result<String, QuoteError> {
        let key = self.api_key.as_deref().ok_or(QuoteError::MissingApiKey)?;
        Ok(format!(
            "{}/{}:generateContent?key={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model,
            key
        ))
    }

    /// JSON body for the request
    pub fn request_body(&self) -> Result<String, QuoteError> {
        let request = GenerateRequest {
            contents: [Content {
                parts: vec![Part {
                    text: PROMPT.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_p: self.settings.top_p,
            },
        };
        Ok(serde_json::to_string(&request)?)
    }

    /// Extract the reply text (all parts of the first candidate, joined)
    pub fn parse_response(body: &str) -> Result<String, QuoteError> {
        let response: GenerateResponse = serde_json::from_str(body)?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        Ok(text)
    }

    fn ready(&self) -> Result<(String, String), QuoteError> {
        if !self.settings.enabled {
            return Err(QuoteError::Disabled);
        }
        Ok((self.endpoint()?, self.request_body()?))
    }
}

#[cfg(target_arch = "wasm32")]
impl QuoteSource for GeminiClient {
    async fn generate(&self) -> Result<String, QuoteError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestInit, RequestMode, Response};

        fn js_err(value: wasm_bindgen::JsValue) -> QuoteError {
            QuoteError::Transport(format!("{:?}", value))
        }

        let (url, body) = self.ready()?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&wasm_bindgen::JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        let window = web_sys::window().ok_or_else(|| QuoteError::Transport("no window".into()))?;
        let reply = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let response: Response = reply.dyn_into().map_err(js_err)?;
        if !response.ok() {
            return Err(QuoteError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .unwrap_or_default();
        Self::parse_response(&text)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl QuoteSource for GeminiClient {
    async fn generate(&self) -> Result<String, QuoteError> {
        use reqwest::header::CONTENT_TYPE;

        fn transport_err(e: reqwest::Error) -> QuoteError {
            QuoteError::Transport(e.to_string())
        }

        let (url, body) = self.ready()?;

        // Blocking client: the headless runner drives this future with pollster, not tokio
        let response = reqwest::blocking::Client::new()
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(transport_err)?;
        if !response.status().is_success() {
            return Err(QuoteError::Status(response.status().as_u16()));
        }

        let text = response.text().map_err(transport_err)?;
        Self::parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Canned(Result<&'static str, u16>);

    impl QuoteSource for Canned {
        async fn generate(&self) -> Result<String, QuoteError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(QuoteError::Status(status)),
            }
        }
    }

    fn fetch(source: &impl QuoteSource) -> String {
        let mut rng = Pcg32::seed_from_u64(5);
        pollster::block_on(fetch_encouragement_quote(source, &mut rng))
    }

    #[test]
    fn test_reply_is_trimmed() {
        assert_eq!(fetch(&Canned(Ok("  Shine on!\n"))), "Shine on!");
    }

    #[test]
    fn test_empty_reply_uses_default() {
        assert_eq!(fetch(&Canned(Ok("   "))), DEFAULT_QUOTE);
    }

    #[test]
    fn test_errors_fall_back() {
        let quote = fetch(&Canned(Err(503)));
        assert!(FALLBACK_QUOTES.contains(&quote.as_str()));
    }

    #[test]
    fn test_missing_key_falls_back() {
        let client = GeminiClient::new(Some("  ".into()), QuoteSettings::default());
        assert!(!client.has_api_key());
        assert!(matches!(client.endpoint(), Err(QuoteError::MissingApiKey)));
        let quote = fetch(&client);
        assert!(FALLBACK_QUOTES.contains(&quote.as_str()));
    }

    #[test]
    fn test_disabled_falls_back() {
        let settings = QuoteSettings {
            enabled: false,
            ..QuoteSettings::default()
        };
        let client = GeminiClient::new(Some("key".into()), settings);
        let quote = fetch(&client);
        assert!(FALLBACK_QUOTES.contains(&quote.as_str()));
    }

    #[test]
    fn test_request_shape() {
        let client = GeminiClient::new(Some("abc".into()), QuoteSettings::default());
        assert_eq!(
            client.endpoint().unwrap(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent?key=abc"
        );

        let body: serde_json::Value = serde_json::from_str(&client.request_body().unwrap()).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], PROMPT);
        assert!((body["generationConfig"]["topP"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Friends "},{"text":"forever!"}]}}]}"#;
        assert_eq!(GeminiClient::parse_response(body).unwrap(), "Friends forever!");

        assert_eq!(GeminiClient::parse_response(r#"{"candidates":[]}"#).unwrap(), "");
        assert_eq!(GeminiClient::parse_response("{}").unwrap(), "");
        assert!(matches!(
            GeminiClient::parse_response("not json"),
            Err(QuoteError::Decode(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_unreachable_service_falls_back() {
        let settings = QuoteSettings {
            endpoint: "http://127.0.0.1:9/v1beta/models/".to_string(),
            ..QuoteSettings::default()
        };
        let client = GeminiClient::new(Some("key".into()), settings);
        assert!(
            client
                .endpoint()
                .unwrap()
                .starts_with("http://127.0.0.1:9/v1beta/models/gemini-3-flash-preview:")
        );
        assert!(matches!(
            pollster::block_on(client.generate()),
            Err(QuoteError::Transport(_))
        ));
        let quote = fetch(&client);
        assert!(FALLBACK_QUOTES.contains(&quote.as_str()));
    }

    #[test]
    fn test_fallback_is_seeded() {
        let mut a = Pcg32::seed_from_u64(11);
        let mut b = Pcg32::seed_from_u64(11);
        for _ in 0..10 {
            assert_eq!(fallback_quote(&mut a), fallback_quote(&mut b));
        }
    }
}
