//! Blocking chat-completion client.

use crate::config::GenerationSettings;
use crate::prompt::Prompts;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("the API rejected the key (status {0})")]
    Auth(u16),

    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("the response contained no story")]
    EmptyResponse,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GenerationError {
    /// One line for the status bar.
    pub fn user_message(&self) -> String {
        format!("Story generation failed: {}", self)
    }
}

/// Anything that can turn built prompts into a story.
pub trait StoryGenerator {
    fn generate(&self, api_key: &str, prompts: &Prompts) -> Result<String, GenerationError>;
}

pub struct OpenAiClient {
    client: Client,
    api_base: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        DEFAULT_MAX_TOKENS
    }

    fn build_headers(api_key: &str) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| GenerationError::Config(format!("invalid API key: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn build_request<'a>(&'a self, prompts: &'a Prompts) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: &prompts.system,
                },
                ApiMessage {
                    role: "user",
                    content: &prompts.user,
                },
            ],
            temperature: prompts.temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl StoryGenerator for OpenAiClient {
    fn generate(&self, api_key: &str, prompts: &Prompts) -> Result<String, GenerationError> {
        let headers = Self::build_headers(api_key)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .headers(headers)
            .json(&self.build_request(prompts))
            .send()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body = response
            .text()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        parse_completion(&body)
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

fn status_error(status: StatusCode, body: &str) -> GenerationError {
    // the API wraps failures as {"error": {"message": ...}}
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Auth(status.as_u16()),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        _ => GenerationError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GenerationSettings {
        GenerationSettings::default()
    }

    fn prompts() -> Prompts {
        Prompts {
            system: "be a writer".to_string(),
            user: "write about cats".to_string(),
            temperature: 0.7,
        }
    }

    #[test]
    fn request_body_has_fixed_model_and_ceiling() {
        let client = OpenAiClient::new(&settings()).unwrap();
        let p = prompts();
        let body = serde_json::to_value(client.build_request(&p)).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be a writer");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "write about cats");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn trailing_slash_in_base_is_dropped() {
        let mut s = settings();
        s.api_base = "http://localhost:8080/v1/".to_string();
        let client = OpenAiClient::new(&s).unwrap();
        assert_eq!(client.api_base, "http://localhost:8080/v1");
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Once upon a time."}},
                       {"message":{"role":"assistant","content":"ignored"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Once upon a time.");
    }

    #[test]
    fn no_choices_is_empty_response() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        assert!(matches!(parse_completion("<html>"), Err(GenerationError::Parse(_))));
    }

    #[test]
    fn statuses_map_to_kinds() {
        let quota = r#"{"error":{"message":"You exceeded your current quota"}}"#;
        match status_error(StatusCode::TOO_MANY_REQUESTS, quota) {
            GenerationError::RateLimited(m) => assert_eq!(m, "You exceeded your current quota"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            GenerationError::Auth(401)
        ));
        match status_error(StatusCode::BAD_GATEWAY, "upstream down\n") {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn newline_in_key_is_config_error() {
        assert!(matches!(
            OpenAiClient::build_headers("sk-\nbad"),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn user_message_is_one_line() {
        let msg = GenerationError::Auth(401).user_message();
        assert_eq!(msg, "Story generation failed: the API rejected the key (status 401)");
    }
}
