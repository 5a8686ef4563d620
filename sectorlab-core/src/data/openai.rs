//! OpenAI chat-completion client.
//!
//! Serves as both the sector classifier (one request per ticker) and the
//! headline summarizer. Requests are deterministic (`temperature = 0`) and
//! never retried: a failure aborts the caller's operation.

use super::http::{build_client, retry_after};
use super::provider::{HeadlineSummarizer, ProviderError, SectorClassifier};
use crate::config::{ApiKey, OpenAiConfig};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CLASSIFY_PROMPT: &str =
    "You are going to classify tickers in the S&P500 into sectors. Respond only with the sector.";
const SUMMARY_PROMPT: &str = "Summarize the following news headlines into key insights:\n\n";
const CLASSIFY_MAX_TOKENS: u32 = 20;
const SUMMARY_MAX_TOKENS: u32 = 200;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Blocking chat-completion client.
pub struct OpenAiClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig, api_key: ApiKey) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.request_timeout_secs)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request<'a>(&'a self, messages: Vec<ChatMessage<'a>>, max_tokens: u32) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
            max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }

    /// Send one completion request and return the trimmed reply.
    fn complete(&self, body: &ChatRequest<'_>) -> Result<String, ProviderError> {
        let url = self.completions_url();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(body)
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthenticationRequired(
                "chat-completion API rejected the API key".into(),
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after(&resp),
            });
        }
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            debug!(status = status.as_u16(), %detail, "chat-completion request failed");
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let text = resp.text()?;
        parse_completion(&text)
    }
}

/// Content of the first choice, trimmed.
fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let resp: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ResponseFormatChanged(format!("chat completion: {e}")))?;

    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ProviderError::ResponseFormatChanged("no message content in choices".into()))
}

fn summary_prompt(headlines: &[String]) -> String {
    format!("{SUMMARY_PROMPT}{}", headlines.join("\n"))
}

impl SectorClassifier for OpenAiClient {
    fn classify(&self, ticker: &str) -> Result<String, ProviderError> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: CLASSIFY_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: ticker,
            },
        ];
        self.complete(&self.request(messages, CLASSIFY_MAX_TOKENS))
    }
}

impl HeadlineSummarizer for OpenAiClient {
    fn summarize(&self, headlines: &[String]) -> Result<String, ProviderError> {
        let prompt = summary_prompt(headlines);
        let messages = vec![ChatMessage {
            role: "system",
            content: &prompt,
        }];
        self.complete(&self.request(messages, SUMMARY_MAX_TOKENS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::http::test_server::{refused_url, CannedServer};

    fn client() -> OpenAiClient {
        OpenAiClient::new(&OpenAiConfig::default(), ApiKey::new("sk-test")).unwrap()
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"  Utilities\n"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Utilities");
    }

    #[test]
    fn unexpected_shapes_are_format_errors() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
            r#"{"object":"list"}"#,
            "not json",
        ] {
            assert!(matches!(
                parse_completion(body),
                Err(ProviderError::ResponseFormatChanged(_))
            ));
        }
    }

    #[test]
    fn classification_request_sends_the_ticker() {
        let c = client();
        let req = c.request(
            vec![
                ChatMessage {
                    role: "system",
                    content: CLASSIFY_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "NEE",
                },
            ],
            CLASSIFY_MAX_TOKENS,
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][1]["content"], "NEE");
        assert_eq!(json["max_tokens"], 20);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["top_p"], 1.0);
    }

    #[test]
    fn summary_prompt_lists_headlines() {
        let prompt = summary_prompt(&["Rates hold".to_string(), "Chips rally".to_string()]);
        assert_eq!(
            prompt,
            "Summarize the following news headlines into key insights:\n\nRates hold\nChips rally"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let config = OpenAiConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..OpenAiConfig::default()
        };
        let c = OpenAiClient::new(&config, ApiKey::new("k")).unwrap();
        assert_eq!(c.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    fn client_at(base_url: String) -> OpenAiClient {
        let config = OpenAiConfig {
            base_url,
            request_timeout_secs: Some(5),
            ..OpenAiConfig::default()
        };
        OpenAiClient::new(&config, ApiKey::new("sk-test")).unwrap()
    }

    #[test]
    fn classify_over_http() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" Utilities "}}]}"#;
        let server = CannedServer::start("200 OK", &[("Content-Type", "application/json")], body);

        let sector = client_at(format!("{}/v1", server.base_url)).classify("NEE").unwrap();
        assert_eq!(sector, "Utilities");

        let request = server.request();
        assert!(request.starts_with("POST /v1/chat/completions HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""content":"NEE""#));
    }

    #[test]
    fn unauthorized_is_authentication_required() {
        let server = CannedServer::start(
            "401 Unauthorized",
            &[],
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        );
        let err = client_at(server.base_url.clone()).classify("NEE").unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationRequired(_)));
    }

    #[test]
    fn too_many_requests_reads_retry_after() {
        let server = CannedServer::start("429 Too Many Requests", &[("Retry-After", "5")], "");
        let err = client_at(server.base_url.clone()).classify("NEE").unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 5 }));
    }

    #[test]
    fn too_many_requests_defaults_to_a_minute() {
        let server = CannedServer::start("429 Too Many Requests", &[], "");
        let err = client_at(server.base_url.clone()).classify("NEE").unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 60 }));
    }

    #[test]
    fn server_error_is_http_status() {
        let server = CannedServer::start(
            "503 Service Unavailable",
            &[],
            r#"{"error":{"message":"overloaded"}}"#,
        );
        let err = client_at(server.base_url.clone()).classify("NEE").unwrap_err();
        match err {
            ProviderError::HttpStatus { status, url } => {
                assert_eq!(status, 503);
                assert!(url.ends_with("/chat/completions"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_format_error() {
        let server = CannedServer::start("200 OK", &[], r#"{"choices":[]}"#);
        let err = client_at(server.base_url.clone()).classify("NEE").unwrap_err();
        assert!(matches!(err, ProviderError::ResponseFormatChanged(_)));
    }

    #[test]
    fn refused_connection_is_network_unreachable() {
        let err = client_at(refused_url()).classify("NEE").unwrap_err();
        assert!(matches!(err, ProviderError::NetworkUnreachable(_)));
    }
}
