//! Dialog agent HTTP client (detectIntent).
//!
//! One request per user turn, non-streaming; no retry, timeout, or
//! cancellation. The caller drives exactly one call per submitted message.

use serde::{Deserialize, Serialize};

/// Client for the hosted dialog-management API.
#[derive(Clone)]
pub struct DialogClient {
    endpoint: String,
    access_token: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("dialog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("dialog api error: {0}")]
    Api(String),
}

impl DialogClient {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            access_token: access_token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// POST /v3/{session}:detectIntent — run one conversational turn.
    /// `session_name` is the fully qualified session path (see [`crate::session::Session`]).
    pub async fn detect_intent(
        &self,
        session_name: &str,
        text: &str,
        language_code: &str,
    ) -> Result<DetectIntentResponse, DialogError> {
        let url = format!("{}/v3/{}:detectIntent", self.endpoint, session_name);
        let body = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: text.to_string(),
                },
                language_code: language_code.to_string(),
            },
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DialogError::Api(format!("{} {}", status, body)));
        }
        let data: DetectIntentResponse = res.json().await?;
        Ok(data)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest {
    query_input: QueryInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryInput {
    text: TextInput,
    language_code: String,
}

#[derive(Debug, Serialize)]
struct TextInput {
    text: String,
}

/// Response for one turn. Only the fields this client consumes are typed;
/// the payload subtree is backend-defined free-form JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentResponse {
    #[serde(default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub response_messages: Vec<ResponseMessage>,
}

/// One declared message unit: plain text, a rich payload, or both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    #[serde(default)]
    pub text: Option<TextMessage>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextMessage {
    #[serde(default)]
    pub text: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_wire_shape() {
        let body = DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text: "Hi".to_string(),
                },
                language_code: "en-US".to_string(),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["queryInput"]["text"]["text"], "Hi");
        assert_eq!(value["queryInput"]["languageCode"], "en-US");
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = DialogClient::new("https://example.com/", "tok");
        assert_eq!(client.endpoint, "https://example.com");
    }

    #[test]
    fn response_parses_text_and_payload() {
        let raw = r#"{
            "queryResult": {
                "responseMessages": [
                    { "text": { "text": ["Hi"] } },
                    { "payload": { "richContent": [[]] } }
                ]
            }
        }"#;
        let response: DetectIntentResponse = serde_json::from_str(raw).unwrap();
        let messages = &response.query_result.response_messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text.as_ref().unwrap().text, ["Hi"]);
        assert!(messages[0].payload.is_none());
        assert!(messages[1].payload.is_some());
    }

    #[test]
    fn empty_response_parses_to_defaults() {
        let response: DetectIntentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.query_result.response_messages.is_empty());
    }
}
