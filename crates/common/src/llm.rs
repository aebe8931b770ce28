//! Completion-API client and wire types

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::ChatError;

/// The completion function boundary: an ordered message list plus a
/// sampling temperature in, generated text out.
///
/// `ChatSession` is generic over this trait so tests can drive it with a
/// scripted backend instead of the network.
pub trait Completion: Send + Sync {
    fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> impl std::future::Future<Output = Result<String, ChatError>> + Send;
}

impl<C: Completion> Completion for std::sync::Arc<C> {
    fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> impl std::future::Future<Output = Result<String, ChatError>> + Send {
        (**self).complete(messages, temperature)
    }
}

/// Client for OpenAI-compatible chat completion APIs
#[derive(Debug, Clone)]
pub struct LlmClient {
    api_key: String,
    model: String,
    base_url: String,
}

/// Chat message on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

/// Response choice
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

/// Response message; content may be absent on malformed provider output
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl LlmClient {
    /// Create a new completion client
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
        }
    }

    /// Send a chat completion request
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let client = reqwest::Client::new();

        debug!(
            "Sending completion request with {} messages",
            request.messages.len()
        );

        let url = format!("{}/chat/completions", self.base_url);
        let response = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Api(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Completion API error {}: {}", status, body);
            return Err(ChatError::Api(format!("{} - {}", status, body)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ChatError::Api(format!("Failed to read response: {}", e)))?;

        debug!("Completion raw response: {}", response_text);

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::Api(format!("Failed to parse response: {}", e)))?;

        Ok(chat_response)
    }

    /// Pull the reply text out of a response. A successful response with no
    /// content, or whitespace-only content, counts as an API failure.
    fn extract_reply(response: ChatResponse) -> Result<String, ChatError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let reply = content.trim();
        if reply.is_empty() {
            return Err(ChatError::Api("Empty reply from completion API".to_string()));
        }

        Ok(reply.to_string())
    }
}

impl Completion for LlmClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature,
        };

        let response = self.chat_completion(request).await?;
        Self::extract_reply(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply_trims_content() {
        let response = ChatResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some("  hello there \n".to_string()),
                },
            }],
        };

        assert_eq!(LlmClient::extract_reply(response).unwrap(), "hello there");
    }

    #[test]
    fn test_extract_reply_rejects_missing_content() {
        let response = ChatResponse {
            choices: vec![Choice {
                message: ResponseMessage { content: None },
            }],
        };

        assert!(matches!(
            LlmClient::extract_reply(response),
            Err(ChatError::Api(_))
        ));
    }

    #[test]
    fn test_extract_reply_rejects_blank_content() {
        let response = ChatResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some("   \n".to_string()),
                },
            }],
        };

        assert!(matches!(
            LlmClient::extract_reply(response),
            Err(ChatError::Api(_))
        ));
    }

    #[test]
    fn test_extract_reply_rejects_no_choices() {
        let response = ChatResponse { choices: vec![] };

        assert!(matches!(
            LlmClient::extract_reply(response),
            Err(ChatError::Api(_))
        ));
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = ChatRequest {
            model: "gpt-4.1-mini".to_string(),
            messages: vec![ChatMessage::system("be kind"), ChatMessage::user("hi")],
            temperature: 0.5,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4.1-mini");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
