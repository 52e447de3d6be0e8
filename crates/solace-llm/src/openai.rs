use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use solace_core::errors::GatewayError;
use solace_core::messages::ChatMessage;
use solace_core::provider::{GenerationOptions, TextGenerator};
use solace_core::security::ApiKey;

use crate::converter;
use crate::models;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat-completions client. One request per call, no retries; the caller
/// bounds the overall wait.
pub struct OpenAiProvider {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: ApiKey, model_name: Option<&str>) -> Result<Self, GatewayError> {
        Self::with_base_url(api_key, model_name, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: ApiKey,
        model_name: Option<&str>,
        base_url: &str,
    ) -> Result<Self, GatewayError> {
        let model = match model_name {
            Some(name) => {
                if models::find_model(name).is_none() {
                    warn!(model = name, "model not in the known-model table, using as given");
                }
                name.to_string()
            }
            None => models::default_model().name.to_string(),
        };

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages, options), fields(model = %self.model, turns = messages.len()))]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        let body = converter::build_request_body(messages, options, &self.model);

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", self.api_key.bearer())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), text));
        }

        let reply = converter::parse_completion(&text)?;
        debug!(chars = reply.len(), "completion received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::with_base_url(ApiKey::new("sk-test"), None, &server.uri()).unwrap()
    }

    fn context() -> Vec<ChatMessage> {
        vec![ChatMessage::system("be supportive"), ChatMessage::user("rough day")]
    }

    #[test]
    fn provider_properties() {
        let p = OpenAiProvider::new(ApiKey::new("sk-test"), None).unwrap();
        assert_eq!(p.name(), "openai");
        assert_eq!(p.model(), "gpt-4o-mini");
        assert_eq!(p.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn custom_model_and_trailing_slash() {
        let p = OpenAiProvider::with_base_url(
            ApiKey::new("k"),
            Some("my-finetune"),
            "http://localhost:8080/v1/",
        )
        .unwrap();
        assert_eq!(p.model(), "my-finetune");
        assert_eq!(p.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn successful_completion_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 200,
                "messages": [
                    {"role": "system", "content": "be supportive"},
                    {"role": "user", "content": "rough day"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": " That sounds hard. "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server)
            .complete(&context(), &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(reply, "That sounds hard.");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&context(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::AuthenticationFailed("bad key".into()));
    }

    #[tokio::test]
    async fn server_error_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&context(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ServerError { status: 503, .. }));
    }

    #[tokio::test]
    async fn malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&context(), &GenerationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind(), "malformed_response");
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let p = OpenAiProvider::with_base_url(ApiKey::new("k"), None, "http://127.0.0.1:1").unwrap();
        let err = p.complete(&context(), &GenerationOptions::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NetworkError(_)));
    }
}
