use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use solace_core::errors::GatewayError;
use solace_core::messages::ChatMessage;
use solace_core::provider::{GenerationOptions, TextGenerator};

/// Pre-programmed responses for deterministic testing without API calls.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this reply text.
    Text(String),
    /// Fail the call with this error.
    Error(GatewayError),
    /// Wait a duration, then resolve the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    /// Convenience: wrap any response with a delay.
    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Generator that replays queued responses in order and records every
/// context it was handed.
pub struct MockGenerator {
    responses: Mutex<VecDeque<MockResponse>>,
    repeat: Option<MockResponse>,
    received: Mutex<Vec<Vec<ChatMessage>>>,
    call_count: AtomicUsize,
}

impl MockGenerator {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            received: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Answer every call with the same response.
    pub fn always(response: MockResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Contexts passed to `complete`, in call order.
    pub fn received(&self) -> Vec<Vec<ChatMessage>> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.received.lock().push(messages.to_vec());

        let next = self.responses.lock().pop_front();
        let response = match next.or_else(|| self.repeat.clone()) {
            Some(response) => response,
            None => {
                return Err(GatewayError::InvalidRequest(format!(
                    "MockGenerator: no response configured for call {idx}"
                )))
            }
        };

        resolve_response(response).await
    }
}

/// Unrolls nested delays iteratively to avoid recursive async.
async fn resolve_response(response: MockResponse) -> Result<String, GatewayError> {
    let mut current = response;
    loop {
        match current {
            MockResponse::Text(text) => return Ok(text),
            MockResponse::Error(e) => return Err(e),
            MockResponse::Delay(duration, inner) => {
                tokio::time::sleep(duration).await;
                current = *inner;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("hi")]
    }

    #[tokio::test]
    async fn text_response() {
        let mock = MockGenerator::new(vec![MockResponse::text("hello world")]);
        let reply = mock.complete(&context(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(reply, "hello world");
    }

    #[tokio::test]
    async fn error_response() {
        let mock = MockGenerator::new(vec![MockResponse::Error(
            GatewayError::AuthenticationFailed("bad".into()),
        )]);
        let result = mock.complete(&context(), &GenerationOptions::default()).await;
        assert_eq!(result, Err(GatewayError::AuthenticationFailed("bad".into())));
    }

    #[tokio::test]
    async fn sequential_responses_and_recording() {
        let mock = MockGenerator::new(vec![MockResponse::text("first"), MockResponse::text("second")]);

        let first = mock.complete(&context(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(first, "first");
        assert_eq!(mock.call_count(), 1);

        let second = mock
            .complete(&[ChatMessage::user("again")], &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(second, "second");
        assert_eq!(mock.call_count(), 2);

        let received = mock.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], context());
        assert_eq!(received[1], vec![ChatMessage::user("again")]);
    }

    #[tokio::test]
    async fn exhausted_responses() {
        let mock = MockGenerator::new(vec![MockResponse::text("only one")]);
        let _ = mock.complete(&context(), &GenerationOptions::default()).await;
        let result = mock.complete(&context(), &GenerationOptions::default()).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn always_repeats() {
        let mock = MockGenerator::always(MockResponse::text("same"));
        for _ in 0..3 {
            let reply = mock.complete(&context(), &GenerationOptions::default()).await.unwrap();
            assert_eq!(reply, "same");
        }
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn provider_properties() {
        let mock = MockGenerator::new(vec![]);
        assert_eq!(mock.name(), "mock");
        assert_eq!(mock.model(), "mock-model");
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_response() {
        let mock = MockGenerator::new(vec![MockResponse::delayed(
            Duration::from_secs(5),
            MockResponse::text("after delay"),
        )]);

        let start = tokio::time::Instant::now();
        let reply = mock.complete(&context(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(reply, "after delay");
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_error() {
        let mock = MockGenerator::new(vec![MockResponse::delayed(
            Duration::from_millis(20),
            MockResponse::Error(GatewayError::RateLimited),
        )]);
        let result = mock.complete(&context(), &GenerationOptions::default()).await;
        assert_eq!(result, Err(GatewayError::RateLimited));
    }
}
