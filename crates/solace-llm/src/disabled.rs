use async_trait::async_trait;

use solace_core::errors::GatewayError;
use solace_core::messages::ChatMessage;
use solace_core::provider::{GenerationOptions, TextGenerator};

/// Stand-in used when no API key is configured. Every call fails, so every
/// turn is answered with the fallback reply.
pub struct DisabledGenerator {
    reason: String,
}

impl DisabledGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    fn model(&self) -> &str {
        "none"
    }

    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::Unavailable(self.reason.clone()))
    }
}
