use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::messages::ChatMessage;

/// Options controlling generation behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.7,
        }
    }
}

/// A text-generation backend: one ordered context in, one reply out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.max_tokens, 200);
        assert!((opts.temperature - 0.7).abs() < f64::EPSILON);
    }
}
