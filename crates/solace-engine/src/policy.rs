use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use solace_core::errors::GatewayError;
use solace_core::ids::SessionId;
use solace_core::messages::ChatMessage;
use solace_core::provider::{GenerationOptions, TextGenerator};
use solace_store::messages::NewMessage;

use crate::context::ContextAssembler;
use crate::crisis::CrisisDetector;
use crate::error::EngineError;
use crate::resources::{Resource, ResourceCatalog, ResourceCategory};
use crate::sentiment::{SentimentResult, SentimentScorer};
use crate::store::ConversationStore;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

pub const CRISIS_FALLBACK: &str = "I'm here to listen and support you. Please reach out to a crisis helpline immediately if you're having thoughts of self-harm. You can call 988 (Suicide Prevention Lifeline) or text HOME to 741741. Your life has value and there are people who want to help.";

pub const GENERIC_FALLBACK: &str = "I'm here to support you, though I'm having trouble generating a response right now. Remember that it's always okay to reach out to a mental health professional if you need additional support.";

pub fn fallback_reply(crisis_detected: bool) -> &'static str {
    if crisis_detected {
        CRISIS_FALLBACK
    } else {
        GENERIC_FALLBACK
    }
}

/// Phases of a single chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Scoring,
    ContextBuilding,
    Generating,
    Succeeded,
    FallbackUsed,
}

/// Externally observed result of a chat turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolicyOutcome {
    pub reply: String,
    pub session_id: SessionId,
    pub crisis_detected: bool,
    pub sentiment: SentimentResult,
    /// Present iff `crisis_detected`.
    pub resources: Option<&'static [Resource]>,
    /// `Succeeded` or `FallbackUsed`.
    pub state: TurnState,
}

/// Orchestrates one turn: score, detect, build context, persist, generate
/// (or fall back), persist the reply.
pub struct ResponsePolicy {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn ConversationStore>,
    assembler: ContextAssembler,
    scorer: SentimentScorer,
    detector: CrisisDetector,
    catalog: ResourceCatalog,
    options: GenerationOptions,
    timeout: Duration,
}

impl ResponsePolicy {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            generator,
            assembler: ContextAssembler::new(Arc::clone(&store)),
            store,
            scorer: SentimentScorer::new(),
            detector: CrisisDetector::new(),
            catalog: ResourceCatalog::standard(),
            options: GenerationOptions::default(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the built-in lexicon scorer, e.g. with one loaded from a
    /// VADER lexicon file.
    pub fn with_scorer(mut self, scorer: SentimentScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// Runs a full turn for an existing session. The user message is stored
    /// before generation is attempted; generation failures never surface
    /// here.
    #[instrument(skip(self, text), fields(session_id = %session_id, model = self.generator.model()))]
    pub async fn respond(&self, session_id: &SessionId, text: &str) -> Result<PolicyOutcome, EngineError> {
        if !self.store.session_exists(session_id).await? {
            return Err(EngineError::SessionNotFound(session_id.to_string()));
        }

        debug!(state = ?TurnState::Scoring);
        let sentiment = self.scorer.score(text);
        let crisis_detected = self.detector.is_crisis(text);
        if crisis_detected {
            info!(crisis_detected, "crisis language detected");
        }

        debug!(state = ?TurnState::ContextBuilding);
        let context = self.assembler.build_context(session_id, text, crisis_detected).await?;

        self.store.append(NewMessage {
            session_id: session_id.clone(),
            content: text.to_string(),
            is_user: true,
            sentiment_score: Some(sentiment.compound),
            sentiment_label: Some(sentiment.label.as_str().to_string()),
            crisis_detected,
        })
        .await?;

        debug!(state = ?TurnState::Generating, turns = context.len());
        let (reply, state) = match self.generate(&context).await {
            Ok(reply) => (reply, TurnState::Succeeded),
            Err(e) => {
                error!(error = %e, kind = e.error_kind(), "generation failed, using fallback reply");
                (fallback_reply(crisis_detected).to_string(), TurnState::FallbackUsed)
            }
        };

        self.store
            .append(NewMessage::assistant(session_id.clone(), reply.clone()))
            .await?;
        self.store.touch_session(session_id).await?;

        Ok(PolicyOutcome {
            reply,
            session_id: session_id.clone(),
            crisis_detected,
            sentiment,
            resources: crisis_detected.then(|| self.catalog.category(ResourceCategory::Crisis)),
            state,
        })
    }

    /// One bounded attempt; the returned text is trimmed and non-empty.
    async fn generate(&self, context: &[ChatMessage]) -> Result<String, GatewayError> {
        let reply = tokio::time::timeout(self.timeout, self.generator.complete(context, &self.options))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        let trimmed = reply.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::MalformedResponse("empty reply".into()));
        }
        Ok(trimmed.to_string())
    }
}
