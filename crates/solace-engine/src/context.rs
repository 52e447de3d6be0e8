use std::sync::Arc;

use tracing::instrument;

use solace_core::ids::SessionId;
use solace_core::messages::ChatMessage;
use solace_store::messages::MessageRow;
use solace_store::StoreError;

use crate::store::ConversationStore;

/// Prior turns included in every generation request.
pub const HISTORY_LIMIT: u32 = 6;

pub const SYSTEM_DIRECTIVE: &str = "\
You are a warm, empathetic peer-support companion for people who want to talk about how they feel.

Your job:
1. Listen, validate feelings and respond with empathy.
2. Offer gentle coping ideas and emotional support.
3. Encourage reaching out to a mental health professional when it could help.
4. Watch for signs of crisis and respond to them with care.

Safety rules:
- Never diagnose, and never give medical or medication advice.
- Make clear that you are not a replacement for professional help.
- If someone may be in danger, point them to immediate support resources.
- Keep replies short and kind: usually 2-3 sentences.

You are NOT a licensed therapist. You offer peer support and encourage professional help.";

pub const CRISIS_ADDENDUM: &str = "\
PRIORITY: this person may be in crisis. Put their immediate safety first, share crisis resources \
such as the 988 Suicide & Crisis Lifeline, and gently urge them to contact professional help right now.";

/// The system message for a turn, escalated when crisis language was detected.
pub fn system_directive(crisis_detected: bool) -> String {
    if crisis_detected {
        format!("{SYSTEM_DIRECTIVE}\n\n{CRISIS_ADDENDUM}")
    } else {
        SYSTEM_DIRECTIVE.to_string()
    }
}

/// Turns a newest-first history slice into the ordered generation context:
/// directive, history oldest first, then the current message.
pub fn assemble(mut newest_first: Vec<MessageRow>, current: &str, crisis_detected: bool) -> Vec<ChatMessage> {
    newest_first.truncate(HISTORY_LIMIT as usize);
    newest_first.reverse();

    let mut context = Vec::with_capacity(newest_first.len() + 2);
    context.push(ChatMessage::system(system_directive(crisis_detected)));
    context.extend(
        newest_first
            .into_iter()
            .map(|row| ChatMessage::from_turn(row.is_user, row.content)),
    );
    context.push(ChatMessage::user(current));
    context
}

/// Builds the bounded conversation window for a generation call. Read-only.
pub struct ContextAssembler {
    store: Arc<dyn ConversationStore>,
}

impl ContextAssembler {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, current), fields(session_id = %session_id))]
    pub async fn build_context(
        &self,
        session_id: &SessionId,
        current: &str,
        crisis_detected: bool,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let recent = self.store.recent_messages(session_id, HISTORY_LIMIT).await?;
        Ok(assemble(recent, current, crisis_detected))
    }
}
