//! REST handlers for the `/api` routes.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use solace_core::ids::SessionId;
use solace_engine::resources::{CatalogView, Resource};
use solace_engine::trends::{ScoredPoint, TrendReport};
use solace_engine::{ResourceCatalog, ResponsePolicy, SentimentResult, TrendAggregator};
use solace_store::messages::{MessageRepo, MessageRow};
use solace_store::moods::{MoodRepo, MoodRow, MAX_MOOD_SCORE, MIN_MOOD_SCORE};
use solace_store::sessions::{SessionRepo, SessionRow};
use solace_store::{run_blocking, Database};

use crate::error::ApiError;

const DEFAULT_HISTORY_LIMIT: u32 = 50;
const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub policy: Arc<ResponsePolicy>,
    pub trends: TrendAggregator,
    pub catalog: ResourceCatalog,
}

impl AppState {
    pub fn new(db: Database, policy: Arc<ResponsePolicy>) -> Self {
        let catalog = policy.catalog().clone();
        Self {
            db,
            policy,
            trends: TrendAggregator::new(),
            catalog,
        }
    }

    fn sessions(&self) -> SessionRepo {
        SessionRepo::new(self.db.clone())
    }

    fn messages(&self) -> MessageRepo {
        MessageRepo::new(self.db.clone())
    }

    fn moods(&self) -> MoodRepo {
        MoodRepo::new(self.db.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: SessionId,
    pub crisis_detected: bool,
    pub sentiment: SentimentResult,
    pub resources: Option<&'static [Resource]>,
}

#[derive(Debug, Deserialize)]
pub struct MoodRequest {
    pub mood_score: i64,
    #[serde(default)]
    pub note: Option<String>,
    pub session_id: SessionId,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Solace API is running",
    })
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.db.clone();
    match run_blocking(move || db.ping()).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" }))),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unhealthy" })),
            )
        }
    }
}

/// POST /api/session
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<SessionRow>, ApiError> {
    let Json(request) = payload?;
    let sessions = state.sessions();
    let session = run_blocking(move || sessions.create(request.nickname.as_deref())).await?;
    info!(session_id = %session.id, "session created");
    Ok(Json(session))
}

/// GET /api/session/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionRow>, ApiError> {
    let sessions = state.sessions();
    let session = run_blocking(move || sessions.get(&SessionId::from_raw(id))).await?;
    Ok(Json(session))
}

/// POST /api/chat
#[instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let session_id = match request.session_id {
        Some(id) => id,
        None => {
            let sessions = state.sessions();
            run_blocking(move || sessions.create(None)).await?.id
        }
    };

    let outcome = state.policy.respond(&session_id, &request.message).await?;

    Ok(Json(ChatResponse {
        message: outcome.reply,
        session_id: outcome.session_id,
        crisis_detected: outcome.crisis_detected,
        sentiment: outcome.sentiment,
        resources: outcome.resources,
    }))
}

/// GET /api/chat/{id}/history
pub async fn chat_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<MessageRow>>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let messages = state.messages();
    let rows = run_blocking(move || messages.history(&SessionId::from_raw(id), limit)).await?;
    Ok(Json(rows))
}

/// POST /api/mood
pub async fn log_mood(
    State(state): State<AppState>,
    payload: Result<Json<MoodRequest>, JsonRejection>,
) -> Result<Json<MoodRow>, ApiError> {
    let Json(request) = payload?;
    let score = u8::try_from(request.mood_score)
        .ok()
        .filter(|s| (MIN_MOOD_SCORE..=MAX_MOOD_SCORE).contains(s))
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "mood_score must be between {MIN_MOOD_SCORE} and {MAX_MOOD_SCORE}"
            ))
        })?;

    let sessions = state.sessions();
    let moods = state.moods();
    let entry = run_blocking(move || {
        if !sessions.exists(&request.session_id)? {
            return Ok(None);
        }
        moods
            .insert(&request.session_id, score, request.note.as_deref())
            .map(Some)
    })
    .await?;
    entry.map(Json).ok_or_else(ApiError::session_not_found)
}

/// GET /api/mood/{id}/history
pub async fn mood_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<Vec<MoodRow>>, ApiError> {
    let Query(query) = query?;
    let since = window_start(query.days.unwrap_or(DEFAULT_WINDOW_DAYS))?;
    let moods = state.moods();
    let rows = run_blocking(move || moods.since(&SessionId::from_raw(id), since)).await?;
    Ok(Json(rows))
}

/// GET /api/sentiment/{id}/trends
pub async fn sentiment_trends(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<TrendReport>, ApiError> {
    let Query(query) = query?;
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let since = window_start(days)?;
    let messages = state.messages();
    let rows =
        run_blocking(move || messages.scored_user_messages_since(&SessionId::from_raw(id), since)).await?;
    Ok(Json(state.trends.aggregate(&scored_points(&rows), days)))
}

/// GET /api/resources
pub async fn resources(State(state): State<AppState>) -> Json<CatalogView> {
    Json(state.catalog.all())
}

/// DELETE /api/session/{id}/data
#[instrument(skip(state))]
pub async fn delete_session_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let sessions = state.sessions();
    match run_blocking(move || sessions.delete(&SessionId::from_raw(id))).await {
        Ok(existed) => {
            info!(existed, "session data deleted");
            Ok(Json(MessageResponse {
                message: "All user data deleted successfully",
            }))
        }
        Err(e) => {
            error!(error = %e, "failed to delete session data");
            Err(ApiError::Internal("Error deleting user data".into()))
        }
    }
}

/// Start of a `days`-long lookback window ending now. Windows reaching past
/// the representable date range are rejected.
fn window_start(days: u32) -> Result<DateTime<Utc>, ApiError> {
    Duration::try_days(i64::from(days))
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .ok_or_else(|| ApiError::Validation(format!("days={days} is out of range")))
}

/// Rows without a score or with an unreadable timestamp are skipped.
fn scored_points(rows: &[MessageRow]) -> Vec<ScoredPoint> {
    rows.iter()
        .filter_map(|row| {
            let compound = row.sentiment_score?;
            match DateTime::parse_from_rfc3339(&row.timestamp) {
                Ok(at) => Some(ScoredPoint {
                    timestamp: at.with_timezone(&Utc),
                    compound,
                }),
                Err(e) => {
                    warn!(message_id = %row.id, error = %e, "skipping message with bad timestamp");
                    None
                }
            }
        })
        .collect()
}
