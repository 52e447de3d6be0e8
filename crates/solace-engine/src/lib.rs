pub mod context;
pub mod crisis;
pub mod error;
pub mod policy;
pub mod resources;
pub mod sentiment;
pub mod store;
pub mod trends;

pub use context::ContextAssembler;
pub use crisis::CrisisDetector;
pub use error::EngineError;
pub use policy::{PolicyOutcome, ResponsePolicy};
pub use resources::ResourceCatalog;
pub use sentiment::{SentimentResult, SentimentScorer};
pub use store::{ConversationStore, SqliteConversationStore};
pub use trends::TrendAggregator;
