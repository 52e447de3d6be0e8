pub mod converter;
pub mod disabled;
pub mod mock;
pub mod models;
pub mod openai;

pub use disabled::DisabledGenerator;
pub use mock::{MockGenerator, MockResponse};
pub use openai::OpenAiProvider;
