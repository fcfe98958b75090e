pub mod advisor;
pub mod passthrough;
pub mod provider;
pub mod providers;

pub use advisor::FixAdvisor;
pub use passthrough::{GeminiPassthrough, PassthroughResponse};
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::gemini::GeminiProvider;
