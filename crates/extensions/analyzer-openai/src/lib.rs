//! OpenAI-compatible page analyzer for colkeeper.

mod analyzer;
mod api;
mod prompt;

pub use analyzer::OpenAiAnalyzer;
pub use prompt::{create_prompt, extract_json_block};
