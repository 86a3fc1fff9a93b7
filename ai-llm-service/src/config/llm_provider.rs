/// Represents the provider (backend) used for model inference.
///
/// `OpenAI` covers every API speaking the OpenAI wire format, including
/// OpenRouter; `Ollama` is the local runtime's native API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime (native `/api/*` endpoints).
    Ollama,
    /// OpenAI-compatible REST API (`/chat/completions`, `/embeddings`, `/models`).
    OpenAI,
}

impl LlmProvider {
    /// Parses a provider name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Some(LlmProvider::Ollama),
            "openai" | "openrouter" | "chatgpt" => Some(LlmProvider::OpenAI),
            _ => None,
        }
    }
}
