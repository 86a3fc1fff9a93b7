//! Prompt builder: fixed RAG template with the retrieved context inlined.

/// System prompt used when the caller does not provide one.
pub const DEFAULT_ASSISTANT_PROMPT: &str = "You are a helpful AI assistant.";

/// Build the user prompt sent to the model.
///
/// Pure and deterministic: the same inputs always produce the same string,
/// including when `context` is the "no context" sentinel.
///
/// # Example
/// ```
/// # use contextor::prompt::build_rag_prompt;
/// let prompt = build_rag_prompt("Paris is the capital of France.", "What is the capital of France?");
/// assert!(prompt.ends_with("Question: What is the capital of France?"));
/// ```
pub fn build_rag_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following context to answer the question. \
         If the context doesn't help, you can answer based on your general knowledge.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_exact_template() {
        let prompt = build_rag_prompt(
            "Paris is the capital of France.\nFrance is in Europe.",
            "What is the capital of France?",
        );
        let expected = "Use the following context to answer the question. If the context doesn't help, you can answer based on your general knowledge.\n\nContext:\nParis is the capital of France.\nFrance is in Europe.\n\nQuestion: What is the capital of France?";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn is_deterministic_and_verbatim() {
        let context = "  {braces} and \"quotes\"  ";
        let question = "Why?\n";
        let a = build_rag_prompt(context, question);
        let b = build_rag_prompt(context, question);
        assert_eq!(a, b);
        assert!(a.contains("Context:\n  {braces} and \"quotes\"  \n\nQuestion: Why?\n"));
    }

    #[test]
    fn sentinel_context_is_inlined() {
        let prompt = build_rag_prompt(rag_base::NO_CONTEXT_FOUND, "Who wrote Hamlet?");
        assert!(prompt.contains("Context:\nNo relevant context found.\n\nQuestion: Who wrote Hamlet?"));
    }
}
