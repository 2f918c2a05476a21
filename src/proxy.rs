//! Core forwarding logic shared by every chat endpoint
//!
//! The proxy is stateless: each call resolves the prompt and hands it to the provider
//! untouched. There is no retry, caching or rate limiting here.

use crate::chat::DEFAULT_PROMPT;
use crate::provider::{CompletionProvider, FragmentStream, ProviderError};

/// Substitute the default prompt when the caller sent no message.
///
/// An empty `message=` parameter counts as absent. Anything else, including
/// whitespace-only text, is forwarded as-is.
#[must_use]
pub fn resolve_prompt(message: Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => message,
        _ => DEFAULT_PROMPT.to_string(),
    }
}

/// Forward a message and wait for the complete reply.
///
/// # Errors
///
/// Returns the provider's error unchanged.
pub async fn forward(
    provider: &dyn CompletionProvider,
    message: Option<String>,
) -> Result<String, ProviderError> {
    let prompt = resolve_prompt(message);
    tracing::debug!("Forwarding prompt ({} chars) to {}", prompt.chars().count(), provider.model());

    let reply = provider.complete(&prompt).await?;
    tracing::debug!("Received reply ({} chars)", reply.chars().count());
    Ok(reply)
}

/// Forward a message and return the reply as a fragment stream.
///
/// # Errors
///
/// Returns the provider's error if the stream could not be opened.
pub async fn forward_stream(
    provider: &dyn CompletionProvider,
    message: Option<String>,
) -> Result<FragmentStream, ProviderError> {
    let prompt = resolve_prompt(message);
    tracing::debug!(
        "Opening stream for prompt ({} chars) to {}",
        prompt.chars().count(),
        provider.model()
    );

    provider.stream(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::collect_fragments;
    use crate::provider::test_utils::MockProvider;

    #[test]
    fn test_resolve_prompt() {
        assert_eq!(resolve_prompt(None), "Tell me a joke");
        assert_eq!(resolve_prompt(Some(String::new())), "Tell me a joke");
        assert_eq!(resolve_prompt(Some("How are you?".to_string())), "How are you?");
        assert_eq!(resolve_prompt(Some("   ".to_string())), "   ");
    }

    #[tokio::test]
    async fn test_forward_default_prompt() {
        let provider = MockProvider::replying(&["Knock knock."]);

        let reply = forward(&provider, None).await.unwrap();

        assert_eq!(reply, "Knock knock.");
        assert_eq!(provider.recorded(), vec!["Tell me a joke"]);
    }

    #[tokio::test]
    async fn test_forward_passes_message_unmodified() {
        let provider = MockProvider::replying(&["I'm good!"]);

        let reply = forward(&provider, Some("  How are you?\n".to_string())).await.unwrap();

        assert_eq!(reply, "I'm good!");
        assert_eq!(provider.recorded(), vec!["  How are you?\n"]);
    }

    #[tokio::test]
    async fn test_forward_propagates_provider_error() {
        let provider = MockProvider::failing("invalid api key");

        let err = forward(&provider, Some("hi".to_string())).await.unwrap_err();

        assert_eq!(err.to_string(), "invalid api key");
    }

    #[tokio::test]
    async fn test_forward_stream_yields_fragments_in_order() {
        let provider = MockProvider::replying(&["a", "b", "c"]);

        let stream = forward_stream(&provider, None).await.unwrap();

        assert_eq!(collect_fragments(stream).await.unwrap(), "abc");
        assert_eq!(provider.recorded(), vec!["Tell me a joke"]);
    }

    #[tokio::test]
    async fn test_forward_stream_open_failure() {
        let provider = MockProvider::failing("quota exceeded");

        let result = forward_stream(&provider, Some("hi".to_string())).await;

        assert!(matches!(result, Err(ProviderError::Other(msg)) if msg == "quota exceeded"));
    }
}
