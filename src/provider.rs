//! Completion provider capability
//!
//! The proxy only needs one thing from a hosted model: prompt text in, response text
//! (or a sequence of fragments) out. [`CompletionProvider`] captures that so the hosted
//! service can be swapped for a scripted one in tests.

use crate::config::ProviderConfig;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::Stream;
use genai::ModelIden;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver};
use std::pin::Pin;

/// Lazily produced, finite, non-restartable sequence of response fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    GenAi(#[from] genai::Error),
    #[error("provider returned no text")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends `prompt` and waits for the full response text.
    async fn complete(
        &self,
        prompt: &str,
    ) -> Result<String, ProviderError>;

    /// Sends `prompt` and returns the response as it is generated.
    ///
    /// Errors raised before the first fragment are returned directly; later ones are
    /// yielded by the stream, which ends after yielding an error.
    async fn stream(
        &self,
        prompt: &str,
    ) -> Result<FragmentStream, ProviderError>;

    /// Model name used for logging.
    fn model(&self) -> &str;
}

/// [`CompletionProvider`] backed by the `genai` multi-provider client.
pub struct GenAiProvider {
    client: genai::Client,
    model: String,
    options: ChatOptions,
}

impl GenAiProvider {
    #[must_use]
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: create_genai_client(config.api_key.as_deref()),
            model: config.model.clone(),
            options: ChatOptions::default().with_temperature(config.temperature),
        }
    }

    fn request_for(prompt: &str) -> ChatRequest {
        ChatRequest::default().append_message(ChatMessage::user(prompt.to_string()))
    }
}

/// Create a genai client, pinning the API key when one is configured.
///
/// Without a key genai falls back to the provider's usual environment variable
/// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...).
#[must_use]
pub fn create_genai_client(api_key: Option<&str>) -> genai::Client {
    match api_key {
        Some(key) => {
            let key = key.to_string();
            let auth_resolver = AuthResolver::from_resolver_fn(
                move |_model_iden: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                    Ok(Some(AuthData::from_single(key.clone())))
                },
            );
            genai::Client::builder().with_auth_resolver(auth_resolver).build()
        }
        None => genai::Client::default(),
    }
}

#[async_trait]
impl CompletionProvider for GenAiProvider {
    async fn complete(
        &self,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .exec_chat(&self.model, Self::request_for(prompt), Some(&self.options))
            .await?;

        response.into_first_text().ok_or(ProviderError::EmptyResponse)
    }

    async fn stream(
        &self,
        prompt: &str,
    ) -> Result<FragmentStream, ProviderError> {
        let response = self
            .client
            .exec_chat_stream(&self.model, Self::request_for(prompt), Some(&self.options))
            .await?;

        let mut events = response.stream;
        let fragments = async_stream::stream! {
            while let Some(event) = events.next().await {
                match event {
                    Ok(ChatStreamEvent::Chunk(chunk)) => {
                        if !chunk.content.is_empty() {
                            yield Ok(chunk.content);
                        }
                    }
                    Ok(ChatStreamEvent::End(_)) => break,
                    // Start, reasoning and tool-call events carry no answer text
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(ProviderError::from(e));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(fragments))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Collects a fragment stream into the full response text.
///
/// # Errors
///
/// Returns the first error yielded by the stream.
pub async fn collect_fragments(mut stream: FragmentStream) -> Result<String, ProviderError> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use std::sync::Mutex;

    /// Scripted provider recording every prompt it receives.
    pub struct MockProvider {
        reply: Result<Vec<String>, String>,
        fail_after: Option<usize>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockProvider {
        pub fn replying(fragments: &[&str]) -> Self {
            Self {
                reply: Ok(fragments.iter().map(|f| (*f).to_string()).collect()),
                fail_after: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                fail_after: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Streams the first `count` fragments, then fails.
        pub fn failing_after(
            fragments: &[&str],
            count: usize,
        ) -> Self {
            Self {
                fail_after: Some(count),
                ..Self::replying(fragments)
            }
        }

        pub fn recorded(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for MockProvider {
        async fn complete(
            &self,
            prompt: &str,
        ) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(fragments) if self.fail_after.is_none() => Ok(fragments.concat()),
                Ok(_) => Err(ProviderError::Other("stream interrupted".to_string())),
                Err(message) => Err(ProviderError::Other(message.clone())),
            }
        }

        async fn stream(
            &self,
            prompt: &str,
        ) -> Result<FragmentStream, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let fragments = match &self.reply {
                Ok(fragments) => fragments.clone(),
                Err(message) => return Err(ProviderError::Other(message.clone())),
            };

            let mut items: Vec<Result<String, ProviderError>> = match self.fail_after {
                Some(count) => fragments.into_iter().take(count).map(Ok).collect(),
                None => fragments.into_iter().map(Ok).collect(),
            };
            if self.fail_after.is_some() {
                items.push(Err(ProviderError::Other("stream interrupted".to_string())));
            }

            Ok(Box::pin(futures::stream::iter(items)))
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::MockProvider;
    use super::*;

    #[test]
    fn test_genai_provider_uses_configured_model() {
        let config = ProviderConfig {
            api_key: Some("test-api-key".to_string()),
            model: "gpt-4o".to_string(),
            temperature: 0.3,
        };

        let provider = GenAiProvider::new(&config);
        assert_eq!(provider.model(), "gpt-4o");
        assert_eq!(provider.options.temperature, Some(0.3));
    }

    #[test]
    fn test_client_without_key() {
        // Must not panic when no key is configured
        let _client = create_genai_client(None);
    }

    #[tokio::test]
    async fn test_collect_fragments_concatenates_in_order() {
        let provider = MockProvider::replying(&["Why did ", "the crab ", "never share?"]);
        let stream = provider.stream("Tell me a joke").await.unwrap();

        let text = collect_fragments(stream).await.unwrap();
        assert_eq!(text, "Why did the crab never share?");
    }

    #[tokio::test]
    async fn test_collect_fragments_surfaces_mid_stream_error() {
        let provider = MockProvider::failing_after(&["partial", "never sent"], 1);
        let stream = provider.stream("hi").await.unwrap();

        let err = collect_fragments(stream).await.unwrap_err();
        assert_eq!(err.to_string(), "stream interrupted");
    }

    #[tokio::test]
    async fn test_mock_provider_records_prompts() {
        let provider = MockProvider::replying(&["ok"]);
        provider.complete("first").await.unwrap();
        let _ = provider.stream("second").await.unwrap();

        assert_eq!(provider.recorded(), vec!["first", "second"]);
    }
}
