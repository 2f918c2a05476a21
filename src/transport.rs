//! Client side of the chat proxy
//!
//! [`ChatTransport`] is what the chat session needs from the backend; [`HttpTransport`]
//! implements it against the proxy's `/chat` and `/chat/stream` endpoints.

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to chat proxy failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("chat proxy answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one message and waits for the whole reply.
    async fn send(
        &self,
        message: &str,
    ) -> Result<String, TransportError>;

    /// Sends one message and yields the reply as it arrives.
    async fn send_streaming(
        &self,
        message: &str,
    ) -> Result<ReplyStream, TransportError>;
}

#[cfg(feature = "client")]
pub use http::HttpTransport;

#[cfg(feature = "client")]
mod http {
    use super::{ChatTransport, ReplyStream, TransportError};
    use async_trait::async_trait;
    use futures_util::StreamExt;

    impl From<reqwest::Error> for TransportError {
        fn from(err: reqwest::Error) -> Self {
            TransportError::Http(Box::new(err))
        }
    }

    /// Talks to a running chat proxy over HTTP.
    #[derive(Clone)]
    pub struct HttpTransport {
        base_url: String,
        http_client: reqwest::Client,
    }

    impl HttpTransport {
        #[must_use]
        pub fn new(base_url: impl Into<String>) -> Self {
            Self::with_client(base_url, reqwest::Client::new())
        }

        #[must_use]
        pub fn with_client(
            base_url: impl Into<String>,
            http_client: reqwest::Client,
        ) -> Self {
            Self {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                http_client,
            }
        }

        #[must_use]
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        async fn get(
            &self,
            path: &str,
            message: &str,
        ) -> Result<reqwest::Response, TransportError> {
            let url = format!("{}{path}", self.base_url);
            let response = self
                .http_client
                .get(&url)
                .query(&[("message", message)])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(response)
        }
    }

    #[async_trait]
    impl ChatTransport for HttpTransport {
        async fn send(
            &self,
            message: &str,
        ) -> Result<String, TransportError> {
            let response = self.get("/chat", message).await?;
            Ok(response.text().await?)
        }

        async fn send_streaming(
            &self,
            message: &str,
        ) -> Result<ReplyStream, TransportError> {
            let response = self.get("/chat/stream", message).await?;
            let mut bytes = Box::pin(response.bytes_stream());

            let fragments = async_stream::stream! {
                let mut decoder = Utf8Decoder::default();
                while let Some(chunk) = bytes.next().await {
                    match chunk {
                        Ok(chunk) => {
                            let text = decoder.push(&chunk);
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                        }
                        Err(e) => {
                            yield Err(TransportError::from(e));
                            return;
                        }
                    }
                }

                if let Some(rest) = decoder.finish() {
                    yield Ok(rest);
                }
            };

            Ok(Box::pin(fragments))
        }
    }

    /// Decodes UTF-8 across chunk boundaries, holding back a split code point.
    #[derive(Default)]
    pub(super) struct Utf8Decoder {
        pending: Vec<u8>,
    }

    impl Utf8Decoder {
        pub(super) fn push(
            &mut self,
            chunk: &[u8],
        ) -> String {
            self.pending.extend_from_slice(chunk);

            let valid = match std::str::from_utf8(&self.pending) {
                Ok(_) => self.pending.len(),
                // An incomplete sequence at the end: keep it for the next chunk
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                // Genuinely invalid bytes: decode lossily rather than stalling
                Err(_) => {
                    let text = String::from_utf8_lossy(&self.pending).into_owned();
                    self.pending.clear();
                    return text;
                }
            };

            let rest = self.pending.split_off(valid);
            let text = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending = rest;
            text
        }

        pub(super) fn finish(self) -> Option<String> {
            (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_base_url_trailing_slash_trimmed() {
            let transport = HttpTransport::new("http://localhost:8080/");
            assert_eq!(transport.base_url(), "http://localhost:8080");
        }

        #[test]
        fn test_decoder_holds_split_code_point() {
            let bytes = "héllo".as_bytes();
            let mut decoder = Utf8Decoder::default();

            // 'é' is two bytes; split in the middle of it
            assert_eq!(decoder.push(&bytes[..2]), "h");
            assert_eq!(decoder.push(&bytes[2..]), "éllo");
            assert!(decoder.finish().is_none());
        }

        #[test]
        fn test_decoder_flushes_truncated_tail() {
            let mut decoder = Utf8Decoder::default();
            assert_eq!(decoder.push(&[b'a', 0xE2, 0x82]), "a");
            assert_eq!(decoder.finish().as_deref(), Some("\u{FFFD}"));
        }

        #[test]
        fn test_decoder_invalid_bytes_are_replaced() {
            let mut decoder = Utf8Decoder::default();
            assert_eq!(decoder.push(&[b'o', 0xFF, b'k']), "o\u{FFFD}k");
        }

        #[tokio::test]
        async fn test_unreachable_proxy_is_transport_error() {
            // Port 9 (discard) is closed on any sane test host
            let transport = HttpTransport::new("http://127.0.0.1:9");
            let err = transport.send("hi").await.unwrap_err();
            assert!(matches!(err, TransportError::Http(_)));
        }
    }
}
