//! # chat-proxy
//!
//! A pass-through chat endpoint for hosted AI models, and the client-side session that
//! talks to it.
//!
//! The endpoint accepts one `message` query parameter, forwards it unchanged to a
//! completion provider (any model supported by the genai crate) and relays the answer
//! as plain text, either buffered or streamed. The session keeps an append-only list of
//! [`Message`]s, the way a chat page does.
//!
//! ## Features
//!
//! - `server` (default): actix-web endpoints, OpenAPI docs and the `chat-proxy` binary
//! - `client` (default): reqwest transport and the `chat` terminal binary
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use chat_proxy::{GenAiProvider, ProviderConfig, proxy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let provider = GenAiProvider::new(&ProviderConfig::default());
//!
//!     // `None` forwards the default prompt, "Tell me a joke"
//!     let reply = proxy::forward(&provider, None).await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! ### Driving a session
//!
//! ```rust,no_run
//! use chat_proxy::{ChatSession, HttpTransport};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let transport = HttpTransport::new("http://localhost:8080");
//! let mut session = ChatSession::new();
//!
//! session.set_input("How are you?");
//! session.submit(&transport).await;
//!
//! for message in session.messages() {
//!     println!("{}: {}", message.sender, message.text);
//! }
//! # }
//! ```

// Core modules - always available
pub mod chat;
pub mod config;
pub mod provider;
pub mod proxy;
pub mod session;
pub mod transport;

// Server-specific modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod error;
#[cfg(feature = "server")]
pub mod server;

pub use chat::{ChatQuery, DEFAULT_PROMPT, Message, Sender};
pub use config::{ConfigError, ProviderConfig, ServerConfig, UiConfig};
#[cfg(feature = "server")]
pub use error::ErrorResponse;
pub use provider::{CompletionProvider, FragmentStream, GenAiProvider, ProviderError};
pub use session::{ChatSession, Phase, PendingReply, SubmissionOutcome};
#[cfg(feature = "client")]
pub use transport::HttpTransport;
pub use transport::{ChatTransport, TransportError};
