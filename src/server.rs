//! HTTP surface of the chat proxy
//!
//! Three GET endpoints share the same contract (one `message` query parameter, plain
//! text out) and differ only in how the reply is delivered: buffered, as a chunked
//! text body, or as Server-Sent Events.

use crate::chat::{ChatQuery, Message, Sender};
use crate::error::{ApiError, ErrorResponse};
use crate::provider::CompletionProvider;
use crate::proxy;
use actix_web::middleware::DefaultHeaders;
use actix_web::web::{self, Bytes};
use actix_web::{HttpResponse, Responder, get};
use actix_web_lab::sse::{self, Sse};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[utoipa::path(
    get,
    path = "/chat",
    params(ChatQuery),
    responses(
        (status = 200, description = "Full model reply", content_type = "text/plain", body = String),
        (status = 401, description = "Provider rejected the credentials", body = ErrorResponse),
        (status = 429, description = "Provider quota exhausted", body = ErrorResponse),
        (status = 502, description = "Provider failure", body = ErrorResponse)
    )
)]
#[get("/chat")]
pub async fn chat(
    provider: web::Data<dyn CompletionProvider>,
    query: web::Query<ChatQuery>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!("[{request_id}] GET /chat using model {}", provider.model());

    let reply = proxy::forward(provider.get_ref(), query.into_inner().message)
        .await
        .inspect_err(|e| tracing::error!("[{request_id}] Chat request failed: {e}"))?;

    tracing::info!("[{request_id}] Replied with {} bytes", reply.len());
    Ok(HttpResponse::Ok().content_type(TEXT_PLAIN).body(reply))
}

#[utoipa::path(
    get,
    path = "/chat/stream",
    params(ChatQuery),
    responses(
        (status = 200, description = "Model reply streamed as chunked plain text", content_type = "text/plain", body = String),
        (status = 502, description = "Provider failure before the first fragment", body = ErrorResponse)
    )
)]
#[get("/chat/stream")]
pub async fn chat_stream(
    provider: web::Data<dyn CompletionProvider>,
    query: web::Query<ChatQuery>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!("[{request_id}] GET /chat/stream using model {}", provider.model());

    let fragments = proxy::forward_stream(provider.get_ref(), query.into_inner().message)
        .await
        .inspect_err(|e| tracing::error!("[{request_id}] Failed to open stream: {e}"))?;

    let body = fragments.map(move |fragment| {
        fragment.map(Bytes::from).map_err(|e| {
            tracing::error!("[{request_id}] Stream interrupted: {e}");
            ApiError::from(e)
        })
    });

    Ok(HttpResponse::Ok().content_type(TEXT_PLAIN).streaming(body))
}

#[utoipa::path(
    get,
    path = "/chat/events",
    params(ChatQuery),
    responses(
        (status = 200, description = "One `data` event per fragment, then `done` (or `error`)", content_type = "text/event-stream"),
        (status = 502, description = "Provider failure before the first fragment", body = ErrorResponse)
    )
)]
#[get("/chat/events")]
pub async fn chat_events(
    provider: web::Data<dyn CompletionProvider>,
    query: web::Query<ChatQuery>,
) -> Result<impl Responder, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!("[{request_id}] GET /chat/events using model {}", provider.model());

    let mut fragments = proxy::forward_stream(provider.get_ref(), query.into_inner().message)
        .await
        .inspect_err(|e| tracing::error!("[{request_id}] Failed to open stream: {e}"))?;

    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        while let Some(fragment) = fragments.next().await {
            let event = match fragment {
                Ok(text) => sse::Event::Data(sse::Data::new(text)),
                Err(e) => {
                    tracing::error!("[{request_id}] Stream interrupted: {e}");
                    let _ = tx
                        .send(sse::Event::Data(sse::Data::new(e.to_string()).event("error")))
                        .await;
                    return;
                }
            };

            // Receiver gone means the client disconnected
            if tx.send(event).await.is_err() {
                tracing::debug!("[{request_id}] Client disconnected");
                return;
            }
        }

        let _ = tx
            .send(sse::Event::Data(sse::Data::new("[DONE]").event("done")))
            .await;
    });

    let stream = tokio_stream::wrappers::ReceiverStream::new(rx).map(Ok::<_, actix_web::Error>);

    Ok(Sse::from_stream(stream))
}

#[derive(OpenApi)]
#[openapi(
    paths(chat, chat_stream, chat_events),
    components(schemas(ChatQuery, Message, Sender, ErrorResponse))
)]
pub struct ApiDoc;

/// Registers the chat endpoints and the Swagger UI.
///
/// The provider must be registered separately as `web::Data<dyn CompletionProvider>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(chat)
        .service(chat_stream)
        .service(chat_events)
        .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()));
}

/// Lets a UI served from another origin call the endpoints.
#[must_use]
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*"))
}
