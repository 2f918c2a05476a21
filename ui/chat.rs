//! Terminal chat client for the chat proxy
//!
//! Reads one message per line from stdin, sends it through a [`ChatSession`] and prints
//! the reply. Type `/quit` or close stdin to leave.

use chat_proxy::{ChatSession, HttpTransport, SubmissionOutcome, UiConfig};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they do not interleave with the transcript
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = UiConfig::from_env()?;
    let transport = HttpTransport::new(&config.proxy_url);
    let mut session = ChatSession::new();

    tracing::info!("Talking to {} (streaming: {})", config.proxy_url, config.stream);
    println!("Connected to {}. Type a message, or /quit to leave.", config.proxy_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }

        session.set_input(line);

        let outcome = if config.stream {
            print!("ai> ");
            std::io::stdout().flush()?;
            let outcome = session
                .submit_streaming(&transport, |fragment| {
                    print!("{fragment}");
                    let _ = std::io::stdout().flush();
                })
                .await;
            println!();
            outcome
        } else {
            let outcome = session.submit(&transport).await;
            if outcome == SubmissionOutcome::Appended {
                if let Some(reply) = session.messages().last() {
                    println!("ai> {}", reply.text);
                }
            }
            outcome
        };

        if outcome == SubmissionOutcome::Failed {
            println!("(no reply, the request failed; send the message again to retry)");
        }

        prompt()?;
    }

    let exchanged = session.messages().len();
    println!("Bye! {exchanged} messages this session.");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("you> ");
    std::io::stdout().flush()
}
