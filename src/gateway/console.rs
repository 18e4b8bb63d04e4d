//! Local gateway that reads messages from stdin and prints replies
//!
//! Lines look like `#channel !droid hello`; a line without a leading
//! `#channel` goes to the `console` channel.

use super::{DeliveryError, Dispatcher, InboundMessage, ReplySink};
use crate::history::ConversationKey;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub const DEFAULT_CHANNEL: &str = "console";

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Option<InboundMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (channel, text) = match line.strip_prefix('#') {
        Some(rest) => rest.split_once(char::is_whitespace).unwrap_or((rest, "")),
        None => (DEFAULT_CHANNEL, line),
    };
    if channel.is_empty() {
        return None;
    }
    Some(InboundMessage::new(channel, false, text.trim_start()))
}

/// Writes `[#channel] reply` lines to stdout
pub struct ConsoleSink {
    stdout: Mutex<Stdout>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn send(&self, key: &ConversationKey, text: &str) -> Result<(), DeliveryError> {
        let mut stdout = self.stdout.lock().await;
        stdout
            .write_all(format!("[#{key}] {text}\n").as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Read stdin until EOF or Ctrl-C, dispatching every message, then wait for
/// in-flight replies.
pub async fn run(dispatcher: &Dispatcher) -> std::io::Result<()> {
    run_with(BufReader::new(tokio::io::stdin()), dispatcher).await
}

/// Line loop behind [`run`]. Bytes that are not valid UTF-8 are replaced
/// rather than ending the session, and dispatched replies are awaited on
/// every exit path.
pub async fn run_with<R>(mut reader: R, dispatcher: &Dispatcher) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut pending: Vec<JoinHandle<()>> = Vec::new();
    let mut buf = Vec::new();
    let mut result = Ok(());

    loop {
        buf.clear();
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => {
                match read {
                    Ok(0) => {
                        tracing::info!("Console input closed");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read console input");
                        result = Err(e);
                        break;
                    }
                }
                let line = String::from_utf8_lossy(&buf);
                if let Some(message) = parse_line(&line) {
                    pending.retain(|handle| !handle.is_finished());
                    pending.push(dispatcher.dispatch(message));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    for handle in pending {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Dispatch task failed");
        }
    }
    result
}
