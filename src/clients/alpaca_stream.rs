//! One-shot consumer of the realtime news websocket.
//!
//! Connects, authenticates, subscribes, and gathers news messages until
//! enough have arrived, the server closes, or the window elapses.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::alpaca::BrokerageError;

const CLOSE_GRACE: Duration = Duration::from_secs(1);

fn auth_message(key_id: &str, secret: &str) -> Value {
    json!({ "action": "auth", "key": key_id, "secret": secret })
}

fn subscribe_message(symbols: &[String]) -> Value {
    let all = symbols.is_empty() || symbols.iter().any(|s| s == "*");
    let news: Vec<&str> = if all {
        vec!["*"]
    } else {
        symbols.iter().map(String::as_str).collect()
    };
    json!({ "action": "subscribe", "news": news })
}

/// The stream batches messages into arrays, but single objects are accepted
/// too.
fn parse_frame(text: &str) -> Result<Vec<Value>, BrokerageError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| BrokerageError::Stream(format!("Malformed frame: {e}")))?;

    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn message_type(message: &Value) -> Option<&str> {
    message.get("T").and_then(Value::as_str)
}

type NewsSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open_stream(
    url: &str,
    key_id: &str,
    secret: &str,
    symbols: &[String],
) -> Result<NewsSocket, BrokerageError> {
    let (mut ws, _) = connect_async(url)
        .await
        .map_err(|e| BrokerageError::Stream(e.to_string()))?;
    info!("Connected to news stream at {}", url);

    for message in [auth_message(key_id, secret), subscribe_message(symbols)] {
        ws.send(Message::Text(message.to_string()))
            .await
            .map_err(|e| BrokerageError::Stream(e.to_string()))?;
    }

    Ok(ws)
}

/// The window covers the whole exchange, handshake included.
pub async fn collect_news(
    url: &str,
    key_id: &str,
    secret: &str,
    symbols: &[String],
    limit: usize,
    window: Duration,
) -> Result<Vec<Value>, BrokerageError> {
    let deadline = Instant::now() + window;

    let mut ws = match timeout_at(deadline, open_stream(url, key_id, secret, symbols)).await {
        Ok(ws) => ws?,
        Err(_) => {
            warn!("News stream handshake did not finish within {:?}", window);
            return Err(BrokerageError::NoNews);
        }
    };

    let mut items = Vec::new();

    while items.len() < limit {
        let Ok(next) = timeout_at(deadline, ws.next()).await else {
            debug!("News stream window elapsed with {} items", items.len());
            break;
        };

        let text = match next {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                debug!("News stream closed by server");
                break;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                warn!("News stream error: {}", e);
                return Err(BrokerageError::Stream(e.to_string()));
            }
        };

        for message in parse_frame(&text)? {
            match message_type(&message) {
                Some("n") => {
                    items.push(message);
                    if items.len() >= limit {
                        break;
                    }
                }
                Some("error") => {
                    let msg = message
                        .get("msg")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error");
                    return Err(BrokerageError::Stream(msg.to_string()));
                }
                _ => debug!("News stream control message: {}", message),
            }
        }
    }

    match timeout(CLOSE_GRACE, ws.close(None)).await {
        Ok(Err(e)) => debug!("Error closing news stream: {}", e),
        Err(_) => debug!("News stream close timed out"),
        Ok(Ok(())) => {}
    }

    if items.is_empty() {
        return Err(BrokerageError::NoNews);
    }

    Ok(items)
}
