use futures_util::StreamExt;
use sensor_protocol::PowerUpdate;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Connect to the producer and forward parsed updates into the notifier loop.
///
/// There is no reconnect: when the connection drops (or never comes up) the
/// feed simply ends and the notifier decays to zero through staleness.
pub async fn run(url: String, updates: Sender<PowerUpdate>) {
    let (mut stream, _) = match connect_async(url.as_str()).await {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("failed to connect to {}: {}", url, e);
            return;
        }
    };

    log::info!("connected to {}", url);

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(update) = parse_frame(&text) {
                    if updates.send(update).await.is_err() {
                        // Notifier is gone; nothing left to feed.
                        return;
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                log::error!("websocket error: {}", e);
                break;
            }
        }
    }

    log::info!("update feed from {} closed", url);
}

/// Parse a text frame, logging and dropping anything malformed.
fn parse_frame(text: &str) -> Option<PowerUpdate> {
    match PowerUpdate::from_json(text) {
        Ok(update) => Some(update),
        Err(e) => {
            log::error!("error parsing message: {}", e);
            None
        }
    }
}
