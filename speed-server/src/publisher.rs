//! Websocket broadcast server for power updates.

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Accept clients forever, handing each its own broadcast subscription.
pub async fn run(listener: TcpListener, updates: broadcast::Sender<String>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                log::info!("client connected from {}", addr);
                tokio::spawn(handle_client(stream, updates.subscribe()));
            }
            Err(e) => log::error!("accept failed: {}", e),
        }
    }
}

/// Forward broadcast updates to one client. Inbound frames are drained and
/// ignored; the link is one-way.
async fn handle_client(stream: TcpStream, mut updates: broadcast::Receiver<String>) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            log::error!("websocket handshake failed: {}", e);
            return;
        }
    };

    let (mut sink, mut source) = ws.split();

    loop {
        select! {
            update = updates.recv() => {
                match update {
                    Ok(json) => {
                        if sink.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        log::warn!("client lagging, dropped {} updates", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    log::info!("client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_protocol::PowerUpdate;
    use tokio_tungstenite::connect_async;

    #[tokio::test]
    async fn test_client_receives_broadcast_updates() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, _) = broadcast::channel(16);

        tokio::spawn(run(listener, tx.clone()));

        let url = format!("ws://{}", addr);
        let (mut client, _) = connect_async(url.as_str()).await.unwrap();

        // The handshake completes after the server subscribed this client,
        // so this update cannot be missed.
        tx.send(PowerUpdate::new(210.0).to_json().unwrap()).unwrap();

        let frame = client.next().await.unwrap().unwrap();
        let update = PowerUpdate::from_json(frame.to_text().unwrap()).unwrap();
        assert_eq!(update.power, 210.0);
    }

    #[tokio::test]
    async fn test_inbound_client_frames_are_ignored() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, _) = broadcast::channel(16);

        tokio::spawn(run(listener, tx.clone()));

        let url = format!("ws://{}", addr);
        let (mut client, _) = connect_async(url.as_str()).await.unwrap();

        client
            .send(Message::Text("ignore me".to_string()))
            .await
            .unwrap();

        // Broadcasting still works afterwards.
        tx.send(PowerUpdate::new(95.0).to_json().unwrap()).unwrap();
        let frame = client.next().await.unwrap().unwrap();
        assert_eq!(
            PowerUpdate::from_json(frame.to_text().unwrap())
                .unwrap()
                .power,
            95.0
        );
    }
}
