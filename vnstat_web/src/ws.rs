//! WebSocket upgrade for `/live` and the axum side of `LiveChannel`.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};

use crate::live::{ChannelClosed, LiveChannel};
use crate::routes::{accept_query, IfaceQuery, QueryResult};
use crate::state::AppState;

pub async fn live_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    query: QueryResult<IfaceQuery>,
) -> Response {
    let iface = match accept_query(query, "live") {
        Ok(q) => q.iface.unwrap_or_default(),
        Err(e) => return e.into_response(),
    };
    ws.on_upgrade(move |mut socket| async move {
        state.live.run(&mut socket, &iface).await;
    })
}

#[async_trait]
impl LiveChannel for WebSocket {
    async fn handshake(&mut self) -> Option<String> {
        while let Some(msg) = self.recv().await {
            match msg {
                Ok(Message::Text(text)) => return Some(text),
                Ok(Message::Binary(data)) => return Some(String::from_utf8_lossy(&data).into_owned()),
                Ok(Message::Close(_)) | Err(_) => return None,
                // ping/pong
                Ok(_) => {}
            }
        }
        None
    }

    async fn closed(&mut self) {
        while let Some(msg) = self.recv().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                return;
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), ChannelClosed> {
        self.send(Message::Text(text)).await.map_err(|_| ChannelClosed)
    }

    async fn shutdown(&mut self) {
        let _ = self.send(Message::Close(None)).await;
    }
}
