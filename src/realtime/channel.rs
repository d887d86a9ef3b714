use crate::error::Result;
use crate::models::session::{Participant, QuizSessionView, SessionStatus};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Pushed by the session service. Frames look like `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Connect,
    SessionJoined { session: QuizSessionView },
    ParticipantJoined { participant: Participant },
    SessionStatus { status: SessionStatus },
    Error { message: String },
}

/// User intent relayed to the session service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinSession {
        code: String,
        name: String,
    },
    SubmitAnswer {
        code: String,
        #[serde(rename = "questionIndex")]
        question_index: usize,
        answer: serde_json::Value,
    },
    LeaveSession {
        code: String,
    },
}

#[allow(async_fn_in_trait)]
pub trait SessionChannel {
    async fn send(&mut self, event: ClientEvent) -> Result<()>;

    /// Next event from the server, or `None` once the connection is gone.
    async fn next_event(&mut self) -> Result<Option<ServerEvent>>;

    async fn close(&mut self) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait ChannelConnector {
    type Channel: SessionChannel;

    async fn connect(&self) -> Result<Self::Channel>;
}

pub struct WsSessionChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsSessionChannel {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url).await?;
        info!(url = %url, "session channel connected");
        Ok(Self { stream })
    }
}

impl SessionChannel for WsSessionChannel {
    async fn send(&mut self, event: ClientEvent) -> Result<()> {
        let text = serde_json::to_string(&event)?;
        debug!(frame = %text, "sending session event");
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => warn!(error = %e, frame = %text, "ignoring unknown session event"),
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Opens a fresh WebSocket to the session service on every `connect`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ChannelConnector for WsConnector {
    type Channel = WsSessionChannel;

    async fn connect(&self) -> Result<WsSessionChannel> {
        WsSessionChannel::connect(&self.url).await
    }
}
