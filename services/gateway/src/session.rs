//! Manages the WebSocket connection to the audio platform and the per-message
//! receive, process and reply loop.

use crate::{
    auth::AccessToken,
    protocol::{AudioDecodeError, AudioEncoding, InboundEnvelope, OutboundEnvelope},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self, Message,
        client::IntoClientRequest,
        http::HeaderValue,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};
use tracing::{debug, error, info, instrument, warn};
use voxbridge_core::{Pipeline, StageError};

pub type PlatformSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors that end the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid WebSocket request: {0}")]
    InvalidRequest(String),
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("connection closed with error: {code} {reason}")]
    AbnormalClose { code: u16, reason: String },
    #[error("WebSocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),
}

/// Errors confined to a single inbound frame. They are logged and the loop
/// moves on to the next frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("binary frame is not UTF-8 text")]
    NotText,
    #[error("failed to decode JSON envelope: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("envelope has no 'audio' field")]
    MissingAudio,
    #[error("failed to decode audio payload: {0}")]
    Audio(#[from] AudioDecodeError),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error("failed to encode reply envelope: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Opens the WebSocket to the platform, presenting the bearer token.
#[instrument(skip(token))]
pub async fn connect(url: &str, token: &AccessToken) -> Result<PlatformSocket, SessionError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| SessionError::InvalidRequest(e.to_string()))?;
    let header = HeaderValue::from_str(&token.bearer_header())
        .map_err(|e| SessionError::InvalidRequest(e.to_string()))?;
    request.headers_mut().insert("Authorization", header);

    info!("Connecting to WebSocket");
    let (socket, response) = connect_async(request)
        .await
        .map_err(|source| SessionError::Connect {
            url: url.to_string(),
            source,
        })?;
    info!(status = %response.status(), "WebSocket connection established");
    Ok(socket)
}

/// Runs the receive loop until the connection ends.
///
/// Frames are handled one at a time: the next frame is not read until the
/// current one has gone through the whole pipeline and, if there is a reply,
/// the reply has been written. Returns `Ok(())` on a normal close.
pub async fn run_session<S>(
    socket: &mut S,
    pipeline: &Pipeline,
    encoding: AudioEncoding,
) -> Result<(), SessionError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin,
{
    while let Some(msg_result) = socket.next().await {
        let msg = msg_result?;
        let payload = match msg {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    log_frame_error(&FrameError::NotText);
                    continue;
                }
            },
            Message::Close(frame) => {
                // The close reply is only queued by the read; flush it out so
                // the peer sees a completed handshake.
                if let Err(e) = socket.close().await {
                    debug!("Close handshake not completed: {}", e);
                }
                return close_outcome(frame);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };
        debug!(bytes = payload.len(), "Received message from WebSocket");

        match handle_frame(&payload, pipeline, encoding).await {
            Ok(reply) => {
                socket.send(Message::text(reply)).await?;
                info!("Response sent");
            }
            Err(e) => log_frame_error(&e),
        }
    }

    info!("WebSocket stream ended");
    Ok(())
}

/// Decodes one inbound frame, runs it through the pipeline and returns the
/// serialized reply envelope.
pub async fn handle_frame(
    payload: &str,
    pipeline: &Pipeline,
    encoding: AudioEncoding,
) -> Result<String, FrameError> {
    let envelope: InboundEnvelope = serde_json::from_str(payload).map_err(FrameError::Decode)?;
    let audio_text = envelope.audio.ok_or(FrameError::MissingAudio)?;
    let audio = encoding.decode(&audio_text)?;

    let speech = pipeline.run(audio).await?;

    serde_json::to_string(&OutboundEnvelope::from_audio(&speech, encoding))
        .map_err(FrameError::Encode)
}

fn close_outcome(frame: Option<CloseFrame>) -> Result<(), SessionError> {
    match frame {
        Some(frame) if !matches!(frame.code, CloseCode::Normal | CloseCode::Away) => {
            Err(SessionError::AbnormalClose {
                code: u16::from(frame.code),
                reason: frame.reason.to_string(),
            })
        }
        _ => {
            info!("WebSocket connection closed normally");
            Ok(())
        }
    }
}

fn log_frame_error(err: &FrameError) {
    match err {
        FrameError::MissingAudio => warn!("Received message without 'audio' key"),
        FrameError::Stage(stage_err) if stage_err.is_empty() => {
            warn!(stage = %stage_err.stage(), "Dropping message: {}", stage_err)
        }
        FrameError::Stage(stage_err) => {
            error!(stage = %stage_err.stage(), "Dropping message: {}", stage_err)
        }
        other => error!("Error processing WebSocket message: {}", other),
    }
}
