//! Pipeline Stage Contracts
//!
//! Each remote model the bridge talks to sits behind one of these traits so the
//! pipeline can be driven by any backend (the hosted OpenAI models in
//! production, fakes in tests).

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Identifies a step of the speech-to-speech pipeline, mostly for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcription,
    Response,
    Synthesis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Transcription => "transcription",
            Stage::Response => "response generation",
            Stage::Synthesis => "speech synthesis",
        };
        f.write_str(name)
    }
}

/// Why a stage did not hand anything to the next one.
///
/// `Empty` means the remote model answered but with nothing usable, `Failed`
/// means the call itself went wrong. Either way the rest of the pipeline is
/// skipped for that message.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{stage} produced no output")]
    Empty { stage: Stage },
    #[error("{stage} failed: {source:#}")]
    Failed {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl StageError {
    /// The stage that stopped the pipeline.
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Empty { stage } | StageError::Failed { stage, .. } => *stage,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StageError::Empty { .. })
    }
}

/// Turns an audio payload into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes one audio payload. An empty string is a valid answer and is
    /// treated by the pipeline as "nothing was said".
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String>;
}

/// Produces a conversational reply for a transcript.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generates a reply to `transcript`. No earlier turns are sent along.
    async fn respond(&self, transcript: &str) -> Result<String>;
}

/// Turns reply text into raw audio bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
