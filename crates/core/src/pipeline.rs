//! The speech-to-speech pipeline: transcribe, respond, synthesize.

use crate::stages::{Responder, Stage, StageError, Synthesizer, Transcriber};
use std::sync::Arc;
use tracing::{debug, info};

/// Chains the three stages for a single audio payload.
///
/// The pipeline keeps no state between calls; every payload is handled as a
/// fresh, context-free exchange.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    responder: Arc<dyn Responder>,
    synthesizer: Arc<dyn Synthesizer>,
}

impl Pipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        responder: Arc<dyn Responder>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            transcriber,
            responder,
            synthesizer,
        }
    }

    /// Runs one payload through all stages and returns the synthesized reply.
    ///
    /// Stops at the first stage that fails or comes back empty; later stages
    /// are not called in that case.
    pub async fn run(&self, audio: Vec<u8>) -> Result<Vec<u8>, StageError> {
        debug!(bytes = audio.len(), "Running pipeline");

        let transcript = self
            .transcriber
            .transcribe(audio)
            .await
            .map_err(|source| failed(Stage::Transcription, source))?;
        non_empty(Stage::Transcription, &transcript)?;
        info!(%transcript, "Transcribed");

        let reply = self
            .responder
            .respond(&transcript)
            .await
            .map_err(|source| failed(Stage::Response, source))?;
        non_empty(Stage::Response, &reply)?;
        info!(%reply, "Generated response");

        let speech = self
            .synthesizer
            .synthesize(&reply)
            .await
            .map_err(|source| failed(Stage::Synthesis, source))?;
        if speech.is_empty() {
            return Err(StageError::Empty {
                stage: Stage::Synthesis,
            });
        }
        debug!(bytes = speech.len(), "Synthesized reply audio");

        Ok(speech)
    }
}

fn failed(stage: Stage, source: anyhow::Error) -> StageError {
    StageError::Failed { stage, source }
}

fn non_empty(stage: Stage, text: &str) -> Result<(), StageError> {
    if text.is_empty() {
        Err(StageError::Empty { stage })
    } else {
        Ok(())
    }
}
