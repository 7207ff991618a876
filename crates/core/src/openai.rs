//! OpenAI-compatible implementations of the pipeline stages.
//!
//! All three stages share one `async_openai` client, so pointing the
//! `OpenAIConfig` at a different base URL moves the whole pipeline to another
//! OpenAI-compatible provider.

use crate::stages::{Responder, Synthesizer, Transcriber};
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        AudioInput, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateSpeechRequestArgs, CreateTranscriptionRequestArgs,
        SpeechModel, Voice,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// Speech-to-text through the `/audio/transcriptions` endpoint.
pub struct OpenAITranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    file_name: String,
}

impl OpenAITranscriber {
    /// Creates a transcriber.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The transcription model identifier (e.g., "whisper-1").
    /// * `file_name` - Name given to the uploaded audio; its extension tells the
    ///   service which container format to expect (e.g., "audio.wav").
    pub fn new(config: OpenAIConfig, model: String, file_name: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            file_name,
        }
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        debug!(bytes = audio.len(), model = %self.model, "Requesting transcription");
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(self.file_name.clone(), audio))
            .model(&self.model)
            .build()?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .context("Transcription request failed")?;
        Ok(response.text)
    }
}

/// Chat-completion responder with a fixed system prompt.
pub struct OpenAIResponder {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAIResponder {
    /// Creates a responder.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The chat model identifier (e.g., "gpt-4o").
    /// * `system_prompt` - Persona sent as the system turn of every request.
    pub fn new(config: OpenAIConfig, model: String, system_prompt: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            system_prompt,
        }
    }
}

#[async_trait]
impl Responder for OpenAIResponder {
    async fn respond(&self, transcript: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.as_str())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(transcript)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        // A completion without choices or content is an empty answer, not a failure.
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// Text-to-speech through the `/audio/speech` endpoint.
pub struct OpenAISynthesizer {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAISynthesizer {
    /// Creates a synthesizer for the given model and voice names
    /// (e.g., "tts-1" and "alloy").
    ///
    /// Fails if either name cannot be parsed by the client library.
    pub fn new(config: OpenAIConfig, model: &str, voice: &str) -> Result<Self> {
        let model: SpeechModel = serde_json::from_value(serde_json::Value::from(model))
            .with_context(|| format!("Unknown speech model '{}'", model))?;
        let voice: Voice = serde_json::from_value(serde_json::Value::from(voice))
            .with_context(|| format!("Unknown voice '{}'", voice))?;
        Ok(Self {
            client: Client::with_config(config),
            model,
            voice,
        })
    }
}

#[async_trait]
impl Synthesizer for OpenAISynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .build()?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .context("Speech synthesis request failed")?;
        Ok(response.bytes.to_vec())
    }
}
