//! Startup sequence shared by the `gateway` binary and its tests: build the
//! pipeline, authenticate, then connect and serve the session.

use crate::{
    auth::Authenticator,
    config::Config,
    session::{connect, run_session},
};
use anyhow::Context;
use async_openai::config::OpenAIConfig;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{error, info, warn};
use voxbridge_core::{
    Pipeline,
    openai::{OpenAIResponder, OpenAISynthesizer, OpenAITranscriber},
};

/// Listens for the `Ctrl+C` signal to stop the session.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down...");
}

/// Builds the OpenAI-backed pipeline from configuration.
pub fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let mut openai_config = OpenAIConfig::new().with_api_base(&config.openai_api_base);
    match &config.openai_api_key {
        Some(key) => openai_config = openai_config.with_api_key(key.expose_secret()),
        None => warn!("OPENAI_API_KEY is not set; model calls will be rejected by the provider."),
    }

    let transcriber = OpenAITranscriber::new(
        openai_config.clone(),
        config.transcription_model.clone(),
        config.audio_file_name.clone(),
    );
    let responder = OpenAIResponder::new(
        openai_config.clone(),
        config.chat_model.clone(),
        config.system_prompt.clone(),
    );
    let synthesizer = OpenAISynthesizer::new(openai_config, &config.tts_model, &config.tts_voice)
        .context("Invalid speech synthesis settings")?;

    Ok(Pipeline::new(
        Arc::new(transcriber),
        Arc::new(responder),
        Arc::new(synthesizer),
    ))
}

/// Runs the bridge until the session ends.
///
/// Authentication happens before any connection attempt; if it fails, the
/// WebSocket endpoint is never contacted.
pub async fn run(config: Config) -> anyhow::Result<()> {
    // --- 1. Build the Pipeline ---
    let pipeline = build_pipeline(&config)?;

    // --- 2. Authenticate ---
    let authenticator = Authenticator::new(
        config.auth_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
    );
    let token = authenticator
        .fetch_token()
        .await
        .context("Authentication with the platform failed")?;

    // --- 3. Serve the Session ---
    info!(
        transcription_model = %config.transcription_model,
        chat_model = %config.chat_model,
        tts_model = %config.tts_model,
        encoding = ?config.audio_encoding,
        "Pipeline configured. Opening session..."
    );
    let mut socket = connect(&config.ws_url, &token).await?;

    tokio::select! {
        result = run_session(&mut socket, &pipeline, config.audio_encoding) => {
            if let Err(e) = result {
                error!(error = %e, "Session terminated with error.");
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {}
    }

    info!("Session finished.");
    Ok(())
}
