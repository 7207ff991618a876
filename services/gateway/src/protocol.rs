//! Defines the JSON envelopes exchanged with the audio platform and the text
//! encodings used to carry audio bytes inside them.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A frame received from the platform. Only `audio` is looked at; any other
/// fields are ignored.
#[derive(Deserialize, Debug)]
pub struct InboundEnvelope {
    #[serde(default)]
    pub audio: Option<String>,
}

/// A frame sent back to the platform carrying synthesized speech.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutboundEnvelope {
    pub audio: String,
}

/// How audio bytes are represented as JSON strings on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Standard base64 alphabet with padding.
    #[default]
    Base64,
    /// One character per byte, each byte taken as a Unicode code point in
    /// `U+0000..=U+00FF`.
    Latin1,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioDecodeError {
    #[error("invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("character {0:?} at index {1} is outside the latin-1 range")]
    NotLatin1(char, usize),
}

impl FromStr for AudioEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base64" => Ok(AudioEncoding::Base64),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(AudioEncoding::Latin1),
            other => Err(format!("unknown audio encoding '{}'", other)),
        }
    }
}

impl AudioEncoding {
    pub fn encode(&self, audio: &[u8]) -> String {
        match self {
            AudioEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(audio),
            AudioEncoding::Latin1 => audio.iter().map(|&b| char::from(b)).collect(),
        }
    }

    pub fn decode(&self, text: &str) -> Result<Vec<u8>, AudioDecodeError> {
        match self {
            AudioEncoding::Base64 => Ok(base64::engine::general_purpose::STANDARD.decode(text)?),
            AudioEncoding::Latin1 => text
                .chars()
                .enumerate()
                .map(|(i, c)| u8::try_from(c).map_err(|_| AudioDecodeError::NotLatin1(c, i)))
                .collect(),
        }
    }
}

impl OutboundEnvelope {
    /// Wraps synthesized audio for sending.
    pub fn from_audio(audio: &[u8], encoding: AudioEncoding) -> Self {
        Self {
            audio: encoding.encode(audio),
        }
    }
}
