//! Core speech-to-speech logic for the voice bridge.
//!
//! The three remote stages (speech-to-text, chat completion, text-to-speech)
//! are modelled as traits in [`stages`], implemented against OpenAI-compatible
//! APIs in [`openai`] and chained by [`pipeline::Pipeline`].

pub mod openai;
pub mod pipeline;
pub mod stages;

pub use pipeline::Pipeline;
pub use stages::{Responder, Stage, StageError, Synthesizer, Transcriber};
