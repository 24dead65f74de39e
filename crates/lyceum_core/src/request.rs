//! Request and response types for provider calls.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Resolved request sent to a model provider.
///
/// The model and generation parameters are filled in by the tier router from
/// the caller's route; callers never pick a model directly.
///
/// # Examples
///
/// ```
/// use lyceum_core::{ChatRequest, Message};
///
/// let request = ChatRequest {
///     model: "gpt-4o-mini".to_string(),
///     messages: vec![Message::user("Hello!")],
///     max_tokens: 1024,
///     temperature: 0.7,
/// };
///
/// assert_eq!(request.messages.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier to invoke
    pub model: String,
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: f32,
}

/// Text completion returned by a model provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated text
    pub text: String,
}

/// Caller-supplied overrides for a generation request.
///
/// Unset fields fall back to the caller's route defaults.
///
/// # Examples
///
/// ```
/// use lyceum_core::GenerateOptions;
///
/// let options = GenerateOptions::default()
///     .with_max_tokens(Some(256))
///     .with_temperature(Some(0.2));
/// assert_eq!(options.max_tokens, Some(256));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct GenerateOptions {
    /// Maximum number of tokens to generate (route default if None)
    pub max_tokens: Option<u32>,
    /// Sampling temperature (route default if None)
    pub temperature: Option<f32>,
}
