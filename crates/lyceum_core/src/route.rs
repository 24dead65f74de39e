//! Static model routing configuration.

use serde::{Deserialize, Serialize};

/// Target model and generation parameters for one tier.
///
/// Routes are static configuration resolved at startup and never mutated at
/// runtime. Failed calls on a paid tier fall back to the base tier's route.
///
/// # Examples
///
/// ```
/// use lyceum_core::ModelRoute;
///
/// let route = ModelRoute {
///     model: "gpt-4o".to_string(),
///     max_tokens: 4096,
///     temperature: 0.7,
/// };
/// assert_eq!(route.model, "gpt-4o");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Model identifier for this tier
    pub model: String,
    /// Token budget for generation
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}
