//! Tier router with one-step base-tier fallback.

use crate::RouteTable;
use lyceum_core::{AccessTier, ChatRequest, GenerateOptions, Message, ModelRoute};
use lyceum_error::LyceumResult;
use lyceum_interface::ChatProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Completion result annotated with routing metadata.
///
/// `tier` always reflects the caller's original tier for billing and
/// analytics; `model_used` reflects whichever model actually produced the
/// text, which differs after a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedCompletion {
    /// The generated text
    pub text: String,
    /// Model that produced the result
    pub model_used: String,
    /// The caller's tier at request time
    pub tier: AccessTier,
}

/// Routes one caller's requests to the model their tier entitles them to.
///
/// Constructed per request with the caller's current tier. A router built
/// with an unrecognized tier behaves as the base tier rather than failing,
/// since entitlement lookups upstream can be stale.
pub struct TieredRouter {
    tier: AccessTier,
    routes: Arc<RouteTable>,
    provider: Arc<dyn ChatProvider>,
}

impl TieredRouter {
    /// Create a router for a caller at `tier`.
    pub fn new(tier: AccessTier, routes: Arc<RouteTable>, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            tier,
            routes,
            provider,
        }
    }

    /// The tier this router was constructed with.
    pub fn tier(&self) -> AccessTier {
        self.tier
    }

    /// Generate a completion on the tier's model, falling back to the base
    /// model on failure.
    ///
    /// The fallback fires at most once, and only when the resolved route is
    /// not already the base route. A fallback failure propagates unchanged.
    #[instrument(skip(self, messages, options), fields(tier = %self.tier))]
    pub async fn chat_completion(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> LyceumResult<RoutedCompletion> {
        let route = self.routes.resolve(self.tier);
        let request = build_request(route, messages, options);
        debug!(model = %request.model, "Invoking provider");

        match self.provider.chat(&request).await {
            Ok(response) => Ok(RoutedCompletion {
                text: response.text,
                model_used: request.model,
                tier: self.tier,
            }),
            Err(primary_error) => {
                let base = self.routes.base();
                if route == base {
                    return Err(primary_error);
                }

                warn!(
                    error = %primary_error,
                    model = %request.model,
                    fallback = %base.model,
                    "Primary model failed, retrying on base route"
                );
                let request = build_request(base, messages, options);
                let response = self.provider.chat(&request).await?;
                Ok(RoutedCompletion {
                    text: response.text,
                    model_used: request.model,
                    tier: self.tier,
                })
            }
        }
    }
}

fn build_request(
    route: &ModelRoute,
    messages: &[Message],
    options: &GenerateOptions,
) -> ChatRequest {
    ChatRequest {
        model: route.model.clone(),
        messages: messages.to_vec(),
        max_tokens: options.max_tokens.unwrap_or(route.max_tokens),
        temperature: options.temperature.unwrap_or(route.temperature),
    }
}
