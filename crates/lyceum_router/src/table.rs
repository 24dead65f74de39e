//! Static tier-to-model routing table.

use lyceum_core::{AccessTier, LyceumConfig, ModelRoute};
use lyceum_error::{ConfigError, LyceumResult};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use tracing::debug;

/// Immutable map from entitlement tier to model route.
///
/// The base route always exists; it is both the base tier's target and the
/// fallback for every paid tier. Tiers with no configured route resolve to
/// the base route, since entitlement data upstream can be stale.
///
/// # Examples
///
/// ```
/// use lyceum_core::{AccessTier, ModelRoute};
/// use lyceum_router::RouteTable;
///
/// let base = ModelRoute {
///     model: "llama-3.1-8b-instruct".to_string(),
///     max_tokens: 1024,
///     temperature: 0.7,
/// };
/// let table = RouteTable::new(base.clone());
/// assert_eq!(table.resolve(AccessTier::Premium), &base);
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: ModelRoute,
    routes: HashMap<AccessTier, ModelRoute>,
}

impl RouteTable {
    /// Create a table with only the base route configured.
    pub fn new(base: ModelRoute) -> Self {
        Self {
            base,
            routes: HashMap::new(),
        }
    }

    /// Add or replace the route for a paid tier.
    pub fn with_route(mut self, tier: AccessTier, route: ModelRoute) -> Self {
        if tier.is_base() {
            self.base = route;
        } else {
            self.routes.insert(tier, route);
        }
        self
    }

    /// Build a table from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no base-tier route is configured,
    /// since every fallback depends on it.
    pub fn from_config(config: &LyceumConfig) -> LyceumResult<Self> {
        let base = config
            .route(AccessTier::Base)
            .ok_or_else(|| ConfigError::new("No model route configured for the base tier"))?;

        let mut table = Self::new(base);
        for tier in AccessTier::iter().filter(|tier| !tier.is_base()) {
            if let Some(route) = config.route(tier) {
                debug!(tier = %tier, model = %route.model, "Registered tier route");
                table = table.with_route(tier, route);
            }
        }
        Ok(table)
    }

    /// Resolve the route for a tier, falling back to base when unconfigured.
    pub fn resolve(&self, tier: AccessTier) -> &ModelRoute {
        if tier.is_base() {
            &self.base
        } else {
            self.routes.get(&tier).unwrap_or(&self.base)
        }
    }

    /// The base tier's route, the fallback target for every paid tier.
    pub fn base(&self) -> &ModelRoute {
        &self.base
    }
}
