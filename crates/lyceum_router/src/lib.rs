//! Entitlement-tier model routing with automatic base-tier fallback.
//!
//! A [`TieredRouter`] maps a caller's tier to a [`ModelRoute`](lyceum_core::ModelRoute)
//! and invokes the external provider with the resolved model. When a paid
//! tier's model fails, the router retries exactly once against the base
//! tier's model; a base-tier failure propagates unchanged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod router;
mod table;

pub use router::{RoutedCompletion, TieredRouter};
pub use table::RouteTable;
