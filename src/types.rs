//! Type-safe identifiers for the ticketing backend
//!
//! Service keys and HTTP methods are closed sets; enums give exhaustive
//! matching and keep stringly-typed service names out of the engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Logical backend service reachable through a fixed base URL
///
/// Declaration order is the health-sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceKey {
    Gateway,
    Order,
    Inventory,
    Query,
    Worker,
    Nginx,
}

impl ServiceKey {
    /// Human label shown next to health checks
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Order => "order-service",
            Self::Inventory => "inventory-service",
            Self::Query => "query-service",
            Self::Worker => "ticket-worker",
            Self::Nginx => "gateway-nginx",
        }
    }

    /// All services in sweep order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// HTTP methods the console issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}
