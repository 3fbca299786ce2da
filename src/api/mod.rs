// ============================================================================
// Module : api
// ============================================================================
// Client de l'API de marché (CoinGecko v3) derrière le trait MarketApi
//
// CONCEPT RUST : Trait comme point d'injection
// - L'orchestrateur et la recherche ne connaissent que `dyn MarketApi`
// - Le client HTTP réel et le fake des tests implémentent le même trait
// ============================================================================

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{Currency, MarketEntry, PriceSeries};

pub mod coingecko; // Client HTTP CoinGecko

#[cfg(test)]
pub mod fake; // Fake scriptable pour les tests

// Re-export du client principal
pub use coingecko::CoinGeckoClient;

/// Opérations de lecture sur l'API de marché
///
/// Aucune méthode ne retente : les retries éventuels sont à la charge de
/// l'appelant.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Recherche de coins : identifiants dans l'ordre de l'API
    async fn search(&self, query: &str) -> ApiResult<Vec<String>>;

    /// Données de marché de plusieurs coins en un seul appel
    async fn markets(&self, ids: &[String], currency: Currency) -> ApiResult<Vec<MarketEntry>>;

    /// Série de prix d'un coin sur `days` jours
    async fn market_chart(&self, id: &str, currency: Currency, days: u32)
        -> ApiResult<PriceSeries>;
}
