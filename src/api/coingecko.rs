// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère recherche, données de marché et séries de prix depuis CoinGecko
//
// CONCEPTS RUST :
// 1. async/await : requêtes HTTP non-bloquantes (reqwest)
// 2. Result<T, ApiError> : erreurs typées (429, HTTP, réseau, JSON)
// 3. Serde : désérialisation vers des structures qui matchent le JSON
// 4. #[instrument] : span tracing avec les paramètres de l'appel
// ============================================================================

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::MarketApi;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{Currency, MarketEntry, PriceSeries};

/// Header portant la clé "demo" CoinGecko
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================
// On ne déclare que les champs utilisés, serde ignore le reste
// ============================================================================

/// Réponse de `/search`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
}

/// Réponse de `/coins/{id}/market_chart`
#[derive(Debug, Deserialize)]
struct ChartResponse {
    prices: Vec<[f64; 2]>,
}

// ============================================================================
// Construction des URLs
// ============================================================================

/// Construit une URL `{base}/{segments...}?{params}` avec encodage
fn endpoint(base: &str, segments: &[&str], params: &[(&str, &str)]) -> ApiResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| ApiError::NetworkError(format!("invalid API base URL {}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ApiError::NetworkError(format!("API base URL cannot take a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}

/// URL de recherche : `{base}/search?query=...`
pub fn search_url(base: &str, query: &str) -> ApiResult<Url> {
    endpoint(base, &["search"], &[("query", query)])
}

/// URL des données de marché pour une liste de coins
pub fn markets_url(base: &str, ids: &[String], currency: Currency) -> ApiResult<Url> {
    let ids = ids.join(",");
    endpoint(
        base,
        &["coins", "markets"],
        &[
            ("vs_currency", currency.code()),
            ("ids", ids.as_str()),
            ("order", "market_cap_desc"),
            ("per_page", "100"),
            ("page", "1"),
            ("sparkline", "false"),
            ("price_change_percentage", "24h"),
        ],
    )
}

/// URL de la série de prix d'un coin
pub fn chart_url(base: &str, id: &str, currency: Currency, days: u32) -> ApiResult<Url> {
    let days = days.to_string();
    endpoint(
        base,
        &["coins", id, "market_chart"],
        &[
            ("vs_currency", currency.code()),
            ("days", days.as_str()),
            ("interval", "daily"),
        ],
    )
}

/// Headers envoyés avec chaque requête
pub fn api_headers(api_key: &str) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut key = HeaderValue::from_str(api_key).context("Clé API invalide pour un header HTTP")?;
    key.set_sensitive(true); // Jamais affichée dans les logs Debug
    headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

    Ok(headers)
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP CoinGecko
///
/// CONCEPT : Un seul reqwest::Client réutilisé
/// - Pool de connexions partagé entre toutes les requêtes
/// - Headers et timeout configurés une fois au builder
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base: String,
}

impl CoinGeckoClient {
    /// Crée le client depuis la configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // Valide l'URL de base dès le démarrage
        endpoint(&config.api_base, &[], &[])
            .with_context(|| format!("URL d'API invalide : {}", config.api_base))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("coinboard/", env!("CARGO_PKG_VERSION")))
            .default_headers(api_headers(&config.api_key)?)
            .timeout(config.request_timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        info!(base = %config.api_base, timeout = ?config.request_timeout, "CoinGecko client ready");
        Ok(Self {
            http,
            base: config.api_base.clone(),
        })
    }

    /// GET sur une URL et retourne le JSON brut
    ///
    /// - 429 → `RateLimited`
    /// - autre non-2xx → `HttpError { status }`
    /// - échec de transport ou timeout → `NetworkError`
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn request(&self, url: Url) -> ApiResult<Value> {
        debug!("Sending HTTP request");
        let response = self.http.get(url).send().await.map_err(|e| {
            error!(error = %e, "HTTP request failed");
            ApiError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16());
            if err == ApiError::RateLimited {
                warn!("Rate limited by CoinGecko");
            } else {
                error!(status = %status, "CoinGecko returned error status");
            }
            return Err(err);
        }

        response.json::<Value>().await.map_err(ApiError::from)
    }
}

#[async_trait]
impl MarketApi for CoinGeckoClient {
    async fn search(&self, query: &str) -> ApiResult<Vec<String>> {
        let value = self.request(search_url(&self.base, query)?).await?;
        let response: SearchResponse = serde_json::from_value(value)?;

        debug!(query = %query, matches = response.coins.len(), "Search completed");
        Ok(response.coins.into_iter().map(|coin| coin.id).collect())
    }

    async fn markets(&self, ids: &[String], currency: Currency) -> ApiResult<Vec<MarketEntry>> {
        let value = self.request(markets_url(&self.base, ids, currency)?).await?;
        let entries: Vec<MarketEntry> = serde_json::from_value(value)?;

        info!(requested = ids.len(), received = entries.len(), currency = %currency, "Fetched market data");
        Ok(entries)
    }

    async fn market_chart(
        &self,
        id: &str,
        currency: Currency,
        days: u32,
    ) -> ApiResult<PriceSeries> {
        let value = self
            .request(chart_url(&self.base, id, currency, days)?)
            .await?;
        let response: ChartResponse = serde_json::from_value(value)?;

        let series = PriceSeries::from_raw(id.to_string(), &response.prices);
        debug!(coin = %id, points = series.len(), "Fetched price series");
        Ok(series)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
