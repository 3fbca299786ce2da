// ============================================================================
// FakeApi - MarketApi scriptable pour les tests
// ============================================================================
// Réponses programmées, compteurs d'appels, et "porte" optionnelle pour
// bloquer l'appel markets (tests de single-flight)
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;
use tokio::time::Instant;

use super::MarketApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Currency, MarketEntry, PriceSeries};

/// Entrée de marché minimale pour les tests
pub fn entry(id: &str, price: f64, change: f64) -> MarketEntry {
    MarketEntry {
        id: id.to_string(),
        name: id.to_string(),
        symbol: id.chars().take(3).collect(),
        current_price: Some(price),
        price_change_percentage_24h: Some(change),
        market_cap: Some(price * 1e6),
        total_volume: Some(price * 1e4),
        image: format!("https://img.example/{}.png", id),
    }
}

/// Série journalière à partir d'une liste de prix
pub fn series(id: &str, prices: &[f64]) -> PriceSeries {
    let mut s = PriceSeries::new(id.to_string());
    for (i, &price) in prices.iter().enumerate() {
        let ts = Utc.with_ymd_and_hms(2024, 10, 1 + i as u32, 0, 0, 0).unwrap();
        s.push(ts, price);
    }
    s
}

/// Appels enregistrés par le fake
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub searches: Vec<String>,
    pub markets: Vec<(Vec<String>, Currency)>,
    pub charts: Vec<String>,
    /// Instant de chaque appel market_chart (horloge tokio)
    pub chart_times: Vec<Instant>,
}

/// Implémentation de MarketApi pilotée par les tests
pub struct FakeApi {
    search_result: Mutex<ApiResult<Vec<String>>>,
    market_result: Mutex<ApiResult<Vec<MarketEntry>>>,
    chart_results: Mutex<HashMap<String, ApiResult<PriceSeries>>>,
    market_gate: Mutex<Option<Arc<Semaphore>>>,
    calls: Mutex<Calls>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            search_result: Mutex::new(Ok(Vec::new())),
            market_result: Mutex::new(Ok(Vec::new())),
            chart_results: Mutex::new(HashMap::new()),
            market_gate: Mutex::new(None),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn with_markets(self, result: ApiResult<Vec<MarketEntry>>) -> Self {
        self.set_markets(result);
        self
    }

    pub fn with_chart(self, id: &str, result: ApiResult<PriceSeries>) -> Self {
        self.chart_results
            .lock()
            .unwrap()
            .insert(id.to_string(), result);
        self
    }

    pub fn with_search(self, result: ApiResult<Vec<String>>) -> Self {
        *self.search_result.lock().unwrap() = result;
        self
    }

    pub fn set_markets(&self, result: ApiResult<Vec<MarketEntry>>) {
        *self.market_result.lock().unwrap() = result;
    }

    /// Bloque les appels markets jusqu'à ce que le test ajoute un permit
    pub fn hold_markets(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.market_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketApi for FakeApi {
    async fn search(&self, query: &str) -> ApiResult<Vec<String>> {
        self.calls.lock().unwrap().searches.push(query.to_string());
        self.search_result.lock().unwrap().clone()
    }

    async fn markets(&self, ids: &[String], currency: Currency) -> ApiResult<Vec<MarketEntry>> {
        self.calls
            .lock()
            .unwrap()
            .markets
            .push((ids.to_vec(), currency));

        let gate = self.market_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.market_result.lock().unwrap().clone()
    }

    async fn market_chart(
        &self,
        id: &str,
        _currency: Currency,
        _days: u32,
    ) -> ApiResult<PriceSeries> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.charts.push(id.to_string());
            calls.chart_times.push(Instant::now());
        }
        self.chart_results
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or(Err(ApiError::HttpError { status: 404 }))
    }
}
