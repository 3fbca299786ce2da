// ============================================================================
// Configuration
// ============================================================================
// Réglages immuables, fixés une fois au démarrage puis partagés (Arc)
//
// Sources, par priorité :
// 1. Variables d'environnement COINBOARD_*
// 2. Valeurs par défaut (Config::default)
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::Currency;

/// URL de base de l'API CoinGecko v3
pub const DEFAULT_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Coins affichés au démarrage et quand la recherche est vidée
pub const DEFAULT_COINS: [&str; 6] = [
    "bitcoin",
    "ethereum",
    "cardano",
    "polkadot",
    "chainlink",
    "litecoin",
];

/// Configuration globale de l'application
#[derive(Debug, Clone)]
pub struct Config {
    /// URL de base de l'API (sans slash final)
    pub api_base: String,

    /// Clé "demo" envoyée dans le header x-cg-demo-api-key
    pub api_key: String,

    /// Intervalle entre deux rafraîchissements automatiques
    pub refresh_interval: Duration,

    /// Fenêtre des graphiques, en jours
    pub chart_days: u32,

    /// Liste de coins par défaut
    pub default_coins: Vec<String>,

    /// Devise active au démarrage
    pub default_currency: Currency,

    /// Fenêtre de debounce de la recherche
    pub search_debounce: Duration,

    /// Délai avant chaque requête de graphique (rate limiting)
    pub chart_request_delay: Duration,

    /// Timeout appliqué à chaque requête HTTP
    pub request_timeout: Duration,

    /// Nombre max de résultats de recherche retenus
    pub max_search_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            refresh_interval: Duration::from_secs(60),
            chart_days: 7,
            default_coins: DEFAULT_COINS.iter().map(|c| c.to_string()).collect(),
            default_currency: Currency::Usd,
            search_debounce: Duration::from_millis(500),
            chart_request_delay: Duration::from_millis(300),
            request_timeout: Duration::from_secs(10),
            max_search_results: 6,
        }
    }
}

impl Config {
    /// Charge la configuration depuis l'environnement du process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Injection de dépendance par closure
    /// - `from_env` passe std::env::var
    /// - Les tests passent une HashMap, sans toucher à l'environnement global
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base) = lookup("COINBOARD_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(key) = lookup("COINBOARD_API_KEY") {
            config.api_key = key;
        }

        if let Some(secs) = lookup("COINBOARD_REFRESH_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("COINBOARD_REFRESH_SECS invalide : {}", secs))?;
            anyhow::ensure!(secs > 0, "COINBOARD_REFRESH_SECS doit être > 0");
            config.refresh_interval = Duration::from_secs(secs);
        }

        if let Some(days) = lookup("COINBOARD_CHART_DAYS") {
            config.chart_days = days
                .parse()
                .with_context(|| format!("COINBOARD_CHART_DAYS invalide : {}", days))?;
        }

        if let Some(secs) = lookup("COINBOARD_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("COINBOARD_TIMEOUT_SECS invalide : {}", secs))?;
            anyhow::ensure!(secs > 0, "COINBOARD_TIMEOUT_SECS doit être > 0");
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(code) = lookup("COINBOARD_CURRENCY") {
            config.default_currency = Currency::from_code(&code)
                .with_context(|| format!("Devise non supportée : {}", code))?;
        }

        if let Some(coins) = lookup("COINBOARD_COINS") {
            let coins: Vec<String> = coins
                .split(',')
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect();
            anyhow::ensure!(!coins.is_empty(), "COINBOARD_COINS est vide");
            config.default_coins = coins;
        }

        Ok(config)
    }

    /// Intervalle de rafraîchissement en secondes (pour le compte à rebours)
    pub fn refresh_secs(&self) -> u64 {
        self.refresh_interval.as_secs().max(1)
    }
}
