// ============================================================================
// Structure : MarketEntry
// ============================================================================
// Une ligne de la réponse `/coins/markets` : un coin pour un cycle de fetch
//
// CONCEPTS RUST :
// 1. #[serde(default)] : champ absent du JSON -> valeur par défaut
// 2. Option<f64> : l'API renvoie parfois null (market cap inconnue, etc.)
// 3. Immutabilité : une entrée n'est jamais modifiée, elle est remplacée
//    entièrement au cycle suivant
// ============================================================================

use serde::{Deserialize, Serialize};

/// Données de marché d'un coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    /// Identifiant stable CoinGecko (ex: "bitcoin")
    pub id: String,

    /// Nom affiché (ex: "Bitcoin")
    pub name: String,

    /// Symbole (ex: "btc", en minuscules côté API)
    pub symbol: String,

    /// Prix actuel dans la devise demandée
    #[serde(default)]
    pub current_price: Option<f64>,

    /// Variation sur 24h en pourcentage
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,

    /// Capitalisation
    #[serde(default)]
    pub market_cap: Option<f64>,

    /// Volume échangé sur 24h
    #[serde(default)]
    pub total_volume: Option<f64>,

    /// URL du logo
    #[serde(default)]
    pub image: String,
}

impl MarketEntry {
    /// Variation 24h, 0 si l'API ne l'a pas fournie
    pub fn change_or_zero(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }

    /// true si la variation 24h est positive ou nulle
    pub fn is_positive(&self) -> bool {
        self.change_or_zero() >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_nulls() {
        let json = r#"{
            "id": "bitcoin",
            "name": "Bitcoin",
            "symbol": "btc",
            "current_price": 67000.5,
            "price_change_percentage_24h": null,
            "market_cap": 1.3e12,
            "image": "https://example.org/btc.png",
            "ath": 73000.0
        }"#;

        let entry: MarketEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "bitcoin");
        assert_eq!(entry.current_price, Some(67000.5));
        assert_eq!(entry.price_change_percentage_24h, None);
        assert_eq!(entry.total_volume, None);
        assert!(entry.is_positive());
    }

    #[test]
    fn test_negative_change() {
        let entry: MarketEntry = serde_json::from_str(
            r#"{"id":"x","name":"X","symbol":"x","price_change_percentage_24h":-1.5}"#,
        )
        .unwrap();
        assert!(!entry.is_positive());
        assert_eq!(entry.image, "");
    }
}
