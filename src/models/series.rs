// ============================================================================
// Structure : PriceSeries
// ============================================================================
// Série (timestamp, prix) d'un coin sur la fenêtre de lookback
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : timestamps typés (chrono) au lieu de millisecondes brutes
// 2. Option chaining avec ? : first()/last() sur une série vide
// 3. Conversion depuis le format brut de l'API : [[ms, prix], ...]
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tendance d'une série : compare le dernier prix au premier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Dernier prix >= premier prix
    Up,
    /// Dernier prix < premier prix
    Down,
}

/// Un point de la série
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Série de prix d'un coin, remplacée en entier à chaque fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Identifiant du coin (ex: "bitcoin")
    pub coin_id: String,

    /// Points triés comme l'API les renvoie (ordre chronologique)
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Crée une série vide
    pub fn new(coin_id: String) -> Self {
        Self {
            coin_id,
            points: Vec::new(),
        }
    }

    /// Construit la série depuis le format brut `[[timestampMs, price], ...]`
    ///
    /// Les paires mal formées (timestamp hors bornes, prix non fini) sont
    /// ignorées plutôt que de faire échouer toute la série.
    pub fn from_raw(coin_id: String, raw: &[[f64; 2]]) -> Self {
        let points = raw
            .iter()
            .filter(|[_, price]| price.is_finite())
            .filter_map(|&[ms, price]| {
                let timestamp = DateTime::from_timestamp_millis(ms as i64)?;
                Some(PricePoint { timestamp, price })
            })
            .collect();

        Self { coin_id, points }
    }

    /// Ajoute un point à la fin de la série
    pub fn push(&mut self, timestamp: DateTime<Utc>, price: f64) {
        self.points.push(PricePoint { timestamp, price });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Premier prix de la série
    pub fn first_price(&self) -> Option<f64> {
        self.points.first().map(|p| p.price)
    }

    /// Dernier prix de la série
    pub fn last_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }

    /// Tendance : delta dernier - premier >= 0 → Up, sinon Down
    ///
    /// None si la série est vide.
    pub fn trend(&self) -> Option<Trend> {
        let delta = self.last_price()? - self.first_price()?;
        Some(if delta >= 0.0 { Trend::Up } else { Trend::Down })
    }

    /// Prix min et max en un seul passage
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        Some(self.points.iter().fold(
            (f64::MAX, f64::MIN),
            |(min, max), p| (min.min(p.price), max.max(p.price)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> PriceSeries {
        let raw: Vec<[f64; 2]> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| [1_700_000_000_000.0 + i as f64 * 86_400_000.0, p])
            .collect();
        PriceSeries::from_raw("bitcoin".to_string(), &raw)
    }

    #[test]
    fn test_from_raw() {
        let s = series(&[1.0, 2.0, 3.0]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.points[0].timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(s.last_price(), Some(3.0));
    }

    #[test]
    fn test_from_raw_skips_non_finite() {
        let s = PriceSeries::from_raw(
            "x".to_string(),
            &[[1_700_000_000_000.0, f64::NAN], [1_700_000_000_000.0, 5.0]],
        );
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_trend() {
        assert_eq!(series(&[1.0, 0.5, 2.0]).trend(), Some(Trend::Up));
        assert_eq!(series(&[2.0, 3.0, 1.0]).trend(), Some(Trend::Down));
        // Delta nul : tendance positive
        assert_eq!(series(&[2.0, 1.0, 2.0]).trend(), Some(Trend::Up));
        assert_eq!(series(&[]).trend(), None);
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(series(&[3.0, 1.0, 2.0]).price_bounds(), Some((1.0, 3.0)));
        assert_eq!(series(&[]).price_bounds(), None);
    }
}
