// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod currency; // Devises supportées (usd, inr, eur)
pub mod market;   // Entrée de la réponse /coins/markets
pub mod series;   // Série de prix pour les graphiques

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use coinboard::models::market::MarketEntry;
// On peut faire : use coinboard::models::MarketEntry;
pub use currency::Currency;
pub use market::MarketEntry;
pub use series::{PricePoint, PriceSeries, Trend};
