// ============================================================================
// Coinboard - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;        // Client CoinGecko (trait MarketApi)
pub mod app;        // État de session (App)
pub mod charts;     // Gestionnaire des graphiques par coin
pub mod config;     // Configuration immuable
pub mod error;      // Erreurs typées de l'API
pub mod format;     // Formatage des nombres
pub mod models;     // Structures de données
pub mod refresh;    // Orchestrateur de rafraîchissement
pub mod scheduler;  // Tâches différées / périodiques annulables
pub mod search;     // Recherche de coins
pub mod ui;         // Interface utilisateur
pub mod worker;     // Côté async : timers, commandes, teardown
