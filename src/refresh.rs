// ============================================================================
// Refresher - Cycle de rafraîchissement
// ============================================================================
// Un cycle : données de marché → cartes → graphiques, un coin à la fois
//
// CONCEPTS RUST :
// 1. RAII : LoadingGuard remet le drapeau `loading` à false dans Drop,
//    quelle que soit la sortie (succès, erreur, annulation de la tâche)
// 2. Arc<dyn MarketApi> : l'API est injectée (client réel ou fake)
// 3. Verrou court : le Mutex de App n'est jamais tenu pendant un .await
//
// PATTERN : Single-flight
// - Un seul cycle à la fois
// - Tick périodique pendant un cycle → ignoré
// - Rechargement demandé pendant un cycle → mémorisé, exécuté juste après
// ============================================================================

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, info, instrument, warn};

use crate::api::MarketApi;
use crate::app::{lock_app, App, ErrorKind, SharedApp};
use crate::config::Config;
use crate::error::{non_empty, ApiError};
use crate::ui::cards::build_cards;

/// Message affiché pendant le premier chargement
pub const LOADING_MESSAGE: &str = "Chargement des cryptomonnaies...";

/// Message affiché quand les données de marché n'ont pas pu être chargées
pub const LOAD_FAILED_MESSAGE: &str =
    "Impossible de charger les données de marché. Appuyez sur [r] pour réessayer.";

/// Message affiché quand l'API ne retourne aucun coin
pub const NO_DATA_MESSAGE: &str = "Aucune donnée disponible pour cette sélection.";

/// Résultat d'un appel à refresh() / reload()
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Un cycle tournait déjà, le tick est ignoré
    Skipped,

    /// Un cycle tournait déjà, le rechargement le suivra
    Deferred,

    /// Cartes affichées; `placeholder_charts` graphiques n'ont pas pu être chargés
    Completed {
        coins: usize,
        placeholder_charts: usize,
    },

    /// L'appel markets a échoué (`EmptyResult` : aucune donnée)
    Failed(ApiError),

    /// La sélection a changé pendant le cycle, ses résultats sont jetés
    Superseded,

    /// L'affichage a été remplacé pendant le cycle (erreur de recherche) :
    /// le cycle s'arrête sans y toucher
    Interrupted,
}

/// Drapeau `loading` tenu pendant toute la durée d'un cycle
struct LoadingGuard {
    app: SharedApp,
}

impl LoadingGuard {
    /// Teste et pose le drapeau sous un seul verrou
    ///
    /// Si un cycle tourne déjà : None, et si `defer_if_busy` le rechargement
    /// est mémorisé.
    fn acquire(app: &SharedApp, defer_if_busy: bool) -> Option<Self> {
        let mut state = lock_app(app);
        if state.is_loading() {
            if defer_if_busy {
                state.request_reload();
            }
            return None;
        }
        state.start_loading();
        drop(state);

        Some(Self { app: app.clone() })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        lock_app(&self.app).stop_loading();
    }
}

/// Orchestrateur des cycles de rafraîchissement
#[derive(Clone)]
pub struct Refresher {
    api: Arc<dyn MarketApi>,
    app: SharedApp,
    config: Arc<Config>,
}

impl Refresher {
    pub fn new(api: Arc<dyn MarketApi>, app: SharedApp, config: Arc<Config>) -> Self {
        Self { api, app, config }
    }

    pub fn app(&self) -> &SharedApp {
        &self.app
    }

    pub fn api(&self) -> &Arc<dyn MarketApi> {
        &self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rafraîchissement périodique : ignoré si un cycle est en cours
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        match LoadingGuard::acquire(&self.app, false) {
            Some(guard) => self.run_until_settled(guard).await,
            None => {
                debug!("Refresh skipped, a cycle is already running");
                RefreshOutcome::Skipped
            }
        }
    }

    /// Rechargement explicite (devise, recherche, réessayer)
    ///
    /// Si un cycle est en cours, un nouveau cycle démarre dès qu'il se
    /// termine.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> RefreshOutcome {
        match LoadingGuard::acquire(&self.app, true) {
            Some(guard) => self.run_until_settled(guard).await,
            None => {
                debug!("Reload deferred until the running cycle ends");
                RefreshOutcome::Deferred
            }
        }
    }

    /// Enchaîne les cycles tant qu'un rechargement est en attente
    async fn run_until_settled(&self, _guard: LoadingGuard) -> RefreshOutcome {
        loop {
            let outcome = self.run_cycle().await;
            let pending = lock_app(&self.app).take_reload_pending();

            if pending || outcome == RefreshOutcome::Superseded {
                debug!(?outcome, "Selection changed, running another cycle");
                continue;
            }
            return outcome;
        }
    }

    /// Vérifie que la sélection et l'affichage sont ceux que le cycle a
    /// vus en dernier
    fn check_current(&self, generation: u64, epoch: u64) -> Option<RefreshOutcome> {
        stale(&lock_app(&self.app), generation, epoch)
    }

    /// Un cycle complet
    async fn run_cycle(&self) -> RefreshOutcome {
        // Photo de la sélection au début du cycle
        let (coins, currency, generation, epoch) = {
            let mut app = lock_app(&self.app);
            if !app.has_cards() {
                app.show_loading(LOADING_MESSAGE);
            }
            (
                app.current_coins().to_vec(),
                app.current_currency(),
                app.generation(),
                app.display_epoch(),
            )
        };

        info!(coins = coins.len(), currency = %currency, "Refreshing market data");

        let result = if coins.is_empty() {
            Err(ApiError::EmptyResult)
        } else {
            self.api.markets(&coins, currency).await.and_then(non_empty)
        };

        let (ids, epoch) = {
            let mut app = lock_app(&self.app);
            if let Some(outcome) = stale(&app, generation, epoch) {
                return outcome;
            }

            let entries = match result {
                Ok(entries) => entries,
                Err(ApiError::EmptyResult) => {
                    warn!("Market API returned no entries");
                    app.show_error(ErrorKind::NoData, NO_DATA_MESSAGE);
                    return RefreshOutcome::Failed(ApiError::EmptyResult);
                }
                Err(e) => {
                    error!(error = %e, "Failed to load market data");
                    app.show_error(ErrorKind::LoadFailed, LOAD_FAILED_MESSAGE);
                    return RefreshOutcome::Failed(e);
                }
            };

            let ids: Vec<String> = entries.iter().map(|entry| entry.id.clone()).collect();
            app.show_cards(build_cards(&entries, currency));
            app.mark_updated(Local::now());
            (ids, app.display_epoch())
        };

        // Graphiques : un par un, espacés pour ménager la limite de débit
        let mut placeholder_charts = 0;
        for id in &ids {
            tokio::time::sleep(self.config.chart_request_delay).await;
            if let Some(outcome) = self.check_current(generation, epoch) {
                return outcome;
            }

            let result = self
                .api
                .market_chart(id, currency, self.config.chart_days)
                .await;

            let mut app = lock_app(&self.app);
            if let Some(outcome) = stale(&app, generation, epoch) {
                return outcome;
            }
            match result {
                Ok(series) => app.charts.draw_chart(id, &series, currency),
                Err(e) => {
                    warn!(coin = %id, error = %e, "Chart unavailable, drawing placeholder");
                    app.charts.draw_empty_chart(id);
                    placeholder_charts += 1;
                }
            }
        }

        info!(coins = ids.len(), placeholder_charts, "Refresh completed");
        RefreshOutcome::Completed {
            coins: ids.len(),
            placeholder_charts,
        }
    }
}

/// `Superseded` si la sélection a changé, `Interrupted` si quelqu'un
/// d'autre a remplacé l'affichage
fn stale(app: &App, generation: u64, epoch: u64) -> Option<RefreshOutcome> {
    if app.generation() != generation {
        Some(RefreshOutcome::Superseded)
    } else if app.display_epoch() != epoch {
        debug!("Display replaced during the cycle, standing down");
        Some(RefreshOutcome::Interrupted)
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
