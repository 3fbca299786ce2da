// ============================================================================
// Worker - Tâches async en arrière-plan
// ============================================================================
// Tourne dans son propre thread avec un runtime tokio, reçoit les
// commandes de l'UI et possède tous les timers
//
// CONCEPTS RUST :
// 1. Command pattern avec channels : l'UI envoie des WorkerCommand
// 2. tokio::sync::mpsc : recv().await cohabite avec les timers
// 3. Ownership des handles : le worker garde chaque TaskHandle, le
//    shutdown les annule tous
//
// Timers possédés :
// - compte à rebours (1s)
// - rafraîchissement périodique (Config::refresh_interval)
// - debounce de la recherche (Config::search_debounce)
// ============================================================================

use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::app::lock_app;
use crate::refresh::Refresher;
use crate::scheduler::{periodic, spawn_task, Debouncer, TaskHandle};
use crate::search::handle_search;

/// Commandes envoyées au worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Rafraîchissement (ignoré si un cycle tourne)
    Refresh,

    /// Rechargement après changement de sélection ou "réessayer"
    Reload,

    /// Nouveau texte de recherche (debounced)
    SearchInput(String),

    /// Arrêt : annule tous les timers et libère les graphiques
    Shutdown,
}

/// Worker : exécute les commandes et possède les timers
pub struct Worker {
    refresher: Refresher,
    commands: UnboundedSender<WorkerCommand>,
    timers: Vec<TaskHandle>,
    tasks: Vec<TaskHandle>,
    search: Debouncer,
}

impl Worker {
    /// `commands` est l'émetteur du canal que `run` consomme : la recherche
    /// s'en sert pour demander un rechargement.
    pub fn new(refresher: Refresher, commands: UnboundedSender<WorkerCommand>) -> Self {
        let debounce = refresher.config().search_debounce;
        Self {
            refresher,
            commands,
            timers: Vec::new(),
            tasks: Vec::new(),
            search: Debouncer::new(debounce),
        }
    }

    /// Démarre les timers et le premier chargement
    pub fn start(&mut self) {
        let app = self.refresher.app().clone();
        self.timers.push(periodic("countdown", Duration::from_secs(1), move || {
            let app = app.clone();
            async move {
                lock_app(&app).tick_countdown();
            }
        }));

        let refresher = self.refresher.clone();
        let interval = self.refresher.config().refresh_interval;
        self.timers.push(periodic("auto-refresh", interval, move || {
            let refresher = refresher.clone();
            async move {
                refresher.refresh().await;
                lock_app(refresher.app()).reset_countdown();
            }
        }));

        info!(interval_secs = interval.as_secs(), "Worker timers started");
        self.dispatch(WorkerCommand::Refresh);
    }

    /// Traite une commande
    ///
    /// Retourne false après `Shutdown`.
    pub fn handle(&mut self, command: WorkerCommand) -> bool {
        debug!(?command, "Worker received command");
        self.tasks.retain(TaskHandle::is_active);

        match command {
            WorkerCommand::Shutdown => {
                self.shutdown();
                return false;
            }
            other => self.dispatch(other),
        }
        true
    }

    fn dispatch(&mut self, command: WorkerCommand) {
        match command {
            WorkerCommand::Refresh => {
                let refresher = self.refresher.clone();
                self.tasks.push(spawn_task("refresh", async move {
                    refresher.refresh().await;
                }));
            }
            WorkerCommand::Reload => {
                let refresher = self.refresher.clone();
                self.tasks.push(spawn_task("reload", async move {
                    refresher.reload().await;
                }));
            }
            WorkerCommand::SearchInput(query) => {
                let refresher = self.refresher.clone();
                let commands = self.commands.clone();
                self.search.trigger(async move {
                    let outcome = handle_search(
                        &query,
                        refresher.api().as_ref(),
                        refresher.app(),
                        refresher.config(),
                    )
                    .await;
                    if outcome.needs_reload() {
                        let _ = commands.send(WorkerCommand::Reload);
                    }
                });
            }
            WorkerCommand::Shutdown => self.shutdown(),
        }
    }

    /// Annule tous les timers et tâches, puis libère les graphiques
    pub fn shutdown(&mut self) {
        let active: Vec<&str> = self
            .timers
            .iter()
            .chain(&self.tasks)
            .filter(|task| task.is_active())
            .map(TaskHandle::name)
            .collect();
        info!(?active, "Worker shutting down");
        self.search.cancel();
        for task in self.timers.drain(..).chain(self.tasks.drain(..)) {
            task.cancel();
        }
        lock_app(self.refresher.app()).teardown();
    }

    /// Boucle de commandes jusqu'à `Shutdown` ou fermeture du canal
    pub async fn run(mut self, mut commands: UnboundedReceiver<WorkerCommand>) {
        self.start();
        while let Some(command) = commands.recv().await {
            if !self.handle(command) {
                return;
            }
        }
        info!("Command channel closed");
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::sync::mpsc;
    use tokio::time;

    use crate::api::fake::{entry, series, FakeApi};
    use crate::app::{shared, App};
    use crate::config::Config;

    fn setup(api: FakeApi) -> (Worker, UnboundedReceiver<WorkerCommand>, Arc<FakeApi>) {
        let config = Config {
            default_coins: vec!["bitcoin".to_string()],
            ..Config::default()
        };
        let app = shared(App::new(&config));
        let api = Arc::new(api);
        let refresher = Refresher::new(api.clone(), app, Arc::new(config));
        let (tx, rx) = mpsc::unbounded_channel();
        (Worker::new(refresher, tx), rx, api)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_by(total: Duration) {
        let step = Duration::from_millis(100);
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            time::advance(step).await;
            settle().await;
            elapsed += step;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced_then_reloads() {
        let api = FakeApi::new().with_search(Ok(vec!["solana".to_string()]));
        let (mut worker, mut rx, api) = setup(api);

        worker.handle(WorkerCommand::SearchInput("so".into()));
        advance_by(Duration::from_millis(200)).await;
        worker.handle(WorkerCommand::SearchInput("sol".into()));
        advance_by(Duration::from_millis(400)).await;
        assert!(api.calls().searches.is_empty());

        advance_by(Duration::from_millis(200)).await;

        assert_eq!(api.calls().searches, vec!["sol"]);
        assert_eq!(rx.try_recv(), Ok(WorkerCommand::Reload));
        assert_eq!(
            lock_app(worker.refresher.app()).current_coins(),
            ["solana".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_timer_refreshes_and_resets_countdown() {
        let api = FakeApi::new().with_markets(Ok(vec![entry("bitcoin", 67000.0, 1.5)]));
        let (mut worker, _rx, api) = setup(api);
        let app = worker.refresher.app().clone();

        worker.start();
        settle().await;
        assert_eq!(api.calls().markets.len(), 1);

        advance_by(Duration::from_secs(59)).await;
        assert_eq!(api.calls().markets.len(), 1);
        assert_eq!(lock_app(&app).countdown(), 1);

        advance_by(Duration::from_secs(1)).await;
        assert_eq!(api.calls().markets.len(), 2);
        assert_eq!(lock_app(&app).countdown(), 60);

        advance_by(Duration::from_secs(60)).await;
        assert_eq!(api.calls().markets.len(), 3);
        assert_eq!(lock_app(&app).countdown(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_tick_during_cycle_is_skipped() {
        let api = FakeApi::new().with_markets(Ok(vec![entry("bitcoin", 67000.0, 1.5)]));
        let (mut worker, _rx, api) = setup(api);
        let app = worker.refresher.app().clone();
        let gate = api.hold_markets();

        // Le premier chargement reste bloqué sur l'appel markets
        worker.start();
        settle().await;
        advance_by(Duration::from_secs(60)).await;

        assert_eq!(api.calls().markets.len(), 1);
        assert!(lock_app(&app).is_loading());
        assert_eq!(lock_app(&app).countdown(), 60);

        gate.add_permits(10);
        settle().await;
        advance_by(Duration::from_secs(1)).await;
        assert!(!lock_app(&app).is_loading());
        assert_eq!(lock_app(&app).countdown(), 59);

        advance_by(Duration::from_secs(59)).await;
        assert_eq!(api.calls().markets.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timers_and_releases_charts() {
        let api = FakeApi::new()
            .with_markets(Ok(vec![entry("bitcoin", 67000.0, 1.5)]))
            .with_chart("bitcoin", Ok(series("bitcoin", &[66000.0, 67000.0])));
        let (mut worker, _rx, _api) = setup(api);
        let app = worker.refresher.app().clone();

        worker.start();
        settle().await;
        advance_by(Duration::from_secs(1)).await;

        let countdown = {
            let state = lock_app(&app);
            assert!(state.has_cards());
            assert_eq!(state.charts.live_count(), 1);
            state.countdown()
        };
        assert_eq!(countdown, 59);

        assert!(!worker.handle(WorkerCommand::Shutdown));
        advance_by(Duration::from_secs(5)).await;

        let state = lock_app(&app);
        assert!(!state.is_running());
        assert_eq!(state.charts.live_count(), 0);
        assert_eq!(state.countdown(), countdown);
    }
}
