// ============================================================================
// Structure : App
// ============================================================================
// État de session de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Partage explicite : Arc<Mutex<App>> passé à l'orchestrateur, à la
//    recherche et à l'UI (pas d'état global implicite)
//
// PATTERN : "Application State"
// - L'UI lit depuis App pour dessiner
// - Toutes les modifications passent par les méthodes de App
// - Garantit la cohérence (ex: graphiques ⊆ coins affichés)
// ============================================================================

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use crate::charts::ChartManager;
use crate::config::Config;
use crate::models::Currency;
use crate::ui::cards::CardView;

/// État partagé entre le thread UI et le worker async
pub type SharedApp = Arc<Mutex<App>>;

/// Emballe une App dans un Arc<Mutex<>>
pub fn shared(app: App) -> SharedApp {
    Arc::new(Mutex::new(app))
}

/// Verrouille l'état partagé
///
/// Un panic pendant qu'un autre thread tenait le verrou "empoisonne" le
/// Mutex; l'état reste cohérent (aucune méthode ne panique à mi-chemin),
/// on récupère donc le guard au lieu de propager le panic.
pub fn lock_app(app: &SharedApp) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Enums : Screen, ErrorKind, DisplayState
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : grille de cartes
    Dashboard,

    /// Saisie de recherche : les touches alimentent `search_input`
    SearchInput,
}

/// Nature d'une erreur affichée à l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// La recherche n'a retourné aucun coin
    NoResults,
    /// L'API de marché a retourné une liste vide
    NoData,
    /// Échec du chargement des données de marché
    LoadFailed,
    /// Échec de la requête de recherche
    SearchFailed,
}

/// Contenu de la zone d'affichage principale
///
/// CONCEPT : Remplacement complet
/// - Chaque rendu remplace tout le contenu, pas de diff incrémental
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// Rien n'a encore été affiché
    Empty,

    /// Indicateur de chargement avec message
    Loading { message: String },

    /// Une carte par coin
    Cards(Vec<CardView>),

    /// Erreur lisible, avec action "réessayer"
    Error { kind: ErrorKind, message: String },
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' arme la confirmation
    pub confirm_quit: bool,

    /// Texte de recherche en cours de saisie
    pub search_input: String,

    /// Graphiques vivants, un par coin affiché
    pub charts: ChartManager,

    currency: Currency,
    coins: Vec<String>,
    default_coins: Vec<String>,

    /// Single-flight : un cycle de rafraîchissement est en cours
    loading: bool,

    /// Un rechargement a été demandé pendant un cycle en cours
    reload_pending: bool,

    /// Incrémenté à chaque changement de coins ou de devise
    generation: u64,

    display: DisplayState,

    /// Incrémenté à chaque remplacement de la zone d'affichage
    display_epoch: u64,

    /// Secondes restantes avant le prochain rafraîchissement
    countdown: u64,
    refresh_secs: u64,

    last_updated: Option<DateTime<Local>>,
}

impl App {
    /// Crée l'état initial à partir de la configuration
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            running: true,
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            search_input: String::new(),
            charts: ChartManager::new(),
            currency: config.default_currency,
            coins: Vec::new(),
            default_coins: Vec::new(),
            loading: false,
            reload_pending: false,
            generation: 0,
            display: DisplayState::Empty,
            display_epoch: 0,
            countdown: config.refresh_secs(),
            refresh_secs: config.refresh_secs(),
            last_updated: None,
        };
        app.default_coins = dedup_ids(config.default_coins.clone());
        app.coins = app.default_coins.clone();
        app
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Sélection des coins et de la devise
    // ========================================================================

    /// Remplace la liste des coins actifs
    ///
    /// Les doublons sont retirés en gardant le premier (l'ordre est l'ordre
    /// d'affichage).
    pub fn set_coins(&mut self, ids: Vec<String>) {
        self.coins = dedup_ids(ids);
        self.generation += 1;
    }

    /// Revient à la liste de coins par défaut
    pub fn reset_coins(&mut self) {
        let defaults = self.default_coins.clone();
        self.set_coins(defaults);
    }

    pub fn current_coins(&self) -> &[String] {
        &self.coins
    }

    /// Change la devise active
    ///
    /// Retourne true seulement si la devise a réellement changé :
    /// l'appelant ne déclenche un rechargement que dans ce cas.
    pub fn set_currency(&mut self, currency: Currency) -> bool {
        if currency == self.currency {
            return false;
        }
        self.currency = currency;
        self.generation += 1;
        true
    }

    pub fn current_currency(&self) -> Currency {
        self.currency
    }

    /// Numéro de la sélection courante (coins + devise)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Single-flight
    // ========================================================================

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    pub fn stop_loading(&mut self) {
        self.loading = false;
    }

    /// Mémorise qu'un rechargement doit suivre le cycle en cours
    pub fn request_reload(&mut self) {
        self.reload_pending = true;
    }

    /// Consomme la demande de rechargement
    pub fn take_reload_pending(&mut self) -> bool {
        std::mem::take(&mut self.reload_pending)
    }

    // ========================================================================
    // Zone d'affichage
    // ========================================================================

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Numéro du contenu affiché
    ///
    /// Un cycle qui voit ce numéro changer sans l'avoir fait lui-même
    /// s'arrête sans toucher à l'affichage.
    pub fn display_epoch(&self) -> u64 {
        self.display_epoch
    }

    /// true si des cartes sont actuellement affichées
    pub fn has_cards(&self) -> bool {
        matches!(self.display, DisplayState::Cards(_))
    }

    /// Affiche l'indicateur de chargement
    ///
    /// Plus aucune carte n'est affichée : tous les graphiques sont libérés.
    pub fn show_loading(&mut self, message: impl Into<String>) {
        self.charts.release_all();
        self.display = DisplayState::Loading {
            message: message.into(),
        };
        self.display_epoch += 1;
    }

    /// Affiche une erreur (avec action "réessayer")
    pub fn show_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.charts.release_all();
        self.display = DisplayState::Error {
            kind,
            message: message.into(),
        };
        self.display_epoch += 1;
    }

    /// Remplace les cartes affichées
    ///
    /// Les graphiques des coins qui ne sont plus affichés sont libérés avant
    /// que le nouveau jeu de cartes soit visible.
    pub fn show_cards(&mut self, cards: Vec<CardView>) {
        let ids: Vec<String> = cards.iter().map(|card| card.id.clone()).collect();
        self.charts.retain(&ids);
        self.display = DisplayState::Cards(cards);
        self.display_epoch += 1;
    }

    // ========================================================================
    // Compte à rebours
    // ========================================================================

    pub fn countdown(&self) -> u64 {
        self.countdown
    }

    /// Décrémente le compte à rebours, revient à l'intervalle complet à zéro
    pub fn tick_countdown(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.countdown = self.refresh_secs;
        }
    }

    /// Remet le compte à rebours à l'intervalle complet
    pub fn reset_countdown(&mut self) {
        self.countdown = self.refresh_secs;
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn mark_updated(&mut self, at: DateTime<Local>) {
        self.last_updated = Some(at);
    }

    // ========================================================================
    // Mode recherche
    // ========================================================================

    /// Entre en mode recherche (le texte courant est conservé)
    pub fn start_search(&mut self) {
        self.current_screen = Screen::SearchInput;
    }

    /// Quitte le mode recherche en gardant le texte
    pub fn finish_search(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    /// Quitte le mode recherche et vide le texte
    pub fn cancel_search(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.search_input.clear();
    }

    pub fn append_char(&mut self, c: char) {
        self.search_input.push(c);
    }

    pub fn backspace(&mut self) {
        self.search_input.pop();
    }

    pub fn is_in_search_mode(&self) -> bool {
        self.current_screen == Screen::SearchInput
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Libère toutes les ressources de rendu
    pub fn teardown(&mut self) {
        self.charts.release_all();
        self.running = false;
    }
}

/// Retire les doublons en conservant l'ordre de première apparition
fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketEntry, PriceSeries};
    use crate::ui::cards::build_cards;

    fn entry(id: &str) -> MarketEntry {
        MarketEntry {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_string(),
            current_price: Some(1.0),
            price_change_percentage_24h: Some(0.0),
            market_cap: None,
            total_volume: None,
            image: String::new(),
        }
    }

    fn app() -> App {
        App::new(&Config::default())
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert!(app.is_running());
        assert_eq!(app.current_coins().len(), 6);
        assert_eq!(app.current_currency(), Currency::Usd);
        assert_eq!(app.display(), &DisplayState::Empty);
        assert_eq!(app.countdown(), 60);
    }

    #[test]
    fn test_set_coins_dedups_and_keeps_order() {
        let mut app = app();
        let before = app.generation();
        app.set_coins(vec!["solana".into(), "bitcoin".into(), "solana".into()]);
        assert_eq!(app.current_coins(), ["solana", "bitcoin"]);
        assert_eq!(app.generation(), before + 1);

        app.reset_coins();
        assert_eq!(app.current_coins()[0], "bitcoin");
    }

    #[test]
    fn test_set_currency_only_changes_once() {
        let mut app = app();
        assert!(app.set_currency(Currency::Eur));
        assert!(!app.set_currency(Currency::Eur));
        assert_eq!(app.current_currency(), Currency::Eur);
    }

    #[test]
    fn test_countdown_wraps() {
        let mut app = App::new(&Config {
            refresh_interval: std::time::Duration::from_secs(3),
            ..Config::default()
        });
        app.tick_countdown();
        app.tick_countdown();
        assert_eq!(app.countdown(), 1);
        app.tick_countdown();
        assert_eq!(app.countdown(), 3);
    }

    #[test]
    fn test_reload_pending_is_consumed() {
        let mut app = app();
        assert!(!app.take_reload_pending());
        app.request_reload();
        assert!(app.take_reload_pending());
        assert!(!app.take_reload_pending());
    }

    #[test]
    fn test_show_cards_releases_charts_of_removed_coins() {
        let mut app = app();
        app.show_cards(build_cards(&[entry("bitcoin"), entry("ethereum")], Currency::Usd));
        app.charts.draw_empty_chart("bitcoin");
        app.charts.draw_empty_chart("ethereum");

        app.show_cards(build_cards(&[entry("ethereum"), entry("solana")], Currency::Usd));
        assert!(app.charts.get("bitcoin").is_none());
        assert!(app.charts.get("ethereum").is_some());
        assert_eq!(app.charts.live_count(), 1);
    }

    #[test]
    fn test_error_and_loading_release_all_charts() {
        let mut app = app();
        app.show_cards(build_cards(&[entry("bitcoin")], Currency::Usd));
        app.charts.draw_chart("bitcoin", &PriceSeries::new("bitcoin".into()), Currency::Usd);

        app.show_error(ErrorKind::LoadFailed, "boom");
        assert_eq!(app.charts.live_count(), 0);
        assert!(!app.has_cards());

        app.show_loading("...");
        assert!(matches!(app.display(), DisplayState::Loading { .. }));
    }

    #[test]
    fn test_every_display_change_bumps_epoch() {
        let mut app = app();
        let start = app.display_epoch();

        app.show_loading("...");
        app.show_cards(build_cards(&[entry("bitcoin")], Currency::Usd));
        app.show_error(ErrorKind::NoResults, "rien");
        assert_eq!(app.display_epoch(), start + 3);

        // La sélection a son propre compteur
        app.set_coins(vec!["solana".into()]);
        assert_eq!(app.display_epoch(), start + 3);
    }

    #[test]
    fn test_search_input() {
        let mut app = app();
        app.start_search();
        assert!(app.is_in_search_mode());
        app.append_char('s');
        app.append_char('o');
        app.backspace();
        assert_eq!(app.search_input, "s");

        app.cancel_search();
        assert!(!app.is_in_search_mode());
        assert!(app.search_input.is_empty());
    }

    #[test]
    fn test_app_quit() {
        let mut app = app();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
