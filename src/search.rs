// ============================================================================
// Recherche de coins
// ============================================================================
// Transforme le texte saisi en nouvelle sélection de coins
//
// Règles :
// - texte vide        → retour aux coins par défaut
// - un seul caractère → ignoré
// - sinon             → /search, les N premiers résultats deviennent la
//                       sélection
//
// Le debounce (500ms) est appliqué par le worker avant l'appel.
// ============================================================================

use tracing::{info, instrument, warn};

use crate::api::MarketApi;
use crate::app::{lock_app, ErrorKind, SharedApp};
use crate::config::Config;
use crate::error::{non_empty, ApiError};

/// Message affiché pendant la requête de recherche
pub const SEARCHING_MESSAGE: &str = "Recherche...";

/// Message affiché quand la recherche échoue
pub const SEARCH_FAILED_MESSAGE: &str = "La recherche a échoué. Appuyez sur [r] pour réessayer.";

/// Résultat du traitement d'une saisie
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Saisie vide : coins par défaut restaurés
    Reset,

    /// Saisie trop courte, rien ne change
    Ignored,

    /// Nouvelle sélection
    Applied(Vec<String>),

    /// Requête en échec ou sans résultat (`EmptyResult`), sélection
    /// inchangée
    Failed(ApiError),
}

impl SearchOutcome {
    /// true si la sélection a changé et qu'un rechargement doit suivre
    pub fn needs_reload(&self) -> bool {
        matches!(self, SearchOutcome::Reset | SearchOutcome::Applied(_))
    }
}

/// Message affiché quand aucun coin ne correspond
pub fn no_results_message(query: &str) -> String {
    format!("Aucune cryptomonnaie trouvée pour \"{}\"", query)
}

/// Traite une saisie de recherche
///
/// N'effectue pas le rechargement : l'appelant le déclenche si
/// `needs_reload()`.
#[instrument(skip(api, app, config))]
pub async fn handle_search(
    query: &str,
    api: &dyn MarketApi,
    app: &SharedApp,
    config: &Config,
) -> SearchOutcome {
    let query = query.trim().to_lowercase();

    match query.chars().count() {
        0 => {
            info!("Empty search, restoring default coins");
            lock_app(app).reset_coins();
            return SearchOutcome::Reset;
        }
        1 => return SearchOutcome::Ignored,
        _ => {}
    }

    {
        let mut state = lock_app(app);
        if !state.is_loading() {
            state.show_loading(SEARCHING_MESSAGE);
        }
    }

    match api.search(&query).await.and_then(non_empty) {
        Ok(ids) => {
            let ids: Vec<String> = ids.into_iter().take(config.max_search_results).collect();
            info!(query = %query, coins = ?ids, "Search applied");
            lock_app(app).set_coins(ids.clone());
            SearchOutcome::Applied(ids)
        }
        Err(ApiError::EmptyResult) => {
            info!(query = %query, "Search returned no coins");
            lock_app(app).show_error(ErrorKind::NoResults, no_results_message(&query));
            SearchOutcome::Failed(ApiError::EmptyResult)
        }
        Err(e) => {
            warn!(query = %query, error = %e, "Search failed");
            lock_app(app).show_error(ErrorKind::SearchFailed, SEARCH_FAILED_MESSAGE);
            SearchOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::app::{shared, App, DisplayState};

    fn setup() -> (SharedApp, Config) {
        let config = Config::default();
        (shared(App::new(&config)), config)
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_keeps_first_results_in_order() {
        let (app, config) = setup();
        let api = FakeApi::new().with_search(Ok(ids(&[
            "solana", "sol-a", "sol-b", "sol-c", "sol-d", "sol-e", "sol-f", "sol-g",
        ])));

        let outcome = handle_search("  SOL ", &api, &app, &config).await;
        let expected = ids(&["solana", "sol-a", "sol-b", "sol-c", "sol-d", "sol-e"]);
        assert_eq!(outcome, SearchOutcome::Applied(expected.clone()));
        assert!(outcome.needs_reload());
        assert_eq!(lock_app(&app).current_coins(), expected.as_slice());
        assert_eq!(api.calls().searches, vec!["sol"]);
    }

    #[tokio::test]
    async fn test_single_char_is_ignored() {
        let (app, config) = setup();
        let api = FakeApi::new();
        let before = lock_app(&app).generation();

        let outcome = handle_search("b", &api, &app, &config).await;
        assert_eq!(outcome, SearchOutcome::Ignored);
        assert!(!outcome.needs_reload());
        assert!(api.calls().searches.is_empty());
        assert_eq!(lock_app(&app).generation(), before);
    }

    #[tokio::test]
    async fn test_empty_query_restores_defaults() {
        let (app, config) = setup();
        lock_app(&app).set_coins(ids(&["solana"]));

        let outcome = handle_search("   ", &FakeApi::new(), &app, &config).await;
        assert_eq!(outcome, SearchOutcome::Reset);
        assert_eq!(lock_app(&app).current_coins(), config.default_coins.as_slice());
    }

    #[tokio::test]
    async fn test_no_results_keeps_selection() {
        let (app, config) = setup();
        let api = FakeApi::new().with_search(Ok(Vec::new()));
        let before = lock_app(&app).current_coins().to_vec();

        let outcome = handle_search("zzzz", &api, &app, &config).await;
        assert_eq!(outcome, SearchOutcome::Failed(ApiError::EmptyResult));
        assert!(!outcome.needs_reload());

        let state = lock_app(&app);
        assert_eq!(state.current_coins(), before.as_slice());
        match state.display() {
            DisplayState::Error { kind, message } => {
                assert_eq!(*kind, ErrorKind::NoResults);
                assert!(message.contains("zzzz"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_shows_search_error() {
        let (app, config) = setup();
        let api = FakeApi::new().with_search(Err(ApiError::NetworkError("offline".into())));

        let outcome = handle_search("doge", &api, &app, &config).await;
        assert!(matches!(outcome, SearchOutcome::Failed(_)));
        assert!(matches!(
            lock_app(&app).display(),
            DisplayState::Error {
                kind: ErrorKind::SearchFailed,
                ..
            }
        ));
    }
}
