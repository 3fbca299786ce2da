// ============================================================================
// Coinboard - Tableau de bord crypto dans le terminal
// ============================================================================
// Cartes prix / market cap / volume et graphiques de tendance sur 7 jours,
// rafraîchis toutes les 60 secondes depuis l'API CoinGecko
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans un thread dédié : runtime tokio current_thread pour le worker
// 4. Arc<Mutex<App>> : état partagé entre l'UI et le worker
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use coinboard::api::{CoinGeckoClient, MarketApi};
use coinboard::app::{lock_app, shared, App, SharedApp};
use coinboard::config::Config;
use coinboard::models::Currency;
use coinboard::refresh::Refresher;
use coinboard::ui::{render, Event, EventHandler};
use coinboard::worker::{Worker, WorkerCommand};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/coinboard/logs
/// - macOS : ~/Library/Application Support/coinboard/logs
/// - Windows : C:\Users\<user>\AppData\Local\coinboard\logs
///
/// Retombe sur ./logs si le répertoire de données est introuvable.
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("coinboard").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/coinboard/logs/coinboard.log.*
/// RUST_LOG=coinboard=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "coinboard.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinboard=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("Coinboard starting up");

    let config = Arc::new(Config::from_env().context("Configuration invalide")?);
    info!(
        coins = ?config.default_coins,
        currency = %config.default_currency,
        refresh_secs = config.refresh_secs(),
        "Configuration loaded"
    );

    let api: Arc<dyn MarketApi> = Arc::new(CoinGeckoClient::new(&config)?);
    let app = shared(App::new(&config));

    // Canal UI → worker
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let refresher = Refresher::new(api, app.clone(), config.clone());
    let worker = Worker::new(refresher, command_tx.clone());
    let worker_thread = spawn_worker(worker, command_rx)?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();
    info!("Starting event loop");
    let result = run(&mut terminal, &app, &events, &command_tx);

    // Teardown : timers annulés, graphiques libérés
    send(&command_tx, WorkerCommand::Shutdown);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    if worker_thread.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

// ============================================================================
// Worker thread
// ============================================================================
// CONCEPT RUST : Thread + runtime async
// - std::thread : thread OS dédié aux appels réseau et aux timers
// - Runtime current_thread : toutes les tâches async tournent sur ce thread
// - L'UI ne bloque jamais sur le réseau
// ============================================================================

fn spawn_worker(
    worker: Worker,
    commands: UnboundedReceiver<WorkerCommand>,
) -> Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Échec de la création du runtime tokio")?;

    info!("Spawning background worker thread");
    thread::Builder::new()
        .name("coinboard-worker".to_string())
        .spawn(move || {
            runtime.block_on(worker.run(commands));
            info!("Worker thread exiting");
        })
        .context("Échec du lancement du worker")
}

/// Envoie une commande au worker
fn send(commands: &UnboundedSender<WorkerCommand>, command: WorkerCommand) {
    if commands.send(command).is_err() {
        warn!("Worker is gone, command dropped");
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// Render → Input, jusqu'à ce que app.running devienne false
// Le verrou n'est tenu que le temps d'un dessin ou d'une touche
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &SharedApp,
    events: &EventHandler,
    commands: &UnboundedSender<WorkerCommand>,
) -> Result<()> {
    loop {
        if !lock_app(app).is_running() {
            break;
        }

        terminal.draw(|frame| {
            let state = lock_app(app);
            render(frame, &state);
        })?;

        match events.next() {
            Ok(event) => {
                let mut state = lock_app(app);
                handle_event(&mut state, &event, commands);
            }
            Err(e) => error!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: &Event, commands: &UnboundedSender<WorkerCommand>) {
    use coinboard::ui::events::{
        currency_shortcut, is_currency_cycle_event, is_interrupt_event, is_quit_event,
        is_retry_event, is_search_event,
    };

    match event {
        Event::Tick => {}

        Event::Key(_) if is_interrupt_event(event) => {
            info!("Interrupted with Ctrl+C");
            app.quit();
        }

        // En mode recherche, toutes les touches vont dans la saisie
        Event::Key(_) if app.is_in_search_mode() => handle_search_key(app, event, commands),

        Event::Key(_) if is_quit_event(event) => {
            // Two-step : première pression arme, deuxième quitte
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_search_event(event) => {
            app.cancel_quit();
            debug!("User opened search");
            app.start_search();
        }

        Event::Key(_) if is_currency_cycle_event(event) => {
            app.cancel_quit();
            let next = app.current_currency().next();
            change_currency(app, next, commands);
        }

        Event::Key(_) if is_retry_event(event) => {
            app.cancel_quit();
            info!("User requested reload");
            send(commands, WorkerCommand::Reload);
        }

        Event::Key(_) => {
            app.cancel_quit();
            if let Some(currency) = currency_shortcut(event) {
                change_currency(app, currency, commands);
            }
        }
    }
}

/// Touches en mode recherche : chaque modification du texte est envoyée
/// au worker, qui applique le debounce
fn handle_search_key(app: &mut App, event: &Event, commands: &UnboundedSender<WorkerCommand>) {
    use coinboard::ui::events::{
        get_char_from_event, is_backspace_event, is_enter_event, is_escape_event,
        is_search_char_event,
    };

    if is_escape_event(event) {
        info!("User cleared search");
        app.cancel_search();
        send(commands, WorkerCommand::SearchInput(String::new()));
    } else if is_enter_event(event) {
        app.finish_search();
    } else if is_backspace_event(event) {
        app.backspace();
        send(commands, WorkerCommand::SearchInput(app.search_input.clone()));
    } else if is_search_char_event(event) {
        if let Some(c) = get_char_from_event(event) {
            app.append_char(c);
            send(commands, WorkerCommand::SearchInput(app.search_input.clone()));
        }
    }
}

/// Change la devise; ne recharge que si elle a réellement changé
fn change_currency(app: &mut App, currency: Currency, commands: &UnboundedSender<WorkerCommand>) {
    if app.set_currency(currency) {
        info!(currency = %currency, "User changed currency");
        send(commands, WorkerCommand::Reload);
    } else {
        debug!(currency = %currency, "Currency unchanged");
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
