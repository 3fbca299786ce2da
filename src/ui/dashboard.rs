// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Header (devise, compte à rebours), barre de recherche, zone principale
// (chargement / cartes / erreur) et footer (raccourcis)
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, DisplayState, ErrorKind};
use crate::models::Currency;
use crate::ui::cards::render_card_grid;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_search_bar(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

/// Crée le layout principal (header, recherche, contenu, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Recherche
            Constraint::Min(0),    // Cartes
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Coinboard ")
        .title_alignment(Alignment::Center);

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    // Devises : l'active en surbrillance
    let mut spans = Vec::new();
    for (i, currency) in Currency::all().into_iter().enumerate() {
        let style = if currency == app.current_currency() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("[{}]", i + 1), key));
        spans.push(Span::styled(
            format!(" {} {} ", currency.symbol(), currency),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw(" │ "));
    spans.push(Span::raw(format!(
        "Prochain rafraîchissement : {}s",
        app.countdown()
    )));

    if let Some(updated) = app.last_updated() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("Mis à jour : {}", updated.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ));
    }

    if app.is_loading() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "⟳ Chargement...",
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Barre de recherche
// ============================================================================

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.is_in_search_mode();
    let border = if active { Color::Green } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Rechercher ");

    let mut spans = vec![Span::styled(
        "/ ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    if app.search_input.is_empty() && !active {
        spans.push(Span::styled(
            "bitcoin, solana, doge...",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            app.search_input.as_str(),
            Style::default().fg(Color::White),
        ));
    }

    if active {
        spans.push(Span::styled(
            "█", // Curseur
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ============================================================================
// Zone principale
// ============================================================================

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.display() {
        DisplayState::Empty => {}
        DisplayState::Loading { message } => render_loading(frame, message, area),
        DisplayState::Cards(cards) => render_card_grid(frame, cards, &app.charts, area),
        DisplayState::Error { kind, message } => render_error(frame, *kind, message, area),
    }
}

fn render_loading(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⟳",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, kind: ErrorKind, message: &str, area: Rect) {
    let title = match kind {
        ErrorKind::NoResults => " Aucun résultat ",
        ErrorKind::NoData => " Aucune donnée ",
        ErrorKind::LoadFailed | ErrorKind::SearchFailed => " ⚠ Erreur ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(title);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[r]",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Réessayer"),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_in_search_mode() {
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Valider  "),
            Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Effacer"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[/]", key),
            Span::raw(" Search  "),
            Span::styled("[c]", key),
            Span::raw(" Currency  "),
            Span::styled("[1-3]", key),
            Span::raw(" USD/INR/EUR  "),
            Span::styled("[r]", key),
            Span::raw(" Refresh"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
