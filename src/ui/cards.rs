// ============================================================================
// Cards - Projection des données de marché en cartes
// ============================================================================
// build_cards : MarketEntry → CardView (fonction pure, testable sans terminal)
// render_card_grid : dessine les cartes en grille de 3 colonnes
//
// CONCEPTS RATATUI :
// 1. Layout imbriqués : lignes puis colonnes
// 2. Block::inner() : zone intérieure d'un bloc pour y placer le graphique
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::charts::{trend_color, ChartManager};
use crate::format::{format_optional_large_number, format_optional_price};
use crate::models::{Currency, MarketEntry, Trend};
use crate::ui::chart::render_coin_chart;

/// Nombre de cartes par ligne
pub const GRID_COLUMNS: usize = 3;

/// Vue d'une carte, prête à afficher
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: String,
    pub name: String,

    /// Symbole en majuscules (ex: "BTC")
    pub symbol: String,

    /// Prix avec symbole de devise (ex: "$67,012.46")
    pub price: String,

    /// Variation 24h signée (ex: "+2.34%")
    pub change: String,

    pub trend: Trend,
    pub market_cap: String,
    pub volume: String,

    /// URL du logo
    pub image: String,

    /// Clé de l'emplacement du graphique : "chart-<id>"
    pub chart_key: String,
}

impl CardView {
    /// Construit la vue d'une entrée de marché
    pub fn from_entry(entry: &MarketEntry, currency: Currency) -> Self {
        let symbol = currency.symbol();
        let trend = if entry.is_positive() {
            Trend::Up
        } else {
            Trend::Down
        };

        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            symbol: entry.symbol.to_uppercase(),
            price: format!("{}{}", symbol, format_optional_price(entry.current_price)),
            change: format!("{:+.2}%", entry.change_or_zero()),
            trend,
            market_cap: format!("{}{}", symbol, format_optional_large_number(entry.market_cap)),
            volume: format!("{}{}", symbol, format_optional_large_number(entry.total_volume)),
            image: entry.image.clone(),
            chart_key: format!("chart-{}", entry.id),
        }
    }
}

/// Une carte par entrée, dans l'ordre de l'API
pub fn build_cards(entries: &[MarketEntry], currency: Currency) -> Vec<CardView> {
    entries
        .iter()
        .map(|entry| CardView::from_entry(entry, currency))
        .collect()
}

/// Dessine la grille de cartes
pub fn render_card_grid(frame: &mut Frame, cards: &[CardView], charts: &ChartManager, area: Rect) {
    if cards.is_empty() {
        return;
    }

    let rows = cards.len().div_ceil(GRID_COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, chunk) in cards.chunks(GRID_COLUMNS).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(row_areas[row]);

        for (card, cell) in chunk.iter().zip(cells.iter()) {
            render_card(frame, card, charts, *cell);
        }
    }
}

/// Dessine une carte : en-tête chiffré puis graphique
fn render_card(frame: &mut Frame, card: &CardView, charts: &ChartManager, area: Rect) {
    let color = trend_color(card.trend);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ({}) ", card.name, card.symbol),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let label = Style::default().fg(Color::Gray);
    let text = vec![
        Line::from(vec![
            Span::styled(
                card.price.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(card.change.as_str(), Style::default().fg(color)),
        ]),
        Line::from(vec![
            Span::styled("Market Cap: ", label),
            Span::raw(card.market_cap.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Volume 24h: ", label),
            Span::raw(card.volume.as_str()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), parts[0]);

    render_coin_chart(frame, charts.get(&card.id), parts[1]);
}
