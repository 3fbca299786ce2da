// ============================================================================
// Chart - Rendu du graphique d'une carte
// ============================================================================
// Dessine le handle du ChartManager associé à un coin
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : bornes et labels pré-calculés par TrendChart
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::charts::{ChartHandle, ChartKind, TrendChart, NEUTRAL_COLOR};

/// Label du graphique neutre
pub const NO_DATA_LABEL: &str = "No Data";

/// Texte affiché tant que le graphique n'est pas chargé
pub const CHART_PENDING_MESSAGE: &str = "Chargement du graphique...";

/// Dessine le graphique d'un coin
///
/// - pas de handle : le graphique n'est pas encore chargé
/// - Placeholder : ligne plate grise "No Data"
/// - Trend : courbe colorée selon la tendance
pub fn render_coin_chart(frame: &mut Frame, handle: Option<&ChartHandle>, area: Rect) {
    if area.height < 2 {
        return;
    }

    match handle.map(|h| &h.kind) {
        None => render_pending(frame, area),
        Some(ChartKind::Placeholder) => render_placeholder(frame, area),
        Some(ChartKind::Trend(chart)) => render_trend(frame, chart, area),
    }
}

fn render_trend(frame: &mut Frame, chart: &TrendChart, area: Rect) {
    let color = chart.color();
    let gray = Style::default().fg(NEUTRAL_COLOR);

    // CONCEPT RATATUI : Marker types
    // - Braille : résolution 2x4 par cellule, adapté aux petites cartes
    let datasets = vec![Dataset::default()
        .name(chart.last_value_label())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&chart.points)];

    let x_axis = Axis::default()
        .style(gray)
        .bounds(chart.x_bounds)
        .labels(chart.x_labels().into_iter().map(Span::raw).collect());

    let y_axis = Axis::default()
        .style(gray)
        .bounds(chart.y_bounds)
        .labels(chart.y_labels().into_iter().map(Span::raw).collect());

    let widget = Chart::new(datasets).x_axis(x_axis).y_axis(y_axis);
    frame.render_widget(widget, area);
}

/// Ligne plate neutre : les données du graphique sont indisponibles
fn render_placeholder(frame: &mut Frame, area: Rect) {
    let flat = [(0.0, 0.5), (1.0, 0.5)];
    let style = Style::default().fg(NEUTRAL_COLOR);

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(style)
        .data(&flat)];

    let widget = Chart::new(datasets)
        .x_axis(Axis::default().style(style).bounds([0.0, 1.0]))
        .y_axis(Axis::default().style(style).bounds([0.0, 1.0]));
    frame.render_widget(widget, area);

    // Label centré au-dessus de la ligne
    let label_area = Rect {
        y: area.y + area.height / 2 - 1,
        height: 1,
        ..area
    };
    let label = Paragraph::new(Span::styled(NO_DATA_LABEL, style)).alignment(Alignment::Center);
    frame.render_widget(label, label_area);
}

fn render_pending(frame: &mut Frame, area: Rect) {
    let text = Line::from(Span::styled(
        CHART_PENDING_MESSAGE,
        Style::default()
            .fg(NEUTRAL_COLOR)
            .add_modifier(Modifier::ITALIC),
    ));
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::charts::ChartManager;

    fn chart_text(handle: Option<&ChartHandle>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|frame| render_coin_chart(frame, handle, frame.size()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_pending_chart_message() {
        assert!(chart_text(None).contains(CHART_PENDING_MESSAGE));
    }

    #[test]
    fn test_placeholder_shows_no_data() {
        let mut charts = ChartManager::new();
        charts.draw_empty_chart("bitcoin");

        let text = chart_text(charts.get("bitcoin"));
        assert!(text.contains(NO_DATA_LABEL));
        assert!(!text.contains(CHART_PENDING_MESSAGE));
    }
}
