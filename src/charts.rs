// ============================================================================
// ChartManager - Un graphique par coin
// ============================================================================
// Crée, remplace et libère les graphiques affichés dans les cartes
//
// CONCEPTS RUST :
// 1. HashMap<String, ChartHandle> : un handle par identifiant de coin
// 2. Remplacement = libération puis allocation (jamais deux handles pour
//    le même coin)
// 3. Compteurs alloués / libérés pour détecter une fuite dans les tests
//
// Le rendu ratatui (ui::chart) ne fait que lire ces handles.
// ============================================================================

use std::collections::{HashMap, HashSet};

use ratatui::style::Color;
use tracing::debug;

use crate::format::format_price;
use crate::models::{Currency, PriceSeries, Trend};

/// Couleur d'une tendance positive (#4ade80)
pub const POSITIVE_COLOR: Color = Color::Rgb(74, 222, 128);

/// Couleur d'une tendance négative (#f87171)
pub const NEGATIVE_COLOR: Color = Color::Rgb(248, 113, 113);

/// Couleur du graphique vide
pub const NEUTRAL_COLOR: Color = Color::DarkGray;

/// Couleur associée à une tendance
pub fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Up => POSITIVE_COLOR,
        Trend::Down => NEGATIVE_COLOR,
    }
}

/// Données prêtes à dessiner pour un graphique de tendance
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    /// Points (index, prix)
    pub points: Vec<(f64, f64)>,

    /// Label de date de chaque point (ex: "Oct 16")
    pub labels: Vec<String>,

    pub trend: Trend,
    pub currency: Currency,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl TrendChart {
    /// Construit le graphique depuis une série non vide
    fn from_series(series: &PriceSeries, currency: Currency) -> Option<Self> {
        let trend = series.trend()?;
        let (min, max) = series.price_bounds()?;

        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect();

        let labels = series
            .points
            .iter()
            .map(|p| p.timestamp.format("%b %-d").to_string())
            .collect();

        // Marge de 5% pour que la courbe respire (1% du prix si la série est plate)
        let range = max - min;
        let margin = if range > 0.0 {
            range * 0.05
        } else {
            (max.abs() * 0.01).max(1e-8)
        };

        Some(Self {
            x_bounds: [0.0, (points.len().saturating_sub(1)).max(1) as f64],
            y_bounds: [(min - margin).max(0.0), max + margin],
            points,
            labels,
            trend,
            currency,
        })
    }

    pub fn color(&self) -> Color {
        trend_color(self.trend)
    }

    /// Formate une valeur de l'axe Y dans la devise du graphique
    pub fn format_value(&self, value: f64) -> String {
        format!("{}{}", self.currency.symbol(), format_price(value))
    }

    /// Labels de l'axe Y : min, milieu, max
    pub fn y_labels(&self) -> Vec<String> {
        let [low, high] = self.y_bounds;
        vec![
            self.format_value(low),
            self.format_value((low + high) / 2.0),
            self.format_value(high),
        ]
    }

    /// Labels de l'axe X : premier, milieu, dernier jour
    pub fn x_labels(&self) -> Vec<String> {
        match self.labels.len() {
            0 => Vec::new(),
            1 => vec![self.labels[0].clone()],
            n => vec![
                self.labels[0].clone(),
                self.labels[n / 2].clone(),
                self.labels[n - 1].clone(),
            ],
        }
    }

    /// Dernier prix formaté (équivalent de l'info-bulle au survol)
    pub fn last_value_label(&self) -> String {
        self.points
            .last()
            .map(|&(_, price)| self.format_value(price))
            .unwrap_or_default()
    }
}

/// Contenu d'un graphique
#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Courbe de prix colorée selon la tendance
    Trend(TrendChart),

    /// Ligne plate neutre "No Data"
    Placeholder,
}

/// Handle d'un graphique vivant
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    /// Identifiant unique de la ressource (jamais réutilisé)
    pub resource_id: u64,
    pub kind: ChartKind,
}

/// Gestionnaire des graphiques : au plus un handle par coin
#[derive(Debug, Default)]
pub struct ChartManager {
    handles: HashMap<String, ChartHandle>,
    allocated: u64,
    released: u64,
}

impl ChartManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dessine le graphique de tendance d'un coin
    ///
    /// Libère d'abord le graphique existant pour ce coin. Une série vide
    /// donne le graphique neutre.
    pub fn draw_chart(&mut self, coin_id: &str, series: &PriceSeries, currency: Currency) {
        self.release(coin_id);

        let kind = match TrendChart::from_series(series, currency) {
            Some(chart) => ChartKind::Trend(chart),
            None => ChartKind::Placeholder,
        };
        self.insert(coin_id, kind);
    }

    /// Dessine le graphique neutre d'un coin (données indisponibles)
    pub fn draw_empty_chart(&mut self, coin_id: &str) {
        self.release(coin_id);
        self.insert(coin_id, ChartKind::Placeholder);
    }

    /// Libère le graphique d'un coin
    ///
    /// Retourne true si un graphique existait.
    pub fn release(&mut self, coin_id: &str) -> bool {
        match self.handles.remove(coin_id) {
            Some(handle) => {
                self.released += 1;
                debug!(coin = %coin_id, resource = handle.resource_id, "Released chart");
                true
            }
            None => false,
        }
    }

    /// Libère tous les graphiques
    pub fn release_all(&mut self) {
        let ids: Vec<String> = self.handles.keys().cloned().collect();
        for id in ids {
            self.release(&id);
        }
    }

    /// Libère les graphiques des coins absents de `ids`
    pub fn retain(&mut self, ids: &[String]) {
        let keep: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let stale: Vec<String> = self
            .handles
            .keys()
            .filter(|id| !keep.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            self.release(&id);
        }
    }

    pub fn get(&self, coin_id: &str) -> Option<&ChartHandle> {
        self.handles.get(coin_id)
    }

    /// Identifiants des coins qui ont un graphique
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    /// Nombre de ressources allouées et pas encore libérées
    pub fn live_count(&self) -> usize {
        (self.allocated - self.released) as usize
    }

    fn insert(&mut self, coin_id: &str, kind: ChartKind) {
        self.allocated += 1;
        let handle = ChartHandle {
            resource_id: self.allocated,
            kind,
        };
        debug!(coin = %coin_id, resource = handle.resource_id, "Created chart");
        self.handles.insert(coin_id.to_string(), handle);
    }
}
