// ============================================================================
// Chart - Rendu des graphiques de prix
// ============================================================================
// Deux vues sur le même widget :
// - Historique seul : "Bitcoin Price Trend"
// - Historique + prévision : "Bitcoin Price Prediction using ARIMA"
//
// CONCEPTS RUST :
// 1. Option<&T> : la prévision est facultative, un seul point d'entrée
// 2. Iterator chaining : transformer les séries en points (x, y)
// 3. fold : min/max en un seul passage
//
// CONCEPTS RATATUI :
// 1. Chart widget : plusieurs Dataset sur les mêmes axes
// 2. Dataset::name() : entrée de légende
// 3. Axis : titre, bornes et labels
// ============================================================================

use chrono::{DateTime, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::{Forecast, PriceSeries};

pub const HISTORY_TITLE: &str = "Bitcoin Price Trend";
pub const HISTORY_LEGEND: &str = "Bitcoin Price (USD)";
pub const PREDICTION_TITLE: &str = "Bitcoin Price Prediction using ARIMA";
pub const ACTUAL_LEGEND: &str = "Actual Prices";
pub const PREDICTED_LEGEND: &str = "Predicted Prices";
pub const X_AXIS_TITLE: &str = "Date";
pub const Y_AXIS_TITLE: &str = "Price (USD)";

const ACTUAL_COLOR: Color = Color::Blue;
const PREDICTED_COLOR: Color = Color::Red;

const DAY_MS: f64 = 86_400_000.0;

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine le graphique sur tout le frame, avec une ligne d'aide en bas
pub fn render_chart(frame: &mut Frame, series: &PriceSeries, forecast: Option<&Forecast>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Graphique
            Constraint::Length(3), // Aide
        ])
        .split(frame.size())
        .to_vec();

    if series.is_empty() {
        render_no_data(frame, chunks[0], "Pas de données à afficher");
    } else {
        render_chart_graph(frame, series, forecast, chunks[0]);
    }

    render_footer(frame, chunks[1]);
}

// ============================================================================
// Graphique principal
// ============================================================================

fn render_chart_graph(frame: &mut Frame, series: &PriceSeries, forecast: Option<&Forecast>, area: Rect) {
    let actual = history_points(series);
    let predicted = forecast.map(forecast_points).unwrap_or_default();

    let (x_min, x_max) = x_bounds(&actual, &predicted);
    let (y_min, y_max) = price_bounds(&actual, &predicted);

    // CONCEPT RATATUI : Marker types
    // - Braille : trait fin et continu pour l'historique
    // - Dot : points espacés, rendu "pointillé" pour la prévision
    let (title, datasets) = match forecast {
        None => (
            HISTORY_TITLE,
            vec![Dataset::default()
                .name(HISTORY_LEGEND)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(ACTUAL_COLOR))
                .data(&actual)],
        ),
        Some(_) => (
            PREDICTION_TITLE,
            vec![
                Dataset::default()
                    .name(ACTUAL_LEGEND)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(ACTUAL_COLOR))
                    .data(&actual),
                Dataset::default()
                    .name(PREDICTED_LEGEND)
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(PREDICTED_COLOR))
                    .data(&predicted),
            ],
        ),
    };

    let x_axis = Axis::default()
        .title(X_AXIS_TITLE)
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max])
        .labels(vec![
            Span::raw(day_label(x_min)),
            Span::raw(day_label((x_min + x_max) / 2.0)),
            Span::raw(day_label(x_max)),
        ]);

    let y_axis = Axis::default()
        .title(Y_AXIS_TITLE)
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.0}", y_min)),
            Span::raw(format!("${:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.0}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(Span::styled(
                    format!(" {} ", title),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .title_alignment(Alignment::Center),
        )
        .x_axis(x_axis)
        .y_axis(y_axis)
        // Légende visible tant qu'elle tient dans la moitié du graphique
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}

// ============================================================================
// Conversion des données en points (x, y)
// ============================================================================
// L'axe X est en jours depuis l'epoch : historique (timestamps) et prévision
// (dates calendaires) partagent la même échelle.
// ============================================================================

pub fn history_points(series: &PriceSeries) -> Vec<(f64, f64)> {
    series
        .points()
        .iter()
        .map(|p| (p.timestamp_ms() as f64 / DAY_MS, p.price))
        .collect()
}

pub fn forecast_points(forecast: &Forecast) -> Vec<(f64, f64)> {
    forecast
        .points
        .iter()
        .map(|p| (epoch_day(p.date), p.predicted_price))
        .collect()
}

fn epoch_day(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

/// Label de date pour un x en jours depuis l'epoch
fn day_label(x: f64) -> String {
    DateTime::from_timestamp((x * 86_400.0) as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn x_bounds(actual: &[(f64, f64)], predicted: &[(f64, f64)]) -> (f64, f64) {
    let (min, max) = actual
        .iter()
        .chain(predicted)
        .fold((f64::MAX, f64::MIN), |(min, max), &(x, _)| (min.min(x), max.max(x)));

    if min < max {
        (min, max)
    } else {
        (min - 1.0, max + 1.0)
    }
}

/// Bornes de l'axe Y avec une marge de 5% pour que le graphique respire
pub fn price_bounds(actual: &[(f64, f64)], predicted: &[(f64, f64)]) -> (f64, f64) {
    let (min_price, max_price) = actual
        .iter()
        .chain(predicted)
        .fold((f64::MAX, f64::MIN), |(min, max), &(_, y)| (min.min(y), max.max(y)));

    // Série plate : marge arbitraire de 5% du prix
    let margin = if max_price > min_price {
        (max_price - min_price) * 0.05
    } else {
        (max_price.abs() * 0.05).max(1.0)
    };

    ((min_price - margin).max(0.0), max_price + margin)
}

// ============================================================================
// Helpers
// ============================================================================

fn render_footer(frame: &mut Frame, area: Rect) {
    let text = Line::from(vec![
        Span::styled(
            "[q/ESC/Enter]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Continuer"),
    ]);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Affiche un message quand il n'y a pas de données à afficher
fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ Erreur ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::fixtures::{daily_raw_points, random_walk_prices, JAN_10_2024_MS};
    use crate::models::{ArimaOrder, ForecastPoint};

    fn sample_series() -> PriceSeries {
        let prices = random_walk_prices(9, 60, 42_000.0);
        PriceSeries::from_raw(&daily_raw_points(JAN_10_2024_MS, &prices)).unwrap()
    }

    fn sample_forecast(series: &PriceSeries) -> Forecast {
        let last = series.last().unwrap();
        let start = last.timestamp.date_naive();
        Forecast {
            order: ArimaOrder::new(2, 1, 2),
            points: start
                .iter_days()
                .skip(1)
                .take(10)
                .map(|date| ForecastPoint {
                    date,
                    predicted_price: last.price,
                })
                .collect(),
        }
    }

    /// Rend le graphique et retourne le contenu de l'écran, ligne par ligne
    fn draw(series: &PriceSeries, forecast: Option<&Forecast>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|frame| render_chart(frame, series, forecast))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_history_chart_labels() {
        let screen = draw(&sample_series(), None);

        assert!(screen.contains(HISTORY_TITLE));
        assert!(screen.contains(HISTORY_LEGEND));
        assert!(screen.contains(X_AXIS_TITLE));
        assert!(screen.contains(Y_AXIS_TITLE));
        assert!(!screen.contains(PREDICTED_LEGEND));
    }

    #[test]
    fn test_prediction_chart_labels() {
        let series = sample_series();
        let forecast = sample_forecast(&series);
        let screen = draw(&series, Some(&forecast));

        assert!(screen.contains(PREDICTION_TITLE));
        assert!(screen.contains(ACTUAL_LEGEND));
        assert!(screen.contains(PREDICTED_LEGEND));
    }

    #[test]
    fn test_empty_series_shows_message() {
        let screen = draw(&PriceSeries::default(), None);
        assert!(screen.contains("Pas de données à afficher"));
    }

    #[test]
    fn test_history_and_forecast_share_x_scale() {
        let series = sample_series();
        let forecast = sample_forecast(&series);

        let actual = history_points(&series);
        let predicted = forecast_points(&forecast);

        // Dernière observation à minuit UTC : la prévision commence un jour après
        let last_x = actual.last().unwrap().0;
        assert_eq!(predicted[0].0, last_x + 1.0);
        assert_eq!(predicted[9].0, last_x + 10.0);
    }

    #[test]
    fn test_price_bounds_margin() {
        let (min, max) = price_bounds(&[(0.0, 100.0), (1.0, 200.0)], &[(2.0, 300.0)]);
        assert_eq!(min, 90.0);
        assert_eq!(max, 310.0);

        let (flat_min, flat_max) = price_bounds(&[(0.0, 100.0), (1.0, 100.0)], &[]);
        assert!(flat_min < 100.0 && flat_max > 100.0);
    }

    #[test]
    fn test_day_label() {
        assert_eq!(day_label(19732.0), "2024-01-10");
    }
}
