// ============================================================================
// Renderers : affichage des graphiques dans le terminal
// ============================================================================
// TerminalRenderer : un graphique = une session TUI (alternate screen)
//   - bloque jusqu'à ce que l'utilisateur ferme le graphique
//   - le terminal est restauré avant de rendre la main (tableau sur stdout)
// HeadlessRenderer : stdout n'est pas un terminal, on ne fait que logger
//
// CONCEPT RUST : RAII
// - TerminalSession::enter() active le raw mode et l'alternate screen
// - Drop restaure le terminal, même si le rendu échoue avec ?
// ============================================================================

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};

use crate::models::{Forecast, PriceSeries};
use crate::pipeline::ChartRenderer;
use crate::ui::chart::render_chart;
use crate::ui::events::{is_dismiss_event, EventHandler};

// ============================================================================
// Session terminal
// ============================================================================

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    /// Configure le terminal en mode TUI
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Échec de l'activation du raw mode")?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("Échec de l'ouverture de l'alternate screen");
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(e).context("Échec de la création du terminal");
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    /// Restaure le terminal à son état normal
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to disable raw mode");
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            warn!(error = %e, "Failed to leave alternate screen");
        }
        if let Err(e) = self.terminal.show_cursor() {
            warn!(error = %e, "Failed to show cursor");
        }
        debug!("Terminal restored");
    }
}

// ============================================================================
// TerminalRenderer
// ============================================================================

/// Affiche chaque graphique en plein écran jusqu'à sa fermeture
#[derive(Default)]
pub struct TerminalRenderer {
    events: EventHandler,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartRenderer for TerminalRenderer {
    fn render(&mut self, series: &PriceSeries, forecast: Option<&Forecast>) -> Result<()> {
        info!(
            points = series.len(),
            forecast = forecast.map(|f| f.len()),
            "Showing chart"
        );
        let mut session = TerminalSession::enter()?;

        // Render → Input, jusqu'à une touche de fermeture
        loop {
            session
                .terminal
                .draw(|frame| render_chart(frame, series, forecast))
                .context("Échec du rendu du graphique")?;

            let event = self.events.next()?;
            if is_dismiss_event(&event) {
                debug!("Chart dismissed by user");
                break;
            }
        }

        Ok(())
    }
}

// ============================================================================
// HeadlessRenderer
// ============================================================================

/// Renderer sans affichage (sortie redirigée, CI...)
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    /// Nombre de graphiques qui auraient été affichés
    pub rendered: usize,
}

impl ChartRenderer for HeadlessRenderer {
    fn render(&mut self, series: &PriceSeries, forecast: Option<&Forecast>) -> Result<()> {
        self.rendered += 1;
        match forecast {
            None => info!(
                points = series.len(),
                min = series.min_price(),
                max = series.max_price(),
                "Skipping history chart (no terminal)"
            ),
            Some(forecast) => info!(
                points = series.len(),
                forecast = forecast.len(),
                min = forecast.min_price(),
                max = forecast.max_price(),
                "Skipping prediction chart (no terminal)"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_renderer_counts_charts() {
        let mut renderer = HeadlessRenderer::default();
        let series = PriceSeries::default();

        renderer.render(&series, None).unwrap();
        renderer.render(&series, None).unwrap();

        assert_eq!(renderer.rendered, 2);
    }
}
