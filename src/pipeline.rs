// ============================================================================
// Pipeline : fetch → série → graphique → ARIMA → graphique → tableau
// ============================================================================
// Une seule exécution, en ligne droite. Chaque étape reçoit la sortie de
// l'étape précédente en paramètre : aucun état global.
//
// CONCEPTS RUST :
// 1. Génériques avec traits : PriceSource et ChartRenderer sont injectés
// 2. Enum de résultat : l'échec de fetch est un variant, pas un null
// 3. io::Write : le tableau et les diagnostics vont où l'appelant veut
// ============================================================================

use std::io::Write;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{FetchError, PriceSource};
use crate::config::PipelineConfig;
use crate::models::{Forecast, ForecastError, PriceSeries, SeriesError};

/// Affichage des graphiques
///
/// - `forecast == None` : historique seul
/// - `forecast == Some(..)` : historique + prévision
pub trait ChartRenderer {
    fn render(&mut self, series: &PriceSeries, forecast: Option<&Forecast>) -> anyhow::Result<()>;
}

/// Erreurs qui interrompent le pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("récupération des prix impossible")]
    Fetch(#[from] FetchError),

    #[error("construction de la série impossible")]
    Series(#[from] SeriesError),

    #[error("échec de l'ajustement du modèle")]
    ModelFitting(#[from] ForecastError),

    #[error("échec de l'affichage du graphique")]
    Render(#[source] anyhow::Error),

    #[error("échec de l'écriture sur la sortie")]
    Output(#[from] std::io::Error),
}

/// Issue d'une exécution qui n'a pas levé d'erreur
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Les deux graphiques ont été affichés et le tableau écrit
    Completed {
        series: PriceSeries,
        forecast: Forecast,
    },

    /// Le serveur a répondu avec un statut d'échec, rien d'autre n'a été fait
    FetchFailed { status: StatusCode },
}

/// Exécute le pipeline complet
///
/// CONCEPT : Deux chemins seulement
/// - Statut HTTP d'échec : diagnostic sur `out`, Ok(FetchFailed)
/// - Tout le reste va jusqu'au bout ou remonte en Err
#[instrument(skip_all, fields(coin = %config.coin_id, days = config.lookback_days))]
pub fn run_pipeline<S, R, W>(
    config: &PipelineConfig,
    source: &S,
    renderer: &mut R,
    out: &mut W,
) -> Result<PipelineOutcome, PipelineError>
where
    S: PriceSource + ?Sized,
    R: ChartRenderer + ?Sized,
    W: Write + ?Sized,
{
    // 1. Fetcher
    let raw = match source.fetch_prices(config.lookback_days) {
        Ok(raw) => raw,
        Err(FetchError::Status { status }) => {
            error!(status = %status, "Data retrieval failed");
            writeln!(out, "Error fetching data: {}", status)?;
            writeln!(out, "Data retrieval failed.")?;
            return Ok(PipelineOutcome::FetchFailed { status });
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Series Builder
    let series = PriceSeries::from_raw(&raw)?;
    info!(points = series.len(), "Price series built");
    if !series.is_chronological() {
        warn!("Price series is not strictly chronological, the fit may be meaningless");
    }

    // 3. Graphique A : historique
    renderer.render(&series, None).map_err(PipelineError::Render)?;

    // 4. Forecaster
    let forecast = Forecast::from_series(&series, config.order, config.horizon)?;
    info!(points = forecast.len(), "Forecast computed");

    // 5. Graphique B puis tableau
    renderer
        .render(&series, Some(&forecast))
        .map_err(PipelineError::Render)?;
    write!(out, "{}", forecast)?;

    Ok(PipelineOutcome::Completed { series, forecast })
}

// ============================================================================
// Tests unitaires
// ============================================================================
