// ============================================================================
// Structures : ForecastPoint et Forecast
// ============================================================================
// Prévision ponctuelle datée, produite à partir d'un modèle ARIMA ajusté
//
// CONCEPTS RUST :
// 1. NaiveDate : date calendaire sans heure ni timezone
// 2. Trait Display : la prévision s'affiche directement comme un tableau
// 3. Iterator zip : associe chaque date à sa valeur prédite
// ============================================================================

use std::fmt;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::models::arima::{ArimaModel, ArimaOrder, ForecastError};
use crate::models::PriceSeries;

/// Un prix prédit pour un jour donné
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
}

/// Prévision complète, en ordre chronologique
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Ordre du modèle qui a produit la prévision
    pub order: ArimaOrder,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Ajuste le modèle sur la série et prévoit `horizon` jours
    ///
    /// CONCEPT : Dates de prévision
    /// - Les `horizon` jours calendaires qui suivent la dernière observation
    /// - Pas d'ajustement week-end / jours fériés (crypto : marché 24h/24)
    #[instrument(skip(series), fields(observations = series.len()))]
    pub fn from_series(
        series: &PriceSeries,
        order: ArimaOrder,
        horizon: usize,
    ) -> Result<Self, ForecastError> {
        let last = series.last().ok_or(ForecastError::InsufficientData {
            order,
            needed: order.min_observations(),
            got: 0,
        })?;

        let model = ArimaModel::fit(&series.prices(), order)?;
        info!(sigma2 = model.sigma2, aic = model.aic, "Model fitted");
        info!("\n{}", model.summary());

        let values = model.forecast(horizon)?;
        let points = forecast_dates(last.timestamp.date_naive(), horizon)
            .into_iter()
            .zip(values)
            .map(|(date, predicted_price)| ForecastPoint {
                date,
                predicted_price,
            })
            .collect();

        Ok(Self { order, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ForecastPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }

    pub fn min_price(&self) -> Option<f64> {
        self.points.iter().map(|p| p.predicted_price).reduce(f64::min)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.points.iter().map(|p| p.predicted_price).reduce(f64::max)
    }
}

/// Tableau "Date" / "Predicted Price"
impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10}  {:>15}", "Date", "Predicted Price")?;
        for point in &self.points {
            writeln!(
                f,
                "{:<10}  {:>15.2}",
                point.date.format("%Y-%m-%d").to_string(),
                point.predicted_price
            )?;
        }
        Ok(())
    }
}

/// Les `horizon` jours consécutifs après `last`
pub fn forecast_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    last.iter_days().skip(1).take(horizon).collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================
