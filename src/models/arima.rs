// ============================================================================
// Modèle : ARIMA(p, d, q)
// ============================================================================
// Ajuste un modèle ARIMA d'ordre fixe sur une série de prix et produit une
// prévision ponctuelle (moyenne prédictive, sans intervalle de confiance)
//
// ALGORITHME :
// 1. Différenciation d fois de la série
// 2. Estimation ARMA(p, q) par la procédure de Hannan-Rissanen :
//    a. AR long par moindres carrés => innovations approchées
//    b. Moindres carrés sur les retards AR + innovations retardées
// 3. Rejet des coefficients hors de la région stationnaire / inversible
// 4. Résidus recalculés par récurrence (somme des carrés conditionnelle)
// 5. Prévision récursive (innovations futures = 0) puis intégration d fois
//
// CONCEPTS RUST :
// 1. nalgebra : DMatrix / DVector pour les équations normales
// 2. thiserror : erreurs typées pour les échecs d'ajustement
// 3. Option -> Result avec ok_or : try_inverse() ne dit pas pourquoi il échoue
// ============================================================================

use std::fmt;

use nalgebra::{DMatrix, DVector};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Observations minimales au-delà de p + d + q
pub const MIN_EXTRA_OBSERVATIONS: usize = 10;

/// Ordre minimal de l'AR long utilisé pour approcher les innovations
const LONG_AR_MIN_ORDER: usize = 10;

/// Ordres (p, d, q) du modèle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// Ordre autorégressif
    pub p: usize,
    /// Ordre de différenciation
    pub d: usize,
    /// Ordre moyenne mobile
    pub q: usize,
}

impl ArimaOrder {
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Nombre d'observations en dessous duquel l'ajustement est refusé
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + MIN_EXTRA_OBSERVATIONS
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Échecs de l'ajustement ou de la prévision
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("{order} demande au moins {needed} observations, {got} reçues")]
    InsufficientData {
        order: ArimaOrder,
        needed: usize,
        got: usize,
    },

    #[error("matrice singulière pendant l'étape « {stage} » (série dégénérée ?)")]
    SingularMatrix { stage: &'static str },

    #[error("valeur non finie dans {what}")]
    NonFinite { what: &'static str },

    #[error("partie AR non stationnaire (φ = {coeffs:?}), la prévision divergerait")]
    NonStationary { coeffs: Vec<f64> },

    #[error("partie MA non inversible (θ = {coeffs:?})")]
    NonInvertible { coeffs: Vec<f64> },
}

/// Modèle ARIMA ajusté
///
/// CONCEPT : Le modèle garde la fin de la série différenciée et les résidus,
/// c'est tout ce dont la prévision récursive a besoin.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    pub order: ArimaOrder,
    /// Coefficients AR (φ1..φp)
    pub ar_coeffs: Vec<f64>,
    /// Coefficients MA (θ1..θq)
    pub ma_coeffs: Vec<f64>,
    /// Moyenne de la série différenciée (0 quand d > 0, pas de dérive)
    pub mean: f64,
    /// Résidus sur toute la série différenciée
    pub residuals: Vec<f64>,
    /// Variance des résidus
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Série différenciée et centrée
    centered: Vec<f64>,
    /// Dernière valeur de chaque niveau de différenciation (0..d)
    anchors: Vec<f64>,
}

impl ArimaModel {
    /// Ajuste le modèle sur `data`
    #[instrument(skip(data, order), fields(observations = data.len(), order = %order))]
    pub fn fit(data: &[f64], order: ArimaOrder) -> Result<Self, ForecastError> {
        let needed = order.min_observations();
        if data.len() < needed {
            return Err(ForecastError::InsufficientData {
                order,
                needed,
                got: data.len(),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ForecastError::NonFinite {
                what: "les observations",
            });
        }

        let ArimaOrder { p, d, q } = order;

        // 1. Différenciation
        let anchors = differencing_anchors(data, d);
        let diff_data = difference(data, d);

        // Pas de constante dès qu'on différencie : pas de dérive estimée
        let mean = if d == 0 { mean(&diff_data) } else { 0.0 };
        let centered: Vec<f64> = diff_data.iter().map(|x| x - mean).collect();

        // 2. Estimation des coefficients
        let (ar_coeffs, ma_coeffs) = if q == 0 {
            (estimate_ar(&centered, p)?, Vec::new())
        } else {
            estimate_arma(&centered, p, q)?
        };
        debug!(?ar_coeffs, ?ma_coeffs, "Estimated ARMA coefficients");

        // 3. Racines de 1 - φ1 z - ... et 1 + θ1 z + ... hors du cercle unité
        if !is_stationary(&ar_coeffs) {
            warn!(?ar_coeffs, "AR coefficients outside the stationary region");
            return Err(ForecastError::NonStationary { coeffs: ar_coeffs });
        }
        let negated_ma: Vec<f64> = ma_coeffs.iter().map(|theta| -theta).collect();
        if !is_stationary(&negated_ma) {
            warn!(?ma_coeffs, "MA coefficients outside the invertible region");
            return Err(ForecastError::NonInvertible { coeffs: ma_coeffs });
        }

        // 4. Résidus conditionnels
        let residuals = css_residuals(&centered, &ar_coeffs, &ma_coeffs);
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(ForecastError::NonFinite { what: "les résidus" });
        }

        let effective = &residuals[p..];
        let n = effective.len() as f64;
        let sigma2 = effective.iter().map(|r| r * r).sum::<f64>() / n;
        if sigma2 <= 0.0 || !sigma2.is_finite() {
            return Err(ForecastError::NonFinite {
                what: "la variance des résidus",
            });
        }

        // 5. Critères d'information (vraisemblance gaussienne)
        let k = (p + q + 1) as f64;
        let log_likelihood = -0.5 * n * (1.0 + (2.0 * std::f64::consts::PI * sigma2).ln());
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n.ln();

        Ok(Self {
            order,
            ar_coeffs,
            ma_coeffs,
            mean,
            residuals,
            sigma2,
            log_likelihood,
            aic,
            bic,
            centered,
            anchors,
        })
    }

    /// Prévision ponctuelle sur `horizon` pas, dans l'échelle d'origine
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>, ForecastError> {
        let mut values = self.centered.clone();
        let mut innovations = self.residuals.clone();
        let mut diffs = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let ar: f64 = self
                .ar_coeffs
                .iter()
                .enumerate()
                .map(|(i, phi)| phi * values[values.len() - 1 - i])
                .sum();
            let ma: f64 = self
                .ma_coeffs
                .iter()
                .enumerate()
                .map(|(j, theta)| theta * innovations[innovations.len() - 1 - j])
                .sum();

            let next = ar + ma;
            values.push(next);
            innovations.push(0.0); // espérance des innovations futures
            diffs.push(next + self.mean);
        }

        // Intégration inverse, du niveau le plus différencié vers la série
        let forecasts = self
            .anchors
            .iter()
            .rev()
            .fold(diffs, |level, &anchor| integrate(&level, anchor));

        if forecasts.iter().any(|f| !f.is_finite()) {
            warn!(order = %self.order, "Forecast produced non-finite values");
            return Err(ForecastError::NonFinite {
                what: "la prévision",
            });
        }

        Ok(forecasts)
    }

    /// Résumé texte du modèle (loggé après l'ajustement)
    pub fn summary(&self) -> String {
        let mut s = format!("{} Model Summary\n", self.order);
        s.push_str(&"=".repeat(40));
        s.push('\n');

        if !self.ar_coeffs.is_empty() {
            s.push_str("AR Coefficients:\n");
            for (i, c) in self.ar_coeffs.iter().enumerate() {
                s.push_str(&format!("  φ{} = {:.6}\n", i + 1, c));
            }
        }

        if !self.ma_coeffs.is_empty() {
            s.push_str("MA Coefficients:\n");
            for (i, c) in self.ma_coeffs.iter().enumerate() {
                s.push_str(&format!("  θ{} = {:.6}\n", i + 1, c));
            }
        }

        s.push_str(&format!("Mean: {:.6}\n", self.mean));
        s.push_str(&format!("Sigma²: {:.6}\n", self.sigma2));
        s.push_str(&format!("Log-likelihood: {:.2}\n", self.log_likelihood));
        s.push_str(&format!("AIC: {:.2}\n", self.aic));
        s.push_str(&format!("BIC: {:.2}\n", self.bic));

        s
    }
}

// ============================================================================
// Différenciation
// ============================================================================

/// Différencie la série `d` fois
pub fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return vec![];
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Dernière valeur de la série différenciée 0, 1, ..., d-1 fois
fn differencing_anchors(data: &[f64], d: usize) -> Vec<f64> {
    (0..d)
        .filter_map(|k| difference(data, k).last().copied())
        .collect()
}

/// Somme cumulée à partir de `start` (inverse d'une différenciation)
pub fn integrate(diff: &[f64], start: f64) -> Vec<f64> {
    diff.iter()
        .scan(start, |level, d| {
            *level += d;
            Some(*level)
        })
        .collect()
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        data.iter().sum::<f64>() / data.len() as f64
    }
}

// ============================================================================
// Estimation
// ============================================================================

/// Moindres carrés ordinaires : β = (X'X)^-1 X'y
fn least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    stage: &'static str,
) -> Result<DVector<f64>, ForecastError> {
    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;

    let xtx_inv = xtx
        .try_inverse()
        .ok_or(ForecastError::SingularMatrix { stage })?;
    let beta = xtx_inv * xty;

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::SingularMatrix { stage });
    }
    Ok(beta)
}

/// Régression de x_t sur ses `lags` retards, pour t dans `start..n`
fn lagged_design(data: &[f64], lags: usize, start: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = data.len() - start;
    let x = DMatrix::from_fn(rows, lags, |r, c| data[start + r - 1 - c]);
    let y = DVector::from_iterator(rows, data[start..].iter().copied());
    (x, y)
}

/// AR(p) pur par moindres carrés (série déjà centrée)
fn estimate_ar(data: &[f64], p: usize) -> Result<Vec<f64>, ForecastError> {
    if p == 0 {
        return Ok(Vec::new());
    }
    if data.len() <= 2 * p {
        return Err(ForecastError::InsufficientData {
            order: ArimaOrder::new(p, 0, 0),
            needed: 2 * p + 1,
            got: data.len(),
        });
    }

    let (x, y) = lagged_design(data, p, p);
    let beta = least_squares(&x, &y, "AR")?;
    Ok(beta.iter().copied().collect())
}

/// ARMA(p, q) par Hannan-Rissanen (série déjà centrée)
fn estimate_arma(data: &[f64], p: usize, q: usize) -> Result<(Vec<f64>, Vec<f64>), ForecastError> {
    let n = data.len();

    // Étape 1 : AR long pour approcher les innovations
    let long_order = (p + q).max(LONG_AR_MIN_ORDER.min(n / 4)).max(1);
    let long_ar = estimate_ar(data, long_order)?;

    let mut innovations = vec![0.0; n];
    for t in long_order..n {
        let fitted: f64 = long_ar
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * data[t - 1 - i])
            .sum();
        innovations[t] = data[t] - fitted;
    }

    // Étape 2 : régression sur retards AR + innovations retardées
    let start = (long_order + q).max(p);
    let params = p + q;
    if n <= start + params {
        return Err(ForecastError::InsufficientData {
            order: ArimaOrder::new(p, 0, q),
            needed: start + params + 1,
            got: n,
        });
    }

    let rows = n - start;
    let x = DMatrix::from_fn(rows, params, |r, c| {
        let t = start + r;
        if c < p {
            data[t - 1 - c]
        } else {
            innovations[t - 1 - (c - p)]
        }
    });
    let y = DVector::from_iterator(rows, data[start..].iter().copied());

    let beta = least_squares(&x, &y, "ARMA")?;
    let ar_coeffs = beta.iter().take(p).copied().collect();
    let ma_coeffs = beta.iter().skip(p).take(q).copied().collect();

    Ok((ar_coeffs, ma_coeffs))
}

/// Vrai si toutes les racines de 1 - c1 z - ... - ck z^k sont hors du cercle unité
///
/// CONCEPT : Récurrence de Levinson-Durbin inversée
/// - le dernier coefficient est l'autocorrélation partielle d'ordre k
/// - le polynôme est stable ssi toutes ces autocorrélations sont dans ]-1, 1[
fn is_stationary(coeffs: &[f64]) -> bool {
    let mut current = coeffs.to_vec();

    while let Some(&pacf) = current.last() {
        if pacf.is_nan() || pacf.abs() >= 1.0 {
            return false;
        }
        let k = current.len();
        let scale = 1.0 - pacf * pacf;
        current = (0..k - 1)
            .map(|j| (current[j] + pacf * current[k - 2 - j]) / scale)
            .collect();
    }

    true
}

/// Résidus par récurrence, innovations initiales nulles (t < p)
fn css_residuals(data: &[f64], ar_coeffs: &[f64], ma_coeffs: &[f64]) -> Vec<f64> {
    let p = ar_coeffs.len();
    let mut residuals = vec![0.0; data.len()];

    for t in p..data.len() {
        let ar: f64 = ar_coeffs
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * data[t - 1 - i])
            .sum();
        let ma: f64 = ma_coeffs
            .iter()
            .enumerate()
            .filter(|(j, _)| t > *j)
            .map(|(j, theta)| theta * residuals[t - 1 - j])
            .sum();
        residuals[t] = data[t] - ar - ma;
    }

    residuals
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{noise, random_walk_prices};

    #[test]
    fn test_difference() {
        let data = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&data, 0), data);
        assert_eq!(difference(&data, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&data, 2), vec![1.0, 1.0, 1.0]);
        assert!(difference(&[1.0], 1).is_empty());
    }

    #[test]
    fn test_integrate_undoes_difference() {
        let data = vec![10.0, 12.0, 11.0, 15.0];
        let diff = difference(&data, 1);
        assert_eq!(integrate(&diff, data[0]), data[1..].to_vec());
    }

    #[test]
    fn test_differencing_anchors() {
        let data = vec![1.0, 3.0, 6.0, 10.0];
        assert_eq!(differencing_anchors(&data, 0), Vec::<f64>::new());
        assert_eq!(differencing_anchors(&data, 2), vec![10.0, 4.0]);
    }

    #[test]
    fn test_ar_model_recovers_coefficient() {
        // Processus AR(1) : x_t = 0.7 x_{t-1} + bruit
        let phi = 0.7;
        let eps = noise(42, 300, 1.0);
        let mut data = vec![0.0];
        for t in 1..300 {
            data.push(phi * data[t - 1] + eps[t]);
        }

        let model = ArimaModel::fit(&data, ArimaOrder::new(1, 0, 0)).unwrap();
        assert!((model.ar_coeffs[0] - phi).abs() < 0.15);
        assert!(model.ma_coeffs.is_empty());
    }

    #[test]
    fn test_fit_and_forecast_212() {
        let data = random_walk_prices(7, 400, 42_000.0);

        let model = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2)).unwrap();
        assert_eq!(model.ar_coeffs.len(), 2);
        assert_eq!(model.ma_coeffs.len(), 2);
        assert_eq!(model.mean, 0.0);
        assert!(model.sigma2 > 0.0);
        assert!(model.aic.is_finite() && model.bic.is_finite());

        let forecast = model.forecast(10).unwrap();
        assert_eq!(forecast.len(), 10);
        assert!(forecast.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let data = random_walk_prices(11, 200, 100.0);
        let order = ArimaOrder::new(2, 1, 2);

        let a = ArimaModel::fit(&data, order).unwrap().forecast(10).unwrap();
        let b = ArimaModel::fit(&data, order).unwrap().forecast(10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_observation_fails() {
        let result = ArimaModel::fit(&[42_000.0], ArimaOrder::new(2, 1, 2));
        assert_eq!(
            result.unwrap_err(),
            ForecastError::InsufficientData {
                order: ArimaOrder::new(2, 1, 2),
                needed: 15,
                got: 1,
            }
        );
    }

    #[test]
    fn test_constant_series_is_singular() {
        let data = vec![100.0; 50];
        let result = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2));
        assert!(matches!(result, Err(ForecastError::SingularMatrix { .. })));
    }

    #[test]
    fn test_nan_observation_fails() {
        let mut data = random_walk_prices(3, 50, 100.0);
        data[20] = f64::NAN;
        let result = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2));
        assert!(matches!(result, Err(ForecastError::NonFinite { .. })));
    }

    #[test]
    fn test_is_stationary() {
        assert!(is_stationary(&[]));
        assert!(is_stationary(&[0.5]));
        assert!(!is_stationary(&[1.0]));
        assert!(!is_stationary(&[-1.2]));
        // AR(2) : stationnaire ssi |φ2| < 1, φ1 + φ2 < 1, φ2 - φ1 < 1
        assert!(is_stationary(&[0.5, 0.3]));
        assert!(is_stationary(&[1.9, -0.95]));
        assert!(!is_stationary(&[0.6, 0.5]));
        assert!(!is_stationary(&[-0.6, 0.5]));
        assert!(!is_stationary(&[0.2, -1.1]));
        assert!(!is_stationary(&[f64::NAN, 0.1]));
    }

    #[test]
    fn test_short_series_with_explosive_fit_is_rejected() {
        // 15 points : l'estimation donne φ ≈ (-3.7, 3.5), θ ≈ (4.7, 0.4)
        let data = random_walk_prices(0, 15, 42_000.0);
        let result = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2));

        assert!(
            matches!(result, Err(ForecastError::NonStationary { ref coeffs }) if coeffs.len() == 2),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_short_series_forecasts_stay_near_last_price() {
        // Toute prévision acceptée reste dans ±50% du dernier prix
        for seed in 0..200 {
            let data = random_walk_prices(seed, 15, 42_000.0);
            let Ok(model) = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2)) else {
                continue;
            };
            let last = data[data.len() - 1];
            for value in model.forecast(10).unwrap() {
                assert!(
                    (value - last).abs() <= 0.5 * last,
                    "seed {}: {} vs last {}",
                    seed,
                    value,
                    last
                );
            }
        }
    }

    #[test]
    fn test_fitted_model_is_stationary_and_invertible() {
        let data = random_walk_prices(7, 400, 42_000.0);
        let model = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2)).unwrap();
        let negated_ma: Vec<f64> = model.ma_coeffs.iter().map(|t| -t).collect();

        assert!(is_stationary(&model.ar_coeffs));
        assert!(is_stationary(&negated_ma));
    }

    #[test]
    fn test_summary_lists_coefficients() {
        let data = random_walk_prices(5, 120, 50.0);
        let model = ArimaModel::fit(&data, ArimaOrder::new(2, 1, 2)).unwrap();
        let summary = model.summary();

        assert!(summary.starts_with("ARIMA(2,1,2) Model Summary"));
        assert!(summary.contains("φ2 ="));
        assert!(summary.contains("θ2 ="));
        assert!(summary.contains("AIC:"));
    }
}
