// ============================================================================
// Structures : PricePoint et PriceSeries
// ============================================================================
// Historique de prix journalier tel que retourné par l'API de marché
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : timestamp avec timezone UTC (précision milliseconde)
// 2. Tuple struct + serde : désérialise directement un tableau JSON [ms, prix]
// 3. Fonction pure : même entrée => même série, aucun état caché
// ============================================================================

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Paire brute `[timestamp_ms, price]` du tableau JSON `prices`
///
/// CONCEPT RUST : Tuple struct
/// - serde désérialise un tableau JSON à 2 éléments en tuple struct
/// - .0 = timestamp en millisecondes epoch, .1 = prix
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawPricePoint(pub i64, pub f64);

impl RawPricePoint {
    pub fn timestamp_ms(&self) -> i64 {
        self.0
    }

    pub fn price(&self) -> f64 {
        self.1
    }
}

/// Erreurs de construction de la série
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("timestamp hors limites à l'index {index}: {timestamp_ms} ms")]
    InvalidTimestamp { index: usize, timestamp_ms: i64 },
}

/// Un prix observé à un instant donné
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Instant de l'observation
    pub timestamp: DateTime<Utc>,

    /// Prix en devise de cotation (USD)
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Timestamp reconverti en millisecondes epoch
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Série de prix indexée par timestamp
///
/// CONCEPT : Conversion directe
/// - L'ordre de l'entrée est conservé tel quel
/// - Pas de déduplication, pas de rééchantillonnage, pas de comblement des trous
/// - Le tri chronologique est attendu mais pas imposé (voir is_chronological)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Construit la série à partir des paires brutes
    ///
    /// CONCEPT RUST : Iterator + collect sur Result
    /// - collect::<Result<Vec<_>, _>>() s'arrête à la première erreur
    pub fn from_raw(raw: &[RawPricePoint]) -> Result<Self, SeriesError> {
        let points = raw
            .iter()
            .enumerate()
            .map(|(index, point)| {
                DateTime::from_timestamp_millis(point.timestamp_ms())
                    .map(|timestamp| PricePoint::new(timestamp, point.price()))
                    .ok_or(SeriesError::InvalidTimestamp {
                        index,
                        timestamp_ms: point.timestamp_ms(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Les prix seuls, dans l'ordre de la série (entrée du modèle)
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Recherche du prix par timestamp (l'index de la série)
    pub fn price_at(&self, timestamp: DateTime<Utc>) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.timestamp == timestamp)
            .map(|p| p.price)
    }

    /// Vérifie que les timestamps sont strictement croissants
    pub fn is_chronological(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp)
    }

    pub fn min_price(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price).reduce(f64::min)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price).reduce(f64::max)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{daily_raw_points, DAY_MS, JAN_10_2024_MS};

    #[test]
    fn test_raw_point_from_json() {
        let raw: Vec<RawPricePoint> =
            serde_json::from_str("[[1704844800000, 42000.5], [1704931200000, 42500]]").unwrap();

        assert_eq!(raw[0], RawPricePoint(1_704_844_800_000, 42000.5));
        assert_eq!(raw[1].price(), 42500.0);
    }

    #[test]
    fn test_from_raw_preserves_order_and_values() {
        let raw = daily_raw_points(JAN_10_2024_MS, &[42000.0, 42500.0, 41800.0, 43000.0]);
        let series = PriceSeries::from_raw(&raw).unwrap();

        assert_eq!(series.len(), raw.len());
        for (point, raw_point) in series.points().iter().zip(&raw) {
            assert_eq!(point.timestamp_ms(), raw_point.timestamp_ms());
            assert_eq!(point.price, raw_point.price());
        }
        assert!(series.is_chronological());
    }

    #[test]
    fn test_timestamp_round_trip_keeps_milliseconds() {
        let raw = vec![RawPricePoint(1_704_844_800_123, 1.0)];
        let series = PriceSeries::from_raw(&raw).unwrap();

        assert_eq!(series.points()[0].timestamp_ms(), 1_704_844_800_123);
        assert_eq!(
            series.points()[0].timestamp.to_rfc3339(),
            "2024-01-10T00:00:00.123+00:00"
        );
    }

    #[test]
    fn test_from_raw_is_idempotent() {
        let raw = daily_raw_points(JAN_10_2024_MS, &[1.5, 2.25, 3.125]);

        let a = PriceSeries::from_raw(&raw).unwrap();
        let b = PriceSeries::from_raw(&raw).unwrap();

        assert_eq!(a, b);
        for (x, y) in a.points().iter().zip(b.points()) {
            assert_eq!(x.price.to_bits(), y.price.to_bits());
        }
    }

    #[test]
    fn test_from_raw_keeps_unsorted_and_duplicate_input() {
        // Conversion directe : pas de tri ni de déduplication
        let raw = vec![
            RawPricePoint(2 * DAY_MS, 2.0),
            RawPricePoint(DAY_MS, 1.0),
            RawPricePoint(DAY_MS, 1.0),
        ];
        let series = PriceSeries::from_raw(&raw).unwrap();

        assert_eq!(series.len(), 3);
        assert!(!series.is_chronological());
        assert_eq!(series.prices(), vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_from_raw_rejects_out_of_range_timestamp() {
        let raw = vec![RawPricePoint(0, 1.0), RawPricePoint(i64::MAX, 2.0)];

        assert_eq!(
            PriceSeries::from_raw(&raw),
            Err(SeriesError::InvalidTimestamp {
                index: 1,
                timestamp_ms: i64::MAX
            })
        );
    }

    #[test]
    fn test_price_at_and_bounds() {
        let raw = daily_raw_points(0, &[10.0, 30.0, 20.0]);
        let series = PriceSeries::from_raw(&raw).unwrap();

        let second = DateTime::from_timestamp_millis(DAY_MS).unwrap();
        assert_eq!(series.price_at(second), Some(30.0));
        assert_eq!(series.price_at(Utc::now()), None);
        assert_eq!(series.min_price(), Some(10.0));
        assert_eq!(series.max_price(), Some(30.0));
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::from_raw(&[]).unwrap();

        assert!(series.is_empty());
        assert_eq!(series.last(), None);
        assert_eq!(series.min_price(), None);
        assert!(series.is_chronological());
    }
}
