// ============================================================================
// Données synthétiques pour les tests
// ============================================================================
// Générateur pseudo-aléatoire déterministe (LCG 64 bits) : mêmes séries à
// chaque exécution, aucune dépendance au réseau
// ============================================================================

use crate::models::RawPricePoint;

pub const DAY_MS: i64 = 86_400_000;

/// 2024-01-10T00:00:00Z
pub const JAN_10_2024_MS: i64 = 1_704_844_800_000;

/// Bruit uniforme dans [-amplitude, amplitude)
pub fn noise(seed: u64, n: usize, amplitude: f64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            (unit * 2.0 - 1.0) * amplitude
        })
        .collect()
}

/// Marche aléatoire avec inertie sur les variations journalières
pub fn random_walk_prices(seed: u64, n: usize, start: f64) -> Vec<f64> {
    let eps = noise(seed, n, start * 0.01);
    let mut prices = Vec::with_capacity(n);
    let mut price = start;
    let mut change = 0.0;

    for e in eps {
        prices.push(price);
        change = 0.3 * change + e;
        price += change;
    }
    prices
}

/// Paires brutes journalières à partir de `start_ms`
pub fn daily_raw_points(start_ms: i64, prices: &[f64]) -> Vec<RawPricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| RawPricePoint(start_ms + i as i64 * DAY_MS, price))
        .collect()
}
