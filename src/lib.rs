// ============================================================================
// Coincast - Library
// ============================================================================
// Expose les étapes du pipeline pour le binaire et les tests
// ============================================================================

pub mod api;      // Client CoinGecko
pub mod config;   // Paramètres d'exécution
pub mod models;   // Série de prix, ARIMA, prévision
pub mod pipeline; // Enchaînement des étapes
pub mod ui;       // Graphiques dans le terminal

#[cfg(test)]
pub(crate) mod fixtures; // Données synthétiques des tests
