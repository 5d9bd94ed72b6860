// ============================================================================
// Module : models
// ============================================================================
// Structures de données et modèle statistique
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod arima;    // Ajustement ARIMA(p, d, q) et prévision
pub mod forecast; // Prévision datée + tableau
pub mod price;    // Série de prix historique

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use coincast::models::price::PriceSeries;
// On peut faire : use coincast::models::PriceSeries;
pub use arima::{ArimaModel, ArimaOrder, ForecastError};
pub use forecast::{Forecast, ForecastPoint};
pub use price::{PricePoint, PriceSeries, RawPricePoint, SeriesError};
