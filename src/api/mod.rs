// ============================================================================
// Module : api
// ============================================================================
// Source de l'historique de prix
//
// CONCEPT RUST : Trait comme frontière
// - Le pipeline ne connaît que PriceSource
// - CoinGeckoSource fait le vrai appel réseau
// - Les tests branchent une source factice, sans réseau
// ============================================================================

pub mod coingecko; // Client API CoinGecko

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::RawPricePoint;

// Re-export des éléments principaux
pub use coingecko::{fetch_market_chart, CoinGeckoSource};

/// Échecs de la récupération des prix
#[derive(Debug, Error)]
pub enum FetchError {
    /// Le serveur a répondu avec un statut HTTP hors 2xx
    #[error("HTTP {status}")]
    Status { status: StatusCode },

    /// Pas de réponse exploitable (DNS, connexion, TLS...)
    #[error("échec de la requête HTTP : {0}")]
    Transport(#[source] reqwest::Error),

    /// Corps de réponse qui n'est pas le JSON attendu
    #[error("réponse JSON invalide : {0}")]
    Decode(#[source] reqwest::Error),

    #[error("impossible de créer le runtime tokio : {0}")]
    Runtime(#[source] std::io::Error),
}

/// Fournit l'historique journalier des `days` derniers jours
pub trait PriceSource {
    fn fetch_prices(&self, days: u32) -> Result<Vec<RawPricePoint>, FetchError>;
}
