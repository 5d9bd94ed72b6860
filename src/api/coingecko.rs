// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère l'historique journalier d'une crypto depuis l'endpoint
// /coins/{id}/market_chart de CoinGecko
//
// CONCEPTS RUST :
// 1. async/await : l'appel HTTP est asynchrone (reqwest)
// 2. block_on : le reste du programme est synchrone, on attend la Future
// 3. Serde : désérialisation JSON vers des structures typées
// 4. Erreurs typées : le statut HTTP est conservé dans FetchError::Status
// ============================================================================

use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::{FetchError, PriceSource};
use crate::config::PipelineConfig;
use crate::models::RawPricePoint;

/// User-Agent envoyé avec la requête (les API publiques bloquent les clients nus)
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structure pour parser la réponse JSON
// ============================================================================
// CoinGecko retourne :
// { "prices": [[ms, prix], ...], "market_caps": [...], "total_volumes": [...] }
// Seul "prices" nous intéresse, serde ignore les autres clés.
// ============================================================================

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<RawPricePoint>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Client HTTP partagé par toutes les requêtes de la source
pub fn build_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Transport)
}

/// Exécute un GET sur `url` et extrait le tableau `prices`
///
/// Un statut hors 2xx donne FetchError::Status, sans lire le corps.
///
/// # Exemple
/// let url = build_market_chart_url(COINGECKO_BASE_URL, "bitcoin", "usd", 365);
/// let prices = fetch_market_chart(&build_client()?, &url).await?;
#[instrument(skip(client))]
pub async fn fetch_market_chart(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<RawPricePoint>, FetchError> {
    debug!("Sending HTTP request to CoinGecko");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::Transport)?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Vérifie que la réponse est un succès HTTP (200-299)
    if !status.is_success() {
        error!(status = %status, "CoinGecko returned error status");
        return Err(FetchError::Status { status });
    }

    // Le corps est entièrement consommé ici, la réponse n'est plus utilisée après
    debug!("Parsing JSON response");
    let chart: MarketChartResponse = response.json().await.map_err(FetchError::Decode)?;

    info!(points = chart.prices.len(), "Successfully fetched market chart");
    Ok(chart.prices)
}

/// Construit l'URL de l'endpoint market_chart (granularité journalière)
pub fn build_market_chart_url(base_url: &str, coin_id: &str, vs_currency: &str, days: u32) -> String {
    format!(
        "{}/coins/{}/market_chart?vs_currency={}&days={}&interval=daily",
        base_url.trim_end_matches('/'),
        coin_id,
        vs_currency,
        days
    )
}

// ============================================================================
// CoinGeckoSource : PriceSource synchrone
// ============================================================================
// CONCEPT RUST : Async dans sync
// - La source possède son runtime tokio
// - fetch_prices() bloque sur la Future, un seul appel par exécution
// ============================================================================

pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
    coin_id: String,
    vs_currency: String,
    runtime: tokio::runtime::Runtime,
}

impl CoinGeckoSource {
    pub fn new(config: &PipelineConfig) -> Result<Self, FetchError> {
        Self::with_client(config, build_client()?)
    }

    pub fn with_client(config: &PipelineConfig, client: reqwest::Client) -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FetchError::Runtime)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            coin_id: config.coin_id.clone(),
            vs_currency: config.vs_currency.clone(),
            runtime,
        })
    }
}

impl PriceSource for CoinGeckoSource {
    fn fetch_prices(&self, days: u32) -> Result<Vec<RawPricePoint>, FetchError> {
        let url = build_market_chart_url(&self.base_url, &self.coin_id, &self.vs_currency, days);
        debug!(url = %url, "Built CoinGecko API URL");

        self.runtime.block_on(fetch_market_chart(&self.client, &url))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
