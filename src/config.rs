// ============================================================================
// Configuration du pipeline
// ============================================================================
// Paramètres fixes d'une exécution : actif, devise, fenêtre d'historique,
// ordre du modèle et horizon de prévision. Pas de flags ni de fichier :
// seule la valeur par défaut est utilisée par le binaire.
// ============================================================================

use crate::models::ArimaOrder;

/// URL de base de l'API CoinGecko (v3)
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Fenêtre d'historique par défaut (en jours)
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Nombre de jours prévus
pub const FORECAST_HORIZON: usize = 10;

/// Ordre fixe du modèle, non ajusté sur les données
pub const ARIMA_ORDER: ArimaOrder = ArimaOrder::new(2, 1, 2);

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Hôte de l'API de marché (remplacé par un serveur local dans les tests)
    pub base_url: String,

    /// Identifiant CoinGecko de l'actif (ex: "bitcoin")
    pub coin_id: String,

    /// Devise de cotation (ex: "usd")
    pub vs_currency: String,

    /// Fenêtre d'historique demandée
    pub lookback_days: u32,

    pub order: ArimaOrder,

    pub horizon: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_BASE_URL.to_string(),
            coin_id: "bitcoin".to_string(),
            vs_currency: "usd".to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            order: ARIMA_ORDER,
            horizon: FORECAST_HORIZON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.coin_id, "bitcoin");
        assert_eq!(config.vs_currency, "usd");
        assert_eq!(config.lookback_days, 365);
        assert_eq!(config.order, ArimaOrder::new(2, 1, 2));
        assert_eq!(config.horizon, 10);
    }
}
