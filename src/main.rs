// ============================================================================
// Coincast - Prévision du prix du bitcoin
// ============================================================================
// Récupère un an d'historique journalier depuis CoinGecko, affiche le
// graphique, ajuste un ARIMA(2,1,2), affiche historique + prévision puis
// imprime les 10 jours prévus.
//
// CONCEPTS RUST CLÉS :
// 1. Pipeline explicite : run_pipeline() reçoit tout en paramètre
// 2. Trait objects : Box<dyn ChartRenderer> choisi à l'exécution
// 3. anyhow : erreurs avec contexte jusqu'à main()
// ============================================================================

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use coincast::api::CoinGeckoSource;
use coincast::config::PipelineConfig;
use coincast::pipeline::{run_pipeline, ChartRenderer, PipelineOutcome};
use coincast::ui::{HeadlessRenderer, TerminalRenderer};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging avec un TUI
// - Les graphiques occupent le terminal, on log vers un fichier
// - stdout reste réservé au tableau et aux diagnostics
// ============================================================================

/// Répertoire des logs
/// - Linux : ~/.local/share/coincast/logs/
/// - macOS : ~/Library/Application Support/coincast/logs/
/// - Sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("coincast").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/coincast/logs/coincast.log
/// RUST_LOG=coincast=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Un nouveau fichier chaque jour : coincast.log.2024-01-15
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "coincast.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour coincast, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coincast=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Si le logging échoue, on continue sans
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("Coincast starting up");
    let config = PipelineConfig::default();
    let source = CoinGeckoSource::new(&config).context("Échec de l'initialisation du client CoinGecko")?;

    // Sortie redirigée : pas de TUI possible, on garde le tableau
    let mut stdout = io::stdout();
    let mut renderer: Box<dyn ChartRenderer> = if stdout.is_terminal() {
        Box::new(TerminalRenderer::new())
    } else {
        warn!("stdout is not a terminal, charts are disabled");
        Box::new(HeadlessRenderer::default())
    };

    let outcome = run_pipeline(&config, &source, renderer.as_mut(), &mut stdout)
        .context("Le pipeline de prévision a échoué")?;

    match outcome {
        PipelineOutcome::Completed { series, forecast } => {
            info!(observations = series.len(), forecast = forecast.len(), "Run completed");
        }
        PipelineOutcome::FetchFailed { status } => {
            info!(status = %status, "Run stopped after fetch failure");
        }
    }

    Ok(())
}
