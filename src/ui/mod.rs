// ============================================================================
// Module : ui
// ============================================================================
// Affichage des graphiques dans le terminal (ratatui + crossterm)
// ============================================================================

pub mod chart;    // Widget Chart : historique et prévision
pub mod events;   // Gestion des événements clavier
pub mod terminal; // Renderers (session TUI, mode sans terminal)

// Re-exports pour simplifier les imports
pub use chart::render_chart;
pub use events::{Event, EventHandler};
pub use terminal::{HeadlessRenderer, TerminalRenderer};
