use tokio::sync::Mutex;

use cellscope_compute::DiagnosticEngine;
use cellscope_core::Config;
use cellscope_ingest::{MockBatteryGenerator, PackLayout};
use cellscope_llm::GeminiPassthrough;
use cellscope_storage::HistoryStore;

/// Shared by every handler behind an `Arc`.
///
/// Engine and generator own their random sources, so each sits behind its
/// own lock. History writes are serialized through `history`.
pub struct AppState {
    pub config: Config,
    pub history: Mutex<HistoryStore>,
    pub engine: Mutex<DiagnosticEngine>,
    pub generator: Mutex<MockBatteryGenerator>,
    pub genai: GeminiPassthrough,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let history = HistoryStore::new(
            &config.storage.data_dir,
            config.storage.history_limit,
        );
        let seed = config.telemetry.seed;
        // Offset so the engine's stream differs from the generator's under one seed.
        let engine = DiagnosticEngine::from_seed(seed.map(|s| s.wrapping_add(1)));
        let generator =
            MockBatteryGenerator::from_seed(PackLayout::with_cells(config.telemetry.cell_count), seed);
        let genai = GeminiPassthrough::from_config(&config.llm);

        Self {
            history: Mutex::new(history),
            engine: Mutex::new(engine),
            generator: Mutex::new(generator),
            genai,
            config,
        }
    }
}
