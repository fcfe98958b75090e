//! Repair advice for a flagged cell.

use tracing::{debug, info};

use cellscope_core::config::LlmConfig;
use cellscope_core::Cell;

use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;

/// Reply for cells the classifier did not flag. No model call is made.
pub const NORMAL_CELL_MESSAGE: &str =
    "The selected cell is operating within normal parameters. No action is required.";

const SYSTEM_INSTRUCTION: &str = "You are an expert AI assistant for EV battery technicians, \
specializing in the Indian 2/3-wheeler market. Provide concise, actionable advice for a skilled \
mechanic. Format your response using markdown. Your response MUST have three distinct sections \
in this order: 1. **Fault Classification**: (Your classification here), 2. **Likely Causes**: \
(Bulleted list), 3. **Recommended Steps**: (Bulleted list).";

pub struct FixAdvisor {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl FixAdvisor {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the Gemini provider.
    pub fn from_config(llm_config: &LlmConfig) -> Result<Self, LlmError> {
        let provider = create_provider(llm_config)?;
        Ok(Self::new(provider, llm_config.temperature, llm_config.max_tokens))
    }

    /// Markdown advice for `cell` on `vehicle`.
    pub async fn suggest(&self, cell: &Cell, vehicle: &str) -> Result<String, LlmError> {
        if !cell.flagged() {
            debug!(cell = cell.id, "cell not flagged, skipping model call");
            return Ok(NORMAL_CELL_MESSAGE.to_string());
        }

        info!(cell = cell.id, vehicle, "requesting fix suggestion");
        let messages = vec![
            Message::system(SYSTEM_INSTRUCTION),
            Message::user(build_prompt(cell, vehicle)),
        ];
        self.provider
            .complete(messages, self.temperature, self.max_tokens)
            .await
    }
}

/// Diagnostic request text: vehicle plus the cell's readings and reason.
pub fn build_prompt(cell: &Cell, vehicle: &str) -> String {
    let z_score = cell
        .z_score
        .map(|z| format!("{z:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    let reason = cell.anomaly_reason.as_deref().unwrap_or("Unspecified");

    format!(
        "Analyze the following battery cell fault for a {vehicle}.\n\
         - Cell ID: {id}\n\
         - Voltage: {voltage:.3} V\n\
         - Internal Resistance: {resistance:.1} mΩ\n\
         - Z-score: {z_score}\n\
         - Anomaly Reason: {reason}\n\
         Provide a fault classification, likely causes and recommended repair steps.",
        id = cell.id,
        voltage = cell.voltage,
        resistance = cell.internal_resistance * 1000.0,
    )
}
