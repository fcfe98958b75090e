pub mod gemini;

use cellscope_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the Gemini provider from config. Fails when no API key is set.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    let api_key = llm_config
        .gemini_api_key
        .as_ref()
        .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY not set".into()))?;
    Ok(Box::new(gemini::GeminiProvider::new(
        api_key.clone(),
        llm_config.gemini_model.clone(),
        llm_config.gemini_base_url.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> LlmConfig {
        LlmConfig {
            gemini_api_key: key.map(str::to_string),
            gemini_model: "gemini-2.5-pro".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            temperature: 0.2,
            max_tokens: 2048,
        }
    }

    #[test]
    fn missing_key_is_not_configured() {
        let err = create_provider(&config(None)).err().unwrap();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn key_present_builds_provider() {
        assert!(create_provider(&config(Some("k"))).is_ok());
    }
}
