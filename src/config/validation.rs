use anyhow::{Result, anyhow};

use super::types::Config;

pub fn validate(config: &Config) -> Result<()> {
    let llm = &config.llm;

    if llm.base_url.trim().is_empty() {
        return Err(anyhow!("LLM base URL must not be empty"));
    }

    if llm.model.trim().is_empty() {
        return Err(anyhow!("LLM model name must not be empty"));
    }

    if llm.api_key.trim().is_empty() {
        if let Some(env_var) = llm.provider.api_key_env_var() {
            return Err(anyhow!(
                "{} API key not found. Set {} or add it to ~/.taskplan/config",
                llm.provider.display_name(),
                env_var
            ));
        }
    }

    if llm.timeout_secs == Some(0) {
        return Err(anyhow!("LLM timeout must be a positive number of seconds"));
    }

    if config.storage.plans_dir.as_os_str().is_empty() {
        return Err(anyhow!("Plans directory must not be empty"));
    }

    Ok(())
}
