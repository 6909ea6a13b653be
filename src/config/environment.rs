use anyhow::{Context, Result, anyhow};
use std::env;

use super::builder::ConfigBuilder;
use super::types::LlmProvider;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(provider_raw) = env_string("TASKPLAN_PROVIDER")? {
        let provider = provider_raw
            .parse::<LlmProvider>()
            .with_context(|| format!("Failed to parse TASKPLAN_PROVIDER value '{provider_raw}'"))?;
        builder = apply_provider(builder, provider)?;
    }

    if let Some(base_url) = env_string("TASKPLAN_BASE_URL")? {
        builder = builder.with_llm(|llm| llm.base_url = base_url);
    }

    if let Some(model) = env_string("TASKPLAN_MODEL")? {
        builder = builder.with_llm(|llm| llm.model = model);
    }

    if let Some(timeout) = env_u64("TASKPLAN_TIMEOUT_SECS")? {
        builder = builder.with_llm(|llm| llm.timeout_secs = Some(timeout));
    }

    apply_api_key_env(builder)
}

/// Switch provider and pick up that provider's credential from the environment.
pub fn apply_provider(builder: ConfigBuilder, provider: LlmProvider) -> Result<ConfigBuilder> {
    apply_api_key_env(builder.with_llm(|llm| llm.switch_provider(provider)))
}

fn apply_api_key_env(builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let Some(key_var) = builder.llm.provider.api_key_env_var() else {
        return Ok(builder);
    };
    match env_string(key_var)? {
        Some(api_key) => Ok(builder.with_llm(|llm| llm.api_key = api_key)),
        None => Ok(builder),
    }
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_u64(key: &str) -> Result<Option<u64>> {
    if let Some(value) = env_string(key)? {
        let parsed = value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {key} as u64"))?;
        Ok(Some(parsed))
    } else {
        Ok(None)
    }
}
