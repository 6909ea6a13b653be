use anyhow::{Context, Result};
use dirs::home_dir;
use std::{fs, path::Path, path::PathBuf};

use super::Config;
use super::builder::ConfigBuilder;
use super::environment::apply_env_overrides;
use super::types::{FileConfig, LlmProvider};

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(".taskplan/config");
        Ok(path)
    }

    /// Defaults overlaid with the config file and the environment. Callers may
    /// apply further overrides before calling [`ConfigBuilder::build`].
    pub fn load_builder() -> Result<ConfigBuilder> {
        let path = Self::config_path()?;
        let mut builder = ConfigBuilder::new();

        if path.exists() {
            builder = Self::apply_file(builder, &path)?;
        }

        apply_env_overrides(builder)
    }

    fn apply_file(builder: ConfigBuilder, path: &Path) -> Result<ConfigBuilder> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed reading config at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(builder);
        }

        let raw: FileConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed parsing JSON config at {}", path.display()))?;

        raw.apply(builder)
    }
}

impl FileConfig {
    pub fn apply(self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if let Some(llm_file) = self.llm {
            if let Some(provider) = llm_file.provider.as_deref() {
                let parsed = provider
                    .parse::<LlmProvider>()
                    .context("Invalid provider in config file")?;
                builder = builder.with_llm(|llm| llm.switch_provider(parsed));
            }

            builder = builder.with_llm(|llm| {
                if let Some(api_key) = llm_file.api_key {
                    llm.api_key = api_key;
                }
                if let Some(base_url) = llm_file.base_url {
                    llm.base_url = base_url;
                }
                if let Some(model) = llm_file.model {
                    llm.model = model;
                }
                if let Some(timeout) = llm_file.timeout_secs {
                    llm.timeout_secs = Some(timeout);
                }
                if let Some(user_agent) = llm_file.user_agent {
                    llm.user_agent = user_agent;
                }
            });
        }

        if let Some(listen) = self.server.and_then(|server| server.listen) {
            builder = builder.with_server(|server| server.listen = listen);
        }

        if let Some(storage_file) = self.storage {
            builder = builder.with_storage(|storage| {
                if let Some(plans_dir) = storage_file.plans_dir {
                    storage.plans_dir = plans_dir;
                }
                if let Some(naming) = storage_file.naming {
                    storage.naming = naming;
                }
            });
        }

        Ok(builder)
    }
}
