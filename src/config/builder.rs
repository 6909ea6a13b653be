use anyhow::Result;

use super::types::{Config, LlmProvider, LlmSettings, ServerSettings, StorageSettings};

#[derive(Debug)]
pub struct ConfigBuilder {
    pub(super) llm: LlmSettings,
    pub(super) server: ServerSettings,
    pub(super) storage: StorageSettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            llm: LlmSettings::default(),
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
        }
    }

    pub fn with_llm<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut LlmSettings),
    {
        update(&mut self.llm);
        self
    }

    pub fn with_server<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut ServerSettings),
    {
        update(&mut self.server);
        self
    }

    /// Change provider, resetting provider-specific settings and reading the
    /// provider's API key variable if it is set.
    pub fn with_provider(self, provider: LlmProvider) -> Result<Self> {
        super::environment::apply_provider(self, provider)
    }

    pub fn with_storage<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut StorageSettings),
    {
        update(&mut self.storage);
        self
    }

    pub fn build(self) -> Result<Config> {
        let config = Config {
            llm: self.llm,
            server: self.server,
            storage: self.storage,
        };
        super::validation::validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
