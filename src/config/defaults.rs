use std::net::SocketAddr;
use std::path::PathBuf;

use super::constants::{DEFAULT_LISTEN_ADDR, DEFAULT_LM_STUDIO_API_KEY, DEFAULT_PLANS_DIR};
use super::types::{LlmProvider, LlmSettings, RecordNaming, ServerSettings, StorageSettings};

pub fn default_user_agent() -> String {
    format!("taskplan/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LlmSettings {
    fn default() -> Self {
        let provider = LlmProvider::LmStudio;
        Self {
            provider,
            api_key: DEFAULT_LM_STUDIO_API_KEY.to_string(),
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl LlmSettings {
    /// Switch provider, resetting the endpoint, model and credential to that
    /// provider's defaults so settings from a different provider never leak.
    pub fn switch_provider(&mut self, provider: LlmProvider) {
        if self.provider == provider {
            return;
        }
        self.provider = provider;
        self.base_url = provider.default_base_url().to_string();
        self.model = provider.default_model().to_string();
        self.api_key = match provider {
            LlmProvider::LmStudio => DEFAULT_LM_STUDIO_API_KEY.to_string(),
            LlmProvider::OpenRouter | LlmProvider::OpenAi => String::new(),
        };
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN_ADDR
                .parse::<SocketAddr>()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000))),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            plans_dir: PathBuf::from(DEFAULT_PLANS_DIR),
            naming: RecordNaming::Unique,
        }
    }
}
