use anyhow::anyhow;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use super::constants::{
    DEFAULT_LM_STUDIO_BASE_URL, DEFAULT_LM_STUDIO_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL, DEFAULT_OPENROUTER_BASE_URL, DEFAULT_OPENROUTER_MODEL,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub server: ServerSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// `None` leaves the transport's own default in place.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    LmStudio,
    OpenRouter,
    OpenAi,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::LmStudio => write!(f, "lm-studio"),
            LlmProvider::OpenRouter => write!(f, "openrouter"),
            LlmProvider::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lm-studio" | "lmstudio" => Ok(LlmProvider::LmStudio),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(anyhow!("Unknown LLM provider '{other}'")),
        }
    }
}

impl LlmProvider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::LmStudio => DEFAULT_LM_STUDIO_BASE_URL,
            LlmProvider::OpenRouter => DEFAULT_OPENROUTER_BASE_URL,
            LlmProvider::OpenAi => DEFAULT_OPENAI_BASE_URL,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::LmStudio => DEFAULT_LM_STUDIO_MODEL,
            LlmProvider::OpenRouter => DEFAULT_OPENROUTER_MODEL,
            LlmProvider::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }

    /// Environment variable holding the credential, if the provider needs one.
    pub fn api_key_env_var(self) -> Option<&'static str> {
        match self {
            LlmProvider::LmStudio => None,
            LlmProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LlmProvider::LmStudio => "LM Studio",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::OpenAi => "OpenAI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub plans_dir: PathBuf,
    pub naming: RecordNaming,
}

/// How stored plan records are named on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordNaming {
    /// `<unix-seconds>-<uuid>.json`, never overwrites an existing record.
    Unique,
    /// `<unix-seconds>.json`; records landing in the same second overwrite each other.
    Timestamp,
}

impl fmt::Display for RecordNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordNaming::Unique => write!(f, "unique"),
            RecordNaming::Timestamp => write!(f, "timestamp"),
        }
    }
}

impl std::str::FromStr for RecordNaming {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unique" => Ok(RecordNaming::Unique),
            "timestamp" => Ok(RecordNaming::Timestamp),
            other => Err(anyhow!("Unknown record naming '{other}'")),
        }
    }
}

// File configuration types
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct FileConfig {
    #[serde(default)]
    pub llm: Option<FileLlmSettings>,
    #[serde(default)]
    pub server: Option<FileServerSettings>,
    #[serde(default)]
    pub storage: Option<FileStorageSettings>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileLlmSettings {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileServerSettings {
    pub listen: Option<SocketAddr>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileStorageSettings {
    pub plans_dir: Option<PathBuf>,
    pub naming: Option<RecordNaming>,
}
