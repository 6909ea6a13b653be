use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

use tempfile::TempDir;

use super::constants::{
    DEFAULT_LM_STUDIO_BASE_URL, DEFAULT_LM_STUDIO_MODEL, DEFAULT_OPENROUTER_BASE_URL,
};
use super::environment::{env_string, env_u64};
use super::{Config, ConfigBuilder, LlmProvider, RecordNaming};

const CONFIG_VARS: &[&str] = &[
    "TASKPLAN_PROVIDER",
    "TASKPLAN_BASE_URL",
    "TASKPLAN_MODEL",
    "TASKPLAN_TIMEOUT_SECS",
    "OPENROUTER_API_KEY",
    "OPENAI_API_KEY",
];

fn env_lock<'a>() -> MutexGuard<'a, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn new(vars: &[(&str, Option<&str>)]) -> Self {
        let saved = vars
            .iter()
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect::<Vec<_>>();
        for (key, value) in vars {
            match value {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
        Self { saved }
    }

    /// Point `HOME` at `home`, clear every config variable, then apply `vars`.
    fn isolated(home: &TempDir, vars: &[(&str, &str)]) -> Self {
        let home = home.path().to_str().unwrap().to_string();
        let mut all: Vec<(&str, Option<&str>)> = vec![("HOME", Some(home.as_str()))];
        all.extend(CONFIG_VARS.iter().map(|key| (*key, None)));
        all.extend(vars.iter().map(|(key, value)| (*key, Some(*value))));
        Self::new(&all)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.iter().rev() {
            match value {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

fn write_config_file(home: &TempDir, contents: &str) {
    let config_dir = home.path().join(".taskplan");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config"), contents).unwrap();
}

#[test]
fn defaults_target_local_lm_studio() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(&temp_home, &[]);

    let config = Config::load_builder().and_then(ConfigBuilder::build).unwrap();
    assert_eq!(config.llm.provider, LlmProvider::LmStudio);
    assert_eq!(config.llm.base_url, DEFAULT_LM_STUDIO_BASE_URL);
    assert_eq!(config.llm.model, DEFAULT_LM_STUDIO_MODEL);
    assert_eq!(config.llm.api_key, "lm-studio");
    assert_eq!(config.llm.timeout_secs, None);
    assert_eq!(config.storage.plans_dir, PathBuf::from("saved_plans"));
    assert_eq!(config.storage.naming, RecordNaming::Unique);
    assert_eq!(
        config.server.listen,
        "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
    );
}

#[test]
fn load_from_env_only() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(
        &temp_home,
        &[
            ("TASKPLAN_BASE_URL", "http://localhost:9999/v1"),
            ("TASKPLAN_MODEL", "env-model"),
            ("TASKPLAN_TIMEOUT_SECS", "45"),
        ],
    );

    let config = Config::load_builder().and_then(ConfigBuilder::build).unwrap();
    assert_eq!(config.llm.base_url, "http://localhost:9999/v1");
    assert_eq!(config.llm.model, "env-model");
    assert_eq!(config.llm.timeout_secs, Some(45));
}

#[test]
fn load_prefers_env_over_file() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    write_config_file(
        &temp_home,
        r#"{
            "llm": {
                "provider": "openrouter",
                "api_key": "file-key",
                "model": "file-model",
                "timeout_secs": 20
            },
            "storage": { "plans_dir": "/tmp/plans", "naming": "timestamp" },
            "server": { "listen": "0.0.0.0:8080" }
        }"#,
    );
    let _env = EnvGuard::isolated(
        &temp_home,
        &[("OPENROUTER_API_KEY", "env-key"), ("TASKPLAN_MODEL", "env-model")],
    );

    let config = Config::load_builder().and_then(ConfigBuilder::build).unwrap();
    assert_eq!(config.llm.provider, LlmProvider::OpenRouter);
    assert_eq!(config.llm.base_url, DEFAULT_OPENROUTER_BASE_URL);
    assert_eq!(config.llm.api_key, "env-key");
    assert_eq!(config.llm.model, "env-model");
    assert_eq!(config.llm.timeout_secs, Some(20));
    assert_eq!(config.storage.plans_dir, PathBuf::from("/tmp/plans"));
    assert_eq!(config.storage.naming, RecordNaming::Timestamp);
    assert_eq!(
        config.server.listen,
        "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
    );
}

#[test]
fn load_errors_without_hosted_api_key() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(&temp_home, &[("TASKPLAN_PROVIDER", "openrouter")]);

    let err = Config::load_builder().and_then(ConfigBuilder::build).unwrap_err();
    assert!(err.to_string().contains("OpenRouter API key not found"));
}

#[test]
fn load_rejects_unknown_provider() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(&temp_home, &[("TASKPLAN_PROVIDER", "mystery")]);

    let err = Config::load_builder().and_then(ConfigBuilder::build).unwrap_err();
    assert!(err.to_string().contains("TASKPLAN_PROVIDER"));
}

#[test]
fn load_rejects_malformed_file() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    write_config_file(&temp_home, "{ not json");
    let _env = EnvGuard::isolated(&temp_home, &[]);

    let err = Config::load_builder().and_then(ConfigBuilder::build).unwrap_err();
    assert!(err.to_string().contains("Failed parsing JSON config"));
}

#[test]
fn builder_overrides_apply_before_validation() {
    let config = ConfigBuilder::new()
        .with_llm(|llm| {
            llm.switch_provider(LlmProvider::OpenAi);
            llm.api_key = "sk-test".to_string();
        })
        .with_storage(|storage| storage.plans_dir = PathBuf::from("elsewhere"))
        .build()
        .unwrap();

    assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(config.llm.api_key, "sk-test");
    assert_eq!(config.storage.plans_dir, PathBuf::from("elsewhere"));
}

#[test]
fn with_provider_picks_up_that_providers_key() {
    let _lock = env_lock();
    let temp_home = TempDir::new().unwrap();
    let _env = EnvGuard::isolated(&temp_home, &[("OPENAI_API_KEY", "sk-env")]);

    let config = ConfigBuilder::new()
        .with_provider(LlmProvider::OpenAi)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.llm.provider, LlmProvider::OpenAi);
    assert_eq!(config.llm.api_key, "sk-env");
    assert_eq!(config.llm.model, "gpt-4o-mini");
}

#[test]
fn builder_rejects_zero_timeout_and_empty_model() {
    let err = ConfigBuilder::new()
        .with_llm(|llm| llm.timeout_secs = Some(0))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("timeout"));

    let err = ConfigBuilder::new()
        .with_llm(|llm| llm.model = "  ".to_string())
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("model"));
}

#[test]
fn parses_provider_and_naming_names() {
    assert_eq!("lm-studio".parse::<LlmProvider>().unwrap(), LlmProvider::LmStudio);
    assert_eq!("openai".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
    assert!("bedrock".parse::<LlmProvider>().is_err());
    assert_eq!("timestamp".parse::<RecordNaming>().unwrap(), RecordNaming::Timestamp);
    assert_eq!(RecordNaming::Unique.to_string(), "unique");
}

#[test]
fn test_env_string() {
    let _lock = env_lock();
    let _env = EnvGuard::new(&[("TASKPLAN_TEST_VAR", Some("test_value")), ("TASKPLAN_BLANK", Some("  "))]);

    assert_eq!(
        env_string("TASKPLAN_TEST_VAR").unwrap(),
        Some("test_value".to_string())
    );
    assert_eq!(env_string("TASKPLAN_BLANK").unwrap(), None);
    assert_eq!(env_string("TASKPLAN_NONEXISTENT_VAR").unwrap(), None);
}

#[test]
fn test_env_u64() {
    let _lock = env_lock();
    let _env = EnvGuard::new(&[("TASKPLAN_TEST_U64", Some("123")), ("TASKPLAN_BAD_U64", Some("abc"))]);

    assert_eq!(env_u64("TASKPLAN_TEST_U64").unwrap(), Some(123));
    assert_eq!(env_u64("TASKPLAN_NONEXISTENT_VAR").unwrap(), None);
    assert!(env_u64("TASKPLAN_BAD_U64").is_err());
}
