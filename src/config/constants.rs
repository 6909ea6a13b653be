pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_PLANS_DIR: &str = "saved_plans";
pub const DEFAULT_LM_STUDIO_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const DEFAULT_LM_STUDIO_API_KEY: &str = "lm-studio";
pub const DEFAULT_LM_STUDIO_MODEL: &str = "google/gemma-3-1B-it-QAT";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemma-3-12b-it:free";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
