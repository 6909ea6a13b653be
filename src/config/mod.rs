//! Configuration for the taskplan service.
//!
//! Settings are resolved once at startup from, in increasing precedence:
//! - built-in defaults (a local LM Studio endpoint)
//! - an optional JSON file at `~/.taskplan/config`
//! - environment variables for the completion endpoint, credential and model
//! - command-line flags
//!
//! The resulting [`Config`] is read-only and handed to the components that
//! need it; nothing reads configuration from global state.

mod builder;
mod constants;
mod defaults;
mod environment;
mod loader;
mod types;
mod validation;

pub use builder::ConfigBuilder;
pub use types::{Config, LlmProvider, LlmSettings, RecordNaming};

#[cfg(test)]
mod tests;
