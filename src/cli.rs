use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::client::AIClient;
use crate::config::{Config, ConfigBuilder, LlmProvider, RecordNaming};
use crate::planner::PlanService;
use crate::server;
use crate::store::PlanStore;

/// Entry point for the `taskplan` service.
#[derive(Debug, Parser)]
#[command(
    name = "taskplan",
    about = "Turn a goal and a timeline into a phased task plan",
    version,
    long_about = None
)]
pub struct Cli {
    /// Address to listen on (default 127.0.0.1:5000)
    #[arg(short = 'l', long = "listen")]
    pub listen: Option<SocketAddr>,

    /// Directory where generated plans are saved (default saved_plans)
    #[arg(long = "plans-dir")]
    pub plans_dir: Option<PathBuf>,

    /// How saved plan files are named: unique or timestamp
    #[arg(long = "naming")]
    pub naming: Option<String>,

    /// Completion provider: lm-studio, openrouter or openai
    #[arg(long = "provider")]
    pub provider: Option<String>,

    /// Override the completion endpoint base URL
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Override the model name
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Enable debug logging, including raw completions
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_logging(self.verbose);

        let config = self.apply(Config::load_builder()?)?.build()?;
        let client = Arc::new(AIClient::new(&config.llm)?);
        let store = PlanStore::open(&config.storage.plans_dir, config.storage.naming)?;
        info!(
            provider = %config.llm.provider,
            model = %config.llm.model,
            base_url = %config.llm.base_url,
            plans_dir = %store.dir().display(),
            naming = %config.storage.naming,
            "configuration loaded"
        );
        let service = PlanService::new(client, store);

        let listener = TcpListener::bind(config.server.listen)
            .await
            .with_context(|| format!("Failed to bind {}", config.server.listen))?;
        server::serve(listener, service).await
    }

    fn apply(&self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if let Some(provider) = &self.provider {
            let provider = provider.parse::<LlmProvider>()?;
            builder = builder.with_provider(provider)?;
        }

        if let Some(base_url) = &self.base_url {
            builder = builder.with_llm(|llm| llm.base_url = base_url.clone());
        }

        if let Some(model) = &self.model {
            builder = builder.with_llm(|llm| llm.model = model.clone());
        }

        if let Some(listen) = self.listen {
            builder = builder.with_server(|server| server.listen = listen);
        }

        if let Some(plans_dir) = &self.plans_dir {
            builder = builder.with_storage(|storage| storage.plans_dir = plans_dir.clone());
        }

        if let Some(naming) = &self.naming {
            let naming = naming.parse::<RecordNaming>()?;
            builder = builder.with_storage(|storage| storage.naming = naming);
        }

        Ok(builder)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();
}
