//! Parla CLI - run and inspect the language assistant server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parla_core::assistant::LanguageAssistant;
use parla_core::config::ParlaConfig;
use parla_core::llm::{LLMProvider, LLMProviderFactory, StubLLMProvider};
use parla_server::AppState;

#[derive(Parser)]
#[command(name = "parla")]
#[command(about = "Parla language assistant server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, env = "PARLA_BIND")]
        bind: Option<String>,
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
        /// Configuration file (defaults to parla.toml plus PARLA_* variables)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration with secrets redacted
    Config {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Version information
    Version,
}

fn load_config(path: Option<&PathBuf>) -> Result<ParlaConfig> {
    let config = match path {
        Some(path) => ParlaConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ParlaConfig::load()?,
    };
    Ok(config)
}

fn build_provider(config: &ParlaConfig) -> Arc<dyn LLMProvider> {
    match LLMProviderFactory::create(&config.llm) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "no LLM provider available, model routes will fail until one is configured"
            );
            Arc::new(StubLLMProvider)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, port, config } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let provider = build_provider(&config);
            let assistant = LanguageAssistant::new(provider, config.llm.to_llm_config());
            parla_server::serve(AppState::new(assistant), &config.server).await?;
        }
        Commands::Config { config } => {
            let config = load_config(config.as_ref())?;
            print!("{}", toml::to_string_pretty(&config.redacted())?);
        }
        Commands::Version => {
            println!("parla {}", env!("CARGO_PKG_VERSION"));
            println!("parla-core {}", parla_core::VERSION);
        }
    }

    Ok(())
}
