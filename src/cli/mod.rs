//! Command-line interface parsing and handling
//!
//! This module parses the command line, loads the provider configuration and
//! dispatches to the `generate`, `chat` and `show-config` commands.

pub mod chat;
pub mod generate;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::backends::Backend;
use crate::core::config::{detect_providers, path_display, Config, ConfigError};
use crate::core::providers::{build_backend, resolve_provider, EnvCredentials, ProviderKind};
use crate::logging;
use crate::ui::{DebugRenderer, PlainRenderer, Renderer};

#[derive(Parser, Debug)]
#[command(name = "ocelot", version)]
#[command(about = "Command-line client for LLM models")]
#[command(
    long_about = "Ocelot sends prompts to Ollama, OpenAI-compatible, OpenRouter and Gemini \
models and prints the streamed answer as plain text.\n\n\
Models are addressed as [provider/]model, e.g. ollama/qwen3:8b or \
openrouter/deepseek/deepseek-r1. A bare model name uses the only configured \
provider, or the default provider when several are configured.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY       Key for providers of type openai\n\
  OPENROUTER_API_KEY   Key for providers of type openrouter\n\
  GEMINI_API_KEY       Key for providers of type gemini\n\
  RUST_LOG             Diagnostic log filter (overrides --debug)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Hide the model's reasoning
    #[arg(long, global = true)]
    pub no_show_reasoning: bool,

    /// Show every fragment as it arrives and enable debug logging
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Request a single non-streamed reply
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate text from a prompt
    Generate {
        /// Model to use, as [provider/]model
        #[arg(short = 'm', long = "model", visible_alias = "model-name", value_name = "MODEL")]
        model: String,
        /// Prompt text; read from standard input when absent
        prompt: Option<String>,
    },
    /// Interactive chat with a model
    Chat {
        /// Model to use, as [provider/]model
        #[arg(short = 'm', long = "model", visible_alias = "model-name", value_name = "MODEL")]
        model: String,
        /// First prompt to send without waiting for input
        #[arg(long, value_name = "TEXT")]
        initial_prompt: Option<String>,
    },
    /// Print the effective configuration as TOML
    ShowConfig,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.debug);

    let runtime = tokio::runtime::Runtime::new()?;
    let client = http_client()?;

    match &args.command {
        Commands::Generate { model, prompt } => runtime.block_on(generate::run(
            &args,
            &client,
            model,
            prompt.as_deref(),
        )),
        Commands::Chat {
            model,
            initial_prompt,
        } => chat::run(&runtime, &args, &client, model, initial_prompt.clone()),
        Commands::ShowConfig => {
            let config = runtime.block_on(load_config(&args, &client))?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("ocelot/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Loads the config file, or detects providers when there is none.
///
/// A path given with `--config` must exist.
pub async fn load_config(args: &Args, client: &reqwest::Client) -> Result<Config, ConfigError> {
    if let Some(path) = &args.config {
        return match Config::load_from_path(path)? {
            Some(config) => Ok(config),
            None => Err(ConfigError::Read {
                path: path.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
            }),
        };
    }

    if let Some(path) = Config::default_config_path() {
        if let Some(config) = Config::load_from_path(&path)? {
            debug!(path = %path_display(&path), "loaded config");
            return Ok(config);
        }
    }

    Ok(detect_providers(client, ProviderKind::Ollama.default_base_url(), &EnvCredentials).await)
}

/// Resolves `[provider/]model` against the effective config.
pub async fn resolve_backend(
    args: &Args,
    client: &reqwest::Client,
    model: &str,
) -> Result<Box<dyn Backend>, Box<dyn Error>> {
    let config = load_config(args, client).await?;
    let resolved = resolve_provider(model, &config, &EnvCredentials)?;
    Ok(build_backend(resolved, client.clone(), !args.no_stream))
}

pub fn stdout_renderer(debug: bool) -> Box<dyn Renderer> {
    if debug {
        Box::new(DebugRenderer::new(io::stdout()))
    } else {
        Box::new(PlainRenderer::new(io::stdout()))
    }
}

/// Cancels `cancel` on Ctrl-C. Abort the returned task once the request is
/// over.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    debug!("interrupt received, cancelling request");
                    cancel.cancel();
                }
            }
        }
    })
}
