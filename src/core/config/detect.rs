//! Provider detection used when no config file exists.

use std::time::Duration;

use tracing::{debug, warn};

use crate::core::backends::endpoint_url;
use crate::core::config::data::{Config, ProviderConfig};
use crate::core::providers::{CredentialSource, ProviderKind};

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Builds a config from what is reachable: a local Ollama answering
/// `/api/tags` and an OpenRouter key in the environment.
pub async fn detect_providers<C>(
    client: &reqwest::Client,
    ollama_base_url: &str,
    credentials: &C,
) -> Config
where
    C: CredentialSource + ?Sized,
{
    let mut config = Config::default();

    if ollama_is_running(client, ollama_base_url).await {
        let mut ollama = ProviderConfig::new(ProviderKind::Ollama.as_str());
        ollama.base_url = Some(ollama_base_url.to_string());
        config
            .providers
            .insert(ProviderKind::Ollama.as_str().to_string(), ollama);
    }

    let openrouter = ProviderKind::OpenRouter;
    if openrouter
        .default_credential_env()
        .and_then(|variable| credentials.credential(variable))
        .is_some()
    {
        config.providers.insert(
            openrouter.as_str().to_string(),
            ProviderConfig::new(openrouter.as_str()),
        );
    }

    debug!(providers = ?config.providers.keys().collect::<Vec<_>>(), "detected providers");
    config
}

async fn ollama_is_running(client: &reqwest::Client, base_url: &str) -> bool {
    let url = endpoint_url(base_url, "api/tags");
    match client.get(&url).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) => response.status().is_success(),
        Err(err) => {
            warn!(%url, %err, "ollama is not reachable");
            false
        }
    }
}
