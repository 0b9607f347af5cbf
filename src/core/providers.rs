//! Provider resolution: `[provider/]model` plus the provider table become a
//! ready-to-use backend.
//!
//! Everything here runs before any network call, so a bad model reference or
//! a missing credential fails fast with a [`ConfigurationError`].

use tracing::info;

use crate::core::backends::{Backend, GeminiBackend, OllamaBackend, OpenAiBackend};
use crate::core::config::{Config, ProviderConfig};
use crate::core::error::ConfigurationError;

/// Provider used when a bare model name is ambiguous.
pub const DEFAULT_PROVIDER: &str = "ollama";

pub const SUPPORTED_PROVIDER_TYPES: &[&str] = &["ollama", "openai", "openrouter", "gemini"];

const OPENROUTER_REFERER: &str = "https://github.com/bazoocaze/ocelot";
const OPENROUTER_TITLE: &str = "Ocelot CLI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenAi,
    OpenRouter,
    Gemini,
}

impl ProviderKind {
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "ollama" => Some(ProviderKind::Ollama),
            "openai" => Some(ProviderKind::OpenAi),
            "openrouter" => Some(ProviderKind::OpenRouter),
            "gemini" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Gemini => "gemini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "http://localhost:11434",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Environment variable holding the API key, if the type needs one.
    pub fn default_credential_env(self) -> Option<&'static str> {
        match self {
            ProviderKind::Ollama => None,
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
        }
    }
}

/// Where API keys come from.
pub trait CredentialSource {
    fn credential(&self, variable: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credential(&self, variable: &str) -> Option<String> {
        std::env::var(variable)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// A `[provider/]model` reference split at its first slash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRef<'a> {
    pub provider: Option<&'a str>,
    pub model: &'a str,
}

pub fn parse_model_ref(identifier: &str) -> ModelRef<'_> {
    match identifier.split_once('/') {
        Some((provider, model)) => ModelRef {
            provider: Some(provider),
            model,
        },
        None => ModelRef {
            provider: None,
            model: identifier,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

pub fn resolve_provider<C>(
    identifier: &str,
    config: &Config,
    credentials: &C,
) -> Result<ResolvedProvider, ConfigurationError>
where
    C: CredentialSource + ?Sized,
{
    if config.providers.is_empty() {
        return Err(ConfigurationError::NoProviders);
    }

    let reference = parse_model_ref(identifier.trim());

    let name = match reference.provider {
        Some(provider) => provider.to_string(),
        None => select_unprefixed_provider(config),
    };

    let provider_config =
        config
            .providers
            .get(&name)
            .ok_or_else(|| ConfigurationError::UnknownProvider {
                name: name.clone(),
            })?;

    if reference.model.trim().is_empty() {
        return Err(ConfigurationError::MissingModel {
            identifier: identifier.to_string(),
        });
    }

    let kind = ProviderKind::from_type(&provider_config.kind).ok_or_else(|| {
        ConfigurationError::UnsupportedProviderType {
            provider: name.clone(),
            kind: provider_config.kind.clone(),
            supported: SUPPORTED_PROVIDER_TYPES.to_vec(),
        }
    })?;

    let api_key = resolve_credential(&name, kind, provider_config, credentials)?;
    let base_url = provider_config
        .base_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| kind.default_base_url().to_string());

    info!(provider = %name, kind = kind.as_str(), model = reference.model, "resolved provider");

    Ok(ResolvedProvider {
        name,
        kind,
        base_url,
        model: reference.model.to_string(),
        api_key,
    })
}

fn select_unprefixed_provider(config: &Config) -> String {
    if config.providers.len() == 1 {
        if let Some(only) = config.providers.keys().next() {
            return only.clone();
        }
    }
    config.default_provider_name().to_string()
}

fn resolve_credential<C>(
    provider: &str,
    kind: ProviderKind,
    provider_config: &ProviderConfig,
    credentials: &C,
) -> Result<Option<String>, ConfigurationError>
where
    C: CredentialSource + ?Sized,
{
    let variable = provider_config
        .api_key_env
        .as_deref()
        .or(kind.default_credential_env());

    let Some(variable) = variable else {
        return Ok(None);
    };

    match credentials.credential(variable) {
        Some(key) => Ok(Some(key)),
        None if kind.default_credential_env().is_none() => Ok(None),
        None => Err(ConfigurationError::MissingCredential {
            provider: provider.to_string(),
            variable: variable.to_string(),
        }),
    }
}

/// Builds the backend for a resolved provider.
pub fn build_backend(
    resolved: ResolvedProvider,
    client: reqwest::Client,
    stream: bool,
) -> Box<dyn Backend> {
    let ResolvedProvider {
        name,
        kind,
        base_url,
        model,
        api_key,
    } = resolved;
    match kind {
        ProviderKind::Ollama => Box::new(
            OllamaBackend::new(client, name, base_url, model, stream).with_api_key(api_key),
        ),
        ProviderKind::OpenAi => Box::new(OpenAiBackend::new(
            client,
            name,
            base_url,
            model,
            api_key.unwrap_or_default(),
            stream,
        )),
        ProviderKind::OpenRouter => Box::new(
            OpenAiBackend::new(client, name, base_url, model, api_key.unwrap_or_default(), stream)
                .with_header("HTTP-Referer", OPENROUTER_REFERER)
                .with_header("X-Title", OPENROUTER_TITLE),
        ),
        ProviderKind::Gemini => Box::new(GeminiBackend::new(
            client,
            name,
            base_url,
            model,
            api_key.unwrap_or_default(),
        )),
    }
}
