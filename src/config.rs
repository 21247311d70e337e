//! Provider configuration loaded from JSON files or the environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::providers::{Arxiv, Brave, DuckDuckGo, Exa, Google, SearxNG, SerpApi, Tavily};
use crate::query::{DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT};
use crate::{ProviderHandle, Result, SearchError, SearchRequest};

/// Known providers: name, description and the environment variables they read.
pub const KNOWN_PROVIDERS: &[(&str, &str, &[&str])] = &[
    ("google", "Google Programmable Search", &["GOOGLE_API_KEY", "GOOGLE_CX"]),
    ("serpapi", "SerpAPI (Google or Bing)", &["SERPAPI_API_KEY"]),
    ("brave", "Brave Search API", &["BRAVE_API_KEY"]),
    ("exa", "Exa neural search", &["EXA_API_KEY"]),
    ("tavily", "Tavily search API", &["TAVILY_API_KEY"]),
    ("searxng", "Self-hosted SearXNG instance", &["SEARXNG_URL"]),
    ("arxiv", "arXiv paper search (supports --id-list)", &[]),
    ("duckduckgo", "DuckDuckGo (no key required)", &[]),
];

/// Settings for a single provider, tagged by `kind` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderSettings {
    Google {
        api_key: String,
        cx: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    SerpApi {
        api_key: String,
        /// `google` (default) or `bing`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        engine: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Brave {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Exa {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Tavily {
        api_key: String,
        #[serde(default)]
        advanced: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    SearxNG {
        base_url: String,
        /// Comma-separated engine list passed through to the instance.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        engines: Option<String>,
    },
    Arxiv {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    DuckDuckGo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
}

impl ProviderSettings {
    /// Canonical provider name, matching `Provider::name`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google { .. } => "google",
            Self::SerpApi { .. } => "serpapi",
            Self::Brave { .. } => "brave",
            Self::Exa { .. } => "exa",
            Self::Tavily { .. } => "tavily",
            Self::SearxNG { .. } => "searxng",
            Self::Arxiv { .. } => "arxiv",
            Self::DuckDuckGo { .. } => "duckduckgo",
        }
    }

    /// Resolves a provider name or shortcut using `lookup` for credentials.
    ///
    /// Missing variables are left blank so that [`ProviderSettings::build`]
    /// reports them as configuration errors.
    pub fn named<F>(name: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();
        let settings = match name.trim().to_ascii_lowercase().as_str() {
            "google" | "g" => Self::Google {
                api_key: var("GOOGLE_API_KEY"),
                cx: var("GOOGLE_CX"),
                base_url: None,
            },
            "serpapi" | "serp" => Self::SerpApi {
                api_key: var("SERPAPI_API_KEY"),
                engine: None,
                base_url: None,
            },
            "brave" => Self::Brave {
                api_key: var("BRAVE_API_KEY"),
                base_url: None,
            },
            "exa" => Self::Exa {
                api_key: var("EXA_API_KEY"),
                base_url: None,
            },
            "tavily" => Self::Tavily {
                api_key: var("TAVILY_API_KEY"),
                advanced: false,
                base_url: None,
            },
            "searxng" | "searx" => Self::SearxNG {
                base_url: var("SEARXNG_URL"),
                engines: None,
            },
            "arxiv" => Self::Arxiv { base_url: None },
            "duckduckgo" | "ddg" => Self::DuckDuckGo { base_url: None },
            other => {
                return Err(SearchError::config(format!("unknown provider '{}'", other)));
            }
        };
        Ok(settings)
    }

    /// Constructs the provider, validating its credentials.
    pub fn build(&self) -> Result<ProviderHandle> {
        let handle = match self {
            Self::Google { api_key, cx, base_url } => {
                let mut provider = Google::new(api_key, cx)?;
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
            Self::SerpApi { api_key, engine, base_url } => {
                let mut provider = SerpApi::new(api_key)?;
                if let Some(engine) = engine {
                    provider = provider.with_engine(engine);
                }
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
            Self::Brave { api_key, base_url } => {
                let mut provider = Brave::new(api_key)?;
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
            Self::Exa { api_key, base_url } => {
                let mut provider = Exa::new(api_key)?;
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
            Self::Tavily { api_key, advanced, base_url } => {
                let mut provider = Tavily::new(api_key)?;
                if *advanced {
                    provider = provider.advanced();
                }
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
            Self::SearxNG { base_url, engines } => {
                let mut provider = SearxNG::new(base_url)?;
                if let Some(engines) = engines {
                    provider = provider.with_engines(engines);
                }
                ProviderHandle::new(provider)
            }
            Self::Arxiv { base_url } => {
                let mut provider = Arxiv::new()?;
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
            Self::DuckDuckGo { base_url } => {
                let mut provider = DuckDuckGo::new()?;
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url);
                }
                ProviderHandle::new(provider)
            }
        };
        Ok(handle)
    }
}

/// Top-level configuration: request defaults plus the provider list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-provider request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Default result limit per provider.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Providers queried when none are selected explicitly.
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_results: default_max_results(),
            providers: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SearchError::config(format!("invalid configuration: {}", e)))
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SearchError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Includes every keyed provider whose variables are all set, plus DuckDuckGo.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());
        let mut providers = Vec::new();

        for (name, _, vars) in KNOWN_PROVIDERS {
            if vars.is_empty() || !vars.iter().all(|v| is_set(*v)) {
                continue;
            }
            if let Ok(settings) = ProviderSettings::named(name, &lookup) {
                providers.push(settings);
            }
        }
        providers.push(ProviderSettings::DuckDuckGo { base_url: None });

        Self {
            providers,
            ..Self::default()
        }
    }

    /// Per-provider request timeout, from `timeout_ms`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Applies the configured timeout and result limit to `request`.
    pub fn apply(&self, request: SearchRequest) -> SearchRequest {
        request
            .with_timeout(self.timeout())
            .with_max_results(self.max_results)
    }

    /// Builds every configured provider.
    pub fn build(&self) -> Result<Vec<ProviderHandle>> {
        self.providers.iter().map(ProviderSettings::build).collect()
    }

    /// Builds the named providers, preferring configured entries and falling
    /// back to environment variables through `lookup`.
    pub fn select<F>(&self, names: &[String], lookup: F) -> Result<Vec<ProviderHandle>>
    where
        F: Fn(&str) -> Option<String>,
    {
        names
            .iter()
            .map(|name| {
                let wanted = ProviderSettings::named(name, &lookup)?;
                match self.providers.iter().find(|p| p.name() == wanted.name()) {
                    Some(configured) => configured.build(),
                    None => wanted.build(),
                }
            })
            .collect()
    }
}
