//! Loader for Daybreak configuration with YAML + environment overlays.
//!
//! Two ways in: a `daybreak.yaml` file (plus `DAYBREAK__`-prefixed env
//! overrides and `${VAR}` expansion), or [`DaybreakConfig::from_env`] for
//! deployments that carry nothing but environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

pub use daybreak_common::LlmConfig;

const MAX_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct DaybreakConfig {
    pub version: Option<String>,
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
}

#[derive(Debug, Deserialize)]
pub struct PublisherConfig {
    pub api_key: String,
    #[serde(default = "default_publisher_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_images_dir")]
    pub dir: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            enabled: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignalsConfig {
    #[serde(default = "default_market_endpoint")]
    pub market_endpoint: String,
    #[serde(default = "default_news_endpoint")]
    pub news_endpoint: String,
    #[serde(default)]
    pub news_auth_token: Option<String>,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            market_endpoint: default_market_endpoint(),
            news_endpoint: default_news_endpoint(),
            news_auth_token: None,
        }
    }
}

/// One scheduled post: which signals feed the prompt and which model writes it.
#[derive(Debug, Deserialize)]
pub struct VariantSpec {
    pub id: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    pub signals: SignalSource,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub style_examples: Option<Vec<String>>,
    pub llm: LlmConfig,
}

impl VariantSpec {
    /// Variants default to enabled unless the file says otherwise.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Where the morning context comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    /// Market mood plus headlines.
    Market,
    /// Headlines only.
    News,
    /// Provider-side live search over X; no local fetching.
    Social,
}

impl SignalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Market => "market",
            SignalSource::News => "news",
            SignalSource::Social => "social",
        }
    }
}

fn default_publisher_endpoint() -> String {
    "https://api.typefully.com/".into()
}
fn default_images_dir() -> String {
    "images/gm".into()
}
fn default_true() -> bool {
    true
}
fn default_market_endpoint() -> String {
    "https://api.coingecko.com/api/v3/".into()
}
fn default_news_endpoint() -> String {
    "https://cryptopanic.com/api/free/v1/".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAX_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

impl DaybreakConfig {
    /// Build a config from environment variables alone, no file required.
    ///
    /// `TYPEFULLY_API_KEY` is mandatory. One variant is built per provider
    /// key present: `GROQ_API_KEY` (market context), `GEMINI_API_KEY`
    /// (headlines only), `XAI_API_KEY` (live social search). At least one
    /// provider key must be set.
    ///
    /// ```
    /// use daybreak_config::DaybreakConfig;
    ///
    /// unsafe { std::env::set_var("TYPEFULLY_API_KEY", "tf-demo"); }
    /// unsafe { std::env::set_var("XAI_API_KEY", "xai-demo"); }
    ///
    /// let cfg = DaybreakConfig::from_env().expect("publisher + one provider");
    /// assert!(cfg.variants.iter().any(|v| v.id == "social"));
    ///
    /// unsafe { std::env::remove_var("TYPEFULLY_API_KEY"); }
    /// unsafe { std::env::remove_var("XAI_API_KEY"); }
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        fn non_empty(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        let api_key = non_empty("TYPEFULLY_API_KEY")
            .ok_or_else(|| ConfigError::Message("TYPEFULLY_API_KEY is not set".into()))?;

        let mut variants = Vec::new();
        if let Some(key) = non_empty("GROQ_API_KEY") {
            variants.push(VariantSpec {
                id: "market".into(),
                enabled: None,
                signals: SignalSource::Market,
                persona: None,
                style_examples: None,
                llm: LlmConfig::Groq {
                    api_key: key,
                    model: None,
                    endpoint: None,
                    temperature: None,
                    max_tokens: None,
                },
            });
        }
        if let Some(key) = non_empty("GEMINI_API_KEY") {
            variants.push(VariantSpec {
                id: "news".into(),
                enabled: None,
                signals: SignalSource::News,
                persona: None,
                style_examples: None,
                llm: LlmConfig::Gemini {
                    api_key: key,
                    model: None,
                    endpoint: None,
                    temperature: None,
                    max_tokens: None,
                },
            });
        }
        if let Some(key) = non_empty("XAI_API_KEY") {
            variants.push(VariantSpec {
                id: "social".into(),
                enabled: None,
                signals: SignalSource::Social,
                persona: None,
                style_examples: None,
                llm: LlmConfig::Xai {
                    api_key: key,
                    model: None,
                    endpoint: None,
                    temperature: None,
                    max_tokens: None,
                    live_search: true,
                    max_search_results: None,
                },
            });
        }
        if variants.is_empty() {
            return Err(ConfigError::Message(
                "no LLM provider configured: set GROQ_API_KEY, GEMINI_API_KEY, or XAI_API_KEY"
                    .into(),
            ));
        }

        Ok(DaybreakConfig {
            version: None,
            publisher: PublisherConfig {
                api_key,
                endpoint: default_publisher_endpoint(),
            },
            images: ImagesConfig::default(),
            signals: SignalsConfig {
                news_auth_token: non_empty("CRYPTOPANIC_API_KEY"),
                ..SignalsConfig::default()
            },
            variants,
        })
    }

    /// Pick the variant to run: by id when given, else the first enabled one.
    ///
    /// Asking for a disabled variant is an error rather than a silent skip;
    /// a scheduled run should fail loudly when it was told to post something
    /// the config has turned off.
    pub fn select_variant(&self, id: Option<&str>) -> Result<&VariantSpec, ConfigError> {
        match id {
            Some(id) => {
                let v = self
                    .variants
                    .iter()
                    .find(|v| v.id == id)
                    .ok_or_else(|| ConfigError::Message(format!("unknown variant '{id}'")))?;
                if !v.is_enabled() {
                    return Err(ConfigError::Message(format!("variant '{id}' is disabled")));
                }
                Ok(v)
            }
            None => self
                .variants
                .iter()
                .find(|v| v.is_enabled())
                .ok_or_else(|| ConfigError::Message("no enabled variants configured".into())),
        }
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct DaybreakConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for DaybreakConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DaybreakConfigLoader {
    /// Fresh loader. Files merge in call order; `DAYBREAK__`-prefixed env
    /// vars are layered on top of all of them at [`DaybreakConfigLoader::load`].
    ///
    /// ```
    /// use daybreak_config::DaybreakConfigLoader;
    ///
    /// let config = DaybreakConfigLoader::new()
    ///     .with_yaml_str("version: '1'\npublisher:\n  api_key: tf-demo")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.variants.is_empty());
    /// assert_eq!(config.publisher.endpoint, "https://api.typefully.com/");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use daybreak_config::{DaybreakConfigLoader, SignalSource};
    ///
    /// let cfg = DaybreakConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// publisher:
    ///   api_key: "tf-demo"
    /// variants:
    ///   - id: "market"
    ///     signals: market
    ///     llm:
    ///       provider: groq
    ///       api_key: "gsk-demo"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.variants.len(), 1);
    /// assert_eq!(cfg.variants[0].signals, SignalSource::Market);
    /// assert!(cfg.variants[0].is_enabled());
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// The loader combines file/YAML sources with `DAYBREAK__`-prefixed
    /// environment variables and expands `${VAR}` placeholders before
    /// materialising the typed structs, so secrets can live in the
    /// environment while the file stays checked in.
    ///
    /// ```
    /// use daybreak_config::{DaybreakConfigLoader, LlmConfig};
    ///
    /// unsafe { std::env::set_var("DEMO_GROQ_KEY", "injected-from-env"); }
    ///
    /// let config = DaybreakConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// publisher:
    ///   api_key: "tf-demo"
    /// variants:
    ///   - id: "market"
    ///     signals: market
    ///     llm:
    ///       provider: groq
    ///       api_key: "${DEMO_GROQ_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.variants[0].llm {
    ///     LlmConfig::Groq { api_key, model, .. } => {
    ///         assert_eq!(api_key, "injected-from-env");
    ///         assert!(model.is_none());
    ///     }
    ///     _ => panic!("expected Groq configuration"),
    /// }
    ///
    /// unsafe { std::env::remove_var("DEMO_GROQ_KEY"); }
    /// ```
    pub fn load(self) -> Result<DaybreakConfig, ConfigError> {
        // Sources merge in insertion order, so env goes in last: a shell
        // override must beat whatever the file says.
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("DAYBREAK").separator("__"))
            .build()?;

        // Merge to a loose value tree first so ${VAR} expansion sees
        // every string, then materialise the typed config.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: DaybreakConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
